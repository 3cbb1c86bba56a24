// src/world_map/extractor.rs
//! Camera frustum → ground-plane view rect.

use bevy::math::primitives::InfinitePlane3d;
use bevy::prelude::*;

use crate::config::WorldMapConfig;

use super::rect::{ViewRect, MAX_VIEW_EXTENT};

/// Projects a camera onto the ground plane `y = ground_height`.
#[derive(Clone, Copy, Debug)]
pub struct ViewExtractor {
    /// Cells added on every side of the footprint.
    pub padding: i32,
    pub max_extent: i32,
    /// World units per cell.
    pub tile_size: f32,
    pub ground_height: f32,
}

impl ViewExtractor {
    pub fn from_config(cfg: &WorldMapConfig) -> Self {
        Self {
            padding: cfg.padding.max(0),
            max_extent: cfg.max_extent.clamp(1, MAX_VIEW_EXTENT),
            tile_size: cfg.tile_size,
            ground_height: 0.0,
        }
    }

    /// Where `ray` hits the ground, if it does.
    pub fn ground_point(&self, ray: Ray3d) -> Option<Vec3> {
        let origin = Vec3::new(0.0, self.ground_height, 0.0);
        let distance = ray.intersect_plane(origin, InfinitePlane3d::new(Vec3::Y))?;
        Some(ray.get_point(distance))
    }

    /// Padded, clamped cell bounding box of ground-plane points (world XZ).
    pub fn rect_from_ground_points(&self, points: &[Vec3]) -> Option<ViewRect> {
        let ground = |p: &Vec3| Vec2::new(p.x, p.z);
        let first = ground(points.first()?);
        let (mut min, mut max) = (first, first);
        for p in &points[1..] {
            min = min.min(ground(p));
            max = max.max(ground(p));
        }

        // f32 → i32 casts saturate, so far-away horizons stay finite
        let floor = |v: f32| (v / self.tile_size).floor() as i32 as i64;
        let ceil = |v: f32| (v / self.tile_size).ceil() as i32 as i64;
        let pad = self.padding as i64;
        let (x0, y0) = (floor(min.x) - pad, floor(min.y) - pad);
        let (x1, y1) = (ceil(max.x) + pad, ceil(max.y) + pad);

        let max_extent = self.max_extent as i64;
        let width = (x1 - x0 + 1).clamp(1, max_extent);
        let height = (y1 - y0 + 1).clamp(1, max_extent);
        // keep x + width inside i32
        let x = x0.clamp(i32::MIN as i64, i32::MAX as i64 - width);
        let y = y0.clamp(i32::MIN as i64, i32::MAX as i64 - height);

        Some(ViewRect::new(x as i32, y as i32, width as i32, height as i32))
    }

    /// Ground hits of the four corner rays; `None` if any misses.
    pub fn ground_corners(&self, rays: [Ray3d; 4]) -> Option<[Vec3; 4]> {
        let mut corners = [Vec3::ZERO; 4];
        for (corner, ray) in corners.iter_mut().zip(rays) {
            *corner = self.ground_point(ray)?;
        }
        Some(corners)
    }

    /// Rect from the four frustum corner rays; `None` if any misses the ground.
    pub fn extract_from_rays(&self, rays: [Ray3d; 4]) -> Option<ViewRect> {
        let corners = self.ground_corners(rays)?;
        self.rect_from_ground_points(&corners)
    }

    /// Rect seen by a camera, or `None` when it isn't looking at the ground.
    pub fn extract(&self, camera: &Camera, transform: &GlobalTransform) -> Option<ViewRect> {
        self.extract_from_rays(Self::corner_rays(camera, transform)?)
    }

    /// Rays through the viewport corners, bottom-left first, clockwise.
    pub fn corner_rays(camera: &Camera, transform: &GlobalTransform) -> Option<[Ray3d; 4]> {
        let size = camera.logical_viewport_size()?;
        let viewport = [
            Vec2::new(0.0, size.y),
            Vec2::new(0.0, 0.0),
            Vec2::new(size.x, 0.0),
            Vec2::new(size.x, size.y),
        ];
        let mut rays = [Ray3d { origin: Vec3::ZERO, direction: Dir3::NEG_Y }; 4];
        for (ray, pos) in rays.iter_mut().zip(viewport) {
            *ray = camera.viewport_to_world(transform, pos).ok()?;
        }
        Some(rays)
    }
}

impl Default for ViewExtractor {
    fn default() -> Self {
        Self::from_config(&WorldMapConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: f32, z: f32) -> Ray3d {
        Ray3d { origin: Vec3::new(x, 20.0, z), direction: Dir3::NEG_Y }
    }

    #[test]
    fn padded_bounding_box_of_corners() {
        let ex = ViewExtractor { padding: 5, max_extent: 1000, tile_size: 1.0, ground_height: 0.0 };
        let rect = ex
            .extract_from_rays([down(-3.5, -2.0), down(-3.5, 4.2), down(6.1, 4.2), down(6.1, -2.0)])
            .unwrap();
        // floor/ceil: -4..=7 by -2..=5, padded by 5
        assert_eq!(rect, ViewRect::new(-9, -7, 22, 18));
    }

    #[test]
    fn perspective_trapezoid_uses_widest_edge() {
        let ex = ViewExtractor { padding: 0, max_extent: 1000, tile_size: 1.0, ground_height: 0.0 };
        let rect = ex
            .rect_from_ground_points(&[
                Vec3::new(-2.0, 0.0, 0.0),
                Vec3::new(-8.0, 0.0, 10.0),
                Vec3::new(8.0, 0.0, 10.0),
                Vec3::new(2.0, 0.0, 0.0),
            ])
            .unwrap();
        assert_eq!(rect, ViewRect::new(-8, 0, 17, 11));
    }

    #[test]
    fn ray_missing_ground_gives_none() {
        let ex = ViewExtractor::default();
        let flat = Ray3d { origin: Vec3::new(0.0, 5.0, 0.0), direction: Dir3::X };
        let up = Ray3d { origin: Vec3::new(0.0, 5.0, 0.0), direction: Dir3::Y };
        assert!(ex.extract_from_rays([down(0.0, 0.0), flat, down(1.0, 1.0), down(2.0, 2.0)]).is_none());
        assert!(ex.extract_from_rays([up, down(0.0, 0.0), down(1.0, 1.0), down(2.0, 2.0)]).is_none());
    }

    #[test]
    fn corners_keep_ray_order() {
        let ex = ViewExtractor::default();
        let corners = ex
            .ground_corners([down(-1.0, 2.0), down(-1.0, -2.0), down(3.0, -2.0), down(3.0, 2.0)])
            .unwrap();
        assert_eq!(corners[0], Vec3::new(-1.0, 0.0, 2.0));
        assert_eq!(corners[2], Vec3::new(3.0, 0.0, -2.0));
    }

    #[test]
    fn out_of_range_config_is_capped() {
        let cfg = WorldMapConfig { max_extent: 5000, padding: -3, ..Default::default() };
        let ex = ViewExtractor::from_config(&cfg);
        assert_eq!(ex.max_extent, 1000);
        assert_eq!(ex.padding, 0);
    }

    #[test]
    fn huge_footprint_is_clamped() {
        let ex = ViewExtractor::default();
        let rect = ex
            .rect_from_ground_points(&[Vec3::new(-1.0e9, 0.0, -5.0), Vec3::new(1.0e9, 0.0, 5.0)])
            .unwrap();
        assert_eq!(rect.width, 1000);
        assert_eq!(rect.height, 21);
        assert!(rect.check(1000).is_ok());
    }

    #[test]
    fn tile_size_scales_cells() {
        let ex = ViewExtractor { padding: 0, max_extent: 1000, tile_size: 2.0, ground_height: 0.0 };
        let rect = ex
            .rect_from_ground_points(&[Vec3::new(0.0, 0.0, 0.0), Vec3::new(7.9, 0.0, 3.9)])
            .unwrap();
        assert_eq!(rect, ViewRect::new(0, 0, 5, 3));
    }
}
