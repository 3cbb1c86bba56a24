// src/world_map/systems.rs
use bevy::ecs::system::EntityCommands;
use bevy::prelude::*;

use crate::config::WorldMapConfig;

use super::components::{GroundProjectedView, MapView, StreamingStats, TilePalette, WorldMapTile};
use super::decorator::TileRenderer;
use super::engine::TileStreamer;
use super::extractor::ViewExtractor;
use super::tile::{RenderHandle, Tile, TileId};
use super::views::ViewId;

#[inline]
pub fn view_id(entity: Entity) -> ViewId {
    ViewId(entity.to_bits())
}

#[inline]
fn handle_entity(handle: RenderHandle) -> Option<Entity> {
    Entity::try_from_bits(handle.0).ok()
}

/// Builds the shared tile mesh and one material per configured color.
pub fn setup_tile_palette(
    mut commands: Commands,
    config: Res<WorldMapConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let ts = config.tile_size;
    // slabs so neighbouring elevations leave visible steps
    let mesh = meshes.add(Cuboid::new(ts * 0.98, ts, ts * 0.98));

    let materials = config
        .appearance
        .iter()
        .map(|&[r, g, b]| {
            materials.add(StandardMaterial {
                base_color: Color::linear_rgb(r, g, b),
                perceptual_roughness: 0.9,
                ..default()
            })
        })
        .collect();

    commands.insert_resource(TilePalette { mesh, materials });
}

/// Pose to project from this frame. `GlobalTransform` is only propagated in
/// `PostUpdate`, so a root camera moved earlier in `Update` uses its local
/// `Transform` directly.
#[inline]
pub fn camera_pose(local: &Transform, global: &GlobalTransform, has_parent: bool) -> GlobalTransform {
    if has_parent {
        *global
    } else {
        GlobalTransform::from(*local)
    }
}

type ProjectedCamera<'a> = (&'a Camera, &'a Transform, &'a GlobalTransform, Has<ChildOf>);

/// Camera frustum → `MapView` for every ground-projected camera.
pub fn extract_camera_views(
    config: Res<WorldMapConfig>,
    mut cameras: Query<(ProjectedCamera, &mut MapView), With<GroundProjectedView>>,
) {
    let extractor = ViewExtractor::from_config(&config);
    for ((camera, local, global, has_parent), mut view) in &mut cameras {
        let pose = camera_pose(local, global, has_parent);
        let rect = extractor.extract(camera, &pose);
        view.set_if_neq(MapView { rect });
    }
}

/// Footprint gizmos: corner hits in yellow, their outline, and the padded
/// rect that was submitted.
pub fn draw_view_corners(
    config: Res<WorldMapConfig>,
    mut gizmos: Gizmos,
    cameras: Query<(ProjectedCamera, &MapView), With<GroundProjectedView>>,
) {
    let extractor = ViewExtractor::from_config(&config);
    for ((camera, local, global, has_parent), view) in &cameras {
        let pose = camera_pose(local, global, has_parent);
        let Some(rays) = ViewExtractor::corner_rays(camera, &pose) else { continue };
        let Some(corners) = extractor.ground_corners(rays) else { continue };

        let hit = Color::srgb(1.0, 1.0, 0.0);
        for corner in corners {
            gizmos.sphere(corner, 0.3 * config.tile_size, hit);
        }
        gizmos.linestrip(corners.into_iter().chain([corners[0]]), hit);

        if let Some(rect) = view.rect {
            let ts = config.tile_size;
            let (x0, z0) = (rect.x as f32 * ts, rect.y as f32 * ts);
            let (x1, z1) = (x0 + rect.width as f32 * ts, z0 + rect.height as f32 * ts);
            gizmos.linestrip(
                [
                    Vec3::new(x0, 0.0, z0),
                    Vec3::new(x1, 0.0, z0),
                    Vec3::new(x1, 0.0, z1),
                    Vec3::new(x0, 0.0, z1),
                    Vec3::new(x0, 0.0, z0),
                ],
                Color::srgb(0.0, 1.0, 0.0),
            );
        }
    }
}

/// Hands changed and removed views to the streamer.
pub fn submit_views(
    mut streamer: ResMut<TileStreamer>,
    views: Query<(Entity, &MapView), Changed<MapView>>,
    mut removed: RemovedComponents<MapView>,
) {
    for entity in removed.read() {
        // errors are already logged by the streamer
        let _ = streamer.submit_view(view_id(entity), None);
    }
    for (entity, view) in &views {
        let _ = streamer.submit_view(view_id(entity), view.rect);
    }
}

/// Runs one streaming step with tile entities as the visuals.
pub fn stream_tiles(
    mut commands: Commands,
    mut streamer: ResMut<TileStreamer>,
    mut stats: ResMut<StreamingStats>,
    palette: Res<TilePalette>,
    config: Res<WorldMapConfig>,
) {
    let mut renderer = EntityTileRenderer {
        commands: &mut commands,
        palette: &palette,
        tile_size: config.tile_size,
    };
    stats.last = streamer.step(&mut renderer);
    stats.frames += 1;
}

/// Renderer that keeps one entity per tile. All changes go through
/// `Commands` and land at the next sync point.
pub struct EntityTileRenderer<'a, 'w, 's> {
    pub commands: &'a mut Commands<'w, 's>,
    pub palette: &'a TilePalette,
    pub tile_size: f32,
}

impl EntityTileRenderer<'_, '_, '_> {
    fn entity_commands(&mut self, handle: RenderHandle) -> Option<EntityCommands<'_>> {
        let entity = handle_entity(handle)?;
        self.commands.get_entity(entity).ok()
    }

    fn transform(&self, tile: &Tile) -> Transform {
        let ts = self.tile_size;
        let c = tile.coord();
        Transform::from_xyz(c.x as f32 * ts, tile.elevation() as f32 * ts, c.y as f32 * ts)
    }
}

impl TileRenderer for EntityTileRenderer<'_, '_, '_> {
    fn appearance_count(&self) -> usize {
        self.palette.materials.len()
    }

    fn decorate(&mut self, id: TileId, tile: &Tile, bucket: usize) -> RenderHandle {
        let marker = WorldMapTile { id, coord: tile.coord() };
        let transform = self.transform(tile);
        let material = MeshMaterial3d(self.palette.materials.get(bucket).cloned().unwrap_or_default());
        let name = Name::new(format!("Tile ({}, {})", marker.coord.x, marker.coord.y));

        // recycled tile: move, recolour and show the entity it already has
        if let Some(handle) = tile.visual() {
            if let Some(mut entity) = self.entity_commands(handle) {
                entity.insert((name, marker, transform, material, Visibility::Visible));
                return handle;
            }
            warn!("WorldMap: tile {:?} lost its entity; respawning", id);
        }

        let entity = self
            .commands
            .spawn((
                name,
                marker,
                transform,
                Mesh3d(self.palette.mesh.clone()),
                material,
                Visibility::Visible,
            ))
            .id();
        RenderHandle(entity.to_bits())
    }

    fn park(&mut self, handle: RenderHandle) {
        if let Some(mut entity) = self.entity_commands(handle) {
            entity.insert(Visibility::Hidden);
        }
    }

    fn release(&mut self, handle: RenderHandle) {
        if let Some(mut entity) = self.entity_commands(handle) {
            entity.despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_camera_projects_from_its_local_transform() {
        let moved = Transform::from_xyz(30.0, 20.0, -4.0).looking_at(Vec3::new(30.0, 0.0, -10.0), Vec3::Y);
        // propagation hasn't run yet: global still has last frame's pose
        let stale = GlobalTransform::from(Transform::from_xyz(0.0, 20.0, 0.0));

        let pose = camera_pose(&moved, &stale, false);
        assert_eq!(pose.translation(), Vec3::new(30.0, 20.0, -4.0));
        assert!((*pose.forward()).abs_diff_eq(*moved.forward(), 1e-5));

        assert_eq!(camera_pose(&moved, &stale, true), stale);
    }
}
