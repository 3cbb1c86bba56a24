use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::input::{keyboard::KeyCode, ButtonInput};
use bevy::prelude::*;

use worldmap::{HeightField, WorldMapConfig};

use crate::setup::MainCamera;

pub const MOVE_SPEED: f32 = 40.0;
/// Fraction of velocity kept per second once keys are released.
pub const PAN_DAMPING: f32 = 0.02;
pub const MAX_CAMERA_DT: f32 = 0.05; // never use a dt larger than 50ms

/// Top-down pan camera riding over the terrain.
#[derive(Component)]
pub struct CameraRig {
    pub focus: Vec3,
    pub velocity: Vec2,
    pub radius: f32,
    /// Fixed look-down angle (radians below horizontal).
    pub pitch: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            velocity: Vec2::ZERO,
            radius: 40.0,
            pitch: 1.0,
        }
    }
}

pub fn camera_controller(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut scroll_evr: EventReader<MouseWheel>,
    field: Res<HeightField>,
    config: Res<WorldMapConfig>,
    mut query: Query<(&mut Transform, &mut CameraRig), With<MainCamera>>,
) {
    // 0) Clamp delta
    let dt = time.delta_secs().min(MAX_CAMERA_DT);

    let Ok((mut tf, mut rig)) = query.single_mut() else { return; };

    // 1) Pan with momentum
    let mut dir = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) { dir.y -= 1.0; }
    if keys.pressed(KeyCode::KeyS) { dir.y += 1.0; }
    if keys.pressed(KeyCode::KeyA) { dir.x -= 1.0; }
    if keys.pressed(KeyCode::KeyD) { dir.x += 1.0; }

    if dir != Vec2::ZERO {
        rig.velocity = dir.normalize() * MOVE_SPEED;
    } else {
        rig.velocity *= PAN_DAMPING.powf(dt);
    }
    let step = rig.velocity * dt;
    rig.focus.x += step.x;
    rig.focus.z += step.y;

    // 2) Ground the focus Y
    rig.focus.y = field.height_at_world(rig.focus.x, rig.focus.z, config.tile_size);

    // 3) Zoom
    for ev in scroll_evr.read() {
        let amount = match ev.unit {
            MouseScrollUnit::Line => ev.y * 2.0,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
        rig.radius = (rig.radius - amount).clamp(8.0, 400.0);
    }

    // 4) Position camera
    let offset = Vec3::new(0.0, rig.radius * rig.pitch.sin(), rig.radius * rig.pitch.cos());
    tf.translation = rig.focus + offset;
    tf.look_at(rig.focus, Vec3::Y);
}
