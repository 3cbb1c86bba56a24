use bevy::prelude::*;
use worldmap::world_map::GroundProjectedView;

use crate::input::CameraRig;

#[derive(Component)]
pub struct MainCamera;

pub fn setup(
    mut commands: Commands,
) {
    // 1) Light
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // 2) Camera; its ground footprint drives the streamer
    let rig = CameraRig::default();
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, rig.radius * rig.pitch.sin(), rig.radius * rig.pitch.cos())
            .looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
        GroundProjectedView,
        rig,
    ));
}
