use bevy::prelude::*;
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraPlugin};

use crate::config::MorphConfig;

// Orbit camera looking at the particle field from +z.
// The wheel belongs to the page scroll, so orbit zoom is switched off.

pub(crate) struct CameraPlugin;
impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PanOrbitCameraPlugin)
            .add_systems(Startup, setup_camera);
    }
}

#[derive(Component)]
pub(crate) struct MorphCamera;

pub(crate) fn orbit_camera() -> PanOrbitCamera {
    PanOrbitCamera {
        focus: Vec3::ZERO,
        zoom_sensitivity: 0.0,
        orbit_smoothness: 0.1,
        ..Default::default()
    }
}

pub(crate) fn setup_camera(config: Res<MorphConfig>, mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: config.fov_degrees.to_radians(),
            near: 0.1,
            far: 100.0,
            ..Default::default()
        }),
        Transform::from_xyz(0.0, 0.0, config.camera_distance).looking_at(Vec3::ZERO, Vec3::Y),
        orbit_camera(),
        MorphCamera,
    ));
}
