mod camera;
mod config;
mod particles;
mod sampler;
mod scroll;
mod tween;

use bevy::{input::common_conditions::input_toggle_active, prelude::*};
use bevy_fps_counter::FpsCounterPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use camera::CameraPlugin;
use config::{ConfigError, MorphConfig};
use particles::{
    advance_timeline, setup_particles, spin_particles, update_particles, upload_positions,
};
use scroll::{scroll_resize, scroll_wheel, setup_scroll};

/// Scatter to sphere morph, scrubbed by scrolling
pub(crate) struct MorphPlugin;

impl Plugin for MorphPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MorphConfig>()
            .add_systems(Startup, (setup_particles, setup_scroll))
            .add_systems(
                Update,
                (
                    scroll_resize,
                    scroll_wheel,
                    advance_timeline,
                    update_particles,
                    upload_positions,
                )
                    .chain(),
            )
            .add_systems(Update, spin_particles);
    }
}

fn main() -> Result<(), ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => MorphConfig::load(path)?,
        None => MorphConfig::default(),
    };
    config.validate()?;

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "particle morph".to_string(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(config.clear_color()?))
        .insert_resource(config)
        .add_plugins(FpsCounterPlugin)
        .add_plugins(WorldInspectorPlugin::new().run_if(input_toggle_active(false, KeyCode::F1)))
        .add_plugins((CameraPlugin, MorphPlugin))
        .run();

    Ok(())
}
