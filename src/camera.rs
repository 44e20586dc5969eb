use bevy::prelude::*;
use bevy::render::camera::ScalingMode;

use crate::components::{GameConfig, GamePosition, HeadlessMode, Player};

/// Top-left corner of the view in world space (y-down).
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraRig {
    pub scroll: Vec2,
}

#[derive(Component)]
pub struct MainCamera;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraRig>()
            .add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (
                    camera_follow.run_if(crate::game_runtime::gameplay_systems_enabled),
                    sync_camera_transform,
                )
                    .chain(),
            );
    }
}

/// Scroll that would centre the view on the two players.
pub fn follow_target(players: &[Vec2], viewport: Vec2) -> Option<Vec2> {
    if players.len() < 2 {
        return None;
    }
    let mid = players.iter().copied().sum::<Vec2>() / players.len() as f32;
    Some(mid - viewport * 0.5)
}

pub fn clamp_scroll(scroll: Vec2, config: &GameConfig) -> Vec2 {
    let max_x = (config.world_width - config.viewport_width).max(0.0);
    let max_y = (config.world_height - config.viewport_height).max(0.0);
    Vec2::new(scroll.x.clamp(0.0, max_x), scroll.y.clamp(0.0, max_y))
}

/// One smoothing step toward `target`, normalised to a 60 Hz frame.
pub fn follow_step(current: Vec2, target: Vec2, lerp: f32, delta_secs: f32, config: &GameConfig) -> Vec2 {
    let alpha = (lerp * delta_secs * 60.0).clamp(0.0, 1.0);
    clamp_scroll(current.lerp(target, alpha), config)
}

/// Bevy translation for the camera looking at `scroll`.
pub fn camera_translation(scroll: Vec2, config: &GameConfig) -> Vec2 {
    Vec2::new(
        scroll.x + config.viewport_width * 0.5,
        -(scroll.y + config.viewport_height * 0.5),
    )
}

fn spawn_camera(mut commands: Commands, headless: Res<HeadlessMode>, config: Res<GameConfig>) {
    if headless.0 {
        return;
    }
    let translation = camera_translation(Vec2::ZERO, &config);
    commands.spawn((
        MainCamera,
        Camera2d,
        OrthographicProjection {
            scaling_mode: ScalingMode::AutoMin {
                min_width: config.viewport_width,
                min_height: config.viewport_height,
            },
            ..OrthographicProjection::default_2d()
        },
        Transform::from_xyz(translation.x, translation.y, 100.0),
    ));
}

fn camera_follow(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut rig: ResMut<CameraRig>,
    players: Query<&GamePosition, With<Player>>,
) {
    let positions: Vec<Vec2> = players.iter().map(|p| p.as_vec2()).collect();
    let viewport = Vec2::new(config.viewport_width, config.viewport_height);
    let Some(target) = follow_target(&positions, viewport) else {
        return;
    };
    rig.scroll = follow_step(rig.scroll, target, config.camera_lerp, time.delta_secs(), &config);
}

fn sync_camera_transform(
    rig: Res<CameraRig>,
    config: Res<GameConfig>,
    mut camera: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut transform) = camera.get_single_mut() else {
        return;
    };
    let translation = camera_translation(rig.scroll, &config);
    transform.translation.x = translation.x;
    transform.translation.y = translation.y;
}
