use bevy::prelude::*;

use crate::components::*;
use crate::game_runtime::{apply_life_loss, LifeLossIo};
use crate::input::{PlayerControls, PlayerInputs};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (player_controls, fall_out_of_world)
                .chain()
                .in_set(crate::SimulationSet::Behavior)
                .distributive_run_if(crate::game_runtime::gameplay_systems_enabled),
        );
    }
}

/// Left wins when both directions are held.
pub fn horizontal_velocity(left: bool, right: bool, speed: f32) -> f32 {
    if left {
        -speed
    } else if right {
        speed
    } else {
        0.0
    }
}

/// Upward impulse for this tick, if any.
///
/// The jump key is edge-triggered; held "up" fires on every grounded tick.
pub fn jump_impulse(controls: &PlayerControls, grounded: bool, jump_velocity: f32) -> Option<f32> {
    if grounded && (controls.jump_pressed || controls.up) {
        Some(-jump_velocity)
    } else {
        None
    }
}

fn player_controls(
    config: Res<GameConfig>,
    inputs: Res<PlayerInputs>,
    mut query: Query<(&Player, &mut Velocity, &Grounded, &mut Facing)>,
) {
    for (player, mut vel, grounded, mut facing) in query.iter_mut() {
        let controls = inputs.get(*player);
        vel.x = horizontal_velocity(controls.left, controls.right, config.move_speed);
        if vel.x < 0.0 {
            facing.right = false;
        } else if vel.x > 0.0 {
            facing.right = true;
        }
        if let Some(vy) = jump_impulse(&controls, grounded.0, config.jump_velocity) {
            vel.y = vy;
        }
    }
}

fn fall_out_of_world(
    mut commands: Commands,
    mut io: LifeLossIo,
    mut players: Query<(Entity, &Player, &mut GamePosition, &mut Velocity)>,
) {
    let limit = io.config.fall_limit_y;
    if !players.iter().any(|(_, _, pos, _)| pos.y > limit) {
        return;
    }
    let outcome = io.trigger("fell");
    for (entity, player, mut pos, mut vel) in players.iter_mut() {
        apply_life_loss(
            &mut commands,
            &io.config,
            outcome,
            entity,
            *player,
            &mut pos,
            &mut vel,
        );
    }
}
