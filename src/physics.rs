use bevy::prelude::*;

use crate::components::*;
use crate::physics_core::{self, Aabb, StepParams};

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (apply_gravity, integrate_bodies)
                .chain()
                .in_set(crate::SimulationSet::Physics)
                .distributive_run_if(crate::game_runtime::gameplay_systems_enabled),
        );
    }
}

pub fn world_aabb(config: &GameConfig) -> Aabb {
    Aabb::from_min_max(0.0, 0.0, config.world_width, config.world_height)
}

fn is_simulated(coin: Option<&Coin>) -> bool {
    coin.map_or(true, |c| c.active)
}

fn apply_gravity(
    config: Res<GameConfig>,
    time: Res<Time<Fixed>>,
    mut query: Query<(&mut Velocity, &Body, Option<&Coin>)>,
) {
    let dt = time.delta_secs();
    for (mut vel, body, coin) in query.iter_mut() {
        if body.gravity && is_simulated(coin) {
            physics_core::apply_gravity(&mut vel.y, config.gravity, dt);
        }
    }
}

type BodyQueryItem<'a> = (
    &'a mut GamePosition,
    &'a mut Velocity,
    &'a Collider,
    &'a Body,
    Option<&'a mut Grounded>,
    Option<&'a Coin>,
);

fn integrate_bodies(
    config: Res<GameConfig>,
    time: Res<Time<Fixed>>,
    platforms: Query<(&GamePosition, &Collider), With<Platform>>,
    mut bodies: Query<BodyQueryItem<'_>, Without<Platform>>,
) {
    let dt = time.delta_secs();
    let world = world_aabb(&config);
    let solids: Vec<Aabb> = platforms
        .iter()
        .map(|(pos, col)| Aabb::from_center(pos.x, pos.y, col.width, col.height))
        .collect();

    for (mut pos, mut vel, collider, body, grounded, coin) in bodies.iter_mut() {
        if !is_simulated(coin) {
            continue;
        }
        let out = physics_core::step_body(
            StepParams {
                dt,
                x: pos.x,
                y: pos.y,
                vx: vel.x,
                vy: vel.y,
                width: collider.width,
                height: collider.height,
                restitution: body.restitution,
                collide_platforms: body.collide_platforms,
                collide_world_bounds: body.collide_world_bounds,
            },
            &solids,
            &world,
        );
        pos.x = out.x;
        pos.y = out.y;
        vel.x = out.vx;
        vel.y = out.vy;
        if let Some(mut grounded) = grounded {
            grounded.0 = out.grounded;
        }
    }
}
