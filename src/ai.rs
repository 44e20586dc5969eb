use bevy::prelude::*;

use crate::components::{Enemy, Facing, Fireball, GameConfig, GamePosition, Player, Velocity};
use crate::events::GameEventBus;

pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        let interval = app
            .world()
            .get_resource::<GameConfig>()
            .map(|c| c.fire_interval_secs)
            .unwrap_or_else(|| GameConfig::default().fire_interval_secs);
        app.insert_resource(FireTimer::new(interval))
            .add_systems(
                FixedUpdate,
                fire_fireballs
                    .in_set(crate::SimulationSet::Fire)
                    .run_if(crate::game_runtime::gameplay_systems_enabled),
            )
            .add_systems(
                FixedUpdate,
                (update_enemies, cull_fireballs)
                    .chain()
                    .in_set(crate::SimulationSet::Behavior)
                    .distributive_run_if(crate::game_runtime::gameplay_systems_enabled),
            );
    }
}

/// Walks back and forth between `min_x` and `max_x`.
///
/// Returns true when the direction flipped this tick. A velocity of exactly
/// zero restarts the walk in the current direction.
pub fn patrol_step(
    direction: &mut f32,
    min_x: f32,
    max_x: f32,
    x: &mut f32,
    vx: &mut f32,
    speed: f32,
) -> bool {
    if *vx == 0.0 {
        *vx = *direction * speed;
    }
    if *x <= min_x || *x >= max_x {
        *direction = -*direction;
        *vx = *direction * speed;
        *x = x.clamp(min_x, max_x);
        return true;
    }
    false
}

/// Bobs vertically around the height captured on the first tick.
pub fn hover_step(
    float_direction: &mut f32,
    original_y: &mut Option<f32>,
    y: &mut f32,
    vy: &mut f32,
    speed: f32,
    amplitude: f32,
) {
    let origin = match *original_y {
        Some(origin) => origin,
        None => {
            *original_y = Some(*y);
            *float_direction = 1.0;
            *y
        }
    };
    *y = y.clamp(origin - amplitude, origin + amplitude);
    if *y >= origin + amplitude {
        *float_direction = -1.0;
    } else if *y <= origin - amplitude {
        *float_direction = 1.0;
    }
    *vy = *float_direction * speed;
}

/// Straight-line launch velocity from `from` toward `to`.
pub fn aim_velocity(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    Vec2::new(angle.cos(), angle.sin()) * speed
}

pub fn fireball_in_bounds(pos: &GamePosition, config: &GameConfig) -> bool {
    pos.x >= 0.0
        && pos.x <= config.world_width
        && pos.y >= config.fireball_min_y
        && pos.y <= config.fireball_max_y
}

fn update_enemies(
    config: Res<GameConfig>,
    mut query: Query<(&mut Enemy, &mut GamePosition, &mut Velocity, Option<&mut Facing>)>,
) {
    for (mut enemy, mut pos, mut vel, facing) in query.iter_mut() {
        match &mut *enemy {
            Enemy::Patrol {
                direction,
                min_x,
                max_x,
            } => {
                let flipped = patrol_step(
                    direction,
                    *min_x,
                    *max_x,
                    &mut pos.x,
                    &mut vel.x,
                    config.patrol_speed,
                );
                if flipped {
                    if let Some(mut facing) = facing {
                        facing.right = !facing.right;
                    }
                }
            }
            Enemy::Hover {
                float_direction,
                original_y,
            } => {
                hover_step(
                    float_direction,
                    original_y,
                    &mut pos.y,
                    &mut vel.y,
                    config.hover_speed,
                    config.hover_amplitude,
                );
            }
        }
    }
}

/// Repeating timer for the hover enemies' volley.
#[derive(Resource)]
pub struct FireTimer(pub Timer);

impl FireTimer {
    pub fn new(interval_secs: f32) -> Self {
        Self(Timer::from_seconds(interval_secs, TimerMode::Repeating))
    }

    pub fn reset(&mut self, config: &GameConfig) {
        *self = Self::new(config.fire_interval_secs);
    }
}

fn fire_fireballs(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    config: Res<GameConfig>,
    mut timer: ResMut<FireTimer>,
    mut bus: ResMut<GameEventBus>,
    players: Query<(&Player, &GamePosition)>,
    enemies: Query<(&Enemy, &GamePosition)>,
) {
    timer.0.tick(time.delta());
    let volleys = timer.0.times_finished_this_tick();
    if volleys == 0 {
        return;
    }

    let mut targets: [Option<Vec2>; 2] = [None, None];
    for (player, pos) in players.iter() {
        targets[player.index()] = Some(pos.as_vec2());
    }

    for _ in 0..volleys {
        for (enemy, pos) in enemies.iter() {
            if !matches!(enemy, Enemy::Hover { .. }) {
                continue;
            }
            let origin = pos.as_vec2();
            let mut shots = 0u32;
            if let Some(p1) = targets[Player::One.index()] {
                let velocity = aim_velocity(origin, p1, config.fireball_speed);
                crate::level::spawn_fireball(&mut commands, origin, velocity);
                shots += 1;
            }
            if let Some(p2) = targets[Player::Two.index()] {
                if origin.distance(p2) < config.second_target_range {
                    let velocity = aim_velocity(origin, p2, config.fireball_speed);
                    crate::level::spawn_fireball(&mut commands, origin, velocity);
                    shots += 1;
                }
            }
            if shots > 0 {
                bus.emit(
                    "fireball_fired",
                    serde_json::json!({ "x": origin.x, "y": origin.y, "count": shots }),
                );
            }
        }
    }
}

fn cull_fireballs(
    mut commands: Commands,
    config: Res<GameConfig>,
    query: Query<(Entity, &GamePosition), With<Fireball>>,
) {
    for (entity, pos) in query.iter() {
        if !fireball_in_bounds(pos, &config) {
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn patrol_stays_within_bounds() {
        let (min_x, max_x) = (200.0, 400.0);
        let mut direction = 1.0;
        let mut x = 300.0;
        let mut vx = 0.0;
        let mut flips = 0;
        for _ in 0..3000 {
            // Integration, as the physics step would do it.
            x += vx * DT;
            if patrol_step(&mut direction, min_x, max_x, &mut x, &mut vx, 50.0) {
                flips += 1;
            }
            assert!((min_x..=max_x).contains(&x), "x = {x}");
            assert_eq!(vx.abs(), 50.0);
        }
        assert!(flips >= 5);
    }

    #[test]
    fn patrol_outside_bounds_snaps_in_and_walks_inward() {
        let mut direction = -1.0;
        let mut x = 500.0;
        let mut vx = 0.0;
        assert!(patrol_step(&mut direction, 550.0, 700.0, &mut x, &mut vx, 50.0));
        assert_eq!(x, 550.0);
        assert_eq!(direction, 1.0);
        assert_eq!(vx, 50.0);

        x += vx * DT;
        assert!(!patrol_step(&mut direction, 550.0, 700.0, &mut x, &mut vx, 50.0));
        assert_eq!(direction, 1.0);
    }

    #[test]
    fn patrol_resumes_current_direction_after_zeroed_velocity() {
        let mut direction = -1.0;
        let mut x = 300.0;
        let mut vx = 0.0;
        assert!(!patrol_step(&mut direction, 200.0, 400.0, &mut x, &mut vx, 50.0));
        assert_eq!(vx, -50.0);
    }

    #[test]
    fn hover_stays_within_band() {
        let mut float_direction = 0.0;
        let mut original_y = None;
        let mut y = 200.0;
        let mut vy = 0.0;
        hover_step(&mut float_direction, &mut original_y, &mut y, &mut vy, 30.0, 20.0);
        assert_eq!(original_y, Some(200.0));
        assert_eq!(vy, 30.0);

        let mut saw_top = false;
        let mut saw_bottom = false;
        for _ in 0..2000 {
            y += vy * DT;
            hover_step(&mut float_direction, &mut original_y, &mut y, &mut vy, 30.0, 20.0);
            assert!((180.0..=220.0).contains(&y), "y = {y}");
            saw_top |= y >= 219.0;
            saw_bottom |= y <= 181.0;
        }
        assert!(saw_top && saw_bottom);
    }

    #[test]
    fn aim_velocity_has_fixed_speed_toward_target() {
        let v = aim_velocity(Vec2::new(300.0, 200.0), Vec2::new(100.0, 500.0), 150.0);
        assert!((v.length() - 150.0).abs() < 0.001);
        assert!(v.x < 0.0 && v.y > 0.0);
        let dir = Vec2::new(-200.0, 300.0).normalize();
        assert!((v.normalize() - dir).length() < 0.0001);
    }

    #[test]
    fn fireball_bounds_region() {
        let config = GameConfig::default();
        assert!(fireball_in_bounds(&GamePosition::new(0.0, -200.0), &config));
        assert!(fireball_in_bounds(&GamePosition::new(800.0, 1200.0), &config));
        assert!(!fireball_in_bounds(&GamePosition::new(-0.1, 100.0), &config));
        assert!(!fireball_in_bounds(&GamePosition::new(400.0, -201.0), &config));
        assert!(!fireball_in_bounds(&GamePosition::new(400.0, 1201.0), &config));
    }

    fn fire_app() -> App {
        let mut app = App::new();
        let mut fixed = Time::<Fixed>::from_hz(60.0);
        fixed.advance_by(Duration::from_secs_f64(0.5));
        app.insert_resource(fixed)
            .insert_resource(GameConfig::default())
            .insert_resource(GameEventBus::default())
            .insert_resource(FireTimer::new(2.0))
            .add_systems(Update, fire_fireballs);
        app
    }

    #[test]
    fn volley_targets_player_two_only_when_close() {
        let mut app = fire_app();
        app.world_mut()
            .spawn((Player::One, GamePosition::new(100.0, 500.0)));
        app.world_mut()
            .spawn((Player::Two, GamePosition::new(700.0, 500.0)));
        // Near player two: 100 units away.
        app.world_mut().spawn((
            Enemy::Hover {
                float_direction: 1.0,
                original_y: None,
            },
            GamePosition::new(700.0, 400.0),
        ));
        // Far from player two.
        app.world_mut().spawn((
            Enemy::Hover {
                float_direction: 1.0,
                original_y: None,
            },
            GamePosition::new(100.0, 0.0),
        ));
        // Patrol enemies never fire.
        app.world_mut().spawn((
            Enemy::Patrol {
                direction: 1.0,
                min_x: 0.0,
                max_x: 100.0,
            },
            GamePosition::new(50.0, 500.0),
        ));

        for _ in 0..3 {
            app.update();
        }
        let world = app.world_mut();
        assert_eq!(world.query::<&Fireball>().iter(world).count(), 0);

        app.update();
        let world = app.world_mut();
        let shots: Vec<Velocity> = world
            .query_filtered::<&Velocity, With<Fireball>>()
            .iter(world)
            .copied()
            .collect();
        assert_eq!(shots.len(), 3);
        for v in &shots {
            assert!((Vec2::new(v.x, v.y).length() - 150.0).abs() < 0.01);
        }
        assert_eq!(app.world().resource::<GameEventBus>().count("fireball_fired"), 2);
    }

    #[test]
    fn fireballs_leaving_region_are_culled() {
        let mut app = App::new();
        app.insert_resource(GameConfig::default())
            .add_systems(Update, cull_fireballs);
        let inside = app
            .world_mut()
            .spawn((Fireball, GamePosition::new(400.0, 300.0)))
            .id();
        let outside = app
            .world_mut()
            .spawn((Fireball, GamePosition::new(810.0, 300.0)))
            .id();
        app.update();
        assert!(app.world().get_entity(inside).is_ok());
        assert!(app.world().get_entity(outside).is_err());
    }
}
