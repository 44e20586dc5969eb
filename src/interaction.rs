use bevy::prelude::*;

use crate::components::*;
use crate::game_runtime::{apply_life_loss, LifeLoss, LifeLossIo};
use crate::level::{self, GameRng};
use crate::physics_core::Aabb;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                fireball_platform_contacts,
                fireball_player_contacts,
                enemy_player_contacts,
                coin_pickups,
            )
                .chain()
                .in_set(crate::SimulationSet::Collision)
                .distributive_run_if(crate::game_runtime::gameplay_systems_enabled),
        );
    }
}

/// A landing from above while descending defeats the enemy.
pub fn is_stomp(player_y: f32, player_vy: f32, enemy_y: f32, margin: f32) -> bool {
    player_vy > 0.0 && player_y < enemy_y - margin
}

pub fn stomp_margin(kind: EnemyKind, config: &GameConfig) -> f32 {
    match kind {
        EnemyKind::Patrol => config.patrol_stomp_margin,
        EnemyKind::Hover => config.hover_stomp_margin,
    }
}

pub fn stomp_points(kind: EnemyKind, config: &GameConfig) -> u32 {
    match kind {
        EnemyKind::Patrol => config.patrol_points,
        EnemyKind::Hover => config.hover_points,
    }
}

fn body_box(pos: &GamePosition, col: &Collider) -> Aabb {
    Aabb::from_center(pos.x, pos.y, col.width, col.height)
}

type PlayerItem<'a> = (
    Entity,
    &'a Player,
    &'a mut GamePosition,
    &'a mut Velocity,
    &'a Collider,
);

/// Runs the life-loss outcome over both players.
fn lose_life(
    commands: &mut Commands,
    io: &mut LifeLossIo,
    players: &mut Query<PlayerItem<'_>, With<Player>>,
    cause: &str,
) -> LifeLoss {
    let outcome = io.trigger(cause);
    for (entity, player, mut pos, mut vel, _) in players.iter_mut() {
        apply_life_loss(commands, &io.config, outcome, entity, *player, &mut pos, &mut vel);
    }
    outcome
}

fn touching_player(players: &Query<PlayerItem<'_>, With<Player>>, target: &Aabb) -> Option<Entity> {
    players
        .iter()
        .find(|(_, _, pos, _, col)| body_box(pos, col).overlaps(target))
        .map(|(entity, ..)| entity)
}

fn fireball_platform_contacts(
    mut commands: Commands,
    fireballs: Query<(Entity, &GamePosition, &Collider), With<Fireball>>,
    platforms: Query<(&GamePosition, &Collider), With<Platform>>,
) {
    let solids: Vec<Aabb> = platforms.iter().map(|(p, c)| body_box(p, c)).collect();
    for (entity, pos, col) in fireballs.iter() {
        let fb = body_box(pos, col);
        if solids.iter().any(|s| s.overlaps(&fb)) {
            commands.entity(entity).despawn_recursive();
        }
    }
}

fn fireball_player_contacts(
    mut commands: Commands,
    mut io: LifeLossIo,
    mut players: Query<PlayerItem<'_>, With<Player>>,
    fireballs: Query<(Entity, &GamePosition, &Collider), (With<Fireball>, Without<Player>)>,
) {
    for (entity, pos, col) in fireballs.iter() {
        let fb = body_box(pos, col);
        if touching_player(&players, &fb).is_none() {
            continue;
        }
        commands.entity(entity).despawn_recursive();
        if lose_life(&mut commands, &mut io, &mut players, "fireball") != LifeLoss::Respawn {
            return;
        }
    }
}

fn enemy_player_contacts(
    mut commands: Commands,
    mut io: LifeLossIo,
    mut players: Query<PlayerItem<'_>, With<Player>>,
    enemies: Query<(Entity, &Enemy, &GamePosition, &Collider), Without<Player>>,
) {
    for (enemy_entity, enemy, enemy_pos, enemy_col) in enemies.iter() {
        let enemy_box = body_box(enemy_pos, enemy_col);
        let Some(player_entity) = touching_player(&players, &enemy_box) else {
            continue;
        };
        let kind = enemy.kind();
        let stomped = players
            .get(player_entity)
            .map(|(_, _, pos, vel, _)| {
                is_stomp(pos.y, vel.y, enemy_pos.y, stomp_margin(kind, &io.config))
            })
            .unwrap_or(false);

        if stomped {
            if let Ok((_, player, _, mut vel, _)) = players.get_mut(player_entity) {
                vel.y = -io.config.stomp_bounce;
                let points = stomp_points(kind, &io.config);
                io.state.add_score(points);
                io.bus.emit(
                    "enemy_stomped",
                    serde_json::json!({
                        "kind": kind,
                        "player": player.index() + 1,
                        "points": points,
                        "score": io.state.score,
                    }),
                );
            }
            commands.entity(enemy_entity).despawn_recursive();
        } else if lose_life(&mut commands, &mut io, &mut players, "enemy") != LifeLoss::Respawn {
            return;
        }
    }
}

type CoinItem<'a> = (
    &'a mut Coin,
    &'a mut GamePosition,
    &'a mut Velocity,
    &'a Collider,
);

fn coin_pickups(
    mut commands: Commands,
    mut io: LifeLossIo,
    mut rng: ResMut<GameRng>,
    players: Query<PlayerItem<'_>, With<Player>>,
    mut coins: Query<CoinItem<'_>, Without<Player>>,
) {
    let mut remaining = coins.iter().filter(|(coin, ..)| coin.active).count();
    if remaining == 0 {
        return;
    }
    let mut wave_cleared = false;
    for (mut coin, pos, _, col) in coins.iter_mut() {
        if !coin.active {
            continue;
        }
        if touching_player(&players, &body_box(&pos, col)).is_none() {
            continue;
        }
        coin.active = false;
        remaining -= 1;
        io.state.add_score(io.config.coin_points);
        io.bus.emit(
            "coin_collected",
            serde_json::json!({ "score": io.state.score, "remaining": remaining }),
        );
        if remaining == 0 {
            wave_cleared = true;
            break;
        }
    }

    if !wave_cleared {
        return;
    }
    for (mut coin, mut pos, mut vel, _) in coins.iter_mut() {
        coin.active = true;
        *pos = GamePosition::new(coin.column_x, 0.0);
        *vel = Velocity::default();
    }
    let spawn = level::refill_patrol_spawn(&mut rng.0, &io.config);
    level::spawn_patrol_enemy(&mut commands, spawn);
    io.bus.emit(
        "coin_wave_cleared",
        serde_json::json!({ "score": io.state.score, "enemy_x": spawn.x }),
    );
    info!(
        "[Duodash] Coin wave cleared, new patrol enemy at x={:.0} ({:.0}..{:.0})",
        spawn.x, spawn.min_x, spawn.max_x
    );
}
