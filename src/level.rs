use bevy::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::components::*;

pub const PLAYER_SIZE: Vec2 = Vec2::new(40.0, 40.0);
pub const PLATFORM_SIZE: Vec2 = Vec2::new(64.0, 16.0);
pub const GROUND_CENTER: Vec2 = Vec2::new(400.0, 584.0);
pub const GROUND_SIZE: Vec2 = Vec2::new(800.0, 32.0);
pub const COIN_SIZE: Vec2 = Vec2::new(24.0, 24.0);
pub const PATROL_SIZE: Vec2 = Vec2::new(24.0, 24.0);
pub const HOVER_SIZE: Vec2 = Vec2::new(24.0, 20.0);
pub const FIREBALL_SIZE: Vec2 = Vec2::new(18.0, 18.0);

pub const COIN_COUNT: usize = 12;
const COIN_START_X: f32 = 100.0;
const COIN_STEP_X: f32 = 70.0;

/// Floating platforms, lowest tier first.
pub const PLATFORMS: [(f32, f32); 18] = [
    (600.0, 480.0),
    (200.0, 450.0),
    (500.0, 420.0),
    (100.0, 360.0),
    (400.0, 340.0),
    (700.0, 320.0),
    (250.0, 260.0),
    (550.0, 240.0),
    (150.0, 220.0),
    (650.0, 160.0),
    (350.0, 140.0),
    (100.0, 120.0),
    (500.0, 60.0),
    (200.0, 40.0),
    (700.0, 20.0),
    (400.0, -60.0),
    (100.0, -120.0),
    (650.0, -140.0),
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatrolSpawn {
    pub x: f32,
    pub y: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub direction: f32,
}

pub const PATROL_ENEMIES: [PatrolSpawn; 3] = [
    PatrolSpawn {
        x: 300.0,
        y: 500.0,
        min_x: 200.0,
        max_x: 400.0,
        direction: 1.0,
    },
    PatrolSpawn {
        x: 500.0,
        y: 420.0,
        min_x: 550.0,
        max_x: 700.0,
        direction: -1.0,
    },
    PatrolSpawn {
        x: 700.0,
        y: 270.0,
        min_x: 700.0,
        max_x: 800.0,
        direction: 1.0,
    },
];

pub const HOVER_ENEMIES: [(f32, f32); 3] = [(300.0, 200.0), (600.0, 100.0), (150.0, -50.0)];

pub fn player_spawn(player: Player) -> Vec2 {
    match player {
        Player::One => Vec2::new(100.0, 500.0),
        Player::Two => Vec2::new(150.0, 500.0),
    }
}

pub fn coin_column(index: usize) -> f32 {
    COIN_START_X + COIN_STEP_X * index as f32
}

/// Scene-wide random source. Seedable so runs can be replayed.
#[derive(Resource)]
pub struct GameRng(pub SmallRng);

impl GameRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(SmallRng::seed_from_u64(seed)),
            None => Self(SmallRng::from_entropy()),
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_seed(None)
    }
}

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameRng>()
            .add_systems(Startup, spawn_level);
    }
}

fn spawn_level(mut commands: Commands, config: Res<GameConfig>, mut rng: ResMut<GameRng>) {
    spawn_scene(&mut commands, &config, &mut rng.0);
    info!(
        "[Duodash] Scene ready: {} platforms, {} coins, {} patrol and {} hover enemies",
        PLATFORMS.len() + 1,
        COIN_COUNT,
        PATROL_ENEMIES.len(),
        HOVER_ENEMIES.len()
    );
}

/// Spawns the full static layout: platforms, both players, coins and enemies.
pub fn spawn_scene(commands: &mut Commands, config: &GameConfig, rng: &mut impl Rng) {
    spawn_platform(commands, GROUND_CENTER, GROUND_SIZE, SpriteKind::Ground);
    for &(x, y) in PLATFORMS.iter() {
        spawn_platform(commands, Vec2::new(x, y), PLATFORM_SIZE, SpriteKind::Platform);
    }

    for player in Player::ALL {
        spawn_player(commands, player, config);
    }

    for i in 0..COIN_COUNT {
        let bounce = rng.gen_range(config.coin_restitution_min..=config.coin_restitution_max);
        spawn_coin(commands, coin_column(i), bounce);
    }

    for spawn in PATROL_ENEMIES {
        spawn_patrol_enemy(commands, spawn);
    }
    for &(x, y) in HOVER_ENEMIES.iter() {
        spawn_hover_enemy(commands, x, y);
    }
}

pub fn spawn_platform(commands: &mut Commands, center: Vec2, size: Vec2, kind: SpriteKind) -> Entity {
    commands
        .spawn((
            SceneEntity,
            Platform,
            kind,
            GamePosition::new(center.x, center.y),
            Collider {
                width: size.x,
                height: size.y,
            },
            Transform::default(),
        ))
        .id()
}

pub fn spawn_player(commands: &mut Commands, player: Player, config: &GameConfig) -> Entity {
    let spawn = player_spawn(player);
    let kind = match player {
        Player::One => SpriteKind::PlayerOne,
        Player::Two => SpriteKind::PlayerTwo,
    };
    commands
        .spawn((
            SceneEntity,
            player,
            kind,
            GamePosition::new(spawn.x, spawn.y),
            Velocity::default(),
            Collider {
                width: PLAYER_SIZE.x,
                height: PLAYER_SIZE.y,
            },
            Body {
                restitution: Vec2::splat(config.player_restitution),
                ..default()
            },
            Grounded(false),
            Facing::default(),
            Transform::default(),
        ))
        .id()
}

pub fn spawn_coin(commands: &mut Commands, column_x: f32, bounce: f32) -> Entity {
    commands
        .spawn((
            SceneEntity,
            Coin {
                column_x,
                active: true,
            },
            SpriteKind::Coin,
            GamePosition::new(column_x, 0.0),
            Velocity::default(),
            Collider {
                width: COIN_SIZE.x,
                height: COIN_SIZE.y,
            },
            Body {
                restitution: Vec2::new(0.0, bounce),
                ..default()
            },
            Transform::default(),
            Visibility::default(),
        ))
        .id()
}

pub fn spawn_patrol_enemy(commands: &mut Commands, spawn: PatrolSpawn) -> Entity {
    commands
        .spawn((
            SceneEntity,
            Enemy::Patrol {
                direction: spawn.direction,
                min_x: spawn.min_x,
                max_x: spawn.max_x,
            },
            SpriteKind::PatrolEnemy,
            GamePosition::new(spawn.x, spawn.y),
            Velocity::default(),
            Collider {
                width: PATROL_SIZE.x,
                height: PATROL_SIZE.y,
            },
            Body {
                restitution: Vec2::ONE,
                ..default()
            },
            Facing::default(),
            Transform::default(),
        ))
        .id()
}

pub fn spawn_hover_enemy(commands: &mut Commands, x: f32, y: f32) -> Entity {
    commands
        .spawn((
            SceneEntity,
            Enemy::Hover {
                float_direction: 1.0,
                original_y: None,
            },
            SpriteKind::HoverEnemy,
            GamePosition::new(x, y),
            Velocity::default(),
            Collider {
                width: HOVER_SIZE.x,
                height: HOVER_SIZE.y,
            },
            Body {
                gravity: false,
                collide_platforms: false,
                collide_world_bounds: true,
                restitution: Vec2::ONE,
            },
            Transform::default(),
        ))
        .id()
}

pub fn spawn_fireball(commands: &mut Commands, origin: Vec2, velocity: Vec2) -> Entity {
    commands
        .spawn((
            SceneEntity,
            Fireball,
            SpriteKind::Fireball,
            GamePosition::new(origin.x, origin.y),
            Velocity {
                x: velocity.x,
                y: velocity.y,
            },
            Collider {
                width: FIREBALL_SIZE.x,
                height: FIREBALL_SIZE.y,
            },
            Body {
                gravity: false,
                collide_platforms: false,
                collide_world_bounds: false,
                restitution: Vec2::ZERO,
            },
            Transform::default(),
        ))
        .id()
}

/// Parameters for the extra patrol enemy added when a coin wave is cleared.
pub fn refill_patrol_spawn(rng: &mut impl Rng, config: &GameConfig) -> PatrolSpawn {
    let x = rng.gen_range(0.0..=config.world_width);
    let half = config.refill_patrol_half_range;
    PatrolSpawn {
        x,
        y: 0.0,
        min_x: (x - half).max(0.0),
        max_x: (x + half).min(config.world_width),
        direction: if rng.gen_bool(0.5) { -1.0 } else { 1.0 },
    }
}
