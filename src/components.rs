use bevy::prelude::*;

/// Which of the two co-op players an entity is.
#[derive(Component, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

/// World position in y-down world units (centre of the body).
#[derive(Component, Clone, Copy, Default, Debug, PartialEq)]
pub struct GamePosition {
    pub x: f32,
    pub y: f32,
}

impl GamePosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Velocity in world units per second. Positive y is downward.
#[derive(Component, Clone, Copy, Default, Debug, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned body box, centred on `GamePosition`.
#[derive(Component, Clone, Copy, Debug)]
pub struct Collider {
    pub width: f32,
    pub height: f32,
}

/// Per-body physics flags.
#[derive(Component, Clone, Copy, Debug)]
pub struct Body {
    pub gravity: bool,
    pub collide_platforms: bool,
    pub collide_world_bounds: bool,
    pub restitution: Vec2,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            gravity: true,
            collide_platforms: true,
            collide_world_bounds: true,
            restitution: Vec2::ZERO,
        }
    }
}

/// Set by the physics step when a downward move was blocked this tick.
#[derive(Component, Clone, Copy, Default)]
pub struct Grounded(pub bool);

/// Horizontal facing. `flip_x` on the sprite mirrors `!right`.
#[derive(Component, Clone, Copy)]
pub struct Facing {
    pub right: bool,
}

impl Default for Facing {
    fn default() -> Self {
        Self { right: true }
    }
}

/// Static solid rectangle that bodies land on.
#[derive(Component, Clone, Copy)]
pub struct Platform;

/// Enemy behaviour parameters, one variant per enemy class.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub enum Enemy {
    Patrol {
        direction: f32,
        min_x: f32,
        max_x: f32,
    },
    Hover {
        float_direction: f32,
        original_y: Option<f32>,
    },
}

impl Enemy {
    pub fn kind(&self) -> EnemyKind {
        match self {
            Enemy::Patrol { .. } => EnemyKind::Patrol,
            Enemy::Hover { .. } => EnemyKind::Hover,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Patrol,
    Hover,
}

/// Projectile launched by a hover enemy. Flies straight.
#[derive(Component, Clone, Copy)]
pub struct Fireball;

/// Collectible. Inactive coins are hidden and skipped by physics.
#[derive(Component, Clone, Copy, Debug)]
pub struct Coin {
    pub column_x: f32,
    pub active: bool,
}

/// Half-opacity hit indicator; removed when the timer runs out.
#[derive(Component)]
pub struct HitFlash(pub Timer);

/// Red game-over tint on player one.
#[derive(Component, Clone, Copy)]
pub struct DefeatTint;

/// Everything spawned by the level. Restart despawns all of it.
#[derive(Component, Clone, Copy)]
pub struct SceneEntity;

/// Which procedural texture an entity is drawn with.
#[derive(Component, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SpriteKind {
    PlayerOne,
    PlayerTwo,
    Platform,
    Ground,
    Coin,
    PatrolEnemy,
    HoverEnemy,
    Fireball,
}

#[derive(Resource, Clone, Copy, Default)]
pub struct HeadlessMode(pub bool);

/// Tuning constants (as a resource so they can be tuned from game.json).
#[derive(Resource, Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub gravity: f32,
    pub move_speed: f32,
    pub jump_velocity: f32,
    pub stomp_bounce: f32,
    pub patrol_speed: f32,
    pub hover_speed: f32,
    pub hover_amplitude: f32,
    pub fireball_speed: f32,
    pub fire_interval_secs: f32,
    pub second_target_range: f32,
    pub starting_lives: u32,
    pub hit_flash_secs: f32,
    pub camera_lerp: f32,
    pub world_width: f32,
    pub world_height: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub fall_limit_y: f32,
    pub fireball_min_y: f32,
    pub fireball_max_y: f32,
    pub coin_points: u32,
    pub patrol_points: u32,
    pub hover_points: u32,
    pub patrol_stomp_margin: f32,
    pub hover_stomp_margin: f32,
    pub player_restitution: f32,
    pub coin_restitution_min: f32,
    pub coin_restitution_max: f32,
    pub refill_patrol_half_range: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            gravity: 800.0,
            move_speed: 200.0,
            jump_velocity: 500.0,
            stomp_bounce: 300.0,
            patrol_speed: 50.0,
            hover_speed: 30.0,
            hover_amplitude: 20.0,
            fireball_speed: 150.0,
            fire_interval_secs: 2.0,
            second_target_range: 400.0,
            starting_lives: 3,
            hit_flash_secs: 1.0,
            camera_lerp: 0.05,
            world_width: 800.0,
            world_height: 1200.0,
            viewport_width: 800.0,
            viewport_height: 600.0,
            fall_limit_y: 1200.0,
            fireball_min_y: -200.0,
            fireball_max_y: 1200.0,
            coin_points: 10,
            patrol_points: 20,
            hover_points: 50,
            patrol_stomp_margin: 10.0,
            hover_stomp_margin: 5.0,
            player_restitution: 0.1,
            coin_restitution_min: 0.4,
            coin_restitution_max: 0.8,
            refill_patrol_half_range: 100.0,
        }
    }
}

impl GameConfig {
    /// Rejects values that would panic in timers, range sampling or clamps.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("fire_interval_secs", self.fire_interval_secs),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be a positive number, got {value}"));
            }
        }
        let non_negative = [
            ("hit_flash_secs", self.hit_flash_secs),
            ("refill_patrol_half_range", self.refill_patrol_half_range),
            ("coin_restitution_min", self.coin_restitution_min),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be zero or more, got {value}"));
            }
        }
        if !self.coin_restitution_max.is_finite()
            || self.coin_restitution_min > self.coin_restitution_max
        {
            return Err(format!(
                "coin restitution range {}..={} is empty",
                self.coin_restitution_min, self.coin_restitution_max
            ));
        }
        Ok(())
    }
}
