use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::Serialize;

use crate::components::*;
use crate::events::GameEventBus;
use crate::input::{PlayerInputs, RESTART_KEY};

#[derive(States, Default, Clone, Copy, Eq, PartialEq, Debug, Hash, Serialize)]
pub enum GameFlow {
    #[default]
    Playing,
    GameOver,
}

/// Score and lives for the running scene.
#[derive(Resource, Clone, Debug, PartialEq, Serialize)]
pub struct GameState {
    pub score: u32,
    pub lives: u32,
    pub game_over: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(GameConfig::default().starting_lives)
    }
}

/// What a single life-loss trigger did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LifeLoss {
    /// Game was already over; nothing changed.
    Ignored,
    /// Lives remain; players go back to spawn.
    Respawn,
    /// Last life gone.
    GameOver,
}

impl GameState {
    pub fn new(lives: u32) -> Self {
        Self {
            score: 0,
            lives,
            game_over: false,
        }
    }

    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    pub fn lose_life(&mut self) -> LifeLoss {
        if self.game_over {
            return LifeLoss::Ignored;
        }
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.game_over = true;
            LifeLoss::GameOver
        } else {
            LifeLoss::Respawn
        }
    }
}

pub fn gameplay_systems_enabled(state: Option<Res<GameState>>) -> bool {
    state.map(|s| !s.game_over).unwrap_or(false)
}

/// Resources touched when a life is lost.
#[derive(SystemParam)]
pub struct LifeLossIo<'w> {
    pub state: ResMut<'w, GameState>,
    pub config: Res<'w, GameConfig>,
    pub bus: ResMut<'w, GameEventBus>,
    pub next_flow: ResMut<'w, NextState<GameFlow>>,
}

impl LifeLossIo<'_> {
    /// Bookkeeping half of a life loss. Callers then run
    /// [`apply_life_loss`] on both players with the returned outcome.
    pub fn trigger(&mut self, cause: &str) -> LifeLoss {
        let outcome = self.state.lose_life();
        match outcome {
            LifeLoss::Ignored => {}
            LifeLoss::Respawn => {
                info!("[Duodash] Life lost ({cause}), {} left", self.state.lives);
                self.bus.emit(
                    "life_lost",
                    serde_json::json!({ "cause": cause, "lives": self.state.lives }),
                );
            }
            LifeLoss::GameOver => {
                info!("[Duodash] Game over ({cause}), final score {}", self.state.score);
                self.bus.emit(
                    "life_lost",
                    serde_json::json!({ "cause": cause, "lives": 0 }),
                );
                self.bus.emit(
                    "game_over",
                    serde_json::json!({ "score": self.state.score }),
                );
                self.next_flow.set(GameFlow::GameOver);
            }
        }
        outcome
    }
}

/// Per-player half of a life loss.
pub fn apply_life_loss(
    commands: &mut Commands,
    config: &GameConfig,
    outcome: LifeLoss,
    entity: Entity,
    player: Player,
    pos: &mut GamePosition,
    vel: &mut Velocity,
) {
    match outcome {
        LifeLoss::Ignored => {}
        LifeLoss::Respawn => {
            let spawn = crate::level::player_spawn(player);
            *pos = GamePosition::new(spawn.x, spawn.y);
            *vel = Velocity::default();
            // A running flash keeps its deadline; repeat hits do not extend it.
            commands.entity(entity).insert_if_new(HitFlash(Timer::from_seconds(
                config.hit_flash_secs,
                TimerMode::Once,
            )));
        }
        LifeLoss::GameOver => {
            if player == Player::One {
                commands.entity(entity).insert(DefeatTint);
            }
        }
    }
}

/// Restart the scene from game-over. Sent by the restart key.
#[derive(Event, Default)]
pub struct RestartRequested;

pub struct RuntimeStatePlugin;

impl Plugin for RuntimeStatePlugin {
    fn build(&self, app: &mut App) {
        let lives = app
            .world()
            .get_resource::<GameConfig>()
            .map(|c| c.starting_lives)
            .unwrap_or_else(|| GameConfig::default().starting_lives);
        app.insert_resource(GameState::new(lives))
            .init_state::<GameFlow>()
            .add_event::<RestartRequested>()
            .add_systems(
                Update,
                (
                    restart_key.run_if(
                        in_state(GameFlow::GameOver)
                            .and(resource_exists::<ButtonInput<KeyCode>>),
                    ),
                    restart_scene,
                    tick_hit_flash,
                )
                    .chain(),
            );
    }
}

fn restart_key(keyboard: Res<ButtonInput<KeyCode>>, mut requests: EventWriter<RestartRequested>) {
    if keyboard.just_pressed(RESTART_KEY) {
        requests.send(RestartRequested);
    }
}

#[derive(SystemParam)]
struct RestartResets<'w> {
    rng: ResMut<'w, crate::level::GameRng>,
    inputs: ResMut<'w, PlayerInputs>,
    fire_timer: Option<ResMut<'w, crate::ai::FireTimer>>,
    camera: Option<ResMut<'w, crate::camera::CameraRig>>,
}

fn restart_scene(
    mut commands: Commands,
    mut requests: EventReader<RestartRequested>,
    mut io: LifeLossIo,
    mut resets: RestartResets,
    scene: Query<Entity, With<SceneEntity>>,
) {
    if requests.read().count() == 0 || !io.state.game_over {
        return;
    }

    for entity in scene.iter() {
        commands.entity(entity).despawn_recursive();
    }
    *io.state = GameState::new(io.config.starting_lives);
    *resets.inputs = PlayerInputs::default();
    if let Some(mut timer) = resets.fire_timer {
        timer.reset(&io.config);
    }
    if let Some(mut camera) = resets.camera {
        *camera = crate::camera::CameraRig::default();
    }
    crate::level::spawn_scene(&mut commands, &io.config, &mut resets.rng.0);
    io.next_flow.set(GameFlow::Playing);
    io.bus.clear();
    io.bus.emit("scene_restarted", serde_json::json!({}));
    info!("[Duodash] Scene restarted");
}

fn tick_hit_flash(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut HitFlash)>,
) {
    for (entity, mut flash) in query.iter_mut() {
        if flash.0.tick(time.delta()).finished() {
            commands.entity(entity).remove::<HitFlash>();
        }
    }
}
