mod ai;
mod camera;
mod components;
mod events;
mod game_runtime;
mod input;
mod interaction;
mod level;
mod physics;
mod physics_core;
mod player;
mod render;
mod sprites;
mod ui;

use bevy::prelude::*;
use components::{GameConfig, HeadlessMode};

/// Order of one fixed simulation tick.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Fire,
    Physics,
    Behavior,
    Collision,
}

const DEFAULT_BACKGROUND: &str = "#5c94fc";

#[derive(serde::Deserialize, Default)]
struct StartupConfig {
    window_title: Option<String>,
    window_width: Option<f32>,
    window_height: Option<f32>,
    background_color: Option<String>,
    texture_filter: Option<String>,
    seed: Option<u64>,
    gameplay: Option<GameConfig>,
}

fn parse_startup_config(contents: &str) -> Result<StartupConfig, serde_json::Error> {
    serde_json::from_str(contents)
}

fn load_startup_config() -> StartupConfig {
    let path = env_override("DUODASH_GAME_CONFIG").unwrap_or_else(|| "game.json".to_string());
    match std::fs::read_to_string(&path) {
        Ok(contents) => match parse_startup_config(&contents) {
            Ok(cfg) => {
                println!("[Duodash] Loaded startup config from {}", path);
                cfg
            }
            Err(e) => {
                eprintln!("[Duodash] Failed to parse {}: {}", path, e);
                StartupConfig::default()
            }
        },
        Err(_) => StartupConfig::default(),
    }
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

/// Env var wins over the file. An unparsable env value is reported and ignored.
fn resolve_seed(env_value: Option<String>, file_value: Option<u64>) -> Option<u64> {
    match env_value.map(|v| v.parse::<u64>()) {
        Some(Ok(seed)) => Some(seed),
        Some(Err(e)) => {
            eprintln!("[Duodash] Ignoring DUODASH_SEED: {}", e);
            file_value
        }
        None => file_value,
    }
}

/// A gameplay override that fails validation is reported and replaced by the defaults.
fn validated_gameplay(gameplay: Option<GameConfig>) -> GameConfig {
    let Some(gameplay) = gameplay else {
        return GameConfig::default();
    };
    match gameplay.validate() {
        Ok(()) => gameplay,
        Err(e) => {
            eprintln!("[Duodash] Ignoring gameplay override: {}", e);
            GameConfig::default()
        }
    }
}

fn wants_nearest_filter(env_value: Option<String>, file_value: Option<String>) -> bool {
    env_value
        .or(file_value)
        .map_or(true, |v| !v.eq_ignore_ascii_case("linear"))
}

/// Everything the simulation needs, without windowing or rendering.
fn add_gameplay(app: &mut App) {
    app.insert_resource(Time::<Fixed>::from_hz(60.0))
        .configure_sets(
            FixedUpdate,
            (
                SimulationSet::Fire,
                SimulationSet::Physics,
                SimulationSet::Behavior,
                SimulationSet::Collision,
            )
                .chain(),
        )
        .add_plugins(events::GameEventsPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(level::LevelPlugin)
        .add_plugins(game_runtime::RuntimeStatePlugin)
        .add_plugins(physics::PhysicsPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(ai::AiPlugin)
        .add_plugins(interaction::InteractionPlugin);
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let headless = args.iter().any(|a| a == "--headless");

    let startup_config = load_startup_config();
    let seed = resolve_seed(env_override("DUODASH_SEED"), startup_config.seed);
    let mut app = App::new();

    app.insert_resource(HeadlessMode(headless));

    if headless {
        // No window, no rendering: just the ECS simulation.
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(bevy::log::LogPlugin::default());
        println!("[Duodash] Starting in HEADLESS mode");
    } else {
        let nearest_filter = wants_nearest_filter(
            env_override("DUODASH_TEXTURE_FILTER"),
            startup_config.texture_filter,
        );
        let window_title = startup_config
            .window_title
            .unwrap_or_else(|| "Duodash".to_string());
        let window_width = startup_config.window_width.unwrap_or(800.0);
        let window_height = startup_config.window_height.unwrap_or(600.0);

        let mut plugins = DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: window_title,
                resolution: (window_width, window_height).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        });

        if nearest_filter {
            plugins = plugins.set(bevy::render::texture::ImagePlugin::default_nearest());
            println!("[Duodash] Texture filter: nearest (pixel-art mode)");
        }

        app.add_plugins(plugins);
        let background = startup_config
            .background_color
            .as_deref()
            .and_then(ui::parse_hex_color)
            .or_else(|| ui::parse_hex_color(DEFAULT_BACKGROUND))
            .unwrap_or(Color::srgb(0.36, 0.58, 0.99));
        app.insert_resource(ClearColor(background));
        app.add_plugins(sprites::SpritePlugin)
            .add_plugins(render::RenderPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(ui::UiPlugin);
        println!("[Duodash] Starting in WINDOWED mode");
    }

    app.insert_resource(validated_gameplay(startup_config.gameplay))
        .insert_resource(level::GameRng::from_seed(seed));
    if let Some(seed) = seed {
        println!("[Duodash] RNG seed: {}", seed);
    }
    add_gameplay(&mut app);

    app.run();
}

/// Headless app with the full gameplay stack and the scene already spawned.
/// Drive it with [`run_fixed_tick`].
#[cfg(test)]
pub(crate) fn gameplay_test_app() -> App {
    let mut app = App::new();
    let mut fixed = Time::<Fixed>::from_hz(60.0);
    fixed.advance_by(std::time::Duration::from_secs_f64(1.0 / 60.0));
    app.add_plugins(bevy::state::app::StatesPlugin)
        .insert_resource(GameConfig::default())
        .insert_resource(HeadlessMode(true))
        .insert_resource(level::GameRng::from_seed(Some(42)))
        .insert_resource(Time::<()>::default());
    add_gameplay(&mut app);
    // Keep the hand-advanced clock; add_gameplay installs a fresh one.
    app.insert_resource(fixed);
    app.update();
    app
}

/// One 60 Hz simulation tick followed by a frame.
#[cfg(test)]
pub(crate) fn run_fixed_tick(app: &mut App) {
    let world = app.world_mut();
    world.try_run_schedule(FixedPreUpdate).ok();
    world.try_run_schedule(FixedUpdate).ok();
    world.try_run_schedule(FixedPostUpdate).ok();
    app.update();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Coin, Enemy, Platform, Player};
    use crate::game_runtime::GameState;

    #[test]
    fn startup_config_parses_partial_gameplay_override() {
        let cfg = parse_startup_config(
            r##"{
                "window_title": "Co-op",
                "background_color": "#000000",
                "seed": 9,
                "gameplay": { "starting_lives": 5, "gravity": 900.0 }
            }"##,
        )
        .expect("valid config");
        assert_eq!(cfg.window_title.as_deref(), Some("Co-op"));
        assert_eq!(cfg.seed, Some(9));
        let gameplay = cfg.gameplay.unwrap_or_default();
        assert_eq!(gameplay.starting_lives, 5);
        assert_eq!(gameplay.gravity, 900.0);
        assert_eq!(gameplay.move_speed, 200.0);
        assert!(parse_startup_config("{ not json").is_err());
    }

    #[test]
    fn env_values_override_file_values() {
        assert_eq!(resolve_seed(Some("17".into()), Some(3)), Some(17));
        assert_eq!(resolve_seed(Some("abc".into()), Some(3)), Some(3));
        assert_eq!(resolve_seed(None, None), None);
        assert!(wants_nearest_filter(None, None));
        assert!(!wants_nearest_filter(None, Some("linear".into())));
        assert!(wants_nearest_filter(Some("nearest".into()), Some("linear".into())));
    }

    #[test]
    fn invalid_gameplay_override_falls_back_to_defaults() {
        let cfg = parse_startup_config(r#"{ "gameplay": { "coin_restitution_min": 0.9 } }"#)
            .expect("valid json");
        let gameplay = validated_gameplay(cfg.gameplay);
        assert_eq!(gameplay.coin_restitution_min, 0.4);
        assert_eq!(gameplay.coin_restitution_max, 0.8);

        for bad in [
            r#"{ "gameplay": { "fire_interval_secs": -1.0, "gravity": 900.0 } }"#,
            r#"{ "gameplay": { "world_width": 0.0 } }"#,
            r#"{ "gameplay": { "hit_flash_secs": -0.5 } }"#,
        ] {
            let cfg = parse_startup_config(bad).expect("valid json");
            let gameplay = validated_gameplay(cfg.gameplay);
            assert_eq!(gameplay.gravity, 800.0);
            assert_eq!(gameplay.fire_interval_secs, 2.0);
            assert_eq!(gameplay.world_width, 800.0);
        }

        let cfg = parse_startup_config(
            r#"{ "gameplay": { "coin_restitution_min": 0.5, "coin_restitution_max": 0.5, "gravity": 900.0 } }"#,
        )
        .expect("valid json");
        let gameplay = validated_gameplay(cfg.gameplay);
        assert_eq!(gameplay.gravity, 900.0);
        assert_eq!(gameplay.coin_restitution_min, 0.5);
        assert_eq!(validated_gameplay(None).starting_lives, 3);
    }

    #[test]
    fn validated_override_spawns_scene() {
        let cfg = parse_startup_config(r#"{ "gameplay": { "coin_restitution_min": 0.9 } }"#)
            .expect("valid json");
        let mut app = App::new();
        app.add_plugins(bevy::state::app::StatesPlugin)
            .insert_resource(validated_gameplay(cfg.gameplay))
            .insert_resource(HeadlessMode(true))
            .insert_resource(level::GameRng::from_seed(Some(5)))
            .insert_resource(Time::<()>::default());
        add_gameplay(&mut app);
        app.update();
        let world = app.world_mut();
        assert_eq!(world.query::<&Coin>().iter(world).count(), 12);
    }

    #[test]
    fn gameplay_app_spawns_scene_and_keeps_playing() {
        let mut app = gameplay_test_app();
        {
            let world = app.world_mut();
            assert_eq!(world.query::<&Player>().iter(world).count(), 2);
            assert_eq!(world.query::<&Platform>().iter(world).count(), 19);
            assert_eq!(world.query::<&Coin>().iter(world).count(), 12);
            assert_eq!(world.query::<&Enemy>().iter(world).count(), 6);
        }
        for _ in 0..30 {
            run_fixed_tick(&mut app);
        }
        let state = app.world().resource::<GameState>();
        assert!(!state.game_over);
        assert_eq!(state.lives, 3);
    }
}
