use bevy::prelude::*;

use crate::components::HeadlessMode;
use crate::game_runtime::{GameFlow, GameState};

pub const CONTROLS_HINT: &str = "P1: Arrows/Space | P2: WASD/Shift";
const BLINK_HALF_PERIOD_SECS: f32 = 0.5;

#[derive(Component)]
struct ScoreText;

#[derive(Component)]
struct LivesText;

#[derive(Component)]
struct GameOverOverlay;

/// Blinking "Press R" line; holds seconds since the overlay appeared.
#[derive(Component, Default)]
struct BlinkText(f32);

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_hud)
            .add_systems(Update, (refresh_hud, blink_restart_hint))
            .add_systems(OnEnter(GameFlow::GameOver), spawn_game_over_overlay)
            .add_systems(OnExit(GameFlow::GameOver), despawn_game_over_overlay);
    }
}

pub fn score_label(score: u32) -> String {
    format!("Score: {score}")
}

pub fn lives_label(lives: u32) -> String {
    format!("Lives: {}", "❤".repeat(lives as usize))
}

/// Linear 1 -> 0 -> 1 triangle wave.
pub fn blink_alpha(elapsed_secs: f32) -> f32 {
    let phase = (elapsed_secs / BLINK_HALF_PERIOD_SECS).rem_euclid(2.0);
    if phase <= 1.0 {
        1.0 - phase
    } else {
        phase - 1.0
    }
}

pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    let bytes: Vec<u8> = (0..hex.len())
        .step_by(2)
        .filter_map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect();
    match bytes.len() {
        3 => Some(Color::srgb_u8(bytes[0], bytes[1], bytes[2])),
        4 => Some(Color::srgba_u8(bytes[0], bytes[1], bytes[2], bytes[3])),
        _ => None,
    }
}

fn text_bundle(text: String, size: f32, color: Color) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

fn spawn_hud(mut commands: Commands, headless: Res<HeadlessMode>, state: Res<GameState>) {
    if headless.0 {
        return;
    }
    commands.spawn((
        ScoreText,
        text_bundle(score_label(state.score), 24.0, Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(16.0),
            top: Val::Px(16.0),
            ..default()
        },
    ));
    commands.spawn((
        LivesText,
        text_bundle(lives_label(state.lives), 24.0, Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(16.0),
            top: Val::Px(50.0),
            ..default()
        },
    ));
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                top: Val::Px(16.0),
                justify_content: JustifyContent::Center,
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|row| {
            row.spawn(text_bundle(CONTROLS_HINT.to_string(), 16.0, Color::WHITE));
        });
}

fn refresh_hud(
    state: Res<GameState>,
    mut score: Query<&mut Text, (With<ScoreText>, Without<LivesText>)>,
    mut lives: Query<&mut Text, (With<LivesText>, Without<ScoreText>)>,
) {
    if !state.is_changed() {
        return;
    }
    for mut text in score.iter_mut() {
        text.0 = score_label(state.score);
    }
    for mut text in lives.iter_mut() {
        text.0 = lives_label(state.lives);
    }
}

fn spawn_game_over_overlay(
    mut commands: Commands,
    headless: Res<HeadlessMode>,
    state: Res<GameState>,
) {
    if headless.0 {
        return;
    }
    commands
        .spawn((
            GameOverOverlay,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                row_gap: Val::Px(12.0),
                ..default()
            },
            GlobalZIndex(100),
            PickingBehavior::IGNORE,
        ))
        .with_children(|overlay| {
            overlay.spawn(text_bundle("Game Over!".to_string(), 64.0, Color::srgb(1.0, 0.0, 0.0)));
            overlay.spawn(text_bundle(
                format!("Final Score: {}", state.score),
                32.0,
                Color::WHITE,
            ));
            overlay.spawn((
                BlinkText::default(),
                text_bundle(
                    "Press R to Restart".to_string(),
                    24.0,
                    Color::srgb(1.0, 1.0, 0.0),
                ),
            ));
        });
}

fn blink_restart_hint(time: Res<Time>, mut query: Query<(&mut BlinkText, &mut TextColor)>) {
    for (mut blink, mut color) in query.iter_mut() {
        blink.0 += time.delta_secs();
        color.0.set_alpha(blink_alpha(blink.0));
    }
}

fn despawn_game_over_overlay(mut commands: Commands, query: Query<Entity, With<GameOverOverlay>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_hud_format() {
        assert_eq!(score_label(130), "Score: 130");
        assert_eq!(lives_label(3), "Lives: ❤❤❤");
        assert_eq!(lives_label(0), "Lives: ");
    }

    #[test]
    fn blink_is_a_triangle_wave() {
        assert_eq!(blink_alpha(0.0), 1.0);
        assert!((blink_alpha(0.25) - 0.5).abs() < 1e-5);
        assert!(blink_alpha(0.5).abs() < 1e-5);
        assert!((blink_alpha(0.75) - 0.5).abs() < 1e-5);
        assert!((blink_alpha(1.0) - 1.0).abs() < 1e-5);
        assert!((blink_alpha(10.25) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn hex_colors_parse_with_or_without_hash() {
        assert_eq!(parse_hex_color("#5c94fc"), Some(Color::srgb_u8(0x5c, 0x94, 0xfc)));
        assert_eq!(parse_hex_color("ff000080"), Some(Color::srgba_u8(255, 0, 0, 128)));
        assert_eq!(parse_hex_color("#zz"), None);
    }

    fn ui_app() -> App {
        let mut app = App::new();
        app.add_plugins(bevy::state::app::StatesPlugin)
            .init_state::<GameFlow>()
            .insert_resource(HeadlessMode(false))
            .insert_resource(GameState::default())
            .insert_resource(Time::<()>::default())
            .add_plugins(UiPlugin);
        app.update();
        app
    }

    fn text_of<T: Component>(app: &mut App) -> Option<String> {
        let world = app.world_mut();
        world
            .query_filtered::<&Text, With<T>>()
            .iter(world)
            .next()
            .map(|t| t.0.clone())
    }

    #[test]
    fn hud_tracks_score_and_lives() {
        let mut app = ui_app();
        assert_eq!(text_of::<ScoreText>(&mut app).as_deref(), Some("Score: 0"));
        {
            let mut state = app.world_mut().resource_mut::<GameState>();
            state.score = 70;
            state.lives = 1;
        }
        app.update();
        assert_eq!(text_of::<ScoreText>(&mut app).as_deref(), Some("Score: 70"));
        assert_eq!(text_of::<LivesText>(&mut app).as_deref(), Some("Lives: ❤"));
    }

    #[test]
    fn overlay_follows_game_flow() {
        let mut app = ui_app();
        app.world_mut().resource_mut::<GameState>().score = 90;
        app.world_mut()
            .resource_mut::<NextState<GameFlow>>()
            .set(GameFlow::GameOver);
        app.update();

        let world = app.world_mut();
        assert_eq!(world.query::<&GameOverOverlay>().iter(world).count(), 1);
        let texts: Vec<String> = world.query::<&Text>().iter(world).map(|t| t.0.clone()).collect();
        assert!(texts.iter().any(|t| t == "Final Score: 90"));
        assert!(texts.iter().any(|t| t == "Press R to Restart"));

        app.world_mut()
            .resource_mut::<NextState<GameFlow>>()
            .set(GameFlow::Playing);
        app.update();
        let world = app.world_mut();
        assert_eq!(world.query::<&GameOverOverlay>().iter(world).count(), 0);
        assert_eq!(world.query::<&BlinkText>().iter(world).count(), 0);
    }
}
