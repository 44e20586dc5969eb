use bevy::prelude::*;

use crate::components::Player;

/// Per-player control state for one frame.
#[derive(Clone, Copy, Default, Debug)]
pub struct PlayerControls {
    pub left: bool,
    pub right: bool,
    /// Held "up" direction. Jumps every grounded tick while held.
    pub up: bool,
    /// Rising edge of the dedicated jump key.
    pub jump_pressed: bool,
}

/// Abstraction layer between raw input and game systems.
/// Both keyboard (windowed) and tests/headless runs write to this.
#[derive(Resource, Default, Clone)]
pub struct PlayerInputs {
    pub players: [PlayerControls; 2],
}

impl PlayerInputs {
    pub fn get(&self, player: Player) -> PlayerControls {
        self.players[player.index()]
    }

    pub fn get_mut(&mut self, player: Player) -> &mut PlayerControls {
        &mut self.players[player.index()]
    }

    pub fn clear_edges(&mut self) {
        for controls in self.players.iter_mut() {
            controls.jump_pressed = false;
        }
    }
}

struct KeyBinding {
    left: KeyCode,
    right: KeyCode,
    up: KeyCode,
    jump: &'static [KeyCode],
}

const BINDINGS: [KeyBinding; 2] = [
    KeyBinding {
        left: KeyCode::ArrowLeft,
        right: KeyCode::ArrowRight,
        up: KeyCode::ArrowUp,
        jump: &[KeyCode::Space],
    },
    KeyBinding {
        left: KeyCode::KeyA,
        right: KeyCode::KeyD,
        up: KeyCode::KeyW,
        jump: &[KeyCode::ShiftLeft, KeyCode::ShiftRight],
    },
];

pub const RESTART_KEY: KeyCode = KeyCode::KeyR;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PlayerInputs::default())
            .add_systems(
                PreUpdate,
                keyboard_to_player_inputs.run_if(resource_exists::<ButtonInput<KeyCode>>),
            )
            .add_systems(
                FixedPostUpdate,
                consume_jump_edges,
            );
    }
}

/// Translate keyboard state into both players' controls.
///
/// Jump edges are OR-ed in rather than overwritten so a press that lands on a
/// frame without a fixed tick is still seen by the next tick.
fn keyboard_to_player_inputs(keyboard: Res<ButtonInput<KeyCode>>, mut inputs: ResMut<PlayerInputs>) {
    for (controls, binding) in inputs.players.iter_mut().zip(BINDINGS.iter()) {
        controls.left = keyboard.pressed(binding.left);
        controls.right = keyboard.pressed(binding.right);
        controls.up = keyboard.pressed(binding.up);
        if keyboard.any_just_pressed(binding.jump.iter().copied()) {
            controls.jump_pressed = true;
        }
    }
}

fn consume_jump_edges(mut inputs: ResMut<PlayerInputs>) {
    inputs.clear_edges();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_maps_both_bindings_independently() {
        let mut app = App::new();
        app.insert_resource(PlayerInputs::default())
            .insert_resource(ButtonInput::<KeyCode>::default())
            .add_systems(Update, keyboard_to_player_inputs);

        {
            let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
            keys.press(KeyCode::ArrowLeft);
            keys.press(KeyCode::KeyW);
            keys.press(KeyCode::ShiftRight);
        }
        app.update();

        let inputs = app.world().resource::<PlayerInputs>();
        let p1 = inputs.get(Player::One);
        let p2 = inputs.get(Player::Two);
        assert!(p1.left && !p1.right && !p1.up && !p1.jump_pressed);
        assert!(!p2.left && p2.up && p2.jump_pressed);
    }

    #[test]
    fn jump_edge_survives_until_consumed() {
        let mut app = App::new();
        app.insert_resource(PlayerInputs::default())
            .insert_resource(ButtonInput::<KeyCode>::default())
            .add_systems(Update, keyboard_to_player_inputs);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Space);
        app.update();
        // Still held, no longer a fresh press.
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .clear_just_pressed(KeyCode::Space);
        app.update();
        assert!(app.world().resource::<PlayerInputs>().get(Player::One).jump_pressed);

        app.world_mut().resource_mut::<PlayerInputs>().clear_edges();
        app.update();
        assert!(!app.world().resource::<PlayerInputs>().get(Player::One).jump_pressed);
    }
}
