use std::collections::VecDeque;

use bevy::prelude::*;
use serde::Serialize;

const MAX_EVENTS: usize = 500;

#[derive(Serialize, Clone, Debug)]
pub struct GameEvent {
    pub name: String,
    pub data: serde_json::Value,
    pub frame: u64,
}

/// Recent gameplay events, newest last. Read by logging and tests.
#[derive(Resource, Default)]
pub struct GameEventBus {
    pub recent: VecDeque<GameEvent>,
    pub frame: u64,
    pub dropped_events: u64,
    last_overflow_log_frame: u64,
}

impl GameEventBus {
    pub fn emit(&mut self, name: impl Into<String>, data: serde_json::Value) {
        let name = name.into();
        debug!("[Duodash events] {} {}", name, data);
        let mut evicted = 0u64;
        while self.recent.len() >= MAX_EVENTS {
            self.recent.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            self.dropped_events = self.dropped_events.saturating_add(evicted);
            if self.frame.saturating_sub(self.last_overflow_log_frame) >= 60 {
                self.last_overflow_log_frame = self.frame;
                warn!(
                    "[Duodash events] Event ring full at frame {}, {} dropped so far",
                    self.frame, self.dropped_events
                );
            }
        }
        self.recent.push_back(GameEvent {
            name,
            data,
            frame: self.frame,
        });
    }

    pub fn count(&self, name: &str) -> usize {
        self.recent.iter().filter(|ev| ev.name == name).count()
    }

    pub fn last(&self, name: &str) -> Option<&GameEvent> {
        self.recent.iter().rev().find(|ev| ev.name == name)
    }

    pub fn clear(&mut self) {
        self.recent.clear();
    }
}

pub struct GameEventsPlugin;

impl Plugin for GameEventsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GameEventBus::default()).add_systems(
            FixedPreUpdate,
            tick_event_frame.run_if(crate::game_runtime::gameplay_systems_enabled),
        );
    }
}

fn tick_event_frame(mut bus: ResMut<GameEventBus>) {
    bus.frame = bus.frame.saturating_add(1);
}
