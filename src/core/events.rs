//! Observer events emitted by the player.
//!
//! One event type per observable transition, delivered through the
//! [`EventBus`](crate::core::event_bus::EventBus). The network layer relays
//! these to connected clients; tests subscribe recording callbacks.

use crate::core::player::SyncMode;
use crate::core::timecode::TimeCode;

/// Logical on/off state of one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    On,
    Off,
}

impl OutputState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputState::On => "on",
            OutputState::Off => "off",
        }
    }
}

/// Current time changed: once per tick, once per seek.
#[derive(Debug, Clone, Copy)]
pub struct TimeUpdateEvent(pub TimeCode);

/// A track's output switched on or off.
#[derive(Debug, Clone, Copy)]
pub struct StateChangeEvent {
    pub track: usize,
    pub state: OutputState,
}

/// Playback started (`true`) or paused (`false`).
#[derive(Debug, Clone, Copy)]
pub struct PlayStateEvent(pub bool);

/// Synchronization mode changed.
#[derive(Debug, Clone, Copy)]
pub struct ModeChangeEvent(pub SyncMode);

/// Playback speed level changed.
#[derive(Debug, Clone, Copy)]
pub struct SpeedChangeEvent(pub i32);
