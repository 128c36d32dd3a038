//! CIRCADIA - daily schedule player library
//!
//! Drives timed binary outputs (lighting circuits) from a declarative daily
//! schedule: a time-ordered boundary-event queue is built from the schedule,
//! a tick loop advances the current time and dispatches on/off transitions,
//! and seeking reconstructs per-output state at any target time without
//! replaying the day.

// Core engine (timecode, clock, event bus, queue, player)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod entities;
pub mod gpio;
pub mod runner;
pub mod server;
pub mod store;

// Re-export commonly used types from core
pub use crate::core::clock::{Clock, ManualClock, SystemClock};
pub use crate::core::event_bus::{BoxedEvent, EventBus, EventEmitter, PlayerEventEmitter, downcast_event};
pub use crate::core::events::{
    ModeChangeEvent, OutputState, PlayStateEvent, SpeedChangeEvent, StateChangeEvent,
    TimeUpdateEvent,
};
pub use crate::core::player::{PlayState, Player, SyncMode};
pub use crate::core::queue::{BoundaryEvent, Edge, EventQueue};
pub use crate::core::timecode::TimeCode;

// Re-export entities
pub use crate::entities::{ScheduleDoc, Sequence, TimeSpan, Timeline, Track};

// Re-export drivers
pub use crate::gpio::{MemoryOutputs, OutputDriver, SysfsGpio};
