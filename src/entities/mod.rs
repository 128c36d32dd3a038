//! Schedule model: the declarative daily schedule as validated runtime types.
//!
//! `Sequence` -> `Track` -> `Timeline` -> `TimeSpan`, built once from a
//! `ScheduleDoc` and treated as read-only by the player.

pub mod sequence;
pub mod timeline;
pub mod timespan;
pub mod track;

pub use sequence::{ScheduleDoc, Sequence, SpanDoc, TrackDoc};
pub use timeline::Timeline;
pub use timespan::TimeSpan;
pub use track::Track;
