//! Flattened boundary-event queue derived from a sequence.
//!
//! Two events per timespan (Start, End), across all tracks, stable-sorted
//! ascending by time. The queue is derived state: it is rebuilt whenever the
//! sequence is (re)loaded and never persisted.
//!
//! Tie-break for equal times: the stable sort preserves build order, so
//! simultaneous events dispatch in track-index order, span order within a
//! track, and Start before End within one span.

use crate::core::timecode::TimeCode;
use crate::entities::{Sequence, TimeSpan};

/// Which boundary of a timespan an event marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// One on/off boundary of one timespan, addressed to its track.
#[derive(Debug, Clone)]
pub struct BoundaryEvent {
    pub time: TimeCode,
    pub track_index: usize,
    pub edge: Edge,
    /// Copy of the owning span, kept for the boundary consistency check.
    pub span: TimeSpan,
}

/// Time-sorted list of all boundary events of a sequence.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<BoundaryEvent>,
}

impl EventQueue {
    /// Flatten a sequence into a sorted queue. Pure and re-entrant: the same
    /// sequence always yields the same queue. Length is exactly
    /// `2 * total_span_count`.
    pub fn build(sequence: &Sequence) -> Self {
        let mut events = Vec::with_capacity(2 * sequence.total_span_count());
        for track in sequence.tracks() {
            for span in track.timeline.spans() {
                events.push(BoundaryEvent {
                    time: span.start,
                    track_index: track.index,
                    edge: Edge::Start,
                    span: span.clone(),
                });
                events.push(BoundaryEvent {
                    time: span.end,
                    track_index: track.index,
                    edge: Edge::End,
                    span: span.clone(),
                });
            }
        }
        // Stable: equal times keep build order (track index, span, Start/End).
        events.sort_by(|a, b| a.time.compare(&b.time));
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BoundaryEvent> {
        self.events.get(index)
    }

    pub fn events(&self) -> &[BoundaryEvent] {
        &self.events
    }

    /// Index of the first event strictly after `t`; `len()` if none.
    pub fn first_after(&self, t: &TimeCode) -> usize {
        self.events
            .partition_point(|e| e.time.compare(t) != std::cmp::Ordering::Greater)
    }
}
