//! Sequence: the full schedule, and its declarative document form.
//!
//! `ScheduleDoc` is the serde model of the on-disk JSON document; `Sequence`
//! is the validated runtime schedule built from it. The sequence is the unit
//! of load/export: building assigns track indices and repairs timeline
//! overlaps, exporting produces the minimal declarative document back
//! (timecodes as text, no derived fields).

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use super::timeline::Timeline;
use super::timespan::TimeSpan;
use super::track::Track;
use crate::core::timecode::TimeCode;

/// On-disk schedule document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDoc {
    pub tracks: Vec<TrackDoc>,
}

/// One track in the document. `off` may be omitted and then derives from
/// `on` (`|on - 1|`: an active-low circuit with `on = 0` idles at `1`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackDoc {
    pub name: String,
    pub port: u32,
    pub on: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off: Option<u8>,
    pub timeline: Vec<SpanDoc>,
}

/// One timespan in the document, timecodes as `"H:MM"` text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanDoc {
    pub start: String,
    pub end: String,
}

/// The full schedule: ordered tracks, each with a repaired timeline.
///
/// Read-only for the player; structural edits happen in the schedule editor
/// and arrive here only through a full reload.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    tracks: Vec<Track>,
}

impl Sequence {
    /// Build a sequence from a document: parse timecodes, repair overlaps,
    /// assign track indices. A malformed timecode fails the whole load; an
    /// empty or inverted span is skipped with a warning.
    pub fn from_doc(doc: &ScheduleDoc) -> Result<Self> {
        let mut tracks = Vec::with_capacity(doc.tracks.len());
        for (index, track_doc) in doc.tracks.iter().enumerate() {
            let mut spans = Vec::with_capacity(track_doc.timeline.len());
            for span_doc in &track_doc.timeline {
                let start = TimeCode::parse(&span_doc.start)
                    .with_context(|| format!("track '{}': bad span start", track_doc.name))?;
                let end = TimeCode::parse(&span_doc.end)
                    .with_context(|| format!("track '{}': bad span end", track_doc.name))?;
                match TimeSpan::new(start, end) {
                    Ok(span) => spans.push(span),
                    Err(e) => warn!("track '{}': skipping span: {}", track_doc.name, e),
                }
            }

            let on_value = track_doc.on;
            let off_value = track_doc.off.unwrap_or_else(|| on_value.abs_diff(1));
            tracks.push(Track {
                name: track_doc.name.clone(),
                port: track_doc.port,
                on_value,
                off_value,
                index,
                timeline: Timeline::from_spans(spans),
            });
        }
        Ok(Self { tracks })
    }

    /// Export back to the minimal declarative document. The `off` field is
    /// written only when it does not derive from `on`.
    pub fn to_doc(&self) -> ScheduleDoc {
        ScheduleDoc {
            tracks: self
                .tracks
                .iter()
                .map(|track| TrackDoc {
                    name: track.name.clone(),
                    port: track.port,
                    on: track.on_value,
                    off: (track.off_value != track.on_value.abs_diff(1))
                        .then_some(track.off_value),
                    timeline: track
                        .timeline
                        .spans()
                        .iter()
                        .map(|span| SpanDoc {
                            start: span.start.to_string(),
                            end: span.end.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn total_span_count(&self) -> usize {
        self.tracks.iter().map(|t| t.timeline.len()).sum()
    }
}
