//! A named output circuit with its timeline.

use super::timeline::Timeline;

/// One schedulable output: a physical port plus the timeline that drives it.
///
/// `index` is the stable position in the owning sequence's track list,
/// assigned at load time. It is the identity key for state reconciliation
/// and for addressing the output - never reassigned while a sequence lives.
#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub port: u32,
    pub on_value: u8,
    pub off_value: u8,
    pub index: usize,
    pub timeline: Timeline,
}
