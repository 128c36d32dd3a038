//! Per-track timeline: sorted, non-overlapping timespans.
//!
//! Construction from untrusted input normalizes destructively instead of
//! rejecting: spans are sorted by start, an overlapping span has its start
//! clamped to the previous span's end (one warning per repair), and a span
//! left degenerate by clamping is dropped. After construction the invariant
//! `span[i].end <= span[i+1].start` holds for all adjacent pairs.

use log::warn;
use uuid::Uuid;

use super::timespan::TimeSpan;
use crate::core::timecode::TimeCode;

/// Ordered, non-overlapping list of on-intervals for one track.
#[derive(Debug, Clone)]
pub struct Timeline {
    spans: Vec<TimeSpan>,
    pub uuid: Uuid,
}

impl Timeline {
    /// Build from untrusted spans: sort, then repair overlaps by clamping.
    pub fn from_spans(mut spans: Vec<TimeSpan>) -> Self {
        spans.sort_by(|a, b| a.start.compare(&b.start));

        // Clamp each overlapping start to the previous end. The repaired
        // value participates in the next comparison, so chains of overlaps
        // collapse left to right.
        for i in 1..spans.len() {
            let prev_end = spans[i - 1].end;
            if spans[i].start.is_before(Some(&prev_end)) {
                warn!(
                    "timespan {} overlaps previous ending {}; clamping start",
                    spans[i], prev_end
                );
                spans[i].start = prev_end;
            }
        }

        // A span swallowed whole by its predecessor is now empty or inverted.
        spans.retain(|span| {
            let keep = span.start.is_before(Some(&span.end));
            if !keep {
                warn!("dropping degenerate timespan {} after overlap repair", span);
            }
            keep
        });

        Self {
            spans,
            uuid: Uuid::new_v4(),
        }
    }

    pub fn spans(&self) -> &[TimeSpan] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Insert preserving sort order. Overlap is not rejected here: callers
    /// (the schedule editor) are expected to check `overlaps()` first.
    pub fn add(&mut self, span: TimeSpan) {
        let at = self
            .spans
            .iter()
            .position(|existing| existing.start.is_after(Some(&span.start)))
            .unwrap_or(self.spans.len());
        self.spans.insert(at, span);
    }

    /// True if `span` overlaps any existing span on this timeline.
    pub fn overlaps(&self, span: &TimeSpan) -> bool {
        self.spans.iter().any(|existing| {
            span.start.is_before(Some(&existing.end)) && span.end.is_after(Some(&existing.start))
        })
    }

    /// The span positioned just before `span`, if any.
    pub fn previous(&self, span: &TimeSpan) -> Option<&TimeSpan> {
        let idx = self.index_of(span)?;
        idx.checked_sub(1).map(|i| &self.spans[i])
    }

    /// The span positioned just after `span`, if any.
    pub fn next(&self, span: &TimeSpan) -> Option<&TimeSpan> {
        let idx = self.index_of(span)?;
        self.spans.get(idx + 1)
    }

    fn index_of(&self, span: &TimeSpan) -> Option<usize> {
        self.spans.iter().position(|s| s.uuid == span.uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tc(text: &str) -> TimeCode {
        TimeCode::parse(text).unwrap()
    }

    fn span(start: &str, end: &str) -> TimeSpan {
        TimeSpan::new(tc(start), tc(end)).unwrap()
    }

    fn assert_non_overlapping(timeline: &Timeline) {
        for pair in timeline.spans().windows(2) {
            assert!(
                !pair[1].start.is_before(Some(&pair[0].end)),
                "{} overlaps {}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn test_from_spans_sorts_by_start() {
        let timeline = Timeline::from_spans(vec![span("18:00", "22:00"), span("6:00", "8:00")]);
        assert_eq!(timeline.spans()[0].start, tc("6:00"));
        assert_eq!(timeline.spans()[1].start, tc("18:00"));
    }

    #[test]
    fn test_overlap_repaired_by_clamping_start() {
        let timeline = Timeline::from_spans(vec![span("8:00", "10:00"), span("9:00", "11:00")]);
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.spans()[1].start, tc("10:00"));
        assert_eq!(timeline.spans()[1].end, tc("11:00"));
        assert_non_overlapping(&timeline);
    }

    #[test]
    fn test_swallowed_span_is_dropped() {
        let timeline = Timeline::from_spans(vec![span("8:00", "12:00"), span("9:00", "10:00")]);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.spans()[0].end, tc("12:00"));
    }

    #[test]
    fn test_overlap_chain_collapses_left_to_right() {
        let timeline = Timeline::from_spans(vec![
            span("8:00", "10:00"),
            span("9:00", "11:00"),
            span("10:30", "12:00"),
        ]);
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.spans()[1].start, tc("10:00"));
        assert_eq!(timeline.spans()[2].start, tc("11:00"));
        assert_non_overlapping(&timeline);
    }

    #[test]
    fn test_add_keeps_sort_order() {
        let mut timeline = Timeline::from_spans(vec![span("6:00", "8:00"), span("18:00", "20:00")]);
        timeline.add(span("10:00", "12:00"));
        let starts: Vec<String> = timeline
            .spans()
            .iter()
            .map(|s| s.start.to_string())
            .collect();
        assert_eq!(starts, ["6:00", "10:00", "18:00"]);
    }

    #[test]
    fn test_overlaps_detects_any_intersection() {
        let timeline = Timeline::from_spans(vec![span("8:00", "10:00")]);
        assert!(timeline.overlaps(&span("9:00", "11:00")));
        assert!(timeline.overlaps(&span("7:00", "8:30")));
        assert!(timeline.overlaps(&span("8:30", "9:30")));
        // Touching boundaries do not overlap.
        assert!(!timeline.overlaps(&span("10:00", "11:00")));
        assert!(!timeline.overlaps(&span("7:00", "8:00")));
    }

    #[test]
    fn test_previous_and_next_neighbors() {
        let a = span("6:00", "8:00");
        let b = span("10:00", "12:00");
        let c = span("18:00", "20:00");
        let (a_id, b_id, c_id) = (a.uuid, b.uuid, c.uuid);
        let timeline = Timeline::from_spans(vec![a, b, c]);

        let b_ref = timeline.spans().iter().find(|s| s.uuid == b_id).unwrap().clone();
        assert_eq!(timeline.previous(&b_ref).unwrap().uuid, a_id);
        assert_eq!(timeline.next(&b_ref).unwrap().uuid, c_id);

        let a_ref = timeline.spans()[0].clone();
        assert!(timeline.previous(&a_ref).is_none());
        let c_ref = timeline.spans()[2].clone();
        assert!(timeline.next(&c_ref).is_none());
    }
}
