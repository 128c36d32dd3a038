//! The scheduling player: current time, event cursor, tick loop, seek.
//!
//! The player owns the live `current time` cursor over one schedule day and
//! dispatches on/off transitions as that cursor crosses timespan boundaries.
//! It guarantees that at any current-time value every output reflects exactly
//! what the schedule dictates at that instant, including after an arbitrary
//! jump: `seek` relocates the queue cursor and replays only the minimal
//! backward scan needed to restore per-track state.
//!
//! The player is synchronous and single-threaded by construction: `tick()`
//! performs one advance-and-dispatch step and returns the delay until the
//! next one. Driving it on a timer (and serializing external commands against
//! ticks) is the runner's job; driving it by hand with a [`ManualClock`] is
//! how the tests work.
//!
//! [`ManualClock`]: crate::core::clock::ManualClock

use std::cmp::Ordering;
use std::time::Duration;

use anyhow::{Result, bail};
use log::{debug, error, info, warn};

use crate::core::clock::{Clock, SystemClock};
use crate::core::event_bus::PlayerEventEmitter;
use crate::core::events::{
    ModeChangeEvent, OutputState, PlayStateEvent, SpeedChangeEvent, StateChangeEvent,
    TimeUpdateEvent,
};
use crate::core::queue::{BoundaryEvent, Edge, EventQueue};
use crate::core::timecode::TimeCode;
use crate::entities::{ScheduleDoc, Sequence};
use crate::gpio::{MemoryOutputs, OutputDriver};

/// Playback state. `Stopped` only exists before a schedule is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Paused,
    Playing,
}

/// How the current time advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Virtual clock: one logical minute per tick, paced by the speed level.
    Adjusted,
    /// Wall-clock time-of-day, resynchronized every tick.
    Realtime,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Adjusted => "adjusted",
            SyncMode::Realtime => "realtime",
        }
    }

    /// Parse a mode command string; `None` for anything unknown.
    pub fn parse(text: &str) -> Option<SyncMode> {
        match text {
            "adjusted" => Some(SyncMode::Adjusted),
            "realtime" => Some(SyncMode::Realtime),
            _ => None,
        }
    }
}

pub const SPEED_MIN: i32 = 1;
pub const SPEED_MAX: i32 = 100;
pub const DEFAULT_SPEED_LEVEL: i32 = 50;

const SPEED_CURVE_BASE: f64 = 1.066;
const SPEED_CURVE_SCALE_MS: f64 = 100.0;

/// Realtime ticks run at a coarse fixed delay; wall-clock drift self-corrects.
const REALTIME_TICK_DELAY: Duration = Duration::from_secs(20);

/// Wall-clock divergence beyond this is a discontinuity and handled as a seek.
const REALTIME_TOLERANCE_MINUTES: f64 = 1.0;

/// Next tick right after the 24:00 wrap, so the boundary is near-instant.
const ROLLOVER_DELAY: Duration = Duration::from_millis(10);

/// Adjusted-mode tick interval for a speed level.
///
/// Exponential curve `100 * 1.066^(100 - level)` ms, monotonically decreasing:
/// level 1 is about 56 s per logical minute (real-time pacing), level 100 is
/// 100 ms (near-instantaneous). The base and scale are tuning parameters.
pub fn tick_interval_ms(level: i32) -> f64 {
    SPEED_CURVE_SCALE_MS * SPEED_CURVE_BASE.powi(SPEED_MAX - level)
}

/// Scheduling engine for one daily sequence.
pub struct Player {
    sequence: Sequence,
    queue: EventQueue,
    /// Index of the next undispatched event. Monotonic within a day, reset
    /// only by seek, reload and midnight rollover.
    cursor: usize,
    current_time: TimeCode,
    state: PlayState,
    mode: SyncMode,
    speed_level: i32,
    clock: Box<dyn Clock>,
    outputs: Box<dyn OutputDriver>,
    events: PlayerEventEmitter,
}

impl Player {
    pub fn new(clock: Box<dyn Clock>, outputs: Box<dyn OutputDriver>) -> Self {
        Self {
            sequence: Sequence::default(),
            queue: EventQueue::default(),
            cursor: 0,
            current_time: TimeCode::MIDNIGHT,
            state: PlayState::Stopped,
            mode: SyncMode::Adjusted,
            speed_level: DEFAULT_SPEED_LEVEL,
            clock,
            outputs,
            events: PlayerEventEmitter::dummy(),
        }
    }

    pub fn set_event_emitter(&mut self, events: PlayerEventEmitter) {
        self.events = events;
    }

    // === Accessors ===

    pub fn current_time(&self) -> TimeCode {
        self.current_time
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn play_state(&self) -> PlayState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    pub fn speed_level(&self) -> i32 {
        self.speed_level
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Last known value on an output port (observer resync only).
    pub fn read_output(&self, port: u32) -> Option<u8> {
        self.outputs.read(port)
    }

    // === Commands ===

    /// (Re)load a schedule document: atomically swap in a freshly built
    /// sequence and event queue, then re-derive every output for the new
    /// schedule at the current time. Play/pause state is preserved.
    pub fn load(&mut self, doc: &ScheduleDoc) -> Result<()> {
        let sequence = Sequence::from_doc(doc)?;
        let queue = EventQueue::build(&sequence);
        info!(
            "schedule loaded: {} tracks, {} queued events",
            sequence.len(),
            queue.len()
        );
        self.sequence = sequence;
        self.queue = queue;
        self.cursor = 0;
        if self.state == PlayState::Stopped {
            self.state = PlayState::Paused;
        }
        self.seek(self.current_time);
        Ok(())
    }

    /// Start playback. No-op if already playing.
    pub fn play(&mut self) {
        if self.state == PlayState::Playing {
            return;
        }
        info!("playing from {}", self.current_time);
        self.state = PlayState::Playing;
        self.events.emit(PlayStateEvent(true));
    }

    /// Pause playback. No-op unless playing.
    pub fn pause(&mut self) {
        if self.state != PlayState::Playing {
            return;
        }
        info!("paused at {}", self.current_time);
        self.state = PlayState::Paused;
        self.events.emit(PlayStateEvent(false));
    }

    /// Switch synchronization mode. Entering realtime hard-syncs the current
    /// time to the wall clock and ensures playback is running; entering
    /// adjusted keeps the prior play/pause state.
    pub fn set_mode(&mut self, mode: SyncMode) {
        if self.mode != mode {
            self.mode = mode;
            info!("mode -> {}", mode.as_str());
            self.events.emit(ModeChangeEvent(mode));
        }
        if mode == SyncMode::Realtime {
            let wall = self.clock.time_of_day();
            self.seek(wall);
            self.play();
        }
    }

    /// Set the adjusted-mode speed level, clamped to `[1, 100]`.
    pub fn set_speed(&mut self, level: i32) {
        let clamped = level.clamp(SPEED_MIN, SPEED_MAX);
        if clamped != level {
            warn!("speed level {} out of range, clamped to {}", level, clamped);
        }
        if clamped != self.speed_level {
            self.speed_level = clamped;
            info!(
                "speed level -> {} ({} ms/tick)",
                clamped,
                tick_interval_ms(clamped) as u64
            );
            self.events.emit(SpeedChangeEvent(clamped));
        }
    }

    /// Jump the current time to `t` and reconcile all outputs. Valid in any
    /// state; targets outside the schedule day are rejected unchanged.
    pub fn set_current_time(&mut self, t: TimeCode) -> Result<()> {
        if t.compare(&TimeCode::END_OF_DAY) == Ordering::Greater {
            bail!("seek target {} is outside the schedule day", t);
        }
        self.seek(t);
        Ok(())
    }

    // === Tick loop ===

    /// One advance-and-dispatch step. Returns the delay until the next tick.
    /// Does nothing unless playing.
    pub fn tick(&mut self) -> Duration {
        if self.state != PlayState::Playing {
            return self.tick_delay();
        }

        self.dispatch_due();

        match self.mode {
            SyncMode::Adjusted => {
                // Fixed logical step: the tick interval controls playback
                // speed, not the step size.
                self.current_time = self.current_time.add_minutes(1.0);
            }
            SyncMode::Realtime => {
                let wall = self.clock.time_of_day();
                let drift_minutes =
                    (wall.decimal_time() - self.current_time.decimal_time()).abs() * 60.0;
                if drift_minutes > REALTIME_TOLERANCE_MINUTES {
                    // Discontinuity: reconcile instead of replaying the gap.
                    debug!(
                        "wall clock discontinuity {} -> {}, reseeking",
                        self.current_time, wall
                    );
                    self.seek(wall);
                    return self.tick_delay();
                }
                self.current_time = wall;
            }
        }

        if self.current_time.compare(&TimeCode::END_OF_DAY) != Ordering::Less {
            // Day boundary: events scheduled exactly at 24:00 still dispatch,
            // then the day wraps.
            self.dispatch_remaining();
            info!("day complete, wrapping to 0:00");
            self.current_time = TimeCode::MIDNIGHT;
            self.cursor = 0;
            self.events.emit(TimeUpdateEvent(self.current_time));
            return ROLLOVER_DELAY;
        }

        self.events.emit(TimeUpdateEvent(self.current_time));
        self.tick_delay()
    }

    /// Delay until the next tick for the current mode and speed.
    pub fn tick_delay(&self) -> Duration {
        match self.mode {
            SyncMode::Adjusted => Duration::from_millis(tick_interval_ms(self.speed_level) as u64),
            SyncMode::Realtime => REALTIME_TICK_DELAY,
        }
    }

    fn dispatch_due(&mut self) {
        while let Some(event) = self.queue.get(self.cursor) {
            if self.current_time.compare(&event.time) == Ordering::Less {
                break;
            }
            let event = event.clone();
            self.dispatch(&event);
            self.cursor += 1;
        }
    }

    fn dispatch_remaining(&mut self) {
        while let Some(event) = self.queue.get(self.cursor) {
            let event = event.clone();
            self.dispatch(&event);
            self.cursor += 1;
        }
    }

    // === Seek / reconciliation ===

    /// Relocate the cursor to `t` and rebuild per-track output state with a
    /// single backward scan: the most recent boundary at-or-before `t` wins
    /// per track, tracks without history default to off. At most one
    /// transition is dispatched per track.
    fn seek(&mut self, t: TimeCode) {
        self.current_time = t;
        self.cursor = self.queue.first_after(&t);
        debug!("seek to {} (cursor {})", t, self.cursor);

        let track_count = self.sequence.len();
        let mut resolved = vec![false; track_count];
        let mut remaining = track_count;

        for i in (0..self.cursor).rev() {
            if remaining == 0 {
                break;
            }
            let event = match self.queue.get(i) {
                Some(e) => e.clone(),
                None => break,
            };
            if !resolved[event.track_index] {
                resolved[event.track_index] = true;
                remaining -= 1;
                self.dispatch(&event);
            }
        }

        // No boundary at or before t: the default state with no history is off.
        for index in 0..track_count {
            if !resolved[index] {
                self.force_off(index);
            }
        }

        self.events.emit(TimeUpdateEvent(self.current_time));
    }

    // === Dispatch ===

    fn dispatch(&mut self, event: &BoundaryEvent) {
        let Some(track) = self.sequence.tracks().get(event.track_index) else {
            error!("dispatch for unknown track index {}", event.track_index);
            return;
        };
        let (value, state) = match event.edge {
            Edge::Start if event.time == event.span.start => (track.on_value, OutputState::On),
            Edge::End if event.time == event.span.end => (track.off_value, OutputState::Off),
            _ => {
                error!(
                    "event at {} matches neither boundary of span {}; skipping",
                    event.time, event.span
                );
                return;
            }
        };
        info!(
            "{}: {} @ {} '{}' ({})",
            event.time,
            track.name,
            track.port,
            state.as_str().to_uppercase(),
            value
        );
        let port = track.port;
        self.outputs.write(port, value);
        self.events.emit(StateChangeEvent {
            track: event.track_index,
            state,
        });
    }

    fn force_off(&mut self, track_index: usize) {
        let Some(track) = self.sequence.tracks().get(track_index) else {
            return;
        };
        debug!(
            "{}: {} @ {} has no prior events, defaulting to 'OFF' ({})",
            self.current_time, track.name, track.port, track.off_value
        );
        let (port, value) = (track.port, track.off_value);
        self.outputs.write(port, value);
        self.events.emit(StateChangeEvent {
            track: track_index,
            state: OutputState::Off,
        });
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Box::new(SystemClock), Box::new(MemoryOutputs::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::core::clock::ManualClock;
    use crate::core::event_bus::EventBus;

    fn tc(text: &str) -> TimeCode {
        TimeCode::parse(text).unwrap()
    }

    fn doc(json: &str) -> ScheduleDoc {
        serde_json::from_str(json).unwrap()
    }

    const PORCH: &str = r#"{"tracks": [{"name": "Porch", "port": 17, "on": 1, "timeline": [
        {"start": "8:00", "end": "10:00"}]}]}"#;

    struct Recorder {
        states: Arc<Mutex<Vec<(usize, &'static str)>>>,
        times: Arc<Mutex<Vec<String>>>,
    }

    /// Player with manual clock, memory outputs and recording subscribers.
    fn test_player(json: &str) -> (Player, ManualClock, Recorder) {
        let clock = ManualClock::new(TimeCode::MIDNIGHT);
        let mut player = Player::new(Box::new(clock.clone()), Box::new(MemoryOutputs::new()));

        let bus = EventBus::new();
        let states = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&states);
        bus.subscribe::<StateChangeEvent, _>(move |e| {
            s.lock().unwrap().push((e.track, e.state.as_str()));
        });
        let times = Arc::new(Mutex::new(Vec::new()));
        let t = Arc::clone(&times);
        bus.subscribe::<TimeUpdateEvent, _>(move |e| {
            t.lock().unwrap().push(e.0.to_string());
        });
        player.set_event_emitter(PlayerEventEmitter::from_emitter(bus.emitter()));

        player.load(&doc(json)).unwrap();
        (player, clock, Recorder { states, times })
    }

    fn clear(recorder: &Recorder) {
        recorder.states.lock().unwrap().clear();
        recorder.times.lock().unwrap().clear();
    }

    #[test]
    fn test_load_moves_stopped_to_paused() {
        let (player, _, _) = test_player(PORCH);
        assert_eq!(player.play_state(), PlayState::Paused);
        assert_eq!(player.cursor(), 0);
        // Initial reconciliation at 0:00 turned the porch off.
        assert_eq!(player.read_output(17), Some(0));
    }

    #[test]
    fn test_seek_inside_span_turns_on() {
        let (mut player, _, recorder) = test_player(PORCH);
        clear(&recorder);

        player.set_current_time(tc("9:00")).unwrap();
        assert_eq!(player.read_output(17), Some(1));
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "on")]);
        assert_eq!(*recorder.times.lock().unwrap(), ["9:00"]);
    }

    #[test]
    fn test_seek_after_span_turns_off() {
        let (mut player, _, recorder) = test_player(PORCH);
        player.set_current_time(tc("9:00")).unwrap();
        clear(&recorder);

        player.set_current_time(tc("11:00")).unwrap();
        assert_eq!(player.read_output(17), Some(0));
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "off")]);
    }

    #[test]
    fn test_seek_before_any_events_defaults_off() {
        let (mut player, _, recorder) = test_player(PORCH);
        clear(&recorder);

        player.set_current_time(tc("7:00")).unwrap();
        assert_eq!(player.read_output(17), Some(0));
        // Exactly one transition per track, even without history.
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "off")]);
    }

    #[test]
    fn test_seek_with_empty_queue_defaults_off() {
        let (mut player, _, recorder) =
            test_player(r#"{"tracks": [{"name": "Bare", "port": 5, "on": 1, "timeline": []}]}"#);
        clear(&recorder);

        player.set_current_time(tc("12:00")).unwrap();
        assert_eq!(player.read_output(5), Some(0));
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "off")]);
    }

    #[test]
    fn test_seek_dispatches_once_per_track_across_many_spans() {
        let (mut player, _, recorder) = test_player(
            r#"{"tracks": [{"name": "Yard", "port": 4, "on": 1, "timeline": [
                {"start": "6:00", "end": "8:00"},
                {"start": "18:00", "end": "22:00"}]}]}"#,
        );
        clear(&recorder);

        // Between spans: the most recent boundary is the 8:00 end.
        player.set_current_time(tc("12:00")).unwrap();
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "off")]);
        clear(&recorder);

        player.set_current_time(tc("19:00")).unwrap();
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "on")]);
    }

    #[test]
    fn test_seek_rejects_target_past_end_of_day() {
        let (mut player, _, recorder) = test_player(PORCH);
        player.set_current_time(tc("9:00")).unwrap();
        clear(&recorder);

        let target = TimeCode::from_decimal_time(25.0);
        assert!(player.set_current_time(target).is_err());
        assert_eq!(player.current_time(), tc("9:00"));
        assert!(recorder.states.lock().unwrap().is_empty());
    }

    #[test]
    fn test_tick_dispatches_events_in_window() {
        let (mut player, _, recorder) = test_player(
            r#"{"tracks": [{"name": "Porch", "port": 17, "on": 1, "timeline": [
                {"start": "9:00", "end": "9:02"}]}]}"#,
        );
        player.set_current_time(tc("8:58")).unwrap();
        clear(&recorder);
        player.play();

        // 8:58 -> 8:59 -> 9:00: nothing due until the cursor passes 9:00.
        player.tick();
        player.tick();
        assert!(recorder.states.lock().unwrap().is_empty());

        player.tick(); // at 9:00: dispatches the start
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "on")]);

        player.tick(); // at 9:01: nothing
        player.tick(); // at 9:02: dispatches the end
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "on"), (0, "off")]);
        assert_eq!(player.current_time(), tc("9:03"));

        // Cursor is past the end; further ticks dispatch nothing again.
        player.tick();
        assert_eq!(recorder.states.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_tick_is_noop_while_paused() {
        let (mut player, _, recorder) = test_player(PORCH);
        clear(&recorder);

        player.tick();
        assert_eq!(player.current_time(), TimeCode::MIDNIGHT);
        assert!(recorder.times.lock().unwrap().is_empty());
    }

    #[test]
    fn test_simultaneous_boundaries_dispatch_in_track_order() {
        let (mut player, _, recorder) = test_player(
            r#"{"tracks": [
                {"name": "A", "port": 1, "on": 1, "timeline": [{"start": "8:00", "end": "12:00"}]},
                {"name": "B", "port": 2, "on": 1, "timeline": [{"start": "12:00", "end": "14:00"}]}
            ]}"#,
        );
        player.set_current_time(tc("11:59")).unwrap();
        clear(&recorder);
        player.play();

        player.tick(); // advances to 12:00
        player.tick(); // dispatches both 12:00 boundaries, first-loaded first
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "off"), (1, "on")]);
        assert_eq!(player.read_output(1), Some(0));
        assert_eq!(player.read_output(2), Some(1));
    }

    #[test]
    fn test_midnight_rollover_flushes_and_resets() {
        let (mut player, _, recorder) = test_player(
            r#"{"tracks": [{"name": "Night", "port": 9, "on": 1, "timeline": [
                {"start": "23:00", "end": "24:00"}]}]}"#,
        );
        player.set_current_time(tc("23:59")).unwrap();
        assert_eq!(player.read_output(9), Some(1));
        clear(&recorder);
        player.play();

        let delay = player.tick(); // 23:59 -> 24:00 wraps
        // The 24:00 end event dispatched before the reset.
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "off")]);
        assert_eq!(player.read_output(9), Some(0));
        assert_eq!(player.current_time(), TimeCode::MIDNIGHT);
        assert_eq!(player.cursor(), 0);
        // Day boundary reschedules almost immediately.
        assert!(delay < Duration::from_millis(100));
        assert_eq!(recorder.times.lock().unwrap().last().unwrap(), "0:00");
    }

    #[test]
    fn test_speed_interval_monotonically_decreasing() {
        for level in SPEED_MIN..SPEED_MAX {
            assert!(
                tick_interval_ms(level) > tick_interval_ms(level + 1),
                "interval not decreasing at level {}",
                level
            );
        }
        // Level 1 paces about one real minute per logical minute.
        let slowest = tick_interval_ms(SPEED_MIN);
        assert!((50_000.0..70_000.0).contains(&slowest), "got {}", slowest);
        assert!((tick_interval_ms(SPEED_MAX) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_speed_clamps_and_notifies() {
        let (mut player, _, _) = test_player(PORCH);
        player.set_speed(250);
        assert_eq!(player.speed_level(), SPEED_MAX);
        player.set_speed(0);
        assert_eq!(player.speed_level(), SPEED_MIN);
        assert_eq!(player.tick_delay(), Duration::from_millis(tick_interval_ms(1) as u64));
    }

    #[test]
    fn test_play_pause_transitions_and_events() {
        let (mut player, _, _) = test_player(PORCH);
        let bus = EventBus::new();
        let plays = Arc::new(Mutex::new(Vec::new()));
        let p = Arc::clone(&plays);
        bus.subscribe::<PlayStateEvent, _>(move |e| p.lock().unwrap().push(e.0));
        player.set_event_emitter(PlayerEventEmitter::from_emitter(bus.emitter()));

        player.play();
        player.play(); // no-op, no duplicate event
        player.pause();
        player.pause(); // no-op
        assert_eq!(*plays.lock().unwrap(), [true, false]);
        assert_eq!(player.play_state(), PlayState::Paused);
    }

    #[test]
    fn test_realtime_mode_syncs_and_plays() {
        let (mut player, clock, recorder) = test_player(PORCH);
        clock.set(tc("9:00"));
        clear(&recorder);

        player.set_mode(SyncMode::Realtime);
        assert_eq!(player.mode(), SyncMode::Realtime);
        assert!(player.is_playing());
        assert_eq!(player.current_time(), tc("9:00"));
        assert_eq!(player.read_output(17), Some(1));
    }

    #[test]
    fn test_realtime_tick_tracks_small_drift_directly() {
        let (mut player, clock, recorder) = test_player(PORCH);
        clock.set(tc("9:00"));
        player.set_mode(SyncMode::Realtime);
        clear(&recorder);

        clock.set(tc("9:01"));
        let delay = player.tick();
        assert_eq!(player.current_time(), tc("9:01"));
        // Within tolerance: plain assignment, no reconciliation dispatches.
        assert!(recorder.states.lock().unwrap().is_empty());
        assert_eq!(delay, Duration::from_secs(20));
    }

    #[test]
    fn test_realtime_tick_reseeks_on_discontinuity() {
        let (mut player, clock, recorder) = test_player(PORCH);
        clock.set(tc("9:00"));
        player.set_mode(SyncMode::Realtime);
        clear(&recorder);

        clock.set(tc("11:00"));
        player.tick();
        assert_eq!(player.current_time(), tc("11:00"));
        // The jump reconciled state instead of replaying the gap.
        assert_eq!(*recorder.states.lock().unwrap(), [(0, "off")]);
        assert_eq!(player.read_output(17), Some(0));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(SyncMode::parse("realtime"), Some(SyncMode::Realtime));
        assert_eq!(SyncMode::parse("adjusted"), Some(SyncMode::Adjusted));
        assert_eq!(SyncMode::parse("banana"), None);
    }

    #[test]
    fn test_reload_swaps_schedule_and_reconciles() {
        let (mut player, _, recorder) = test_player(PORCH);
        player.set_current_time(tc("9:00")).unwrap();
        assert_eq!(player.read_output(17), Some(1));
        player.play();
        clear(&recorder);

        player
            .load(&doc(
                r#"{"tracks": [{"name": "Porch", "port": 17, "on": 1, "timeline": [
                    {"start": "9:30", "end": "10:00"}]}]}"#,
            ))
            .unwrap();
        // 9:00 is outside the new span; output reconciled to off.
        assert_eq!(player.read_output(17), Some(0));
        assert_eq!(player.current_time(), tc("9:00"));
        // Play state survives the reload.
        assert!(player.is_playing());
    }
}
