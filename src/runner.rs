//! Headless run loop: tick thread plus API command pump.
//!
//! All player state lives behind one `Arc<Mutex<Player>>`. The ticker thread
//! and the command pump both take that lock, so ticks and external commands
//! are fully serialized. The ticker owns the single pending "timer": it
//! sleeps on a condvar for the player's current tick delay and re-reads
//! mode/speed/play state under the lock at fire time, so a stale sleep can
//! never tick with an outdated interval. `kick()` is the "cancel pending
//! timer and tick immediately" primitive used by play / mode / speed changes.

use std::path::Path;
use std::sync::{Arc, Condvar, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::{error, info, trace, warn};

use crate::cli::Args;
use crate::config::{self, PathConfig};
use crate::core::clock::SystemClock;
use crate::core::event_bus::{EventBus, PlayerEventEmitter};
use crate::core::events::{ModeChangeEvent, PlayStateEvent, SpeedChangeEvent, TimeUpdateEvent};
use crate::core::player::{Player, SyncMode};
use crate::core::timecode::TimeCode;
use crate::gpio::{MemoryOutputs, OutputDriver, SysfsGpio};
use crate::server::{ApiCommand, ApiServer, OutputSnapshot, SharedApiState};
use crate::store;

/// How often the pump wakes to refresh derived snapshots with no commands.
const PUMP_IDLE: Duration = Duration::from_millis(500);

#[derive(Default)]
struct TickerState {
    tick_now: bool,
    quit: bool,
}

struct TickerShared {
    state: Mutex<TickerState>,
    cv: Condvar,
}

/// The tick driver: one background thread, one pending delay at a time.
pub struct Ticker {
    shared: Arc<TickerShared>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn(player: Arc<Mutex<Player>>) -> Self {
        let shared = Arc::new(TickerShared {
            state: Mutex::new(TickerState::default()),
            cv: Condvar::new(),
        });
        let thread_shared = Arc::clone(&shared);

        let handle = thread::Builder::new()
            .name("ticker".to_string())
            .spawn(move || loop {
                let delay = {
                    let player = player.lock().unwrap_or_else(|e| e.into_inner());
                    player.is_playing().then(|| player.tick_delay())
                };

                {
                    let guard = thread_shared.state.lock().unwrap_or_else(|e| e.into_inner());
                    let mut guard = match delay {
                        // Playing: sleep out the tick delay unless kicked.
                        Some(delay) => {
                            thread_shared
                                .cv
                                .wait_timeout_while(guard, delay, |s| !s.tick_now && !s.quit)
                                .unwrap_or_else(|e| e.into_inner())
                                .0
                        }
                        // Paused or stopped: nothing pending, wait for a kick.
                        None => thread_shared
                            .cv
                            .wait_while(guard, |s| !s.tick_now && !s.quit)
                            .unwrap_or_else(|e| e.into_inner()),
                    };
                    if guard.quit {
                        break;
                    }
                    guard.tick_now = false;
                }

                let mut player = player.lock().unwrap_or_else(|e| e.into_inner());
                if player.is_playing() {
                    player.tick();
                }
            })
            .expect("failed to spawn ticker thread");

        Self {
            shared,
            handle: Some(handle),
        }
    }

    /// Cancel the pending delay and tick as soon as the lock is free.
    pub fn kick(&self) {
        let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
        state.tick_now = true;
        self.shared.cv.notify_all();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
            state.quit = true;
            self.shared.cv.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Run the daemon: load the schedule, wire player + ticker + API, pump
/// commands forever. Returns only on a fatal startup error.
pub fn run(args: &Args, paths: &PathConfig) -> Result<()> {
    let schedule_path = args
        .schedule
        .clone()
        .unwrap_or_else(|| config::config_file("schedule.json", paths));
    info!("schedule document: {}", schedule_path.display());

    // No schedule, no scheduler: refuse to run silently empty.
    let doc = store::load_document(&schedule_path)
        .with_context(|| format!("cannot start without a schedule ({})", schedule_path.display()))?;

    let outputs: Box<dyn OutputDriver> = if args.gpio {
        info!("using sysfs GPIO outputs");
        Box::new(SysfsGpio::new())
    } else {
        info!("using in-memory outputs");
        Box::new(MemoryOutputs::new())
    };

    let mut player = Player::new(Box::new(SystemClock), outputs);

    let bus = EventBus::new();
    let state = Arc::new(SharedApiState::default());
    wire_snapshot_observers(&bus, &state);
    player.set_event_emitter(PlayerEventEmitter::from_emitter(bus.emitter()));

    player.load(&doc)?;
    player.set_speed(args.speed);
    if args.realtime {
        player.set_mode(SyncMode::Realtime);
    } else if args.autoplay {
        player.play();
    }

    let player = Arc::new(Mutex::new(player));
    refresh_derived_snapshots(&player, &state);

    let ticker = Ticker::spawn(Arc::clone(&player));
    if args.realtime || args.autoplay {
        ticker.kick();
    }

    let rx = ApiServer::start(args.port, Arc::clone(&state));
    info!("circadia running, control API on port {}", args.port);

    loop {
        match rx.recv_timeout(PUMP_IDLE) {
            Ok(cmd) => {
                apply_command(cmd, &player, &ticker, &schedule_path);
                refresh_derived_snapshots(&player, &state);
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                refresh_derived_snapshots(&player, &state);
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                bail!("API command channel closed");
            }
        }

        // Immediate subscribers already ran; drain the deferred queue.
        for event in bus.poll() {
            trace!("event: {}", (*event).type_name());
        }
    }
}

/// Copy player transitions into the API snapshot as they happen.
fn wire_snapshot_observers(bus: &EventBus, state: &Arc<SharedApiState>) {
    let s = Arc::clone(state);
    bus.subscribe::<TimeUpdateEvent, _>(move |e| {
        s.player.write().unwrap_or_else(|p| p.into_inner()).time = e.0.to_string();
    });
    let s = Arc::clone(state);
    bus.subscribe::<PlayStateEvent, _>(move |e| {
        s.player.write().unwrap_or_else(|p| p.into_inner()).playing = e.0;
    });
    let s = Arc::clone(state);
    bus.subscribe::<ModeChangeEvent, _>(move |e| {
        s.player.write().unwrap_or_else(|p| p.into_inner()).mode = e.0.as_str().to_string();
    });
    let s = Arc::clone(state);
    bus.subscribe::<SpeedChangeEvent, _>(move |e| {
        s.player.write().unwrap_or_else(|p| p.into_inner()).speed = e.0;
    });
}

/// Rebuild the snapshots that need the player lock (outputs, schedule).
fn refresh_derived_snapshots(player: &Arc<Mutex<Player>>, state: &Arc<SharedApiState>) {
    let player = player.lock().unwrap_or_else(|e| e.into_inner());

    let outputs: Vec<OutputSnapshot> = player
        .sequence()
        .tracks()
        .iter()
        .map(|track| OutputSnapshot {
            track: track.index,
            name: track.name.clone(),
            port: track.port,
            value: player.read_output(track.port),
        })
        .collect();
    *state.outputs.write().unwrap_or_else(|e| e.into_inner()) = outputs;

    *state.schedule.write().unwrap_or_else(|e| e.into_inner()) =
        Some(player.sequence().to_doc());
}

/// Apply one API command under the player lock.
fn apply_command(
    cmd: ApiCommand,
    player: &Arc<Mutex<Player>>,
    ticker: &Ticker,
    schedule_path: &Path,
) {
    let mut player = player.lock().unwrap_or_else(|e| e.into_inner());
    match cmd {
        ApiCommand::Play => {
            player.play();
            ticker.kick();
        }
        ApiCommand::Pause => {
            player.pause();
        }
        ApiCommand::SetTime(text) => match TimeCode::parse(&text) {
            Ok(t) => {
                if let Err(e) = player.set_current_time(t) {
                    warn!("seek rejected: {:#}", e);
                }
            }
            Err(e) => warn!("seek rejected: {:#}", e),
        },
        ApiCommand::SetMode(text) => match SyncMode::parse(&text) {
            Some(mode) => {
                player.set_mode(mode);
                ticker.kick();
            }
            None => warn!("unknown mode '{}', command rejected", text),
        },
        ApiCommand::SetSpeed(level) => {
            player.set_speed(level);
            ticker.kick();
        }
        ApiCommand::ReplaceSchedule(doc) => match player.load(&doc) {
            Ok(()) => {
                if let Err(e) = store::save_document(schedule_path, &doc) {
                    error!("schedule accepted but not persisted: {:#}", e);
                }
            }
            Err(e) => {
                error!("schedule rejected, keeping previous: {:#}", e);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::entities::ScheduleDoc;

    fn porch_player() -> Arc<Mutex<Player>> {
        let clock = ManualClock::new(TimeCode::MIDNIGHT);
        let mut player = Player::new(Box::new(clock), Box::new(MemoryOutputs::new()));
        let doc = serde_json::from_str(
            r#"{"tracks": [{"name": "Porch", "port": 17, "on": 1, "timeline": [
                {"start": "8:00", "end": "10:00"}]}]}"#,
        )
        .unwrap();
        player.load(&doc).unwrap();
        Arc::new(Mutex::new(player))
    }

    #[test]
    fn test_ticker_kick_ticks_while_playing() {
        let player = porch_player();
        {
            let mut p = player.lock().unwrap();
            p.set_current_time(TimeCode::parse("9:00").unwrap()).unwrap();
            p.set_speed(1); // slowest interval, so only kicks cause ticks
            p.play();
        }

        let ticker = Ticker::spawn(Arc::clone(&player));
        ticker.kick();

        // One kicked tick advances the adjusted clock by one logical minute.
        for _ in 0..50 {
            if player.lock().unwrap().current_time() == TimeCode::parse("9:01").unwrap() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("kicked tick did not run");
    }

    #[test]
    fn test_ticker_idles_while_paused() {
        let player = porch_player();
        let ticker = Ticker::spawn(Arc::clone(&player));
        ticker.kick();
        thread::sleep(Duration::from_millis(50));
        // Paused player: the kick re-evaluated and did nothing.
        assert_eq!(player.lock().unwrap().current_time(), TimeCode::MIDNIGHT);
    }

    #[test]
    fn test_apply_unknown_mode_leaves_state_unchanged() {
        let player = porch_player();
        let ticker = Ticker::spawn(Arc::clone(&player));

        apply_command(
            ApiCommand::SetMode("banana".to_string()),
            &player,
            &ticker,
            Path::new("/nonexistent/schedule.json"),
        );
        let p = player.lock().unwrap();
        assert_eq!(p.mode(), SyncMode::Adjusted);
        assert!(!p.is_playing());
    }

    #[test]
    fn test_apply_seek_and_refresh_snapshots() {
        let player = porch_player();
        let ticker = Ticker::spawn(Arc::clone(&player));
        let state = Arc::new(SharedApiState::default());

        apply_command(
            ApiCommand::SetTime("9:00".to_string()),
            &player,
            &ticker,
            Path::new("/nonexistent/schedule.json"),
        );
        refresh_derived_snapshots(&player, &state);

        let outputs = state.outputs.read().unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].port, 17);
        assert_eq!(outputs[0].value, Some(1));
        assert!(state.schedule.read().unwrap().is_some());
    }

    #[test]
    fn test_replace_schedule_rejects_bad_document() {
        let player = porch_player();
        let ticker = Ticker::spawn(Arc::clone(&player));
        let bad: ScheduleDoc = serde_json::from_str(
            r#"{"tracks": [{"name": "X", "port": 1, "on": 1, "timeline": [
                {"start": "99:00", "end": "10:00"}]}]}"#,
        )
        .unwrap();

        apply_command(
            ApiCommand::ReplaceSchedule(bad),
            &player,
            &ticker,
            Path::new("/nonexistent/schedule.json"),
        );
        // Previous schedule stays active.
        assert_eq!(player.lock().unwrap().sequence().tracks()[0].name, "Porch");
    }
}
