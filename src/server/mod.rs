//! REST API server for remote control of the player.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐       mpsc::channel        ┌──────────────────────┐
//! │   API Server Thread     │  ───── ApiCommand ──────▶  │   Runner             │
//! │   (rouille HTTP)        │                            │   (command pump)     │
//! │                         │                            │                      │
//! │  POST /api/player/play  │  ──▶ ApiCommand::Play ──▶  │  player.play()       │
//! │  POST /api/player/time/9:00 ─▶ SetTime("9:00") ──▶   │  player.seek(...)    │
//! └─────────────────────────┘                            └──────────────────────┘
//!          │                                                      │
//!          │  Arc<SharedApiState>                                 │
//!          │◀──────────── read snapshots ─────────────────────────│
//!          │                                          updated after each command
//! ```
//!
//! - **rouille** - sync HTTP server, one handler thread pool, no async runtime
//! - **mpsc channel** - commands from HTTP handlers to the runner
//! - **SharedApiState** - read-only snapshots updated by the runner; handlers
//!   never take the player lock, so a slow request cannot stall the tick loop
//!
//! # Endpoints
//!
//! | Method | Path                      | Description                      |
//! |--------|---------------------------|----------------------------------|
//! | GET    | `/api/status`             | Full status (player/schedule/outputs) |
//! | GET    | `/api/player`             | Player state only                |
//! | GET    | `/api/schedule`           | Current schedule document        |
//! | GET    | `/api/outputs`            | Output values (observer resync)  |
//! | GET    | `/api/health`             | Health check                     |
//! | POST   | `/api/player/play`        | Start playback                   |
//! | POST   | `/api/player/pause`       | Pause playback                   |
//! | POST   | `/api/player/time/{H:MM}` | Seek to time of day              |
//! | POST   | `/api/player/mode/{mode}` | realtime / adjusted              |
//! | POST   | `/api/player/speed/{n}`   | Speed level 1..=100              |
//! | POST   | `/api/schedule`           | Replace schedule (JSON body)     |

mod api;

pub use api::{
    ApiCommand, ApiServer, OutputSnapshot, PlayerSnapshot, SharedApiState, StatusResponse,
};
