//! REST API implementation using rouille.
//!
//! Handles incoming requests, reads shared state snapshots for GET endpoints,
//! and relays player commands over a channel for POST endpoints. Handlers
//! never touch the player directly: the runner applies commands under the
//! player lock, so HTTP traffic is serialized against the tick loop.

use std::sync::{Arc, RwLock, mpsc};
use std::thread;

use rouille::{Request, Response};
use serde::{Deserialize, Serialize};

use crate::entities::ScheduleDoc;

/// Commands sent from API handlers to the runner.
#[derive(Debug, Clone)]
pub enum ApiCommand {
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Seek to a time of day ("H:MM")
    SetTime(String),
    /// Switch synchronization mode ("realtime" | "adjusted")
    SetMode(String),
    /// Set adjusted-mode speed level (1..=100)
    SetSpeed(i32),
    /// Persist a new schedule document (backing up the old) and reload
    ReplaceSchedule(ScheduleDoc),
}

/// Player state snapshot for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub time: String,
    pub playing: bool,
    pub mode: String,
    pub speed: i32,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            time: "0:00".to_string(),
            playing: false,
            mode: "adjusted".to_string(),
            speed: crate::core::player::DEFAULT_SPEED_LEVEL,
        }
    }
}

/// Last written value of one output, for observer resync after reconnect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSnapshot {
    pub track: usize,
    pub name: String,
    pub port: u32,
    pub value: Option<u8>,
}

/// Full status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub player: PlayerSnapshot,
    pub schedule: Option<ScheduleDoc>,
    pub outputs: Vec<OutputSnapshot>,
}

/// Shared state readable by API handlers, written by the runner.
#[derive(Default)]
pub struct SharedApiState {
    pub player: RwLock<PlayerSnapshot>,
    pub schedule: RwLock<Option<ScheduleDoc>>,
    pub outputs: RwLock<Vec<OutputSnapshot>>,
}

/// Generic API response envelope.
#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn ok() -> Self {
        Self { success: true, message: None, error: None }
    }

    fn ok_msg(msg: &str) -> Self {
        Self { success: true, message: Some(msg.to_string()), error: None }
    }

    fn err(msg: &str) -> Self {
        Self { success: false, message: None, error: Some(msg.to_string()) }
    }
}

/// REST API server.
pub struct ApiServer {
    port: u16,
    state: Arc<SharedApiState>,
    command_tx: mpsc::Sender<ApiCommand>,
}

impl ApiServer {
    /// Start the API server in a background thread.
    /// Returns the command receiver for the runner to drain.
    pub fn start(port: u16, state: Arc<SharedApiState>) -> mpsc::Receiver<ApiCommand> {
        let (tx, rx) = mpsc::channel();

        let server = ApiServer {
            port,
            state,
            command_tx: tx,
        };

        thread::spawn(move || {
            server.run();
        });

        rx
    }

    fn run(self) {
        let addr = format!("0.0.0.0:{}", self.port);
        log::info!("API server starting on http://{}", addr);

        let state = self.state;
        let tx = self.command_tx;

        rouille::start_server(&addr, move |request| {
            Self::handle_request(request, &state, &tx)
        });
    }

    fn handle_request(
        request: &Request,
        state: &Arc<SharedApiState>,
        tx: &mpsc::Sender<ApiCommand>,
    ) -> Response {
        // Preflight for browser clients (the schedule editor is a web page).
        if request.method() == "OPTIONS" {
            return Response::empty_204()
                .with_additional_header("Access-Control-Allow-Origin", "*")
                .with_additional_header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
                .with_additional_header("Access-Control-Allow-Headers", "Content-Type");
        }

        // Parameterized paths handled manually (router! doesn't capture well).
        let path = request.url();
        if request.method() == "POST" {
            // /api/player/time/{H:MM}
            if let Some(time) = path.strip_prefix("/api/player/time/") {
                return Self::send_command(tx, ApiCommand::SetTime(time.to_string()))
                    .with_additional_header("Access-Control-Allow-Origin", "*");
            }
            // /api/player/mode/{realtime|adjusted}
            if let Some(mode) = path.strip_prefix("/api/player/mode/") {
                return Self::send_command(tx, ApiCommand::SetMode(mode.to_string()))
                    .with_additional_header("Access-Control-Allow-Origin", "*");
            }
            // /api/player/speed/{n}
            if let Some(speed_str) = path.strip_prefix("/api/player/speed/") {
                if let Ok(speed) = speed_str.parse::<i32>() {
                    return Self::send_command(tx, ApiCommand::SetSpeed(speed))
                        .with_additional_header("Access-Control-Allow-Origin", "*");
                } else {
                    return Response::json(&ApiResponse::err("Invalid speed level"))
                        .with_status_code(400)
                        .with_additional_header("Access-Control-Allow-Origin", "*");
                }
            }
        }

        let response = rouille::router!(request,
            // Status endpoints
            (GET) ["/api/status"] => {
                Self::get_status(state)
            },
            (GET) ["/api/player"] => {
                Self::get_player(state)
            },
            (GET) ["/api/schedule"] => {
                Self::get_schedule(state)
            },
            (GET) ["/api/outputs"] => {
                Self::get_outputs(state)
            },

            // Player control
            (POST) ["/api/player/play"] => {
                Self::send_command(tx, ApiCommand::Play)
            },
            (POST) ["/api/player/pause"] => {
                Self::send_command(tx, ApiCommand::Pause)
            },
            // Time/mode/speed handled above due to path params

            // Schedule replacement (JSON document body)
            (POST) ["/api/schedule"] => {
                Self::handle_replace_schedule(request, tx)
            },

            // Health check
            (GET) ["/api/health"] => {
                Response::json(&ApiResponse::ok_msg("circadia API server"))
            },

            // Fallback
            _ => {
                Response::json(&ApiResponse::err("Not found")).with_status_code(404)
            }
        );

        response.with_additional_header("Access-Control-Allow-Origin", "*")
    }

    fn get_status(state: &Arc<SharedApiState>) -> Response {
        let player = state.player.read().unwrap_or_else(|e| e.into_inner()).clone();
        let schedule = state.schedule.read().unwrap_or_else(|e| e.into_inner()).clone();
        let outputs = state.outputs.read().unwrap_or_else(|e| e.into_inner()).clone();

        Response::json(&StatusResponse { player, schedule, outputs })
    }

    fn get_player(state: &Arc<SharedApiState>) -> Response {
        let player = state.player.read().unwrap_or_else(|e| e.into_inner()).clone();
        Response::json(&player)
    }

    fn get_schedule(state: &Arc<SharedApiState>) -> Response {
        let schedule = state.schedule.read().unwrap_or_else(|e| e.into_inner()).clone();
        match schedule {
            Some(doc) => Response::json(&doc),
            None => Response::json(&ApiResponse::err("No schedule loaded")).with_status_code(404),
        }
    }

    fn get_outputs(state: &Arc<SharedApiState>) -> Response {
        let outputs = state.outputs.read().unwrap_or_else(|e| e.into_inner()).clone();
        Response::json(&outputs)
    }

    fn send_command(tx: &mpsc::Sender<ApiCommand>, cmd: ApiCommand) -> Response {
        match tx.send(cmd) {
            Ok(_) => Response::json(&ApiResponse::ok()),
            Err(e) => Response::json(&ApiResponse::err(&format!("Failed to send command: {}", e)))
                .with_status_code(500),
        }
    }

    fn handle_replace_schedule(request: &Request, tx: &mpsc::Sender<ApiCommand>) -> Response {
        match rouille::input::json_input::<ScheduleDoc>(request) {
            Ok(doc) => Self::send_command(tx, ApiCommand::ReplaceSchedule(doc)),
            Err(e) => Response::json(&ApiResponse::err(&format!("Invalid JSON: {}", e)))
                .with_status_code(400),
        }
    }
}
