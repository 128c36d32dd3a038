use clap::Parser;
use std::path::PathBuf;

use crate::core::player::{DEFAULT_SPEED_LEVEL, SPEED_MAX, SPEED_MIN};

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Daily-schedule player for timed binary outputs
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Path to the schedule document (JSON) - defaults to schedule.json in the config directory
    #[arg(value_name = "SCHEDULE")]
    pub schedule: Option<PathBuf>,

    /// HTTP control port
    #[arg(short = 'p', long = "port", value_name = "PORT", default_value = "8080")]
    pub port: u16,

    /// Start playing immediately (adjusted mode)
    #[arg(short = 'a', long = "autoplay")]
    pub autoplay: bool,

    /// Synchronize to the wall clock on startup (implies playback)
    #[arg(short = 'r', long = "realtime")]
    pub realtime: bool,

    /// Adjusted-mode speed level (1 = real-time pacing, 100 = near-instant)
    #[arg(short = 's', long = "speed", value_name = "LEVEL",
          default_value_t = DEFAULT_SPEED_LEVEL,
          value_parser = clap::value_parser!(i32).range(SPEED_MIN as i64..=SPEED_MAX as i64))]
    pub speed: i32,

    /// Drive sysfs GPIO pins instead of the in-memory output driver
    #[arg(long = "gpio")]
    pub gpio: bool,

    /// Enable logging to file (default: circadia.log in the data directory)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
