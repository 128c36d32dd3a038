//! Output drivers: where dispatched transitions land.
//!
//! The player addresses outputs by port number through the `OutputDriver`
//! trait and never keeps hardware handles on schedule entities. `write` is
//! synchronous and must not block; `read` exists only so observers can
//! resynchronize after a reconnect - the scheduler's own logic never reads.

use std::fs;
use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use log::{debug, error};

/// Exclusive writer of physical output values, keyed by port id.
pub trait OutputDriver: Send {
    /// Set the output value for `port`. Infallible at the interface:
    /// implementations log failures rather than unwinding into the tick loop.
    fn write(&mut self, port: u32, value: u8);

    /// Last known value for `port`, if the port has ever been written
    /// (or can be read back from hardware).
    fn read(&self, port: u32) -> Option<u8>;
}

/// In-memory driver: the default for development and tests.
///
/// Keeps insertion order so snapshot listings stay in first-write order.
#[derive(Debug, Default)]
pub struct MemoryOutputs {
    values: IndexMap<u32, u8>,
}

impl MemoryOutputs {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputDriver for MemoryOutputs {
    fn write(&mut self, port: u32, value: u8) {
        debug!("output port {} <- {}", port, value);
        self.values.insert(port, value);
    }

    fn read(&self, port: u32) -> Option<u8> {
        self.values.get(&port).copied()
    }
}

/// Sysfs GPIO driver for Linux boards (Raspberry Pi class hardware).
///
/// Ports are exported and set to output direction on first write. Write
/// failures are logged, never propagated - a missing pin must not take the
/// tick loop down.
pub struct SysfsGpio {
    base: PathBuf,
    exported: IndexSet<u32>,
}

impl SysfsGpio {
    pub fn new() -> Self {
        Self::with_base(PathBuf::from("/sys/class/gpio"))
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self {
            base,
            exported: IndexSet::new(),
        }
    }

    fn ensure_exported(&mut self, port: u32) {
        if self.exported.contains(&port) {
            return;
        }
        let pin_dir = self.base.join(format!("gpio{}", port));
        if !pin_dir.exists() {
            if let Err(e) = fs::write(self.base.join("export"), port.to_string()) {
                error!("gpio {}: export failed: {}", port, e);
                return;
            }
        }
        if let Err(e) = fs::write(pin_dir.join("direction"), "out") {
            error!("gpio {}: setting direction failed: {}", port, e);
            return;
        }
        self.exported.insert(port);
    }

    fn value_path(&self, port: u32) -> PathBuf {
        self.base.join(format!("gpio{}", port)).join("value")
    }
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDriver for SysfsGpio {
    fn write(&mut self, port: u32, value: u8) {
        self.ensure_exported(port);
        if let Err(e) = fs::write(self.value_path(port), value.to_string()) {
            error!("gpio {}: write {} failed: {}", port, value, e);
        }
    }

    fn read(&self, port: u32) -> Option<u8> {
        let text = fs::read_to_string(self.value_path(port)).ok()?;
        text.trim().parse().ok()
    }
}
