use serde::{Deserialize, Serialize};

/// Size of the emulated display MMIO window (2 MiB).
pub const DEFAULT_MMIO_SIZE: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Bytes of backing register storage.
    pub mmio_size: usize,
    /// DisplayPort monitors with the built-in EDID, plugged on ports B, C, D in order.
    pub preallocated_monitors: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mmio_size: DEFAULT_MMIO_SIZE,
            preallocated_monitors: 1,
        }
    }
}
