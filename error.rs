use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by one acquire/store/sweep cycle.
///
/// Per-channel sensor failures are isolated at record assembly (the channel
/// becomes null); a corrupt log file and a malformed retention filename are
/// recovered in place. Only these remain to abort the cycle.
#[derive(Debug, Error)]
pub enum Error {
    /// Calibration block came back with the wrong length.
    #[error("invalid calibration block: expected 24 bytes, got {0}")]
    InvalidCalibrationBlock(usize),

    /// I2C transfer failed (bus error or unresponsive device).
    #[error("i2c bus error: {0}")]
    Bus(#[from] rppal::i2c::Error),

    /// Data directory could not be created or scanned.
    #[error("data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Daily log file could not be written.
    #[error("failed to write daily log {path}: {source}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
