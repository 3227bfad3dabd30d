//! Error types for the LCD hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when interacting with the display.
#[derive(Error, Debug)]
pub enum Error {
    /// The I2C bus could not be opened or the display address could not be bound.
    #[error("I2C bus {bus} unavailable: {source}")]
    ResourceUnavailable {
        bus: u8,
        #[source]
        source: std::io::Error,
    },

    /// Row index outside the display geometry.
    #[error("Row {row} out of range (display has {rows} rows)")]
    InvalidRow { row: usize, rows: usize },

    /// Display geometry with zero rows or columns.
    #[error("Invalid display geometry: {rows}x{cols}")]
    InvalidGeometry { rows: usize, cols: usize },

    /// Write to the transport failed.
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}
