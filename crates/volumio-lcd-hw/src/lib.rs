//! Volumio LCD Hardware Library
//!
//! Provides a fixed-geometry character display controller and the bus
//! transports it renders through (console, Linux i2c-dev, in-memory).

pub mod error;
pub mod lcd;
pub mod transport;

pub use error::{Error, Result};
pub use lcd::{normalize, LcdController, LcdGeometry};
pub use transport::{ConsoleTransport, I2cBus, MemoryTransport, Transport};

/// Default display rows.
pub const LCD_ROWS: usize = 2;

/// Default display columns.
pub const LCD_COLS: usize = 16;

/// I2C bus the display backpack is attached to (`/dev/i2c-1` on a Raspberry Pi).
pub const DEFAULT_BUS: u8 = 1;

/// Default PCF8574 backpack address.
pub const DEFAULT_ADDRESS: u16 = 0x27;
