//! Display transports.
//!
//! A transport is the only place a rendered line leaves the controller. The
//! controller hands it already-normalized rows; the transport decides how they
//! reach the panel.

mod console;
mod i2c;
mod memory;

pub use console::ConsoleTransport;
pub use i2c::I2cBus;
pub use memory::MemoryTransport;

use crate::Result;

/// Capability the display controller renders through.
pub trait Transport: Send {
    /// Acquires the underlying resource. Called once per controller open.
    fn open(&mut self) -> Result<()>;

    /// Writes one normalized line to a zero-based row.
    fn write_row(&mut self, row: usize, line: &str) -> Result<()>;

    /// Releases the underlying resource. Must be safe to call when not open.
    fn close(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn write_row(&mut self, row: usize, line: &str) -> Result<()> {
        (**self).write_row(row, line)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
