//! Console transport.
//!
//! Prints each rendered row as `[LCD] Row <n>: "<line>"`. When given an
//! [`I2cBus`], the bus is acquired on open and held until close, so a missing
//! bus still fails startup even though no controller commands are sent.

use super::{I2cBus, Transport};
use crate::Result;
use std::io::{self, Write};

/// Transport that writes rows to a text sink.
pub struct ConsoleTransport<W = io::Stdout> {
    out: W,
    bus: Option<I2cBus>,
}

impl ConsoleTransport<io::Stdout> {
    /// Console transport on standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleTransport<W> {
    /// Creates a console transport writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, bus: None }
    }

    /// Attaches an I2C bus that is acquired on open.
    pub fn with_bus(mut self, bus: I2cBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Returns the attached bus, if any.
    pub fn bus(&self) -> Option<&I2cBus> {
        self.bus.as_ref()
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write + Send> Transport for ConsoleTransport<W> {
    fn open(&mut self) -> Result<()> {
        if let Some(bus) = self.bus.as_mut() {
            bus.open()?;
        }
        Ok(())
    }

    fn write_row(&mut self, row: usize, line: &str) -> Result<()> {
        writeln!(self.out, "[LCD] Row {}: \"{}\"", row + 1, line)?;
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(bus) = self.bus.as_mut() {
            bus.close();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_format() {
        let mut transport = ConsoleTransport::new(Vec::new());
        transport.open().unwrap();
        transport.write_row(0, "The Beatles     ").unwrap();
        transport.write_row(1, "Abbey Road      ").unwrap();

        let output = String::from_utf8(transport.get_ref().clone()).unwrap();
        assert_eq!(
            output,
            "[LCD] Row 1: \"The Beatles     \"\n[LCD] Row 2: \"Abbey Road      \"\n"
        );
    }

    #[test]
    fn test_open_fails_without_bus_device() {
        let mut transport = ConsoleTransport::new(Vec::new()).with_bus(I2cBus::new(251, 0x27));
        assert!(transport.open().is_err());
        assert!(!transport.bus().unwrap().is_open());
        assert!(transport.close().is_ok());
    }
}
