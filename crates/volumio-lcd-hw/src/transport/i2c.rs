//! Linux i2c-dev bus handle.

use crate::{Error, Result};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;
use tracing::{debug, info};

/// `I2C_SLAVE` request from `linux/i2c-dev.h`.
const I2C_SLAVE: u32 = 0x0703;

/// An I2C bus opened by number and bound to one slave address.
#[derive(Debug)]
pub struct I2cBus {
    bus: u8,
    address: u16,
    file: Option<File>,
}

impl I2cBus {
    /// Creates a closed bus handle.
    pub fn new(bus: u8, address: u16) -> Self {
        Self {
            bus,
            address,
            file: None,
        }
    }

    /// Returns the character device path for this bus.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(format!("/dev/i2c-{}", self.bus))
    }

    /// Returns the bus number.
    pub fn bus(&self) -> u8 {
        self.bus
    }

    /// Returns the slave address.
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Whether the device node is currently held open.
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Opens the bus device and selects the slave address.
    pub fn open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }

        let path = self.path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| {
                debug!("Failed to open {}: {}", path.display(), source);
                Error::ResourceUnavailable {
                    bus: self.bus,
                    source,
                }
            })?;

        // SAFETY: the descriptor is owned by `file` and stays valid for the call.
        let rc = unsafe {
            libc::ioctl(
                file.as_raw_fd(),
                I2C_SLAVE as _,
                libc::c_ulong::from(self.address),
            )
        };
        if rc < 0 {
            return Err(Error::ResourceUnavailable {
                bus: self.bus,
                source: std::io::Error::last_os_error(),
            });
        }

        info!(
            "I2C bus opened ({}, address 0x{:02X})",
            path.display(),
            self.address
        );
        self.file = Some(file);
        Ok(())
    }

    /// Closes the bus device. No-op if already closed.
    pub fn close(&mut self) {
        if self.file.take().is_some() {
            debug!("I2C bus {} closed", self.bus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path() {
        let bus = I2cBus::new(1, 0x27);
        assert_eq!(bus.path(), PathBuf::from("/dev/i2c-1"));
        assert_eq!(bus.address(), 0x27);
        assert!(!bus.is_open());
    }

    #[test]
    fn test_missing_bus_is_unavailable() {
        let mut bus = I2cBus::new(250, 0x27);
        match bus.open() {
            Err(Error::ResourceUnavailable { bus, .. }) => assert_eq!(bus, 250),
            other => panic!("expected ResourceUnavailable, got {:?}", other),
        }
        assert!(!bus.is_open());
    }

    #[test]
    fn test_close_when_closed() {
        let mut bus = I2cBus::new(1, 0x27);
        bus.close();
        bus.close();
        assert!(!bus.is_open());
    }

    // Hardware tests are skipped by default
    #[test]
    #[ignore]
    fn test_bus_open() {
        let mut bus = I2cBus::new(1, 0x27);
        assert!(bus.open().is_ok());
        bus.close();
    }
}
