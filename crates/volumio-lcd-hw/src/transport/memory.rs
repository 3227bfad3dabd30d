//! In-memory transport for dry runs and tests.

use super::Transport;
use crate::{Error, Result, DEFAULT_BUS};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Recorder {
    open: bool,
    opens: usize,
    closes: usize,
    fail_open: bool,
    fail_writes: bool,
    writes: Vec<(usize, String)>,
}

/// Transport that records every row write.
///
/// Clones share the same recording, so a test can keep one handle while the
/// controller owns the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<Recorder>>,
}

impl MemoryTransport {
    /// Creates an empty recording transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport whose `open` reports the bus as unavailable.
    pub fn unavailable() -> Self {
        let transport = Self::default();
        transport.inner.lock().unwrap().fail_open = true;
        transport
    }

    /// Makes subsequent row writes fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().unwrap().fail_writes = fail;
    }

    /// Returns all recorded `(row, line)` writes.
    pub fn writes(&self) -> Vec<(usize, String)> {
        self.inner.lock().unwrap().writes.clone()
    }

    /// Returns and clears the recorded writes.
    pub fn take_writes(&self) -> Vec<(usize, String)> {
        std::mem::take(&mut self.inner.lock().unwrap().writes)
    }

    /// Whether the resource is currently held.
    pub fn is_open(&self) -> bool {
        self.inner.lock().unwrap().open
    }

    /// Number of successful opens.
    pub fn open_count(&self) -> usize {
        self.inner.lock().unwrap().opens
    }

    /// Number of closes that released a held resource.
    pub fn close_count(&self) -> usize {
        self.inner.lock().unwrap().closes
    }
}

impl Transport for MemoryTransport {
    fn open(&mut self) -> Result<()> {
        let mut rec = self.inner.lock().unwrap();
        if rec.fail_open {
            return Err(Error::ResourceUnavailable {
                bus: DEFAULT_BUS,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such bus"),
            });
        }
        rec.open = true;
        rec.opens += 1;
        Ok(())
    }

    fn write_row(&mut self, row: usize, line: &str) -> Result<()> {
        let mut rec = self.inner.lock().unwrap();
        if rec.fail_writes {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "write failed",
            )));
        }
        rec.writes.push((row, line.to_string()));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut rec = self.inner.lock().unwrap();
        if rec.open {
            rec.open = false;
            rec.closes += 1;
        }
        Ok(())
    }
}
