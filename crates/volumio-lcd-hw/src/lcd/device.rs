//! Character LCD controller.

use crate::transport::Transport;
use crate::{Error, Result, DEFAULT_ADDRESS, DEFAULT_BUS, LCD_COLS, LCD_ROWS};
use tracing::{debug, info, trace, warn};

use super::text::{blank, normalize};

/// Default first idle line.
pub const IDLE_LINE1: &str = " Willkommen bei   ";

/// Default second idle line.
pub const IDLE_LINE2: &str = "    Volumio!     ";

/// Display geometry and bus location. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcdGeometry {
    rows: usize,
    cols: usize,
    bus: u8,
    address: u16,
}

impl LcdGeometry {
    /// Creates a geometry on the default bus and address.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidGeometry { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            bus: DEFAULT_BUS,
            address: DEFAULT_ADDRESS,
        })
    }

    /// Sets the bus number and slave address.
    pub fn with_bus(mut self, bus: u8, address: u16) -> Self {
        self.bus = bus;
        self.address = address;
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn bus(&self) -> u8 {
        self.bus
    }

    pub fn address(&self) -> u16 {
        self.address
    }
}

impl Default for LcdGeometry {
    fn default() -> Self {
        Self {
            rows: LCD_ROWS,
            cols: LCD_COLS,
            bus: DEFAULT_BUS,
            address: DEFAULT_ADDRESS,
        }
    }
}

/// Fixed-geometry text display.
///
/// The controller is either closed or open. Every render call made while
/// closed is silently ignored. Every line that reaches the transport is
/// exactly `cols` characters wide.
///
/// The transport is released by [`shutdown`](Self::shutdown), and again on
/// drop if the caller never shut down.
pub struct LcdController<T: Transport> {
    geometry: LcdGeometry,
    transport: T,
    open: bool,
    lines: Vec<String>,
    idle: [String; 2],
}

impl<T: Transport> LcdController<T> {
    /// Creates a closed controller.
    pub fn new(geometry: LcdGeometry, transport: T) -> Self {
        let lines = vec![blank(geometry.cols); geometry.rows];
        Self {
            geometry,
            transport,
            open: false,
            lines,
            idle: [IDLE_LINE1.to_string(), IDLE_LINE2.to_string()],
        }
    }

    /// Replaces the message shown by [`show_idle`](Self::show_idle) when lines are omitted.
    pub fn with_idle_message(mut self, line1: impl Into<String>, line2: impl Into<String>) -> Self {
        self.idle = [line1.into(), line2.into()];
        self
    }

    /// Acquires the transport and clears the display.
    ///
    /// On failure the controller stays closed and nothing is held.
    pub fn open(&mut self) -> Result<()> {
        if self.open {
            return Ok(());
        }

        self.transport.open()?;
        self.open = true;

        if let Err(e) = self.clear() {
            self.open = false;
            if let Err(close_err) = self.transport.close() {
                debug!("Close after failed clear also failed: {}", close_err);
            }
            return Err(e);
        }

        info!(
            "LCD opened ({}x{}, bus {}, address 0x{:02X})",
            self.geometry.rows, self.geometry.cols, self.geometry.bus, self.geometry.address
        );
        Ok(())
    }

    /// Writes spaces to every row.
    pub fn clear(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        for row in 0..self.geometry.rows {
            self.render_line(row, None)?;
        }
        Ok(())
    }

    /// Normalizes `text` to the column count and writes it to `row`.
    ///
    /// `None` renders an empty line.
    pub fn render_line(&mut self, row: usize, text: Option<&str>) -> Result<()> {
        if !self.open {
            trace!("LCD closed, dropping write to row {}", row);
            return Ok(());
        }
        if row >= self.geometry.rows {
            return Err(Error::InvalidRow {
                row,
                rows: self.geometry.rows,
            });
        }

        let line = normalize(text.unwrap_or_default(), self.geometry.cols);
        self.transport.write_row(row, &line)?;
        debug!("Row {} <- {:?}", row, line);
        self.lines[row] = line;
        Ok(())
    }

    /// Two-row accessor: line 1 is row 0, any other line number is row 1.
    pub fn show_line(&mut self, line_number: usize, text: Option<&str>) -> Result<()> {
        let row = if line_number == 1 { 0 } else { 1 };
        self.render_line(row, text)
    }

    /// Shows the idle message. Omitted or empty lines fall back to the configured defaults.
    pub fn show_idle(&mut self, line1: Option<&str>, line2: Option<&str>) -> Result<()> {
        let line1 = match line1 {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.idle[0].clone(),
        };
        let line2 = match line2 {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => self.idle[1].clone(),
        };
        self.show_line(1, Some(&line1))?;
        self.show_line(2, Some(&line2))
    }

    /// Shows the artist on the first row and the title on the second.
    pub fn show_now_playing(&mut self, title: Option<&str>, artist: Option<&str>) -> Result<()> {
        self.show_line(1, artist)?;
        self.show_line(2, title)
    }

    /// Clears the display and releases the transport. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if !self.open {
            return;
        }
        if let Err(e) = self.clear() {
            warn!("Failed to clear LCD during shutdown: {}", e);
        }
        if let Err(e) = self.transport.close() {
            warn!("Failed to release LCD transport: {}", e);
        }
        self.open = false;
        info!("LCD shut down");
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn geometry(&self) -> &LcdGeometry {
        &self.geometry
    }

    /// Lines most recently written to each row.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> Drop for LcdController<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn open_lcd() -> (LcdController<MemoryTransport>, MemoryTransport) {
        let transport = MemoryTransport::new();
        let mut lcd = LcdController::new(LcdGeometry::default(), transport.clone());
        lcd.open().unwrap();
        transport.take_writes();
        (lcd, transport)
    }

    fn row(row: usize, line: &str) -> (usize, String) {
        (row, line.to_string())
    }

    #[test]
    fn test_geometry_validation() {
        assert!(LcdGeometry::new(0, 16).is_err());
        assert!(LcdGeometry::new(2, 0).is_err());
        let geometry = LcdGeometry::new(4, 20).unwrap().with_bus(0, 0x3F);
        assert_eq!(geometry.rows(), 4);
        assert_eq!(geometry.cols(), 20);
        assert_eq!(geometry.bus(), 0);
        assert_eq!(geometry.address(), 0x3F);
    }

    #[test]
    fn test_open_clears_display() {
        let transport = MemoryTransport::new();
        let mut lcd = LcdController::new(LcdGeometry::default(), transport.clone());
        lcd.open().unwrap();

        assert!(lcd.is_open());
        assert!(transport.is_open());
        let blank = " ".repeat(16);
        assert_eq!(transport.writes(), vec![row(0, &blank), row(1, &blank)]);
    }

    #[test]
    fn test_open_failure_stays_closed() {
        let transport = MemoryTransport::unavailable();
        let mut lcd = LcdController::new(LcdGeometry::default(), transport.clone());

        assert!(matches!(lcd.open(), Err(Error::ResourceUnavailable { .. })));
        assert!(!lcd.is_open());
        assert!(lcd.show_idle(None, None).is_ok());
        assert!(transport.writes().is_empty());
    }

    #[test]
    fn test_render_before_open_is_noop() {
        let transport = MemoryTransport::new();
        let mut lcd = LcdController::new(LcdGeometry::default(), transport.clone());

        assert!(lcd.clear().is_ok());
        assert!(lcd.render_line(0, Some("hello")).is_ok());
        assert!(lcd.show_idle(None, None).is_ok());
        assert!(lcd.show_now_playing(Some("Song"), Some("Band")).is_ok());
        assert!(transport.writes().is_empty());
        assert_eq!(lcd.lines()[0], " ".repeat(16));
    }

    #[test]
    fn test_show_idle_defaults() {
        let (mut lcd, transport) = open_lcd();
        lcd.show_idle(None, None).unwrap();
        assert_eq!(
            transport.writes(),
            vec![row(0, " Willkommen bei "), row(1, "    Volumio!    ")]
        );
    }

    #[test]
    fn test_show_idle_custom_and_empty_lines() {
        let (mut lcd, transport) = open_lcd();
        lcd.show_idle(Some("Hello"), Some("")).unwrap();
        assert_eq!(
            transport.writes(),
            vec![row(0, "Hello           "), row(1, "    Volumio!    ")]
        );
    }

    #[test]
    fn test_configured_idle_message() {
        let transport = MemoryTransport::new();
        let mut lcd = LcdController::new(LcdGeometry::default(), transport.clone())
            .with_idle_message("Welcome to", "Volumio");
        lcd.open().unwrap();
        transport.take_writes();

        lcd.show_idle(None, None).unwrap();
        assert_eq!(lcd.lines(), ["Welcome to      ", "Volumio         "]);
    }

    #[test]
    fn test_show_now_playing() {
        let (mut lcd, transport) = open_lcd();
        lcd.show_now_playing(Some("Song"), Some("Band")).unwrap();
        assert_eq!(
            transport.writes(),
            vec![row(0, "Band            "), row(1, "Song            ")]
        );

        lcd.show_now_playing(None, None).unwrap();
        assert_eq!(lcd.lines(), [" ".repeat(16), " ".repeat(16)]);
    }

    #[test]
    fn test_show_line_fallback() {
        let (mut lcd, transport) = open_lcd();
        lcd.show_line(1, Some("a")).unwrap();
        lcd.show_line(0, Some("b")).unwrap();
        lcd.show_line(7, Some("c")).unwrap();
        let rows: Vec<usize> = transport.writes().into_iter().map(|(r, _)| r).collect();
        assert_eq!(rows, vec![0, 1, 1]);
    }

    #[test]
    fn test_render_line_out_of_range() {
        let (mut lcd, transport) = open_lcd();
        assert!(matches!(
            lcd.render_line(2, Some("x")),
            Err(Error::InvalidRow { row: 2, rows: 2 })
        ));
        assert!(transport.writes().is_empty());
    }

    #[test]
    fn test_shutdown_twice() {
        let (mut lcd, transport) = open_lcd();
        lcd.shutdown();
        lcd.shutdown();

        assert!(!lcd.is_open());
        assert!(!transport.is_open());
        assert_eq!(transport.close_count(), 1);
        assert_eq!(transport.writes().len(), 2);
    }

    #[test]
    fn test_shutdown_swallows_clear_failure() {
        let (mut lcd, transport) = open_lcd();
        transport.set_fail_writes(true);

        lcd.shutdown();
        assert!(!lcd.is_open());
        assert!(!transport.is_open());
    }

    #[test]
    fn test_drop_releases_transport() {
        let (lcd, transport) = open_lcd();
        drop(lcd);
        assert!(!transport.is_open());
        assert_eq!(transport.close_count(), 1);
    }

    #[test]
    fn test_reopen_after_shutdown() {
        let (mut lcd, transport) = open_lcd();
        lcd.shutdown();
        lcd.open().unwrap();
        assert!(lcd.is_open());
        assert_eq!(transport.open_count(), 2);
    }
}
