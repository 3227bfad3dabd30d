//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use volumio_lcd_hw::{lcd, LcdGeometry};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Volumio connection
    #[serde(default)]
    pub volumio: VolumioConfig,

    /// LCD hardware
    #[serde(default)]
    pub lcd: LcdConfig,

    /// Display content
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Volumio Socket.IO connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumioConfig {
    /// Base URL of the Volumio instance (e.g., "http://volumio.local:3000")
    #[serde(default = "default_url")]
    pub url: String,

    /// Engine.IO protocol revision (3 for socket.io 2.x servers, 4 for 3.x and later)
    #[serde(default = "default_eio")]
    pub eio: u8,

    /// Reconnect after the connection drops
    #[serde(default = "default_true")]
    pub reconnect: bool,

    /// Delay between reconnect attempts in milliseconds
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,

    /// Emit `getState` after connecting so the display is populated immediately
    #[serde(default)]
    pub request_state: bool,
}

impl Default for VolumioConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            eio: default_eio(),
            reconnect: true,
            reconnect_delay_ms: default_reconnect_delay(),
            request_state: false,
        }
    }
}

/// LCD hardware configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LcdConfig {
    /// I2C bus number (`/dev/i2c-N`)
    #[serde(default = "default_bus")]
    pub bus: u8,

    /// I2C slave address of the display backpack
    #[serde(default = "default_address")]
    pub address: u16,

    /// Number of text rows
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Number of text columns
    #[serde(default = "default_cols")]
    pub cols: usize,

    /// Hold the I2C bus open while running; disable on hosts without i2c-dev
    #[serde(default = "default_true")]
    pub acquire_bus: bool,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            bus: default_bus(),
            address: default_address(),
            rows: default_rows(),
            cols: default_cols(),
            acquire_bus: true,
        }
    }
}

impl LcdConfig {
    /// Builds the validated display geometry.
    pub fn geometry(&self) -> Result<LcdGeometry> {
        let geometry = LcdGeometry::new(self.rows, self.cols)
            .context("Invalid LCD geometry")?
            .with_bus(self.bus, self.address);
        Ok(geometry)
    }
}

/// Display content configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// First line of the idle message
    #[serde(default = "default_idle_line1")]
    pub idle_line1: String,

    /// Second line of the idle message
    #[serde(default = "default_idle_line2")]
    pub idle_line2: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            idle_line1: default_idle_line1(),
            idle_line2: default_idle_line2(),
        }
    }
}

// Default value functions
fn default_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_eio() -> u8 {
    3
}

fn default_true() -> bool {
    true
}

fn default_reconnect_delay() -> u64 {
    5000
}

fn default_bus() -> u8 {
    volumio_lcd_hw::DEFAULT_BUS
}

fn default_address() -> u16 {
    volumio_lcd_hw::DEFAULT_ADDRESS
}

fn default_rows() -> usize {
    volumio_lcd_hw::LCD_ROWS
}

fn default_cols() -> usize {
    volumio_lcd_hw::LCD_COLS
}

fn default_idle_line1() -> String {
    lcd::IDLE_LINE1.to_string()
}

fn default_idle_line2() -> String {
    lcd::IDLE_LINE2.to_string()
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse configuration")?;
        if config.volumio.eio != 3 && config.volumio.eio != 4 {
            anyhow::bail!("Unsupported Engine.IO revision: {}", config.volumio.eio);
        }
        Ok(config)
    }

    /// Saves configuration to a TOML file.
    #[allow(dead_code)]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }
}
