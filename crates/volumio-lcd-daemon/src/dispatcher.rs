//! Maps player events onto display updates.

use tracing::{debug, info, warn};
use volumio_lcd_hw::{LcdController, Result, Transport};

use crate::volumio::PlayerEvent;

/// Owns the display and applies one event at a time.
pub struct Dispatcher<T: Transport> {
    lcd: LcdController<T>,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(lcd: LcdController<T>) -> Self {
        Self { lcd }
    }

    /// Shows the idle message.
    pub fn show_welcome(&mut self) -> Result<()> {
        self.lcd.show_idle(None, None)
    }

    /// Applies one player event to the display.
    pub fn handle(&mut self, event: PlayerEvent) -> Result<()> {
        match event {
            PlayerEvent::Connected => {
                info!("Connected to Volumio");
                Ok(())
            }
            PlayerEvent::Disconnected => {
                warn!("Disconnected from Volumio");
                Ok(())
            }
            PlayerEvent::State(state) if state.is_playing() => {
                debug!(
                    "Now playing: {} - {}",
                    state.artist.as_deref().unwrap_or_default(),
                    state.title.as_deref().unwrap_or_default()
                );
                self.lcd
                    .show_now_playing(state.title.as_deref(), state.artist.as_deref())
            }
            PlayerEvent::State(state) => {
                debug!("Player status {:?}, showing idle message", state.status);
                self.lcd.show_idle(None, None)
            }
        }
    }

    /// Clears the display and releases the bus.
    pub fn shutdown(&mut self) {
        self.lcd.shutdown();
    }

    #[cfg(test)]
    fn lcd(&self) -> &LcdController<T> {
        &self.lcd
    }
}
