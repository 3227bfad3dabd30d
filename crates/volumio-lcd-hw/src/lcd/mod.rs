//! Character LCD module.
//!
//! Provides line-level rendering onto a fixed rows x cols text surface.

mod device;

pub mod text;

pub use device::{LcdController, LcdGeometry, IDLE_LINE1, IDLE_LINE2};
pub use text::normalize;
