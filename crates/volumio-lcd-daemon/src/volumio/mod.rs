//! Volumio real-time event feed.
//!
//! Speaks the Socket.IO protocol over a WebSocket and forwards player events
//! to the dispatcher.

mod client;
mod packet;
mod state;

pub use client::{PlayerEvent, VolumioClient};
#[allow(unused_imports)]
pub use state::{PlayerNotification, PlayerStatus};
