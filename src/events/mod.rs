//! Event system: broadcast [`Bus`] and the [`Event`]/[`EventKind`] types.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
