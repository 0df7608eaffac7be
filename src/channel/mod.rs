//! Channel lifecycle and stream I/O.
//!
//! This module provides the activation state machine that walks a channel
//! from closed to open over a non-blocking transport, the deferred setup
//! directives queued along the way, and the read/write data path once the
//! channel is up.

mod directive;
mod event;
mod io;
mod lifecycle;
mod pty;
mod stage;
mod target;

pub use event::ChannelEvent;
pub use lifecycle::{Activation, Channel};
pub use pty::PtyRequest;
pub use stage::ChannelStage;
pub use target::TcpTarget;
