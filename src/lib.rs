//! # ssh-conduit
//!
//! Client-side channel lifecycle management over non-blocking SSH-style
//! transports.
//!
//! This crate drives a single remote channel from closed to open across a
//! transport whose every operation may complete, block, or fail. The
//! activation state machine absorbs would-block outcomes, queues setup
//! steps requested early, and resumes exactly where it left off when the
//! owner reports connection readiness.
//!
//! ## Features
//!
//! - **Would-block aware**: every transport call can park and resume without losing progress
//! - **Deferred setup**: pty, exec, and shell requests queue until the session channel is ready
//! - **Two channel flavors**: session channels carrying an exec'd command or shell, and direct-tcp streams
//! - **Scriptable transport**: a built-in test double replays outcomes for deterministic tests
//!
//! ## Quick Start
//!
//! ```
//! use ssh_conduit::{Channel, ChannelEvent, PtyRequest, ScriptedTransport};
//!
//! fn main() -> ssh_conduit::Result<()> {
//!     let mut channel = Channel::new(ScriptedTransport::new());
//!
//!     channel.open_session()?;
//!     channel.request_pty(PtyRequest::default())?;
//!     channel.start_shell()?;
//!
//!     assert!(channel.is_open());
//!     assert_eq!(channel.poll_event(), Some(ChannelEvent::Connected));
//!
//!     // Data path: zero means try again after the next readiness event.
//!     let mut buf = [0u8; 4096];
//!     let n = channel.read(&mut buf)?;
//!     assert_eq!(n, 0);
//!
//!     channel.close();
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod logging;
pub mod transport;

// Re-export commonly used types
pub use channel::{Activation, Channel, ChannelEvent, ChannelStage, PtyRequest, TcpTarget};
pub use config::{ChannelConfig, ConfigError};
pub use error::{ChannelError, Result};
pub use transport::{Progress, ScriptedTransport, StreamId, Transport, TransportCall};
