//! Transport abstraction layer.
//!
//! The channel layer never talks to a socket directly. Everything it needs
//! from the authenticated session below it is expressed as the [`Transport`]
//! trait: non-blocking channel allocation, setup requests, sub-stream I/O,
//! and best-effort teardown. Every potentially blocking call reports
//! [`Progress::WouldBlock`] instead of waiting, which is what lets the
//! activation machine be driven purely by external readiness events.

mod scripted;

pub use scripted::{ScriptedHandle, ScriptedTransport, TransportCall};

/// Outcome of a single non-blocking transport call.
///
/// `WouldBlock` is not an error: it tells the caller to wait for the next
/// readiness event and retry. `Failed` carries a rendered description of a
/// non-retryable fault; raw transport error codes stay below this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress<T> {
    /// The operation completed.
    Complete(T),
    /// The transport cannot make progress until the socket is ready again.
    WouldBlock,
    /// The operation failed and will not succeed if retried.
    Failed(String),
}

impl<T> Progress<T> {
    /// Check whether this outcome is the transient would-block signal.
    pub fn is_would_block(&self) -> bool {
        matches!(self, Progress::WouldBlock)
    }
}

/// Selector for a multiplexed sub-stream within a channel.
///
/// A channel carries more than one data lane; reads and writes name the
/// lane they target. Lane numbering follows the usual SSH convention:
/// `0` is the primary data stream, `1` the extended (diagnostic) stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StreamId(pub u32);

impl StreamId {
    /// The primary data stream (stdout for exec/shell channels).
    pub const PRIMARY: StreamId = StreamId(0);
    /// The extended diagnostic stream (stderr for exec/shell channels).
    pub const EXTENDED: StreamId = StreamId(1);

    /// Get the raw lane number.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stream#{}", self.0)
    }
}

/// Capability set the channel layer consumes from the owning session.
///
/// `Handle` is the transport's own representation of an allocated channel;
/// the channel layer treats it as opaque and exclusively owned. All methods
/// must return promptly: implementations report [`Progress::WouldBlock`]
/// rather than blocking the caller.
pub trait Transport {
    /// Opaque allocated-channel resource.
    type Handle;

    /// Allocate a session-backed channel.
    fn open_session_channel(&mut self) -> Progress<Self::Handle>;

    /// Request a pseudo-terminal on an allocated channel.
    fn request_pty(
        &mut self,
        handle: &mut Self::Handle,
        spec: &crate::channel::PtyRequest,
    ) -> Progress<()>;

    /// Start executing a command on an allocated channel.
    fn exec_command(&mut self, handle: &mut Self::Handle, command: &str) -> Progress<()>;

    /// Start an interactive shell on an allocated channel.
    fn start_shell(&mut self, handle: &mut Self::Handle) -> Progress<()>;

    /// Allocate a channel forwarded directly to a TCP destination.
    fn open_direct_tcp(&mut self, host: &str, port: u16) -> Progress<Self::Handle>;

    /// Read up to `buf.len()` bytes from one sub-stream of the channel.
    fn read_stream(
        &mut self,
        handle: &mut Self::Handle,
        stream: StreamId,
        buf: &mut [u8],
    ) -> Progress<usize>;

    /// Write up to `buf.len()` bytes to one sub-stream of the channel.
    ///
    /// Accepting fewer bytes than offered is normal under flow control.
    fn write_stream(
        &mut self,
        handle: &mut Self::Handle,
        stream: StreamId,
        buf: &[u8],
    ) -> Progress<usize>;

    /// Check whether the remote side has signalled end-of-stream.
    fn is_eof(&self, handle: &Self::Handle) -> bool;

    /// Signal end-of-output to the remote side. Best-effort, non-blocking.
    fn send_eof(&mut self, handle: &mut Self::Handle);

    /// Close the channel at the transport level. Best-effort, non-blocking.
    fn close_handle(&mut self, handle: &mut Self::Handle);
}

// Lets an owning client lend its session to a channel for the channel's
// lifetime instead of moving it in.
impl<T: Transport + ?Sized> Transport for &mut T {
    type Handle = T::Handle;

    fn open_session_channel(&mut self) -> Progress<Self::Handle> {
        (**self).open_session_channel()
    }

    fn request_pty(
        &mut self,
        handle: &mut Self::Handle,
        spec: &crate::channel::PtyRequest,
    ) -> Progress<()> {
        (**self).request_pty(handle, spec)
    }

    fn exec_command(&mut self, handle: &mut Self::Handle, command: &str) -> Progress<()> {
        (**self).exec_command(handle, command)
    }

    fn start_shell(&mut self, handle: &mut Self::Handle) -> Progress<()> {
        (**self).start_shell(handle)
    }

    fn open_direct_tcp(&mut self, host: &str, port: u16) -> Progress<Self::Handle> {
        (**self).open_direct_tcp(host, port)
    }

    fn read_stream(
        &mut self,
        handle: &mut Self::Handle,
        stream: StreamId,
        buf: &mut [u8],
    ) -> Progress<usize> {
        (**self).read_stream(handle, stream, buf)
    }

    fn write_stream(
        &mut self,
        handle: &mut Self::Handle,
        stream: StreamId,
        buf: &[u8],
    ) -> Progress<usize> {
        (**self).write_stream(handle, stream, buf)
    }

    fn is_eof(&self, handle: &Self::Handle) -> bool {
        (**self).is_eof(handle)
    }

    fn send_eof(&mut self, handle: &mut Self::Handle) {
        (**self).send_eof(handle)
    }

    fn close_handle(&mut self, handle: &mut Self::Handle) {
        (**self).close_handle(handle)
    }
}
