//! Stream data path for open channels.
//!
//! Reads and writes translate directly into transport operations on the
//! channel's current stream lanes. A blocked transport surfaces as a
//! zero-length transfer; end-of-stream and hard faults close the channel
//! in place.

use tracing::{debug, trace};

use crate::error::{ChannelError, Result};
use crate::transport::{Progress, StreamId, Transport};

use super::lifecycle::Channel;

impl<T: Transport> Channel<T> {
    /// Read from the current read lane into `buf`.
    ///
    /// Returns `Ok(0)` when the transport has no data yet; that is not
    /// end-of-stream. When the remote side has finished the channel is
    /// closed after the final bytes are returned. A transport fault
    /// closes the channel and surfaces as an error.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.stage.is_open_for_io() {
            return Err(ChannelError::NotOpen(self.stage));
        }
        let outcome = {
            let Some(handle) = self.handle.as_mut() else {
                return Err(ChannelError::NotOpen(self.stage));
            };
            self.transport.read_stream(handle, self.read_stream, buf)
        };
        match outcome {
            Progress::Complete(n) => {
                trace!("read {n} bytes from {}", self.read_stream);
                self.close_if_eof("read");
                Ok(n)
            }
            Progress::WouldBlock => Ok(0),
            Progress::Failed(e) => {
                debug!("read failed: {e}");
                self.close();
                Err(ChannelError::Read(e))
            }
        }
    }

    /// Write `buf` to the current write lane.
    ///
    /// Returns how many bytes the transport accepted, which may be less
    /// than offered; the caller re-offers the remainder later. `Ok(0)`
    /// means the transport is backpressured. A transport fault closes
    /// the channel and surfaces as an error.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if !self.stage.is_open_for_io() {
            return Err(ChannelError::NotOpen(self.stage));
        }
        let outcome = {
            let Some(handle) = self.handle.as_mut() else {
                return Err(ChannelError::NotOpen(self.stage));
            };
            self.transport.write_stream(handle, self.write_stream, buf)
        };
        match outcome {
            Progress::Complete(n) => {
                trace!("wrote {n} bytes to {}", self.write_stream);
                self.close_if_eof("write");
                Ok(n)
            }
            Progress::WouldBlock => Ok(0),
            Progress::Failed(e) => {
                debug!("write failed: {e}");
                self.close();
                Err(ChannelError::Write(e))
            }
        }
    }

    /// Lane consumed by [`read`](Self::read).
    pub fn read_stream(&self) -> StreamId {
        self.read_stream
    }

    /// Lane fed by [`write`](Self::write).
    pub fn write_stream(&self) -> StreamId {
        self.write_stream
    }

    /// Route subsequent reads to a different stream lane, for example the
    /// extended lane carrying stderr.
    pub fn set_read_stream(&mut self, stream: StreamId) {
        self.read_stream = stream;
    }

    /// Route subsequent writes to a different stream lane.
    pub fn set_write_stream(&mut self, stream: StreamId) {
        self.write_stream = stream;
    }

    /// Channels deliver data strictly in arrival order; there is no
    /// seeking or random access.
    pub fn is_sequential(&self) -> bool {
        true
    }

    fn close_if_eof(&mut self, direction: &str) {
        let at_eof = match self.handle.as_ref() {
            Some(handle) => self.transport.is_eof(handle),
            None => false,
        };
        if at_eof {
            debug!("channel EOF on {direction}");
            self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelStage, TcpTarget};
    use crate::transport::{ScriptedTransport, TransportCall};

    fn shell_channel(transport: ScriptedTransport) -> Channel<ScriptedTransport> {
        let mut channel = Channel::new(transport);
        channel.open_session().unwrap();
        channel.start_shell().unwrap();
        assert!(channel.is_open());
        channel
    }

    #[test]
    fn test_read_before_open_is_rejected() {
        let mut channel = Channel::new(ScriptedTransport::new());
        let err = channel.read(&mut [0u8; 16]).unwrap_err();
        assert!(matches!(err, ChannelError::NotOpen(ChannelStage::Closed)));
    }

    #[test]
    fn test_read_returns_zero_when_no_data() {
        let mut channel = shell_channel(ScriptedTransport::new());
        let mut buf = [0u8; 16];

        assert_eq!(channel.read(&mut buf).unwrap(), 0);
        assert!(channel.is_open());
    }

    #[test]
    fn test_read_delivers_data() {
        let mut transport = ScriptedTransport::new();
        transport.script_read(StreamId::PRIMARY, Progress::Complete(b"hello".to_vec()));
        let mut channel = shell_channel(transport);

        let mut buf = [0u8; 16];
        assert_eq!(channel.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        assert!(channel.is_open());
    }

    #[test]
    fn test_read_at_eof_closes_channel() {
        let mut transport = ScriptedTransport::new();
        transport.script_read(StreamId::PRIMARY, Progress::Complete(b"bye".to_vec()));
        transport.set_eof(true);
        let mut channel = shell_channel(transport);

        // Final bytes still come through, then the channel shuts down.
        let mut buf = [0u8; 16];
        assert_eq!(channel.read(&mut buf).unwrap(), 3);
        assert_eq!(channel.stage(), ChannelStage::Closed);
        assert!(channel.transport().calls().contains(&TransportCall::SendEof));
        assert!(channel
            .transport()
            .calls()
            .contains(&TransportCall::CloseHandle));
    }

    #[test]
    fn test_read_failure_closes_and_reports() {
        let mut transport = ScriptedTransport::new();
        transport.script_read(
            StreamId::PRIMARY,
            Progress::Failed("channel torn down".into()),
        );
        let mut channel = shell_channel(transport);

        let err = channel.read(&mut [0u8; 8]).unwrap_err();
        assert!(matches!(err, ChannelError::Read(_)));
        assert!(!channel.is_open());

        // Follow-up I/O is rejected rather than retried.
        assert!(matches!(
            channel.read(&mut [0u8; 8]),
            Err(ChannelError::NotOpen(_))
        ));
    }

    #[test]
    fn test_write_accepts_partial_then_remainder() {
        let mut transport = ScriptedTransport::new();
        transport.script_write(Progress::Complete(1024));
        let mut channel = shell_channel(transport);

        let payload = vec![0xAB; 4096];
        let accepted = channel.write(&payload).unwrap();
        assert_eq!(accepted, 1024);

        let rest = channel.write(&payload[accepted..]).unwrap();
        assert_eq!(rest, 3072);
        assert_eq!(channel.transport().written(StreamId::PRIMARY), &payload[..]);
    }

    #[test]
    fn test_write_returns_zero_when_backpressured() {
        let mut transport = ScriptedTransport::new();
        transport.script_write(Progress::WouldBlock);
        let mut channel = shell_channel(transport);

        assert_eq!(channel.write(b"stalled").unwrap(), 0);
        assert!(channel.is_open());
        assert!(channel.transport().written(StreamId::PRIMARY).is_empty());
    }

    #[test]
    fn test_write_failure_closes_and_reports() {
        let mut transport = ScriptedTransport::new();
        transport.script_write(Progress::Failed("peer reset".into()));
        let mut channel = shell_channel(transport);

        let err = channel.write(b"data").unwrap_err();
        assert!(matches!(err, ChannelError::Write(_)));
        assert!(!channel.is_open());
    }

    #[test]
    fn test_write_at_eof_closes_channel() {
        let mut transport = ScriptedTransport::new();
        transport.set_eof(true);
        let mut channel = shell_channel(transport);

        assert_eq!(channel.write(b"late").unwrap(), 4);
        assert_eq!(channel.stage(), ChannelStage::Closed);
    }

    #[test]
    fn test_stream_lanes_route_independently() {
        let mut channel = shell_channel(ScriptedTransport::new());
        channel
            .transport_mut()
            .script_read(StreamId::EXTENDED, Progress::Complete(b"warning".to_vec()));

        channel.set_read_stream(StreamId::EXTENDED);
        channel.set_write_stream(StreamId::EXTENDED);

        let mut buf = [0u8; 16];
        assert_eq!(channel.read(&mut buf).unwrap(), 7);
        assert_eq!(&buf[..7], b"warning");

        channel.write(b"ack").unwrap();
        assert_eq!(channel.transport().written(StreamId::EXTENDED), b"ack");
        assert!(channel.transport().written(StreamId::PRIMARY).is_empty());
    }

    #[test]
    fn test_direct_tcp_channel_reads_like_any_other() {
        let mut transport = ScriptedTransport::new();
        transport.script_read(StreamId::PRIMARY, Progress::Complete(b"SSH-2.0".to_vec()));
        let mut channel = Channel::new(transport);
        channel
            .open_direct_tcp(TcpTarget::new("example.com", 22))
            .unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(channel.read(&mut buf).unwrap(), 7);
        assert_eq!(&buf[..7], b"SSH-2.0");
    }

    #[test]
    fn test_is_sequential() {
        let channel = Channel::new(ScriptedTransport::new());
        assert!(channel.is_sequential());
    }
}
