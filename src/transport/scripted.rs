//! Scripted transport for driving channels without a live session.
//!
//! [`ScriptedTransport`] replays per-operation outcome queues so tests (and
//! downstream consumers prototyping against this crate) can simulate
//! would-block stalls, hard failures, short writes, and end-of-stream at
//! exact points in a channel's life. Operations with an empty queue take a
//! convenient default: setup calls succeed, reads report no data, writes
//! accept everything.

use std::collections::{HashMap, VecDeque};

use super::{Progress, StreamId, Transport};
use crate::channel::PtyRequest;

/// Opaque handle issued by [`ScriptedTransport`].
#[derive(Debug, PartialEq, Eq)]
pub struct ScriptedHandle {
    id: u32,
}

impl ScriptedHandle {
    /// Get the allocation ordinal of this handle.
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// One recorded call into the transport, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    /// `open_session_channel` was invoked.
    OpenSession,
    /// `request_pty` was invoked with the rendered spec.
    RequestPty(String),
    /// `exec_command` was invoked with the command line.
    Exec(String),
    /// `start_shell` was invoked.
    Shell,
    /// `open_direct_tcp` was invoked.
    OpenDirectTcp {
        /// Requested destination host.
        host: String,
        /// Requested destination port.
        port: u16,
    },
    /// `read_stream` was invoked on the given lane.
    Read(StreamId),
    /// `write_stream` was invoked on the given lane with this many bytes offered.
    Write {
        /// Target lane.
        stream: StreamId,
        /// Bytes offered by the caller.
        len: usize,
    },
    /// `send_eof` was invoked.
    SendEof,
    /// `close_handle` was invoked.
    CloseHandle,
}

/// Fully scriptable [`Transport`] test double.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    session_opens: VecDeque<Progress<()>>,
    pty_requests: VecDeque<Progress<()>>,
    execs: VecDeque<Progress<()>>,
    shells: VecDeque<Progress<()>>,
    tcp_opens: VecDeque<Progress<()>>,
    reads: HashMap<StreamId, VecDeque<Progress<Vec<u8>>>>,
    writes: VecDeque<Progress<usize>>,
    written: HashMap<StreamId, Vec<u8>>,
    eof: bool,
    calls: Vec<TransportCall>,
    next_handle: u32,
}

impl ScriptedTransport {
    /// Create a transport where every operation succeeds by default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next `open_session_channel` call.
    pub fn script_session_open(&mut self, outcome: Progress<()>) {
        self.session_opens.push_back(outcome);
    }

    /// Queue an outcome for the next `request_pty` call.
    pub fn script_pty(&mut self, outcome: Progress<()>) {
        self.pty_requests.push_back(outcome);
    }

    /// Queue an outcome for the next `exec_command` call.
    pub fn script_exec(&mut self, outcome: Progress<()>) {
        self.execs.push_back(outcome);
    }

    /// Queue an outcome for the next `start_shell` call.
    pub fn script_shell(&mut self, outcome: Progress<()>) {
        self.shells.push_back(outcome);
    }

    /// Queue an outcome for the next `open_direct_tcp` call.
    pub fn script_direct_tcp(&mut self, outcome: Progress<()>) {
        self.tcp_opens.push_back(outcome);
    }

    /// Queue a read outcome for one lane. `Complete` data longer than the
    /// caller's buffer is delivered across consecutive reads.
    pub fn script_read(&mut self, stream: StreamId, outcome: Progress<Vec<u8>>) {
        self.reads.entry(stream).or_default().push_back(outcome);
    }

    /// Queue a write outcome; `Complete(n)` caps how many bytes the next
    /// write accepts.
    pub fn script_write(&mut self, outcome: Progress<usize>) {
        self.writes.push_back(outcome);
    }

    /// Set the end-of-stream flag reported by `is_eof`.
    pub fn set_eof(&mut self, eof: bool) {
        self.eof = eof;
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> &[TransportCall] {
        &self.calls
    }

    /// Bytes accepted on one lane across all writes.
    pub fn written(&self, stream: StreamId) -> &[u8] {
        self.written.get(&stream).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn allocate_handle(&mut self) -> ScriptedHandle {
        self.next_handle += 1;
        ScriptedHandle {
            id: self.next_handle,
        }
    }
}

impl Transport for ScriptedTransport {
    type Handle = ScriptedHandle;

    fn open_session_channel(&mut self) -> Progress<Self::Handle> {
        self.calls.push(TransportCall::OpenSession);
        match self.session_opens.pop_front() {
            None | Some(Progress::Complete(())) => Progress::Complete(self.allocate_handle()),
            Some(Progress::WouldBlock) => Progress::WouldBlock,
            Some(Progress::Failed(e)) => Progress::Failed(e),
        }
    }

    fn request_pty(&mut self, _handle: &mut Self::Handle, spec: &PtyRequest) -> Progress<()> {
        self.calls.push(TransportCall::RequestPty(spec.to_string()));
        self.pty_requests
            .pop_front()
            .unwrap_or(Progress::Complete(()))
    }

    fn exec_command(&mut self, _handle: &mut Self::Handle, command: &str) -> Progress<()> {
        self.calls.push(TransportCall::Exec(command.to_string()));
        self.execs.pop_front().unwrap_or(Progress::Complete(()))
    }

    fn start_shell(&mut self, _handle: &mut Self::Handle) -> Progress<()> {
        self.calls.push(TransportCall::Shell);
        self.shells.pop_front().unwrap_or(Progress::Complete(()))
    }

    fn open_direct_tcp(&mut self, host: &str, port: u16) -> Progress<Self::Handle> {
        self.calls.push(TransportCall::OpenDirectTcp {
            host: host.to_string(),
            port,
        });
        match self.tcp_opens.pop_front() {
            None | Some(Progress::Complete(())) => Progress::Complete(self.allocate_handle()),
            Some(Progress::WouldBlock) => Progress::WouldBlock,
            Some(Progress::Failed(e)) => Progress::Failed(e),
        }
    }

    fn read_stream(
        &mut self,
        _handle: &mut Self::Handle,
        stream: StreamId,
        buf: &mut [u8],
    ) -> Progress<usize> {
        self.calls.push(TransportCall::Read(stream));
        let queue = self.reads.entry(stream).or_default();
        match queue.pop_front() {
            None | Some(Progress::WouldBlock) => Progress::WouldBlock,
            Some(Progress::Failed(e)) => Progress::Failed(e),
            Some(Progress::Complete(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    // Undelivered tail goes back to the head of the queue.
                    queue.push_front(Progress::Complete(data[n..].to_vec()));
                }
                Progress::Complete(n)
            }
        }
    }

    fn write_stream(
        &mut self,
        _handle: &mut Self::Handle,
        stream: StreamId,
        buf: &[u8],
    ) -> Progress<usize> {
        self.calls.push(TransportCall::Write {
            stream,
            len: buf.len(),
        });
        let accepted = match self.writes.pop_front() {
            None => buf.len(),
            Some(Progress::Complete(cap)) => cap.min(buf.len()),
            Some(Progress::WouldBlock) => return Progress::WouldBlock,
            Some(Progress::Failed(e)) => return Progress::Failed(e),
        };
        self.written
            .entry(stream)
            .or_default()
            .extend_from_slice(&buf[..accepted]);
        Progress::Complete(accepted)
    }

    fn is_eof(&self, _handle: &Self::Handle) -> bool {
        self.eof
    }

    fn send_eof(&mut self, _handle: &mut Self::Handle) {
        self.calls.push(TransportCall::SendEof);
    }

    fn close_handle(&mut self, _handle: &mut Self::Handle) {
        self.calls.push(TransportCall::CloseHandle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_open_succeeds() {
        let mut t = ScriptedTransport::new();
        let first = t.open_session_channel();
        let second = t.open_session_channel();

        match (first, second) {
            (Progress::Complete(a), Progress::Complete(b)) => {
                assert_ne!(a.id(), b.id(), "handles should be distinct");
            }
            other => panic!("expected two handles, got {:?}", other),
        }
    }

    #[test]
    fn test_scripted_outcomes_pop_in_order() {
        let mut t = ScriptedTransport::new();
        t.script_session_open(Progress::WouldBlock);
        t.script_session_open(Progress::Complete(()));

        assert!(t.open_session_channel().is_would_block());
        assert!(matches!(t.open_session_channel(), Progress::Complete(_)));
    }

    #[test]
    fn test_read_default_is_no_data() {
        let mut t = ScriptedTransport::new();
        let mut h = match t.open_session_channel() {
            Progress::Complete(h) => h,
            other => panic!("unexpected {:?}", other),
        };

        let mut buf = [0u8; 8];
        assert!(t.read_stream(&mut h, StreamId::PRIMARY, &mut buf).is_would_block());
    }

    #[test]
    fn test_read_splits_across_short_buffers() {
        let mut t = ScriptedTransport::new();
        let mut h = match t.open_session_channel() {
            Progress::Complete(h) => h,
            other => panic!("unexpected {:?}", other),
        };
        t.script_read(StreamId::PRIMARY, Progress::Complete(b"abcdef".to_vec()));

        let mut buf = [0u8; 4];
        assert_eq!(
            t.read_stream(&mut h, StreamId::PRIMARY, &mut buf),
            Progress::Complete(4)
        );
        assert_eq!(&buf, b"abcd");

        assert_eq!(
            t.read_stream(&mut h, StreamId::PRIMARY, &mut buf),
            Progress::Complete(2)
        );
        assert_eq!(&buf[..2], b"ef");
    }

    #[test]
    fn test_read_lanes_are_independent() {
        let mut t = ScriptedTransport::new();
        let mut h = match t.open_session_channel() {
            Progress::Complete(h) => h,
            other => panic!("unexpected {:?}", other),
        };
        t.script_read(StreamId::EXTENDED, Progress::Complete(b"warn".to_vec()));

        let mut buf = [0u8; 8];
        assert!(t.read_stream(&mut h, StreamId::PRIMARY, &mut buf).is_would_block());
        assert_eq!(
            t.read_stream(&mut h, StreamId::EXTENDED, &mut buf),
            Progress::Complete(4)
        );
    }

    #[test]
    fn test_write_cap_and_recording() {
        let mut t = ScriptedTransport::new();
        let mut h = match t.open_session_channel() {
            Progress::Complete(h) => h,
            other => panic!("unexpected {:?}", other),
        };
        t.script_write(Progress::Complete(3));

        assert_eq!(
            t.write_stream(&mut h, StreamId::PRIMARY, b"hello"),
            Progress::Complete(3)
        );
        // Default accepts the rest in full.
        assert_eq!(
            t.write_stream(&mut h, StreamId::PRIMARY, b"lo"),
            Progress::Complete(2)
        );
        assert_eq!(t.written(StreamId::PRIMARY), b"hello");
    }

    #[test]
    fn test_calls_are_recorded_with_payloads() {
        let mut t = ScriptedTransport::new();
        let mut h = match t.open_session_channel() {
            Progress::Complete(h) => h,
            other => panic!("unexpected {:?}", other),
        };
        t.exec_command(&mut h, "uname -a");
        t.send_eof(&mut h);
        t.close_handle(&mut h);

        assert_eq!(
            t.calls(),
            &[
                TransportCall::OpenSession,
                TransportCall::Exec("uname -a".into()),
                TransportCall::SendEof,
                TransportCall::CloseHandle,
            ]
        );
    }

    #[test]
    fn test_eof_flag() {
        let mut t = ScriptedTransport::new();
        let h = match t.open_session_channel() {
            Progress::Complete(h) => h,
            other => panic!("unexpected {:?}", other),
        };

        assert!(!t.is_eof(&h));
        t.set_eof(true);
        assert!(t.is_eof(&h));
    }
}
