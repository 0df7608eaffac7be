//! Error types for ssh-conduit.

use thiserror::Error;

/// Main error type for channel operations.
///
/// Transport-level failures are resolved into one of these categories at
/// the channel boundary; raw transport error codes never escape. Each
/// variant carries the transport's rendered description where one exists.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// A read or write was attempted before the channel was open.
    #[error("channel not open for I/O in stage {0:?}")]
    NotOpen(crate::channel::ChannelStage),

    /// Session-channel allocation failed.
    #[error("session channel open failed: {0}")]
    SessionOpen(String),

    /// Pseudo-terminal allocation failed.
    #[error("pty allocation failed: {0}")]
    PtyAllocation(String),

    /// Command execution request failed.
    #[error("exec request failed: {0}")]
    Exec(String),

    /// Shell start request failed.
    #[error("shell request failed: {0}")]
    Shell(String),

    /// Direct TCP channel allocation failed.
    #[error("direct-tcp open failed: {0}")]
    DirectTcp(String),

    /// Unrecoverable read fault; the channel has been closed.
    #[error("channel read failed: {0}")]
    Read(String),

    /// Unrecoverable write fault; the channel has been closed.
    #[error("channel write failed: {0}")]
    Write(String),

    /// A pty spec string could not be parsed.
    #[error("pty spec parse error: {0}")]
    PtySpec(String),
}

/// Convenience Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelStage;

    #[test]
    fn test_not_open_display() {
        let err = ChannelError::NotOpen(ChannelStage::SessionReady);
        assert!(err.to_string().contains("not open"));
        assert!(err.to_string().contains("SessionReady"));
    }

    #[test]
    fn test_session_open_display() {
        let err = ChannelError::SessionOpen("server refused".into());
        assert!(err.to_string().contains("session channel open failed"));
        assert!(err.to_string().contains("server refused"));
    }

    #[test]
    fn test_pty_allocation_display() {
        let err = ChannelError::PtyAllocation("no pty available".into());
        assert!(err.to_string().contains("pty allocation failed"));
        assert!(err.to_string().contains("no pty available"));
    }

    #[test]
    fn test_read_write_display() {
        let read = ChannelError::Read("connection reset".into());
        assert!(read.to_string().contains("read failed"));

        let write = ChannelError::Write("connection reset".into());
        assert!(write.to_string().contains("write failed"));
    }

    #[test]
    fn test_pty_spec_display() {
        let err = ChannelError::PtySpec("xterm,80".into());
        assert!(err.to_string().contains("pty spec parse error"));
        assert!(err.to_string().contains("xterm,80"));
    }
}
