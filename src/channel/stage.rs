//! Channel lifecycle stages.

/// Position of a channel in its activation lifecycle.
///
/// A channel begins `Closed`, walks through one or more pending stages as
/// transport requests complete, and ends up open for I/O in `ExecActive`
/// or `Streaming`. Closing returns it to `Closed` for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelStage {
    /// No transport handle is held. Initial stage, and terminal after close.
    #[default]
    Closed,
    /// Waiting for the transport to open a session channel.
    OpeningSession,
    /// Session channel is open; setup directives can now run.
    SessionReady,
    /// Waiting for a pty allocation to complete.
    PtyPending,
    /// Waiting for a command execution request to complete.
    ExecPending,
    /// Waiting for an interactive shell request to complete.
    ShellPending,
    /// Waiting for a direct-tcp channel to open.
    DirectTcpOpening,
    /// A command is running and the channel is open for I/O.
    ExecActive,
    /// A shell or direct-tcp stream is up and the channel is open for I/O.
    Streaming,
}

impl ChannelStage {
    /// Check whether setup directives (pty, exec, shell) can still be
    /// queued in this stage and take effect later.
    pub fn accepts_setup_directives(&self) -> bool {
        use ChannelStage::*;
        matches!(
            self,
            OpeningSession | SessionReady | PtyPending | ExecPending | ShellPending
        )
    }

    /// Check whether the channel carries live stream data in this stage.
    pub fn is_open_for_io(&self) -> bool {
        matches!(self, ChannelStage::ExecActive | ChannelStage::Streaming)
    }

    /// Check whether a transport request is in flight for this stage.
    pub fn is_pending(&self) -> bool {
        use ChannelStage::*;
        matches!(
            self,
            OpeningSession | PtyPending | ExecPending | ShellPending | DirectTcpOpening
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_setup_directives() {
        assert!(!ChannelStage::Closed.accepts_setup_directives());
        assert!(ChannelStage::OpeningSession.accepts_setup_directives());
        assert!(ChannelStage::SessionReady.accepts_setup_directives());
        assert!(ChannelStage::PtyPending.accepts_setup_directives());
        assert!(ChannelStage::ExecPending.accepts_setup_directives());
        assert!(ChannelStage::ShellPending.accepts_setup_directives());
        assert!(!ChannelStage::DirectTcpOpening.accepts_setup_directives());
        assert!(!ChannelStage::ExecActive.accepts_setup_directives());
        assert!(!ChannelStage::Streaming.accepts_setup_directives());
    }

    #[test]
    fn test_is_open_for_io() {
        assert!(ChannelStage::ExecActive.is_open_for_io());
        assert!(ChannelStage::Streaming.is_open_for_io());
        assert!(!ChannelStage::Closed.is_open_for_io());
        assert!(!ChannelStage::SessionReady.is_open_for_io());
        assert!(!ChannelStage::DirectTcpOpening.is_open_for_io());
    }

    #[test]
    fn test_is_pending() {
        assert!(ChannelStage::OpeningSession.is_pending());
        assert!(ChannelStage::PtyPending.is_pending());
        assert!(ChannelStage::ExecPending.is_pending());
        assert!(ChannelStage::ShellPending.is_pending());
        assert!(ChannelStage::DirectTcpOpening.is_pending());
        assert!(!ChannelStage::Closed.is_pending());
        assert!(!ChannelStage::SessionReady.is_pending());
        assert!(!ChannelStage::ExecActive.is_pending());
        assert!(!ChannelStage::Streaming.is_pending());
    }

    #[test]
    fn test_default_is_closed() {
        assert_eq!(ChannelStage::default(), ChannelStage::Closed);
    }
}
