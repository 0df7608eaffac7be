//! Channel activation state machine.
//!
//! A [`Channel`] wraps a non-blocking [`Transport`] and walks it from
//! `Closed` to open for I/O. Every transport request can complete, block,
//! or fail; when one blocks, the channel parks in a pending stage and the
//! owner re-enters the machine with [`Channel::on_readiness_event`] once
//! the underlying connection becomes readable or writable again.
//!
//! Setup steps requested before the session channel exists are queued as
//! directives and submitted in request order as soon as the session is
//! ready. Progress is reported through [`ChannelEvent`]s drained with
//! [`Channel::poll_event`].

use tracing::{debug, warn};

use crate::config::ChannelConfig;
use crate::error::{ChannelError, Result};
use crate::transport::{Progress, StreamId, Transport};

use super::directive::{DirectiveQueue, SetupDirective};
use super::event::{ChannelEvent, EventQueue};
use super::pty::PtyRequest;
use super::stage::ChannelStage;
use super::target::TcpTarget;

/// Outcome of one pass through the activation machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// A transport request is waiting on the peer; re-enter on the next
    /// readiness event.
    Blocked,
    /// Nothing is in flight and nothing is queued.
    Idle,
    /// The channel is open for I/O.
    Active,
}

/// A client-side channel multiplexed over a non-blocking transport.
///
/// One `Channel` drives one remote channel: a session channel carrying an
/// exec'd command or an interactive shell, or a direct-tcp stream. The
/// channel owns its transport handle from open to close.
pub struct Channel<T: Transport> {
    pub(super) transport: T,
    pub(super) config: ChannelConfig,
    pub(super) stage: ChannelStage,
    pub(super) handle: Option<T::Handle>,
    pub(super) pending: DirectiveQueue,
    pub(super) command: Option<String>,
    pub(super) pty: Option<PtyRequest>,
    pub(super) target: Option<TcpTarget>,
    pub(super) read_stream: StreamId,
    pub(super) write_stream: StreamId,
    pub(super) events: EventQueue,
    pub(super) closed: bool,
}

impl<T: Transport> Channel<T> {
    /// Create a closed channel over the given transport.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ChannelConfig::default())
    }

    /// Create a closed channel with explicit behavior configuration.
    pub fn with_config(transport: T, config: ChannelConfig) -> Self {
        Self {
            events: EventQueue::new(config.coalesce_data_ready),
            transport,
            config,
            stage: ChannelStage::Closed,
            handle: None,
            pending: DirectiveQueue::default(),
            command: None,
            pty: None,
            target: None,
            read_stream: StreamId::PRIMARY,
            write_stream: StreamId::PRIMARY,
            closed: false,
        }
    }

    /// Current lifecycle stage.
    pub fn stage(&self) -> ChannelStage {
        self.stage
    }

    /// Check whether the channel is open for reads and writes.
    pub fn is_open(&self) -> bool {
        self.stage.is_open_for_io()
    }

    /// Command recorded for an exec launch, if any.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Pty parameters recorded for this channel, if any.
    pub fn pty_request(&self) -> Option<&PtyRequest> {
        self.pty.as_ref()
    }

    /// Direct-tcp destination recorded for this channel, if any.
    pub fn target(&self) -> Option<&TcpTarget> {
        self.target.as_ref()
    }

    /// Transport handle backing this channel, once one is allocated.
    pub fn handle(&self) -> Option<&T::Handle> {
        self.handle.as_ref()
    }

    /// Shared access to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exclusive access to the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the channel and reclaim its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Drain the next queued event, oldest first.
    pub fn poll_event(&mut self) -> Option<ChannelEvent> {
        self.events.pop()
    }

    /// Begin opening a session channel.
    ///
    /// Does nothing unless the channel is fresh. The channel lands in
    /// `SessionReady` if the transport completes immediately, or parks in
    /// `OpeningSession` until the next readiness event.
    pub fn open_session(&mut self) -> Result<()> {
        if self.closed || self.stage != ChannelStage::Closed {
            return Ok(());
        }
        debug!("opening session channel");
        self.stage = ChannelStage::OpeningSession;
        self.activate()?;
        Ok(())
    }

    /// Begin opening a direct-tcp channel to `target`.
    ///
    /// Does nothing unless the channel is fresh. Direct-tcp channels
    /// take no setup directives; once open they go straight to
    /// streaming.
    pub fn open_direct_tcp(&mut self, target: TcpTarget) -> Result<()> {
        if self.closed || self.stage != ChannelStage::Closed {
            return Ok(());
        }
        debug!(%target, "opening direct-tcp channel");
        self.target = Some(target);
        self.stage = ChannelStage::DirectTcpOpening;
        self.activate()?;
        Ok(())
    }

    /// Ask for a pseudo-terminal before the launch step.
    ///
    /// Runs immediately when the session is ready and nothing else is
    /// queued, otherwise queues behind whatever setup is still underway.
    /// Ignored once the channel has launched or closed. The parameters
    /// are recorded at most once; repeat requests are dropped whole.
    pub fn request_pty(&mut self, spec: PtyRequest) -> Result<()> {
        if self.closed || !self.stage.accepts_setup_directives() {
            return Ok(());
        }
        // The recorded spec is also the dispatch latch: a repeat must
        // not resubmit an allocation already queued or in flight.
        if self.pty.is_some() {
            return Ok(());
        }
        self.pty = Some(spec);
        if self.stage == ChannelStage::SessionReady && self.pending.is_empty() {
            self.stage = ChannelStage::PtyPending;
            self.activate()?;
        } else if self.pending.push(SetupDirective::RequestPty) {
            debug!("pty request queued");
        }
        Ok(())
    }

    /// Launch a single command on the session channel.
    ///
    /// Runs immediately when the session is ready and nothing else is
    /// queued, otherwise queues in request order. Ignored once the
    /// channel has launched or closed. The command line is recorded at
    /// most once; repeat requests are dropped whole.
    pub fn start_command(&mut self, command: impl Into<String>) -> Result<()> {
        if self.closed || !self.stage.accepts_setup_directives() {
            return Ok(());
        }
        if self.command.is_some() {
            return Ok(());
        }
        self.command = Some(command.into());
        if self.stage == ChannelStage::SessionReady && self.pending.is_empty() {
            self.stage = ChannelStage::ExecPending;
            self.activate()?;
        } else if self.pending.push(SetupDirective::Exec) {
            debug!("exec directive queued");
        }
        Ok(())
    }

    /// Launch an interactive shell on the session channel.
    ///
    /// Runs immediately when the session is ready and nothing else is
    /// queued, otherwise queues in request order. Ignored once the
    /// channel has launched or closed.
    pub fn start_shell(&mut self) -> Result<()> {
        if self.closed || !self.stage.accepts_setup_directives() {
            return Ok(());
        }
        if self.stage == ChannelStage::SessionReady && self.pending.is_empty() {
            self.stage = ChannelStage::ShellPending;
            self.activate()?;
        } else if self.pending.push(SetupDirective::Shell) {
            debug!("shell directive queued");
        }
        Ok(())
    }

    /// Re-enter the activation machine after the transport became ready.
    ///
    /// Call this whenever the underlying connection reports readable or
    /// writable. Harmless on idle, open, and closed channels; while the
    /// channel is open each call queues a [`ChannelEvent::DataReady`].
    pub fn on_readiness_event(&mut self) -> Result<Activation> {
        if self.closed {
            return Ok(Activation::Idle);
        }
        self.activate()
    }

    /// Close the channel.
    ///
    /// Sends EOF and a close request only if the channel actually opened
    /// for I/O; a close during setup just abandons the attempt. The
    /// transport handle is released either way, queued directives and
    /// undelivered events are dropped, and the channel stays closed for
    /// good. Closing twice is harmless.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if self.stage.is_open_for_io() {
                self.transport.send_eof(&mut handle);
                self.transport.close_handle(&mut handle);
            }
            debug!(stage = ?self.stage, "channel closed");
        }
        if !self.pending.is_empty() {
            debug!("dropping queued setup directives");
        }
        self.stage = ChannelStage::Closed;
        self.closed = true;
        self.pending.clear();
        self.events.clear();
    }

    /// Drive the state machine until it blocks, settles, or runs out of
    /// budget. Each completed transport request advances the stage and
    /// the loop takes another step, so one readiness event can carry the
    /// channel through several setup stages at once.
    fn activate(&mut self) -> Result<Activation> {
        for _ in 0..self.config.step_budget {
            match self.stage {
                ChannelStage::Closed => return Ok(Activation::Idle),

                ChannelStage::OpeningSession => match self.transport.open_session_channel() {
                    Progress::Complete(handle) => {
                        debug!("session channel opened");
                        self.handle = Some(handle);
                        self.stage = ChannelStage::SessionReady;
                    }
                    Progress::WouldBlock => return Ok(Activation::Blocked),
                    Progress::Failed(e) => return Err(ChannelError::SessionOpen(e)),
                },

                ChannelStage::SessionReady => match self.pending.pop() {
                    Some(directive) => {
                        self.stage = directive.pending_stage();
                    }
                    None => return Ok(Activation::Idle),
                },

                ChannelStage::PtyPending => {
                    let Some(handle) = self.handle.as_mut() else {
                        return Err(ChannelError::PtyAllocation("no session handle".to_string()));
                    };
                    let Some(pty) = self.pty.as_ref() else {
                        return Err(ChannelError::PtyAllocation("no pty spec recorded".to_string()));
                    };
                    match self.transport.request_pty(handle, pty) {
                        Progress::Complete(()) => {
                            debug!(spec = %pty, "pty allocated");
                            self.stage = ChannelStage::SessionReady;
                        }
                        Progress::WouldBlock => return Ok(Activation::Blocked),
                        Progress::Failed(e) => {
                            warn!("pty allocation failed: {e}");
                            return Err(ChannelError::PtyAllocation(e));
                        }
                    }
                }

                ChannelStage::ExecPending => {
                    let Some(handle) = self.handle.as_mut() else {
                        return Err(ChannelError::Exec("no session handle".to_string()));
                    };
                    let Some(command) = self.command.as_deref() else {
                        return Err(ChannelError::Exec("no command recorded".to_string()));
                    };
                    match self.transport.exec_command(handle, command) {
                        Progress::Complete(()) => {
                            debug!(command, "exec started");
                            self.pending.clear();
                            self.stage = ChannelStage::ExecActive;
                            self.events.push(ChannelEvent::Connected);
                            return Ok(Activation::Active);
                        }
                        Progress::WouldBlock => return Ok(Activation::Blocked),
                        Progress::Failed(e) => return Err(ChannelError::Exec(e)),
                    }
                }

                ChannelStage::ShellPending => {
                    let Some(handle) = self.handle.as_mut() else {
                        return Err(ChannelError::Shell("no session handle".to_string()));
                    };
                    match self.transport.start_shell(handle) {
                        Progress::Complete(()) => {
                            debug!("shell started");
                            self.pending.clear();
                            self.stage = ChannelStage::Streaming;
                            self.events.push(ChannelEvent::Connected);
                            return Ok(Activation::Active);
                        }
                        Progress::WouldBlock => return Ok(Activation::Blocked),
                        Progress::Failed(e) => return Err(ChannelError::Shell(e)),
                    }
                }

                ChannelStage::DirectTcpOpening => {
                    let Some(target) = self.target.as_ref() else {
                        return Err(ChannelError::DirectTcp("no target recorded".to_string()));
                    };
                    match self.transport.open_direct_tcp(&target.host, target.port) {
                        Progress::Complete(handle) => {
                            debug!(%target, "direct-tcp channel opened");
                            self.handle = Some(handle);
                            // Falls through to the streaming stage so the
                            // first data-ready fires on this same pass.
                            self.stage = ChannelStage::Streaming;
                        }
                        Progress::WouldBlock => return Ok(Activation::Blocked),
                        Progress::Failed(e) => return Err(ChannelError::DirectTcp(e)),
                    }
                }

                ChannelStage::ExecActive | ChannelStage::Streaming => {
                    self.events.push(ChannelEvent::DataReady);
                    return Ok(Activation::Active);
                }
            }
        }

        warn!(budget = self.config.step_budget, "activation step budget exhausted");
        Ok(Activation::Blocked)
    }
}
