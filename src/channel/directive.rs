//! Deferred setup directives.

use std::collections::VecDeque;

use super::ChannelStage;

/// A setup step the consumer has requested but the channel has not yet
/// submitted to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetupDirective {
    /// Allocate a pseudo-terminal before launching.
    RequestPty,
    /// Launch a single command on the session channel.
    Exec,
    /// Launch an interactive shell on the session channel.
    Shell,
}

impl SetupDirective {
    /// Stage the channel sits in while the transport request for this
    /// directive is in flight.
    pub(crate) fn pending_stage(&self) -> ChannelStage {
        match self {
            SetupDirective::RequestPty => ChannelStage::PtyPending,
            SetupDirective::Exec => ChannelStage::ExecPending,
            SetupDirective::Shell => ChannelStage::ShellPending,
        }
    }
}

/// Directives awaiting submission, in first-request order.
///
/// Holds at most one entry per directive kind; repeat requests while one
/// is already queued are dropped.
#[derive(Debug, Default)]
pub(crate) struct DirectiveQueue {
    entries: VecDeque<SetupDirective>,
}

impl DirectiveQueue {
    /// Queue a directive. Returns `false` if the same kind is already
    /// waiting.
    pub(crate) fn push(&mut self, directive: SetupDirective) -> bool {
        if self.entries.contains(&directive) {
            return false;
        }
        self.entries.push_back(directive);
        true
    }

    /// Remove and return the oldest waiting directive.
    pub(crate) fn pop(&mut self) -> Option<SetupDirective> {
        self.entries.pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything still waiting.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
