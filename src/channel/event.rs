//! Channel event delivery.

use std::collections::VecDeque;

/// Notification produced while a channel activates and streams.
///
/// Events accumulate inside the channel and are drained by the owner
/// through [`Channel::poll_event`](super::Channel::poll_event).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The launch step finished and the channel is open for I/O.
    ///
    /// Emitted at most once per channel, for exec and shell launches only.
    /// Direct-tcp channels skip straight to `DataReady`.
    Connected,
    /// Stream data may be available to read.
    DataReady,
}

/// Owner-polled FIFO of channel events.
#[derive(Debug, Default)]
pub(crate) struct EventQueue {
    entries: VecDeque<ChannelEvent>,
    coalesce_data_ready: bool,
}

impl EventQueue {
    pub(crate) fn new(coalesce_data_ready: bool) -> Self {
        Self {
            entries: VecDeque::new(),
            coalesce_data_ready,
        }
    }

    /// Append an event, optionally folding it into an adjacent
    /// `DataReady` already at the tail.
    pub(crate) fn push(&mut self, event: ChannelEvent) {
        if self.coalesce_data_ready
            && event == ChannelEvent::DataReady
            && self.entries.back() == Some(&ChannelEvent::DataReady)
        {
            return;
        }
        self.entries.push_back(event);
    }

    pub(crate) fn pop(&mut self) -> Option<ChannelEvent> {
        self.entries.pop_front()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
