//! Listener registry
//!
//! Tracks, per message id, which proxies are awaiting a response or
//! subscribed to an attribute. Uniqueness is keyed by (message id,
//! source); registering the same pair twice is a tolerated no-op, never a
//! duplicate entry.

use core_types::{MessageId, ProxyAddress};

/// One registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerEntry {
    /// Message id the listener is registered for
    pub message_id: MessageId,
    /// Sequence number of the listener's in-flight call
    pub sequence_nr: u32,
    /// The listening proxy
    pub source: ProxyAddress,
}

/// Registry of active listeners on one endpoint
///
/// Owned exclusively by the endpoint's dispatch thread; cross-thread
/// interaction happens by posting events, never by touching the registry
/// directly.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    entries: Vec<ListenerEntry>,
}

impl ListenerRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener for (message id, source)
    ///
    /// Returns false when the pair is already registered; the existing
    /// entry is left untouched.
    pub fn start_notify(
        &mut self,
        message_id: MessageId,
        source: ProxyAddress,
        sequence_nr: u32,
    ) -> bool {
        if self.contains(message_id, source) {
            return false;
        }
        self.entries.push(ListenerEntry {
            message_id,
            sequence_nr,
            source,
        });
        true
    }

    /// Removes the listener for (message id, source)
    ///
    /// Returns whether an entry was removed.
    pub fn stop_notify(&mut self, message_id: MessageId, source: ProxyAddress) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !(entry.message_id == message_id && entry.source == source));
        self.entries.len() != before
    }

    /// Removes every listener registered by `source`
    ///
    /// Returns the message ids actually removed, for side-table cleanup.
    pub fn remove_all(&mut self, source: ProxyAddress) -> Vec<MessageId> {
        let mut removed = Vec::new();
        self.entries.retain(|entry| {
            if entry.source == source {
                removed.push(entry.message_id);
                false
            } else {
                true
            }
        });
        removed
    }

    /// Returns whether (message id, source) is registered
    pub fn contains(&self, message_id: MessageId, source: ProxyAddress) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.message_id == message_id && entry.source == source)
    }

    /// Returns the sequence number registered for (message id, source)
    pub fn sequence_of(&self, message_id: MessageId, source: ProxyAddress) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.message_id == message_id && entry.source == source)
            .map(|entry| entry.sequence_nr)
    }

    /// Replaces the sequence number for an existing (message id, source) entry
    ///
    /// Returns whether the entry existed.
    pub fn set_sequence(
        &mut self,
        message_id: MessageId,
        source: ProxyAddress,
        sequence_nr: u32,
    ) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.message_id == message_id && entry.source == source)
        {
            Some(entry) => {
                entry.sequence_nr = sequence_nr;
                true
            }
            None => false,
        }
    }

    /// Returns the listeners registered for `message_id`, in registration order
    pub fn listeners(&self, message_id: MessageId) -> Vec<ListenerEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.message_id == message_id)
            .copied()
            .collect()
    }

    /// Returns the number of registered listeners
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no listeners are registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
