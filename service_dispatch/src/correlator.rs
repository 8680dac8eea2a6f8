//! Proxy-side response correlation
//!
//! Every response carries (response id, sequence number, result). The
//! correlator allocates the monotonically increasing sequence numbers a
//! proxy stamps on its calls and matches inbound responses back to the
//! outstanding call. Responses whose key is no longer recognized (already
//! satisfied, already canceled) are ignored harmlessly rather than
//! treated as errors.

use crate::diagnostics::ProtocolEvent;
use core_types::MessageId;
use events::ResponseEvent;
use std::collections::HashSet;

/// Outstanding-call table of one proxy
#[derive(Debug, Default)]
pub struct ResponseCorrelator {
    next_sequence_nr: u32,
    outstanding: HashSet<(MessageId, u32)>,
    completed: Vec<ResponseEvent>,
    diagnostics: Vec<ProtocolEvent>,
}

impl ResponseCorrelator {
    /// Creates an empty correlator
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next call sequence number
    pub fn next_sequence(&mut self) -> u32 {
        self.next_sequence_nr += 1;
        self.next_sequence_nr
    }

    /// Registers a new call and returns its sequence number
    pub fn register_call(&mut self, response_id: MessageId) -> u32 {
        let sequence_nr = self.next_sequence();
        self.outstanding.insert((response_id, sequence_nr));
        sequence_nr
    }

    /// Registers an already-numbered call
    pub fn expect(&mut self, response_id: MessageId, sequence_nr: u32) {
        self.outstanding.insert((response_id, sequence_nr));
    }

    /// Withdraws an outstanding call
    ///
    /// A response arriving afterwards is ignored. Returns whether the
    /// call was still outstanding.
    pub fn cancel_call(&mut self, response_id: MessageId, sequence_nr: u32) -> bool {
        self.outstanding.remove(&(response_id, sequence_nr))
    }

    /// Matches an inbound response against the outstanding calls
    ///
    /// A recognized response completes its call and is retained for the
    /// caller; a duplicate or late response is recorded and dropped.
    pub fn accept(&mut self, response: ResponseEvent) {
        let key = (response.response_id, response.sequence_nr);
        if self.outstanding.remove(&key) {
            self.completed.push(response);
        } else {
            self.diagnostics.push(ProtocolEvent::StaleResponseIgnored {
                response_id: response.response_id,
                sequence_nr: response.sequence_nr,
            });
        }
    }

    /// Drops every outstanding call, returning the abandoned keys
    ///
    /// Used when the connection to the remote endpoint is lost; the
    /// abandoned calls will never be answered.
    pub fn connection_lost(&mut self) -> Vec<(MessageId, u32)> {
        self.outstanding.drain().collect()
    }

    /// Returns the number of calls still awaiting a response
    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }

    /// Takes the completed responses accumulated so far
    pub fn take_completed(&mut self) -> Vec<ResponseEvent> {
        std::mem::take(&mut self.completed)
    }

    /// Returns the recorded diagnostics
    pub fn diagnostics(&self) -> &[ProtocolEvent] {
        &self.diagnostics
    }

    /// Clears the diagnostics log
    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }
}
