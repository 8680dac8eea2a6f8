//! Protocol diagnostics
//!
//! Tolerated anomalies are recorded instead of raised: duplicate
//! subscriptions, superseded calls, and late responses are all legal
//! traffic. The log is inspectable state, used by tests to verify
//! protocol behavior.

use core_types::{MessageId, ProxyAddress};
use serde::{Deserialize, Serialize};

/// One recorded protocol anomaly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolEvent {
    /// start-notify for an already-registered (id, source) pair
    DuplicateSubscription {
        message_id: MessageId,
        source: ProxyAddress,
    },
    /// A newer request replaced an older in-flight one
    SupersededRequest {
        response_id: MessageId,
        source: ProxyAddress,
        old_sequence_nr: u32,
        new_sequence_nr: u32,
    },
    /// An arriving request was older than the registered in-flight one
    StaleRequestRejected {
        response_id: MessageId,
        source: ProxyAddress,
        sequence_nr: u32,
    },
    /// Two requests carried the same sequence number; the later one won
    SameSequenceAnomaly {
        response_id: MessageId,
        source: ProxyAddress,
        sequence_nr: u32,
    },
    /// A queue-delivered event carried an id the table does not know
    UnrecognizedMessage { message_id: MessageId },
    /// An event reached an entry point its classification does not match
    MisroutedEvent { message_id: MessageId },
    /// A response arrived for a call no longer outstanding
    StaleResponseIgnored {
        response_id: MessageId,
        sequence_nr: u32,
    },
}
