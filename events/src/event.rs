//! Event types
//!
//! An event is the unit of asynchronous work: a closed sum of the kinds a
//! dispatch loop can encounter, matched exhaustively at every dispatch
//! site. Request and response events carry the serialized call arguments
//! as an [`EventDataStream`]; the exit and connect-notify control events
//! always travel in the reserved `System` priority class.

use core_types::{EndpointAddress, EventPriority, MessageId, ProxyAddress, ResultCode};
use marshal::EventDataStream;
use serde::{Deserialize, Serialize};

/// Tag identifying an event's kind
///
/// Used for kind-targeted queue removal; dispatch itself matches the
/// [`Event`] sum directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Request,
    Response,
    ConnectNotify,
    Exit,
}

/// A service call on its way to an endpoint
#[derive(Debug)]
pub struct RequestEvent {
    /// Destination endpoint
    pub target: EndpointAddress,
    /// Message id within the interface's generated id space
    pub message_id: MessageId,
    /// Originating proxy
    pub source: ProxyAddress,
    /// Per-call sequence number allocated by the source proxy
    pub sequence_nr: u32,
    /// Priority class
    pub priority: EventPriority,
    /// Serialized call arguments
    pub data: EventDataStream,
}

impl RequestEvent {
    /// Creates a normal-priority request event
    pub fn new(
        target: EndpointAddress,
        message_id: MessageId,
        source: ProxyAddress,
        sequence_nr: u32,
        data: EventDataStream,
    ) -> Self {
        Self {
            target,
            message_id,
            source,
            sequence_nr,
            priority: EventPriority::Normal,
            data,
        }
    }

    /// Sets the priority class
    ///
    /// `System` is reserved for control events; requests are capped at
    /// `Critical`.
    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority.min(EventPriority::Critical);
        self
    }
}

/// A correlated answer on its way back to a proxy
#[derive(Debug)]
pub struct ResponseEvent {
    /// Destination proxy
    pub target: ProxyAddress,
    /// Response id within the interface's generated id space
    pub response_id: MessageId,
    /// Outcome of the call
    pub result: ResultCode,
    /// Sequence number of the call being answered
    pub sequence_nr: u32,
    /// Priority class
    pub priority: EventPriority,
    /// Serialized response payload
    pub data: EventDataStream,
}

impl ResponseEvent {
    /// Creates a normal-priority response event
    pub fn new(
        target: ProxyAddress,
        response_id: MessageId,
        result: ResultCode,
        sequence_nr: u32,
        data: EventDataStream,
    ) -> Self {
        Self {
            target,
            response_id,
            result,
            sequence_nr,
            priority: EventPriority::Normal,
            data,
        }
    }

    /// Sets the priority class, capped at `Critical`
    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority.min(EventPriority::Critical);
        self
    }
}

/// Notification that a proxy's connection state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectNotifyEvent {
    /// Proxy to notify
    pub target: ProxyAddress,
    /// Whether the connection is now up
    pub connected: bool,
}

/// The unit of asynchronous work
#[derive(Debug)]
pub enum Event {
    /// A service call for an endpoint
    Request(RequestEvent),
    /// A correlated answer for a proxy
    Response(ResponseEvent),
    /// Connection state change; survives a keep-specials queue drain
    ConnectNotify(ConnectNotifyEvent),
    /// Stops the owning dispatch loop; survives a keep-specials queue drain
    Exit,
}

impl Event {
    /// Returns the kind tag
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Request(_) => EventKind::Request,
            Event::Response(_) => EventKind::Response,
            Event::ConnectNotify(_) => EventKind::ConnectNotify,
            Event::Exit => EventKind::Exit,
        }
    }

    /// Returns the priority class
    pub fn priority(&self) -> EventPriority {
        match self {
            Event::Request(request) => request.priority,
            Event::Response(response) => response.priority,
            Event::ConnectNotify(_) | Event::Exit => EventPriority::System,
        }
    }
}
