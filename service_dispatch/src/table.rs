//! Message classification tables
//!
//! The code-generated marshaling layer supplies, per service interface, a
//! mapping from message id to its classification and, for requests, the
//! paired response id. The dispatch protocol treats this mapping as an
//! opaque lookup table; it is built once per endpoint instance and never
//! shared process-globally.

use core_types::MessageId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification of one message id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageClass {
    /// An inbound call; `response_id` is `None` for fire-and-forget
    Request { response_id: Option<MessageId> },
    /// An outbound answer to a request
    Response,
    /// A subscribable attribute with validity state
    Attribute,
    /// An unsolicited outbound push
    Broadcast,
}

/// Per-interface message id classification
#[derive(Debug, Clone, Default)]
pub struct MessageTable {
    classes: HashMap<MessageId, MessageClass>,
}

impl MessageTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a request id paired with its response id
    pub fn with_request(mut self, id: MessageId, response_id: MessageId) -> Self {
        self.classes.insert(
            id,
            MessageClass::Request {
                response_id: Some(response_id),
            },
        );
        self.classes.insert(response_id, MessageClass::Response);
        self
    }

    /// Registers a fire-and-forget request id
    pub fn with_fire_and_forget(mut self, id: MessageId) -> Self {
        self.classes
            .insert(id, MessageClass::Request { response_id: None });
        self
    }

    /// Registers an attribute id
    pub fn with_attribute(mut self, id: MessageId) -> Self {
        self.classes.insert(id, MessageClass::Attribute);
        self
    }

    /// Registers a broadcast id
    pub fn with_broadcast(mut self, id: MessageId) -> Self {
        self.classes.insert(id, MessageClass::Broadcast);
        self
    }

    /// Looks up the classification of a message id
    pub fn classify(&self, id: MessageId) -> Option<MessageClass> {
        self.classes.get(&id).copied()
    }

    /// Returns all attribute ids in the table
    pub fn attribute_ids(&self) -> Vec<MessageId> {
        self.classes
            .iter()
            .filter_map(|(id, class)| matches!(class, MessageClass::Attribute).then_some(*id))
            .collect()
    }

    /// Returns the number of classified ids
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
