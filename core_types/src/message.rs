//! Message identifiers and result codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a message within a service interface
///
/// Message ids come from a closed, generated id space. Each id is
/// classified by the interface's message table as a request, response,
/// attribute, or broadcast; the classification never changes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(u32);

impl MessageId {
    /// Creates a message id from its generated value
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id value
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Msg({})", self.0)
    }
}

/// Result code carried on every response event
///
/// All recoverable failures are resolved at the endpoint and surfaced as
/// one of these codes; nothing recoverable crosses the queue boundary as
/// an unwound panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    /// Call completed
    Ok,
    /// The call was superseded by a newer request from the same caller
    RequestCanceled,
    /// The handler could not complete the call
    RequestError,
    /// The requested value cannot currently be produced
    DataInvalid,
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Ok => write!(f, "ok"),
            ResultCode::RequestCanceled => write!(f, "request canceled"),
            ResultCode::RequestError => write!(f, "request error"),
            ResultCode::DataInvalid => write!(f, "data invalid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_value() {
        let id = MessageId::new(42);
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn test_message_id_equality() {
        assert_eq!(MessageId::new(7), MessageId::new(7));
        assert_ne!(MessageId::new(7), MessageId::new(8));
    }

    #[test]
    fn test_message_id_display() {
        assert_eq!(format!("{}", MessageId::new(3)), "Msg(3)");
    }

    #[test]
    fn test_result_code_display() {
        assert_eq!(format!("{}", ResultCode::Ok), "ok");
        assert_eq!(format!("{}", ResultCode::RequestCanceled), "request canceled");
    }
}
