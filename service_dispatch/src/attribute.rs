//! Attribute validity state

use core_types::MessageId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Validity of one attribute's value
///
/// `Unavailable` is the only legal initial state. An attribute moves to
/// `Ok` when a valid value is published and to `Invalid` when its value
/// cannot be produced; it never returns to `Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeState {
    /// No value has ever been published
    Unavailable,
    /// The last published value is valid
    Ok,
    /// The value is currently not producible
    Invalid,
}

/// Per-endpoint attribute state table
#[derive(Debug, Default)]
pub struct AttributeStates {
    states: HashMap<MessageId, AttributeState>,
}

impl AttributeStates {
    /// Creates a table with every id in `Unavailable`
    pub fn new(attribute_ids: impl IntoIterator<Item = MessageId>) -> Self {
        Self {
            states: attribute_ids
                .into_iter()
                .map(|id| (id, AttributeState::Unavailable))
                .collect(),
        }
    }

    /// Returns the state of an attribute
    pub fn state(&self, id: MessageId) -> Option<AttributeState> {
        self.states.get(&id).copied()
    }

    /// Marks an attribute's value as valid
    ///
    /// Returns whether the id is known.
    pub fn mark_ok(&mut self, id: MessageId) -> bool {
        match self.states.get_mut(&id) {
            Some(state) => {
                *state = AttributeState::Ok;
                true
            }
            None => false,
        }
    }

    /// Latches an attribute `Invalid` until the next successful publish
    ///
    /// Returns whether the id is known.
    pub fn mark_invalid(&mut self, id: MessageId) -> bool {
        match self.states.get_mut(&id) {
            Some(state) => {
                *state = AttributeState::Invalid;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_unavailable() {
        let states = AttributeStates::new([MessageId::new(1)]);
        assert_eq!(states.state(MessageId::new(1)), Some(AttributeState::Unavailable));
        assert_eq!(states.state(MessageId::new(2)), None);
    }

    #[test]
    fn test_ok_and_invalid_transitions() {
        let mut states = AttributeStates::new([MessageId::new(1)]);

        assert!(states.mark_ok(MessageId::new(1)));
        assert_eq!(states.state(MessageId::new(1)), Some(AttributeState::Ok));

        assert!(states.mark_invalid(MessageId::new(1)));
        assert_eq!(states.state(MessageId::new(1)), Some(AttributeState::Invalid));

        // Recovers once a value is published again.
        assert!(states.mark_ok(MessageId::new(1)));
        assert_eq!(states.state(MessageId::new(1)), Some(AttributeState::Ok));
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let mut states = AttributeStates::new([]);
        assert!(!states.mark_ok(MessageId::new(1)));
        assert!(!states.mark_invalid(MessageId::new(1)));
    }
}
