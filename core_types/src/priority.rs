//! Event priority classes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority class of a queued event
///
/// Higher priority always preempts lower priority at dispatch; within one
/// class, FIFO order is preserved. `System` is reserved for the control
/// events (exit, connect-notify) that must survive a full-queue drain, so
/// the drain algorithm stays uniform instead of special-casing identity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EventPriority {
    /// Background work
    Low,
    /// Default for service calls
    Normal,
    /// Latency-sensitive calls
    High,
    /// Urgent control traffic (e.g. shutdown requests)
    Critical,
    /// Reserved for exit and connect-notify control events
    System,
}

impl fmt::Display for EventPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventPriority::Low => write!(f, "low"),
            EventPriority::Normal => write!(f, "normal"),
            EventPriority::High => write!(f, "high"),
            EventPriority::Critical => write!(f, "critical"),
            EventPriority::System => write!(f, "system"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(EventPriority::Low < EventPriority::Normal);
        assert!(EventPriority::Normal < EventPriority::High);
        assert!(EventPriority::High < EventPriority::Critical);
        assert!(EventPriority::Critical < EventPriority::System);
    }

    #[test]
    fn test_system_is_highest() {
        for priority in [
            EventPriority::Low,
            EventPriority::Normal,
            EventPriority::High,
            EventPriority::Critical,
        ] {
            assert!(priority < EventPriority::System);
        }
    }
}
