//! Ordering and drain contracts of the event queues
