//! # Events
//!
//! This crate defines Switchyard's unit of asynchronous work and the
//! queues that hold it.
//!
//! ## Philosophy
//!
//! - **Messages, not shared memory**: Endpoints interact only by posting
//!   events onto each other's queues.
//! - **Closed dispatch**: The event sum type is matched exhaustively;
//!   adding a kind breaks every dispatch site at compile time instead of
//!   falling into an assert-false default arm.
//! - **Specials are a class, not an exception**: The exit and
//!   connect-notify control events live in the reserved `System` priority
//!   class, so a keep-specials drain is uniform priority filtering.

pub mod event;
pub mod queue;

pub use event::{ConnectNotifyEvent, Event, EventKind, RequestEvent, ResponseEvent};
pub use queue::{
    ExternalEventQueue, InternalEventQueue, NullListener, QueueListener, QueueSignal,
};
