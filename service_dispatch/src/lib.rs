//! # Service Dispatch
//!
//! This crate implements the request/response/notification protocol a
//! service endpoint runs, and the correlation a proxy uses to match the
//! answers.
//!
//! ## Philosophy
//!
//! - **Single writer per registry**: Listener and attribute state belong
//!   to the endpoint's dispatch thread; other threads interact only by
//!   posting events.
//! - **Cancellation is an answer, not an interrupt**: A superseded caller
//!   receives a definite canceled result; a running handler is never
//!   aborted.
//! - **Recoverable failures are result codes**: Nothing recoverable
//!   crosses the queue boundary as a panic. Unknown ids in the closed,
//!   generated id space are build defects and fail loudly.
//!
//! ## Key Types
//!
//! - [`DispatchProtocol`]: The per-endpoint state machine
//! - [`MessageTable`]: Per-interface message id classification
//! - [`ListenerRegistry`]: Who is awaiting which message id
//! - [`ResponseCorrelator`]: Proxy-side sequence matching
//! - [`DispatchLoop`]: The per-thread event pump

pub mod attribute;
pub mod correlator;
pub mod diagnostics;
pub mod dispatch_loop;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod table;

pub use attribute::{AttributeState, AttributeStates};
pub use correlator::ResponseCorrelator;
pub use diagnostics::ProtocolEvent;
pub use dispatch_loop::{DispatchLoop, LoopStep};
pub use error::HandlerError;
pub use protocol::{
    Admission, DispatchProtocol, EndpointHandler, EventSink, START_NOTIFY_OP, STOP_NOTIFY_OP,
};
pub use registry::{ListenerEntry, ListenerRegistry};
pub use table::{MessageClass, MessageTable};
