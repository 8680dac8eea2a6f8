//! # Core Types
//!
//! This crate defines the fundamental types used throughout Switchyard.
//!
//! ## Philosophy
//!
//! Core types are designed with these principles:
//! - **Explicit over implicit**: Addresses and ids are typed and cannot be confused.
//! - **Type safety first**: The type system prevents misuse at compile time.
//! - **Closed id spaces**: Message ids are generated, never invented at runtime.
//!
//! ## Key Types
//!
//! - [`ProxyAddress`]: Unique identifier for a calling proxy
//! - [`EndpointAddress`]: Unique identifier for a service endpoint
//! - [`MessageId`]: Identifier within a generated interface id space
//! - [`ResultCode`]: Outcome code carried on every response
//! - [`EventPriority`]: Priority class of a queued event

pub mod ids;
pub mod message;
pub mod priority;

pub use ids::{EndpointAddress, ProxyAddress};
pub use message::{MessageId, ResultCode};
pub use priority::EventPriority;
