//! # Marshal
//!
//! This crate defines Switchyard's serialization primitives: the byte
//! buffers, cursors, and converters that carry call parameters across
//! thread and process boundaries.
//!
//! ## Philosophy
//!
//! - **Ownership in the types**: A buffer is either exclusively owned and
//!   writable, or shared and read-only. There is no "check before resize"
//!   discipline for call sites to forget.
//! - **Truncation is data, not disaster**: Short reads report what was
//!   actually there; the caller decides whether that is fatal.
//! - **Position is explicit**: Every read and write goes through a cursor;
//!   the read side and the write side of one stream never interfere.

pub mod buffer;
pub mod convert;
pub mod cursor;
pub mod error;
pub mod stream;

pub use buffer::{RawBuffer, SharedBuffer, BLOCK_SIZE, MAX_BUF_LENGTH};
pub use convert::{ReadConverter, WriteConverter};
pub use cursor::{CursorPosition, SeekOrigin};
pub use error::{BufferError, MarshalError};
pub use stream::{EventDataStream, MarshalMode};
