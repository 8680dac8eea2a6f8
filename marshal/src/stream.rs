//! Event data streams
//!
//! An [`EventDataStream`] is the serialized argument list of one call: a
//! named, typed pairing of a byte buffer with an independent read cursor
//! and write cursor. The marshaling mode records whether the payload may
//! be shared by reference (same process) or must be deep-copied when it
//! crosses a process boundary.

use crate::buffer::{RawBuffer, SharedBuffer};
use crate::convert::{ReadConverter, WriteConverter};
use crate::cursor::CursorPosition;
use crate::error::MarshalError;
use serde::{Deserialize, Serialize};

/// How a stream's payload crosses an ownership boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarshalMode {
    /// Same-process delivery; the buffer may be shared by reference
    Internal,
    /// Cross-process delivery; the buffer must be copied into the wire envelope
    External,
}

/// Payload storage of a stream
///
/// Exclusive storage is writable; shared storage is frozen. Once a stream
/// has handed its buffer to a second owner, writes are refused at this
/// seam instead of silently corrupting the other owner's view.
#[derive(Debug)]
enum StreamBuffer {
    Exclusive(RawBuffer),
    Shared(SharedBuffer),
}

impl Default for StreamBuffer {
    fn default() -> Self {
        StreamBuffer::Exclusive(RawBuffer::new())
    }
}

/// Serialized argument list of one call
#[derive(Debug)]
pub struct EventDataStream {
    name: Option<String>,
    mode: MarshalMode,
    buffer: StreamBuffer,
    read_cursor: CursorPosition,
    write_cursor: CursorPosition,
}

impl Default for EventDataStream {
    fn default() -> Self {
        Self::new(MarshalMode::Internal)
    }
}

impl EventDataStream {
    /// Creates an empty stream
    pub fn new(mode: MarshalMode) -> Self {
        Self {
            name: None,
            mode,
            buffer: StreamBuffer::default(),
            read_cursor: CursorPosition::new(),
            write_cursor: CursorPosition::new(),
        }
    }

    /// Creates an empty named stream
    pub fn named(name: impl Into<String>, mode: MarshalMode) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(mode)
        }
    }

    /// Creates a stream holding a copy of `payload`
    pub fn with_payload(mode: MarshalMode, payload: &[u8]) -> Result<Self, MarshalError> {
        let buffer = RawBuffer::from_slice(payload)?;
        Ok(Self {
            buffer: StreamBuffer::Exclusive(buffer),
            ..Self::new(mode)
        })
    }

    /// Returns the stream name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the marshaling mode
    pub fn mode(&self) -> MarshalMode {
        self.mode
    }

    /// Returns the number of payload bytes in use
    pub fn used_len(&self) -> usize {
        match &self.buffer {
            StreamBuffer::Exclusive(raw) => raw.used_len(),
            StreamBuffer::Shared(shared) => shared.used_len(),
        }
    }

    /// Returns the used payload as a slice
    pub fn payload(&self) -> &[u8] {
        match &self.buffer {
            StreamBuffer::Exclusive(raw) => raw.as_slice(),
            StreamBuffer::Shared(shared) => shared.as_slice(),
        }
    }

    /// Returns the number of owners of the underlying buffer
    pub fn buffer_ref_count(&self) -> usize {
        match &self.buffer {
            StreamBuffer::Exclusive(_) => 1,
            StreamBuffer::Shared(shared) => shared.ref_count(),
        }
    }

    /// Returns the read cursor position
    pub fn read_offset(&self) -> usize {
        self.read_cursor.offset()
    }

    /// Returns the write cursor position
    pub fn write_offset(&self) -> usize {
        self.write_cursor.offset()
    }

    /// Resets both cursors to the start
    pub fn reset_cursors(&mut self) {
        self.read_cursor.reset();
        self.write_cursor.reset();
    }

    /// Returns a write converter positioned at the write cursor
    ///
    /// Refused once the buffer has been shared.
    pub fn writer(&mut self) -> Result<WriteConverter<'_>, MarshalError> {
        match &mut self.buffer {
            StreamBuffer::Exclusive(raw) => {
                Ok(WriteConverter::new(raw, &mut self.write_cursor))
            }
            StreamBuffer::Shared(_) => Err(MarshalError::BufferShared),
        }
    }

    /// Returns a read converter positioned at the read cursor
    pub fn reader(&mut self) -> ReadConverter<'_> {
        let data = match &self.buffer {
            StreamBuffer::Exclusive(raw) => raw.as_slice(),
            StreamBuffer::Shared(shared) => shared.as_slice(),
        };
        ReadConverter::new(data, &mut self.read_cursor)
    }

    /// Duplicates this stream according to its marshaling mode
    ///
    /// Internal mode shares the buffer by reference, freezing it; external
    /// mode deep-copies the payload. The copy's cursors start at the
    /// beginning; cursor positions are never copied.
    pub fn duplicate(&mut self) -> EventDataStream {
        let buffer = match self.mode() {
            MarshalMode::Internal => StreamBuffer::Shared(self.freeze()),
            MarshalMode::External => StreamBuffer::Exclusive(match &self.buffer {
                StreamBuffer::Exclusive(raw) => raw.clone(),
                StreamBuffer::Shared(shared) => shared.to_raw(),
            }),
        };
        EventDataStream {
            name: self.name.clone(),
            mode: self.mode,
            buffer,
            read_cursor: CursorPosition::new(),
            write_cursor: CursorPosition::new(),
        }
    }

    /// Freezes the buffer in place and returns a shared handle to it
    fn freeze(&mut self) -> SharedBuffer {
        let shared = match std::mem::take(&mut self.buffer) {
            StreamBuffer::Exclusive(raw) => SharedBuffer::from(raw),
            StreamBuffer::Shared(shared) => shared,
        };
        self.buffer = StreamBuffer::Shared(shared.clone());
        shared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream_with(mode: MarshalMode, payload: &[u8]) -> EventDataStream {
        EventDataStream::with_payload(mode, payload).unwrap()
    }

    #[test]
    fn test_new_stream_is_empty() {
        let stream = EventDataStream::new(MarshalMode::Internal);
        assert_eq!(stream.used_len(), 0);
        assert_eq!(stream.buffer_ref_count(), 1);
        assert!(stream.name().is_none());
    }

    #[test]
    fn test_named_stream() {
        let stream = EventDataStream::named("setVolume", MarshalMode::External);
        assert_eq!(stream.name(), Some("setVolume"));
        assert_eq!(stream.mode(), MarshalMode::External);
    }

    #[test]
    fn test_write_then_read() {
        let mut stream = EventDataStream::new(MarshalMode::Internal);
        stream.writer().unwrap().write_u32(99).unwrap();
        assert_eq!(stream.write_offset(), 4);

        assert_eq!(stream.reader().read_u32(), Some(99));
        assert_eq!(stream.read_offset(), 4);
    }

    #[test]
    fn test_cursors_are_independent() {
        let mut stream = EventDataStream::new(MarshalMode::Internal);
        stream.writer().unwrap().write_u16(1).unwrap();
        stream.writer().unwrap().write_u16(2).unwrap();
        assert_eq!(stream.write_offset(), 4);

        // Reading does not move the write cursor.
        assert_eq!(stream.reader().read_u16(), Some(1));
        assert_eq!(stream.read_offset(), 2);
        assert_eq!(stream.write_offset(), 4);
    }

    #[test]
    fn test_internal_duplicate_shares_buffer() {
        let mut stream = stream_with(MarshalMode::Internal, b"args");
        let copy = stream.duplicate();

        assert_eq!(stream.buffer_ref_count(), 2);
        assert_eq!(copy.buffer_ref_count(), 2);
        assert_eq!(copy.payload(), b"args");
    }

    #[test]
    fn test_external_duplicate_copies_buffer() {
        let mut stream = stream_with(MarshalMode::External, b"args");
        let copy = stream.duplicate();

        assert_eq!(stream.buffer_ref_count(), 1);
        assert_eq!(copy.buffer_ref_count(), 1);
        assert_eq!(copy.payload(), b"args");
    }

    #[test]
    fn test_duplicate_resets_copy_cursors() {
        let mut stream = stream_with(MarshalMode::Internal, b"abcd");
        stream.reader().read_u16();
        assert_eq!(stream.read_offset(), 2);

        let copy = stream.duplicate();
        assert_eq!(copy.read_offset(), 0);
        assert_eq!(copy.write_offset(), 0);
    }

    #[test]
    fn test_shared_stream_refuses_writes() {
        let mut stream = stream_with(MarshalMode::Internal, b"abcd");
        let _copy = stream.duplicate();

        match stream.writer() {
            Err(MarshalError::BufferShared) => {}
            other => panic!("Expected BufferShared, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_external_stream_stays_writable_after_duplicate() {
        let mut stream = stream_with(MarshalMode::External, b"abcd");
        let _copy = stream.duplicate();
        stream.writer().unwrap().write_u8(9).unwrap();
    }

    #[test]
    fn test_reading_shared_stream_still_works() {
        let mut stream = stream_with(MarshalMode::Internal, b"xy");
        let mut copy = stream.duplicate();
        assert_eq!(copy.reader().read_u8(), Some(b'x'));
        assert_eq!(stream.reader().read_u8(), Some(b'x'));
    }
}
