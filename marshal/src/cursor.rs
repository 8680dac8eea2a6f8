//! Cursor positions for stream reads and writes

use serde::{Deserialize, Serialize};

/// Origin for a cursor seek
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeekOrigin {
    /// Seek from the start of the buffer
    Begin,
    /// Seek relative to the current position
    Current,
    /// Seek from the end of the used content
    End,
}

/// Offset into an owning buffer
///
/// A stream keeps one cursor for its read side and one for its write side;
/// the two advance independently. Every converter read or write moves the
/// matching cursor. Seeks clamp into `0..=limit`, where the limit is the
/// buffer's used length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorPosition {
    offset: usize,
}

impl CursorPosition {
    /// Creates a cursor at the start
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current offset
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Resets the cursor to the start
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Advances the cursor by `count` bytes
    pub fn advance(&mut self, count: usize) {
        self.offset += count;
    }

    /// Moves the cursor relative to `origin`, clamped into `0..=limit`
    ///
    /// Returns the new offset.
    pub fn seek(&mut self, origin: SeekOrigin, delta: i64, limit: usize) -> usize {
        let base = match origin {
            SeekOrigin::Begin => 0i64,
            SeekOrigin::Current => self.offset as i64,
            SeekOrigin::End => limit as i64,
        };
        let target = base.saturating_add(delta).clamp(0, limit as i64);
        self.offset = target as usize;
        self.offset
    }
}
