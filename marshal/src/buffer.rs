//! Reference-counted byte buffers
//!
//! Two ownership flavors carry serialized call parameters across thread
//! and process boundaries:
//!
//! - [`RawBuffer`]: exclusively owned and writable. Copy-on-construct,
//!   never shared.
//! - [`SharedBuffer`]: a frozen, reference-counted view. Multiple owners
//!   point at one allocation without copying; the type system keeps the
//!   content read-only while shared.

use crate::error::BufferError;
use std::sync::Arc;

/// Allocation granularity; `reserve` rounds capacities up to this block size.
pub const BLOCK_SIZE: usize = 512;

/// Hard upper bound on a single buffer allocation.
pub const MAX_BUF_LENGTH: usize = 16 * 1024 * 1024;

/// Exclusively owned, resizable binary block
///
/// Tracks a used length and an allocated length with the invariant
/// `used_len <= allocated_len <= MAX_BUF_LENGTH`. Equality is content
/// equality over the used length, never identity.
#[derive(Debug, Clone, Default)]
pub struct RawBuffer {
    data: Vec<u8>,
    used_len: usize,
}

impl RawBuffer {
    /// Creates an empty buffer with no storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer pre-reserved to hold `size` bytes
    pub fn with_capacity(size: usize) -> Result<Self, BufferError> {
        let mut buffer = Self::new();
        buffer.reserve(size, false)?;
        Ok(buffer)
    }

    /// Creates a buffer holding a copy of `bytes`
    pub fn from_slice(bytes: &[u8]) -> Result<Self, BufferError> {
        let mut buffer = Self::new();
        buffer.write_at(0, bytes)?;
        Ok(buffer)
    }

    /// Grows or shrinks the allocated storage
    ///
    /// The capacity is rounded up to [`BLOCK_SIZE`] alignment. `size == 0`
    /// releases all storage and invalidates the buffer. With `copy` unset
    /// the current content is discarded; otherwise content up to the new
    /// capacity is kept. Returns the new allocated length.
    pub fn reserve(&mut self, size: usize, copy: bool) -> Result<usize, BufferError> {
        if size == 0 {
            self.data = Vec::new();
            self.used_len = 0;
            return Ok(0);
        }

        if size > MAX_BUF_LENGTH {
            return Err(BufferError::TooLarge {
                requested: size,
                limit: MAX_BUF_LENGTH,
            });
        }
        let aligned = size.div_ceil(BLOCK_SIZE) * BLOCK_SIZE;

        self.data.resize(aligned, 0);
        if copy {
            self.used_len = self.used_len.min(aligned);
        } else {
            self.used_len = 0;
        }
        Ok(aligned)
    }

    /// Returns the number of bytes in use
    pub fn used_len(&self) -> usize {
        self.used_len
    }

    /// Returns the allocated length
    pub fn allocated_len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the buffer holds any storage
    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    /// Returns whether no bytes are in use
    pub fn is_empty(&self) -> bool {
        self.used_len == 0
    }

    /// Returns the used content as a slice
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.used_len]
    }

    /// Writes `bytes` at `offset`, growing storage as needed
    ///
    /// Extends the used length when the write reaches past it. Returns the
    /// number of bytes written.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<usize, BufferError> {
        let end = offset + bytes.len();
        if end > self.data.len() {
            self.reserve(end, true)?;
        }
        self.data[offset..end].copy_from_slice(bytes);
        self.used_len = self.used_len.max(end);
        Ok(bytes.len())
    }

    /// Reads `len` bytes starting at `offset`
    ///
    /// Returns `None` when fewer than `len` bytes of used content remain.
    pub fn read_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        if end > self.used_len {
            return None;
        }
        Some(&self.data[offset..end])
    }
}

impl PartialEq for RawBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for RawBuffer {}

/// Reference-counted, read-only view of a frozen buffer
///
/// Constructed by freezing a [`RawBuffer`]; cloning bumps the reference
/// count instead of copying. Growing a buffer that has more than one owner
/// is refused so a second owner's view can never be corrupted by the
/// first owner's subsequent growth.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<RawBuffer>,
}

impl SharedBuffer {
    /// Returns the number of owners of this allocation
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Grows or shrinks the storage, if this is the sole owner
    ///
    /// With more than one owner the call is a no-op that returns the
    /// current allocated length unchanged.
    pub fn reserve(&mut self, size: usize, copy: bool) -> Result<usize, BufferError> {
        match Arc::get_mut(&mut self.inner) {
            Some(raw) => raw.reserve(size, copy),
            None => Ok(self.inner.allocated_len()),
        }
    }

    /// Returns the number of bytes in use
    pub fn used_len(&self) -> usize {
        self.inner.used_len()
    }

    /// Returns the allocated length
    pub fn allocated_len(&self) -> usize {
        self.inner.allocated_len()
    }

    /// Returns whether the buffer holds any storage
    pub fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    /// Returns the used content as a slice
    pub fn as_slice(&self) -> &[u8] {
        self.inner.as_slice()
    }

    /// Reads `len` bytes starting at `offset`
    pub fn read_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.inner.read_at(offset, len)
    }

    /// Returns an exclusively owned deep copy of the content
    pub fn to_raw(&self) -> RawBuffer {
        (*self.inner).clone()
    }
}

impl From<RawBuffer> for SharedBuffer {
    fn from(raw: RawBuffer) -> Self {
        Self {
            inner: Arc::new(raw),
        }
    }
}

impl PartialEq for SharedBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for SharedBuffer {}
