//! Read and write converters for primitive values
//!
//! Converters are stateless borrows of a buffer and a cursor: every
//! successful operation advances the cursor by the bytes consumed or
//! produced. All fixed-width values are little-endian on the wire.
//!
//! Reads never fail loudly on truncated data. A fixed-width read returns
//! `None` and leaves the cursor unchanged; a string read reports whatever
//! was actually present before the terminator or the end of the buffer.
//! The caller decides whether a short read is fatal to the enclosing call.

use crate::buffer::RawBuffer;
use crate::cursor::CursorPosition;
use crate::error::BufferError;

/// Serializes primitive values at a stream's write cursor
pub struct WriteConverter<'a> {
    buffer: &'a mut RawBuffer,
    cursor: &'a mut CursorPosition,
}

impl<'a> WriteConverter<'a> {
    /// Creates a converter writing at `cursor`
    pub fn new(buffer: &'a mut RawBuffer, cursor: &'a mut CursorPosition) -> Self {
        Self { buffer, cursor }
    }

    /// Appends raw bytes at the write cursor, growing storage as needed
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, BufferError> {
        let written = self.buffer.write_at(self.cursor.offset(), bytes)?;
        self.cursor.advance(written);
        Ok(written)
    }

    pub fn write_u8(&mut self, value: u8) -> Result<usize, BufferError> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<usize, BufferError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<usize, BufferError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<usize, BufferError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<usize, BufferError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<usize, BufferError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<usize, BufferError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<usize, BufferError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<usize, BufferError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<usize, BufferError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<usize, BufferError> {
        self.write_u8(u8::from(value))
    }

    /// Writes a byte string followed by a NUL terminator
    pub fn write_str(&mut self, value: &str) -> Result<usize, BufferError> {
        let written = self.write_bytes(value.as_bytes())?;
        Ok(written + self.write_u8(0)?)
    }

    /// Writes a wide (u16-unit) string followed by a NUL terminator
    pub fn write_wide_str(&mut self, value: &str) -> Result<usize, BufferError> {
        let mut written = 0;
        for unit in value.encode_utf16() {
            written += self.write_u16(unit)?;
        }
        Ok(written + self.write_u16(0)?)
    }
}

/// Deserializes primitive values at a stream's read cursor
pub struct ReadConverter<'a> {
    data: &'a [u8],
    cursor: &'a mut CursorPosition,
}

impl<'a> ReadConverter<'a> {
    /// Creates a converter reading the used content of a buffer at `cursor`
    pub fn new(data: &'a [u8], cursor: &'a mut CursorPosition) -> Self {
        Self { data, cursor }
    }

    /// Returns the number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.cursor.offset())
    }

    /// Reads exactly `len` bytes, or returns `None` with the cursor unchanged
    pub fn read_bytes(&mut self, len: usize) -> Option<&'a [u8]> {
        let start = self.cursor.offset();
        let end = start.checked_add(len)?;
        if end > self.data.len() {
            return None;
        }
        self.cursor.advance(len);
        Some(&self.data[start..end])
    }

    /// Copies bytes into `out`, returning how many were copied
    ///
    /// Returns 0 with the cursor unchanged when fewer than `out.len()`
    /// bytes remain.
    pub fn read_exact(&mut self, out: &mut [u8]) -> usize {
        match self.read_bytes(out.len()) {
            Some(bytes) => {
                out.copy_from_slice(bytes);
                out.len()
            }
            None => 0,
        }
    }

    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Some(array)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|b| b[0])
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_i8(&mut self) -> Option<i8> {
        self.read_array().map(i8::from_le_bytes)
    }

    pub fn read_i16(&mut self) -> Option<i16> {
        self.read_array().map(i16::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> Option<i64> {
        self.read_array().map(i64::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Option<f32> {
        self.read_array().map(f32::from_le_bytes)
    }

    pub fn read_f64(&mut self) -> Option<f64> {
        self.read_array().map(f64::from_le_bytes)
    }

    pub fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|b| b != 0)
    }

    /// Reads byte units until a NUL terminator or the end of the buffer
    ///
    /// The terminator is consumed when present. Truncated input yields
    /// whatever was read; invalid UTF-8 is replaced.
    pub fn read_str(&mut self) -> String {
        let mut bytes = Vec::new();
        while let Some(byte) = self.read_u8() {
            if byte == 0 {
                break;
            }
            bytes.push(byte);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Reads u16 units until a NUL terminator or the end of the buffer
    ///
    /// A trailing partial unit is left unread.
    pub fn read_wide_str(&mut self) -> String {
        let mut units = Vec::new();
        while let Some(unit) = self.read_u16() {
            if unit == 0 {
                break;
            }
            units.push(unit);
        }
        String::from_utf16_lossy(&units)
    }
}
