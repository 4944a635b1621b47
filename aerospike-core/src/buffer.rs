//! Bounds-checked big-endian reader over a borrowed byte range.

use crate::error::{AerospikeError, Result};
use bytes::Buf;
use std::io::Cursor;

/// Trait for reading primitive values from the wire format.
///
/// All multi-byte values are read in big-endian byte order.
pub trait DataInput {
    /// Reads an unsigned byte.
    fn read_u8(&mut self) -> Result<u8>;

    /// Reads a boolean from a single byte.
    fn read_bool(&mut self) -> Result<bool>;

    /// Reads a 16-bit unsigned integer.
    fn read_u16(&mut self) -> Result<u16>;

    /// Reads a 32-bit unsigned integer.
    fn read_u32(&mut self) -> Result<u32>;

    /// Reads a 64-bit signed integer.
    fn read_i64(&mut self) -> Result<i64>;

    /// Reads a 64-bit unsigned integer.
    fn read_u64(&mut self) -> Result<u64>;

    /// Reads a 32-bit IEEE-754 float.
    fn read_f32(&mut self) -> Result<f32>;

    /// Reads a 64-bit IEEE-754 float.
    fn read_f64(&mut self) -> Result<f64>;

    /// Reads `len` raw bytes into an owned vector.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>>;

    /// Reads `len` bytes as UTF-8 text. There is no length prefix.
    fn read_utf8(&mut self, len: usize) -> Result<String>;
}

/// A cursor-based implementation of [`DataInput`].
#[derive(Debug)]
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader over the whole slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// Creates a reader over `data[offset..offset + length]`.
    pub fn with_range(data: &'a [u8], offset: usize, length: usize) -> Result<Self> {
        let end = offset.checked_add(length).filter(|end| *end <= data.len());
        match end {
            Some(end) => Ok(Self::new(&data[offset..end])),
            None => Err(AerospikeError::Serialization(format!(
                "range {}+{} exceeds buffer of {} bytes",
                offset,
                length,
                data.len()
            ))),
        }
    }

    /// Returns the number of bytes remaining to be read.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Returns the current position in the range.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Advances past `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure_remaining(n)?;
        self.cursor.advance(n);
        Ok(())
    }

    /// Borrows the next `len` bytes without copying.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        self.ensure_remaining(len)?;
        let start = self.cursor.position() as usize;
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.advance(len);
        Ok(&data[start..start + len])
    }

    /// Borrows everything that is left.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let len = self.remaining();
        let start = self.cursor.position() as usize;
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.advance(len);
        &data[start..]
    }

    fn ensure_remaining(&self, n: usize) -> Result<()> {
        if self.cursor.remaining() < n {
            Err(AerospikeError::Serialization(format!(
                "insufficient data: need {} bytes, have {}",
                n,
                self.cursor.remaining()
            )))
        } else {
            Ok(())
        }
    }
}

impl DataInput for ByteReader<'_> {
    fn read_u8(&mut self) -> Result<u8> {
        self.ensure_remaining(1)?;
        Ok(self.cursor.get_u8())
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.ensure_remaining(1)?;
        Ok(self.cursor.get_u8() != 0)
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.ensure_remaining(2)?;
        Ok(self.cursor.get_u16())
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.ensure_remaining(4)?;
        Ok(self.cursor.get_u32())
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.ensure_remaining(8)?;
        Ok(self.cursor.get_i64())
    }

    fn read_u64(&mut self) -> Result<u64> {
        self.ensure_remaining(8)?;
        Ok(self.cursor.get_u64())
    }

    fn read_f32(&mut self) -> Result<f32> {
        self.ensure_remaining(4)?;
        Ok(self.cursor.get_f32())
    }

    fn read_f64(&mut self) -> Result<f64> {
        self.ensure_remaining(8)?;
        Ok(self.cursor.get_f64())
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.read_slice(len)?.to_vec())
    }

    fn read_utf8(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_slice(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| AerospikeError::Serialization(format!("invalid UTF-8 string: {}", e)))
    }
}
