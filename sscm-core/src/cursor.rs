//! Bounds-checked forward reader over an in-memory byte buffer.
//!
//! All SSCM decoding goes through [`Cursor`]: every primitive read checks the
//! remaining length first and fails with [`DecodeError::TruncatedData`]
//! instead of reading past the end. The position only advances on success.

use crate::decoder::DecodeError;
use byteorder::ByteOrder;

/// A forward-only reader over a borrowed byte slice.
///
/// After a failed read the position is unspecified; callers are expected to
/// abort decoding, not retry.
#[derive(Debug)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at position 0.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte position from the start of the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns the unread tail of the buffer without advancing.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Returns the next `n` bytes without advancing, or `None` if fewer
    /// than `n` remain.
    #[inline]
    pub fn peek(&self, n: usize) -> Option<&'a [u8]> {
        self.buf.get(self.pos..self.pos + n)
    }

    /// Takes `n` bytes, advancing the position.
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(DecodeError::TruncatedData {
                offset: self.pos,
                needed: n - remaining,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.take(n)
    }

    /// Advances past `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.take(n).map(|_| ())
    }

    /// Moves to an absolute position within the buffer.
    pub fn seek(&mut self, pos: usize) -> Result<(), DecodeError> {
        if pos > self.buf.len() {
            return Err(DecodeError::TruncatedData {
                offset: self.buf.len(),
                needed: pos - self.buf.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.take(1).map(|b| b[0])
    }

    pub fn read_u16<B: ByteOrder>(&mut self) -> Result<u16, DecodeError> {
        self.take(2).map(B::read_u16)
    }

    pub fn read_u32<B: ByteOrder>(&mut self) -> Result<u32, DecodeError> {
        self.take(4).map(B::read_u32)
    }

    pub fn read_i32<B: ByteOrder>(&mut self) -> Result<i32, DecodeError> {
        self.take(4).map(B::read_i32)
    }

    pub fn read_i64<B: ByteOrder>(&mut self) -> Result<i64, DecodeError> {
        self.take(8).map(B::read_i64)
    }

    pub fn read_f32<B: ByteOrder>(&mut self) -> Result<f32, DecodeError> {
        self.take(4).map(B::read_f32)
    }

    pub fn read_f64<B: ByteOrder>(&mut self) -> Result<f64, DecodeError> {
        self.take(8).map(B::read_f64)
    }

    /// Reads `n` bytes and decodes them as ASCII text.
    ///
    /// The firmware only ever writes ASCII; any byte above 0x7F is a
    /// structural error, not a charset to be guessed.
    pub fn read_str(&mut self, n: usize) -> Result<&'a str, DecodeError> {
        let offset = self.pos;
        let bytes = self.take(n)?;
        match std::str::from_utf8(bytes) {
            Ok(s) if s.is_ascii() => Ok(s),
            _ => Err(DecodeError::MalformedRecord(format!(
                "text field at offset {offset} is not ASCII"
            ))),
        }
    }

    /// Reads a u8 length field followed by that many bytes of text.
    pub fn read_len_prefixed_str(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u8()? as usize;
        self.read_str(len).map(str::to_owned)
    }
}
