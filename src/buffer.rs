//! Append-only byte buffer with little-endian writers
//!
//! The buffer keeps a fixed-size backing region and a write cursor. Growth only
//! happens through [`ByteBuffer::ensure_remaining`], which reallocates to the
//! exact size requested instead of doubling: archives are built once and handed
//! off, so callers size whole batches up front rather than paying for slack.
//!
//! Every writer checks the remaining capacity and returns
//! [`ZipError::CapacityExceeded`] instead of writing out of bounds.

use crate::error::{Result, ZipError};

/// Growable byte region with a write cursor
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    index: usize,
}

impl ByteBuffer {
    /// Create a buffer with `initial_size` bytes of capacity
    pub fn new(initial_size: usize) -> Self {
        Self {
            data: vec![0; initial_size],
            index: 0,
        }
    }

    /// Guarantee that at least `size` more bytes can be written.
    ///
    /// When the current region is too small it is replaced by one of exactly
    /// `position() + size` bytes; only the bytes written so far are copied.
    /// A size that overflows `usize` or cannot be allocated fails with
    /// [`ZipError::CapacityExceeded`] and leaves the buffer untouched.
    pub fn ensure_remaining(&mut self, size: usize) -> Result<()> {
        let new_capacity = self
            .index
            .checked_add(size)
            .ok_or_else(|| self.overflow(size))?;
        if new_capacity > self.data.len() {
            tracing::debug!(
                from = self.data.len(),
                to = new_capacity,
                "reallocating archive buffer"
            );
            let mut grown = Vec::new();
            grown
                .try_reserve_exact(new_capacity)
                .map_err(|_| self.overflow(size))?;
            grown.extend_from_slice(&self.data[..self.index]);
            grown.resize(new_capacity, 0);
            self.data = grown;
        }
        Ok(())
    }

    /// Total size of the backing region
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Current write cursor (number of bytes written)
    pub fn position(&self) -> usize {
        self.index
    }

    /// Bytes that can still be written without growing
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    /// The bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.index]
    }

    /// Consume the buffer and return the written range `[0, position)`.
    ///
    /// No copy is made when the backing region is exactly the used length.
    pub fn into_bytes(self) -> Vec<u8> {
        if self.data.len() == self.index {
            return self.data;
        }
        self.data[..self.index].to_vec()
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.claim(1)?[0] = v;
        Ok(())
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.claim(2)?.copy_from_slice(&v.to_le_bytes());
        Ok(())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.claim(4)?.copy_from_slice(&v.to_le_bytes());
        Ok(())
    }

    /// Write a 64-bit value as two little-endian 32-bit halves, low half first.
    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        if self.remaining() < 8 {
            return Err(self.overflow(8));
        }
        self.write_u32(v as u32)?;
        self.write_u32((v >> 32) as u32)
    }

    /// Write each character's code point truncated to its low 8 bits.
    ///
    /// This is a Latin-1 transcription, not a Unicode encoder: characters above
    /// U+00FF lose their high bits. One byte is written per Unicode scalar
    /// value, including characters outside the Basic Multilingual Plane (a
    /// UTF-16 based writer would emit one byte per surrogate, i.e. two).
    pub fn write_text(&mut self, s: &str) -> Result<()> {
        let len = s.chars().count();
        let dst = self.claim(len)?;
        for (slot, ch) in dst.iter_mut().zip(s.chars()) {
            *slot = latin1_byte(ch);
        }
        Ok(())
    }

    /// Copy `bytes` verbatim
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.claim(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    fn claim(&mut self, len: usize) -> Result<&mut [u8]> {
        if self.remaining() < len {
            return Err(self.overflow(len));
        }
        let start = self.index;
        self.index += len;
        Ok(&mut self.data[start..self.index])
    }

    fn overflow(&self, requested: usize) -> ZipError {
        ZipError::CapacityExceeded {
            requested,
            remaining: self.remaining(),
        }
    }
}

/// Number of bytes [`ByteBuffer::write_text`] emits for `s`
pub fn latin1_len(s: &str) -> usize {
    s.chars().count()
}

/// Latin-1 transcription of `s`, identical to what [`ByteBuffer::write_text`] writes
pub fn latin1_bytes(s: &str) -> Vec<u8> {
    s.chars().map(latin1_byte).collect()
}

fn latin1_byte(ch: char) -> u8 {
    (u32::from(ch) & 0xFF) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_little_endian() {
        let mut buf = ByteBuffer::new(15);
        buf.write_u8(0xAB).unwrap();
        buf.write_u16(0x0102).unwrap();
        buf.write_u32(0x0403_4b50).unwrap();
        buf.write_u64(0x1122_3344_5566_7788).unwrap();

        assert_eq!(
            buf.as_slice(),
            &[
                0xAB, 0x02, 0x01, 0x50, 0x4b, 0x03, 0x04, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33,
                0x22, 0x11
            ]
        );
        assert_eq!(buf.position(), 15);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn write_past_capacity_is_an_error() {
        let mut buf = ByteBuffer::new(3);
        buf.write_u16(7).unwrap();

        let err = buf.write_u32(1).unwrap_err();
        assert!(matches!(
            err,
            ZipError::CapacityExceeded {
                requested: 4,
                remaining: 1
            }
        ));
        // a failed write leaves the cursor alone
        assert_eq!(buf.position(), 2);
        assert!(buf.append(b"xy").is_err());
        assert!(buf.write_u64(0).is_err());
        assert_eq!(buf.position(), 2);
    }

    #[test]
    fn ensure_remaining_grows_to_exact_fit() {
        let mut buf = ByteBuffer::new(4);
        buf.append(b"abc").unwrap();

        buf.ensure_remaining(1).unwrap();
        assert_eq!(buf.capacity(), 4);

        buf.ensure_remaining(10).unwrap();
        assert_eq!(buf.capacity(), 13);
        assert_eq!(buf.as_slice(), b"abc");

        buf.append(b"0123456789").unwrap();
        assert_eq!(buf.as_slice(), b"abc0123456789");
    }

    #[test]
    fn oversized_growth_is_an_error() {
        let mut buf = ByteBuffer::new(8);
        buf.append(b"abc").unwrap();

        // cursor + size overflows usize
        let err = buf.ensure_remaining(usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            ZipError::CapacityExceeded {
                requested: usize::MAX,
                remaining: 5
            }
        ));

        // fits in usize but cannot be allocated
        let mut empty = ByteBuffer::new(0);
        assert!(matches!(
            empty.ensure_remaining(usize::MAX),
            Err(ZipError::CapacityExceeded { .. })
        ));

        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.as_slice(), b"abc");
    }

    #[test]
    fn write_text_truncates_code_points() {
        let mut buf = ByteBuffer::new(4);
        buf.write_text("a\u{e9}\u{0141}z").unwrap();
        // U+00E9 fits, U+0141 keeps only 0x41
        assert_eq!(buf.as_slice(), &[b'a', 0xE9, 0x41, b'z']);
        assert_eq!(latin1_len("a\u{e9}\u{0141}z"), 4);
        assert_eq!(latin1_bytes("a\u{e9}\u{0141}z"), buf.as_slice());
    }

    #[test]
    fn astral_characters_take_one_byte() {
        // U+1F600 is one scalar value: a single 0x00 byte, not two surrogate bytes
        let text = "a\u{1F600}b";
        assert_eq!(latin1_len(text), 3);
        assert_eq!(latin1_bytes(text), vec![b'a', 0x00, b'b']);

        let mut buf = ByteBuffer::new(3);
        buf.write_text(text).unwrap();
        assert_eq!(buf.as_slice(), &[b'a', 0x00, b'b']);
    }

    #[test]
    fn into_bytes_returns_used_range() {
        let mut exact = ByteBuffer::new(2);
        exact.write_u16(0xBEEF).unwrap();
        assert_eq!(exact.into_bytes(), vec![0xEF, 0xBE]);

        let mut slack = ByteBuffer::new(64);
        slack.append(b"zip").unwrap();
        let bytes = slack.into_bytes();
        assert_eq!(bytes, b"zip");
        assert_eq!(bytes.len(), 3);
    }
}
