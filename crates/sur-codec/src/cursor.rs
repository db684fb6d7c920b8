//! Little-endian byte cursors.
//!
//! The SUR format stores stream-relative offsets and requires both sides of
//! the codec to seek: the reader follows child/hull offsets, the writer
//! back-patches offset fields once their targets are known. These cursors
//! keep that bookkeeping in one place so the codec modules stay free of
//! index arithmetic.

use glam::Vec3;

use crate::error::{SurError, SurResult};

/// Read cursor over a byte slice. All reads are little-endian.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[must_use]
    pub fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Move the cursor to an absolute position.
    pub fn seek(&mut self, pos: usize) -> SurResult<()> {
        if pos > self.data.len() {
            return Err(SurError::TruncatedStream {
                expected: pos,
                actual: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> SurResult<()> {
        self.seek(self.pos + count)
    }

    fn take(&mut self, count: usize) -> SurResult<&'a [u8]> {
        if self.remaining() < count {
            return Err(SurError::TruncatedStream {
                expected: count,
                actual: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    pub fn u8(&mut self) -> SurResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> SurResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn i16(&mut self) -> SurResult<i16> {
        let b = self.take(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> SurResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn i32(&mut self) -> SurResult<i32> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn f32(&mut self) -> SurResult<f32> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn vec3(&mut self) -> SurResult<Vec3> {
        Ok(Vec3::new(self.f32()?, self.f32()?, self.f32()?))
    }
}

/// Write cursor over a growable buffer.
///
/// Writing past the current end appends; writing at an earlier position
/// overwrites in place, which is how offset fields get patched after their
/// targets have been emitted.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
    pos: usize,
}

impl Writer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Move the cursor to an absolute position within the written region.
    pub fn seek(&mut self, pos: usize) -> SurResult<()> {
        if pos > self.buf.len() {
            return Err(SurError::CorruptFormat {
                context: "writer seek",
                detail: format!("position {pos} beyond written length {}", self.buf.len()),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        if self.pos == self.buf.len() {
            self.buf.extend_from_slice(bytes);
        } else {
            if end > self.buf.len() {
                self.buf.resize(end, 0);
            }
            self.buf[self.pos..end].copy_from_slice(bytes);
        }
        self.pos = end;
    }

    /// Emit `count` zero bytes, typically reserving space for a later patch.
    pub fn zeros(&mut self, count: usize) {
        let end = self.pos + count;
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        } else {
            self.buf[self.pos..end].fill(0);
        }
        self.pos = end;
    }

    pub fn u8(&mut self, value: u8) {
        self.bytes(&[value]);
    }

    pub fn u16(&mut self, value: u16) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn u32(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn i32(&mut self, value: i32) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn f32(&mut self, value: f32) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn vec3(&mut self, value: Vec3) {
        self.f32(value.x);
        self.f32(value.y);
        self.f32(value.z);
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
