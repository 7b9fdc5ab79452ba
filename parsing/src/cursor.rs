use byteorder::{ByteOrder, LittleEndian};

use crate::{Endianess, Error, Parse, ReadBytes, Result};

/// Sequential reader over an immutable byte buffer.
///
/// A cursor produced by [`ByteCursor::take`] only sees its own window, but
/// [`ByteCursor::position`] keeps reporting offsets into the original buffer.
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
    lossy: bool,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            base: 0,
            lossy: false,
        }
    }

    /// Makes string reads replace invalid UTF-8 with U+FFFD. Sub-cursors from
    /// [`ByteCursor::take`] inherit the setting.
    pub fn with_lossy_strings(mut self, lossy: bool) -> Self {
        self.lossy = lossy;
        self
    }

    pub fn position(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes read from this cursor's own window.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Splits the next `num` bytes off into a bounded cursor and advances past them.
    pub fn take(&mut self, num: usize) -> Result<ByteCursor<'a>> {
        let base = self.position();
        let data = self.read_bytes(num)?;
        Ok(ByteCursor {
            data,
            pos: 0,
            base,
            lossy: self.lossy,
        })
    }

    pub fn peek_u16_at(&self, offset: usize) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.window(offset, 2)?))
    }

    // `offset` is relative to the start of this cursor's window
    fn window(&self, offset: usize, need: usize) -> Result<&'a [u8]> {
        match offset.checked_add(need) {
            Some(end) if end <= self.data.len() => Ok(&self.data[offset..end]),
            _ => Err(Error::BufferUnderrun {
                offset: self.base + offset,
                need,
                have: self.data.len().saturating_sub(offset),
            }),
        }
    }
}

impl<'a> ReadBytes<'a> for ByteCursor<'a> {
    fn position(&self) -> usize {
        ByteCursor::position(self)
    }

    fn read_bytes(&mut self, num: usize) -> Result<&'a [u8]> {
        if num <= self.remaining() {
            let bytes = &self.data[self.pos..self.pos + num];
            self.pos += num;
            Ok(bytes)
        } else {
            Err(Error::BufferUnderrun {
                offset: self.position(),
                need: num,
                have: self.remaining(),
            })
        }
    }

    fn lossy_strings(&self) -> bool {
        self.lossy
    }

    fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }

    fn read_type<E: Endianess, T: Parse<'a, E>>(&mut self) -> Result<T> {
        T::parse(self)
    }
}
