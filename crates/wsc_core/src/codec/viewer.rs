//! A read cursor over a byte slice.

use crate::err::{Error, Result};

/// A reference into an existing slice of bytes.
///
/// Every decoder reads through a viewer. Reads that would run past the end of
/// the slice fail with [Error::UnexpectedEof] and leave the offset untouched.
#[derive(Debug, Clone)]
pub struct ByteViewer<'arr> {
    slice: &'arr [u8],
    offset: usize,
}

impl<'arr> ByteViewer<'arr> {
    /// Create a new viewer on a byte slice
    pub fn from_slice(s: &'arr [u8]) -> Self {
        Self {
            slice: s,
            offset: 0,
        }
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes left in the view.
    pub fn distance_to_end(&self) -> usize {
        self.slice.len() - self.offset
    }

    /// Returns `true` if the view has been fully consumed.
    pub fn is_end(&self) -> bool {
        self.offset == self.slice.len()
    }

    /// Peek at the next byte in the slice
    pub fn peek(&self) -> Option<u8> {
        self.slice.get(self.offset).copied()
    }

    /// Return the next byte and advance the view
    pub fn next_byte(&mut self) -> Result<u8> {
        let [b] = self.next_bytes_fixed::<1>()?;
        Ok(b)
    }

    /// Returns the next `size` bytes and advances the view.
    pub fn next_bytes(&mut self, size: usize) -> Result<&'arr [u8]> {
        if size > self.distance_to_end() {
            return Err(Error::UnexpectedEof {
                at: self.offset,
                need: size,
                remaining: self.distance_to_end(),
            });
        }

        let view = &self.slice[self.offset..self.offset + size];
        self.offset += size;

        Ok(view)
    }

    /// Returns a copy of the next slice of bytes as a fixed-size array
    /// and advances the view.
    pub fn next_bytes_fixed<const ARR_SIZE: usize>(&mut self) -> Result<[u8; ARR_SIZE]> {
        let mut arr = [0_u8; ARR_SIZE];
        arr.copy_from_slice(self.next_bytes(ARR_SIZE)?);

        Ok(arr)
    }
}
