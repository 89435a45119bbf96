//! Growable byte buffer drawing from an arena
//!
//! [`ArenaBuffer`] assembles data incrementally (a body arriving in chunks, a
//! decoded value built piece by piece). Appends that overflow the current
//! segment move the data to a new segment sized to the next power of two, so
//! appends are amortized O(1). Superseded segments are handed back to the
//! arena's budget; everything else is released with the arena.

use crate::arena::Arena;
use crate::error::{Error, Result};

/// Amortized-doubling byte buffer
#[derive(Debug)]
pub struct ArenaBuffer<'a> {
    arena: &'a Arena,
    data: Vec<u8>,
    len: usize,
}

impl<'a> ArenaBuffer<'a> {
    /// Create an empty buffer; nothing is allocated until data arrives.
    pub fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            data: Vec::new(),
            len: 0,
        }
    }

    /// Bytes in use
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no bytes are in use
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the current segment
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Bytes in use
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Move the data to a segment of exactly `size` bytes.
    ///
    /// Data beyond `size` is cut off.
    pub fn resize(&mut self, size: usize) -> Result<()> {
        let mut segment = self.arena.alloc(size)?;
        let keep = self.len.min(size);
        segment[..keep].copy_from_slice(&self.data[..keep]);

        self.arena.reclaim(self.data.len());
        self.data = segment;
        self.len = keep;
        Ok(())
    }

    /// Set the length to `len` bytes.
    ///
    /// The bound is the segment size, not the current length: bytes between
    /// the old and new length read as zero. When the new length is at most a
    /// quarter of the segment, the segment is halved and the difference is
    /// returned to the arena. Only a `len` larger than the segment fails, and
    /// then the buffer is left as it was.
    pub fn truncate(&mut self, len: usize) -> Result<()> {
        let size = self.size();
        if len > size {
            return Err(Error::InvalidArgument {
                message: format!("truncate length {len} exceeds buffer size {size}"),
            });
        }

        if len < self.len {
            self.data[len..self.len].fill(0);
        }
        self.len = len;
        if size > 0 && len <= size / 4 {
            self.shrink(size / 2);
        }
        Ok(())
    }

    /// Cut the segment down to `size` bytes without a new allocation.
    fn shrink(&mut self, size: usize) {
        let old = self.data.len();
        self.data.truncate(size);
        self.data.shrink_to_fit();
        self.arena.reclaim(old - size);
    }

    /// Append `bytes`, growing the segment to the next power of two if needed.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let needed = self
            .len
            .checked_add(bytes.len())
            .ok_or_else(|| Error::InvalidArgument {
                message: "buffer length overflow".to_string(),
            })?;

        if needed > self.size() {
            let size = needed
                .checked_next_power_of_two()
                .ok_or_else(|| Error::InvalidArgument {
                    message: format!("no power-of-two size holds {needed} bytes"),
                })?;
            self.resize(size)?;
        }

        self.data[self.len..needed].copy_from_slice(bytes);
        self.len = needed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_append_grows_to_power_of_two() {
        let arena = Arena::new();
        let mut buf = ArenaBuffer::new(&arena);
        assert_eq!(buf.size(), 0);

        buf.append(b"hello").unwrap();
        assert_eq!(buf.size(), 8);
        buf.append(b" world").unwrap();
        assert_eq!(buf.size(), 16);
        assert_eq!(buf.as_bytes(), b"hello world");
        assert_eq!(buf.len(), 11);
    }

    #[test]
    fn test_growth_reclaims_old_segment() {
        let arena = Arena::new();
        let mut buf = ArenaBuffer::new(&arena);
        buf.append(&[1; 3]).unwrap();
        assert_eq!(arena.used(), 4);
        buf.append(&[2; 3]).unwrap();
        assert_eq!(arena.used(), 8);
    }

    #[test]
    fn test_append_fails_when_arena_exhausted() {
        let arena = Arena::with_limit(4);
        let mut buf = ArenaBuffer::new(&arena);
        buf.append(b"abcd").unwrap();
        let err = buf.append(b"e").unwrap_err();
        assert!(matches!(err, Error::Alloc { .. }));
        assert_eq!(buf.as_bytes(), b"abcd");
    }

    #[rstest]
    #[case(16, 4, 8)]
    #[case(16, 0, 8)]
    #[case(16, 5, 16)]
    #[case(16, 16, 16)]
    fn test_truncate_shrinks(#[case] size: usize, #[case] len: usize, #[case] expected_size: usize) {
        let arena = Arena::new();
        let mut buf = ArenaBuffer::new(&arena);
        buf.resize(size).unwrap();
        buf.append(&vec![7; size]).unwrap();

        buf.truncate(len).unwrap();
        assert_eq!(buf.len(), len);
        assert_eq!(buf.size(), expected_size);
        assert!(buf.as_bytes().iter().all(|b| *b == 7));
    }

    #[test]
    fn test_truncate_on_full_arena() {
        let arena = Arena::with_limit(16);
        let mut buf = ArenaBuffer::new(&arena);
        buf.append(&[7; 16]).unwrap();
        assert_eq!(arena.available(), Some(0));

        buf.truncate(0).unwrap();
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.size(), 8);
        assert_eq!(arena.used(), 8);
    }

    #[test]
    fn test_truncate_up_to_size_reads_zeros() {
        let arena = Arena::new();
        let mut buf = ArenaBuffer::new(&arena);
        buf.append(b"abcdef").unwrap();
        buf.truncate(3).unwrap();
        buf.truncate(5).unwrap();
        assert_eq!(buf.as_bytes(), b"abc\0\0");
    }

    #[test]
    fn test_truncate_beyond_size_rejected() {
        let arena = Arena::new();
        let mut buf = ArenaBuffer::new(&arena);
        buf.append(b"ab").unwrap();
        let err = buf.truncate(3).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert_eq!(buf.as_bytes(), b"ab");
    }

    #[test]
    fn test_resize_smaller_cuts_data() {
        let arena = Arena::new();
        let mut buf = ArenaBuffer::new(&arena);
        buf.append(b"abcdef").unwrap();
        buf.resize(3).unwrap();
        assert_eq!(buf.as_bytes(), b"abc");
        assert_eq!(buf.size(), 3);
    }
}
