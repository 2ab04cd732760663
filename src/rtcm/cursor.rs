//! Append-only byte buffer with a read cursor

/// Compact once this many consumed bytes sit in front of the cursor.
const COMPACT_THRESHOLD: usize = 4096;

/// Growable byte buffer consumed from the front.
///
/// Consumption only advances a read offset; the consumed prefix is dropped
/// in bulk once it dominates the allocation, so a stream of small chunks
/// never causes repeated shifting of the unread data.
#[derive(Debug, Default, Clone)]
pub struct ByteCursor {
    data: Vec<u8>,
    read: usize,
}

impl ByteCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes at the end.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.compact();
        self.data.extend_from_slice(bytes);
    }

    /// Unread bytes.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.read..]
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        self.data.len() - self.read
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard `count` unread bytes from the front.
    ///
    /// Panics if `count` exceeds the unread length; callers only consume what
    /// they have already inspected.
    pub fn consume(&mut self, count: usize) {
        assert!(count <= self.len(), "consume({count}) past end of {} buffered bytes", self.len());
        self.read += count;
        if self.read == self.data.len() {
            self.data.clear();
            self.read = 0;
        }
    }

    fn compact(&mut self) {
        if self.read >= COMPACT_THRESHOLD && self.read * 2 >= self.data.len() {
            self.data.drain(..self.read);
            self.read = 0;
        }
    }
}
