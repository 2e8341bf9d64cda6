//! Fixed-capacity file content.

/// Fixed-capacity byte buffer with a tracked length.
///
/// Reads and writes past the end are short, never errors: a write copies
/// at most `capacity - offset` bytes and a read returns at most
/// `len - offset` bytes. Writes only ever grow the length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBuffer {
    bytes: Box<[u8]>,
    len: usize,
}

impl ContentBuffer {
    /// Create an empty buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Create a buffer pre-filled with `data`, truncated to `capacity`.
    pub fn from_slice(capacity: usize, data: &[u8]) -> Self {
        let mut buffer = Self::with_capacity(capacity);
        buffer.write(0, data);
        buffer
    }

    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The committed bytes, `[0, len)`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Copy up to `buf.len()` bytes starting at `offset` into `buf`.
    ///
    /// Returns the number of bytes copied; 0 when `offset >= len`.
    pub fn read(&self, offset: u64, buf: &mut [u8]) -> usize {
        let Some(start) = self.index(offset).filter(|&s| s < self.len) else {
            return 0;
        };
        let count = buf.len().min(self.len - start);
        buf[..count].copy_from_slice(&self.bytes[start..start + count]);
        count
    }

    /// Copy `data` into the buffer at `offset`.
    ///
    /// Copies `min(data.len(), capacity - offset)` bytes and extends the
    /// length to `offset + copied` when that is past the current end. Returns
    /// 0 without touching the buffer when `data` is empty or
    /// `offset >= capacity`.
    pub fn write(&mut self, offset: u64, data: &[u8]) -> usize {
        let capacity = self.capacity();
        if data.is_empty() {
            return 0;
        }
        let Some(start) = self.index(offset).filter(|&s| s < capacity) else {
            return 0;
        };
        let count = data.len().min(capacity - start);
        self.bytes[start..start + count].copy_from_slice(&data[..count]);
        // Bytes between the old end and `start` were never written.
        if start > self.len {
            self.bytes[self.len..start].fill(0);
        }
        self.len = self.len.max(start + count);
        // Logical terminator at `len`.
        if self.len < capacity {
            self.bytes[self.len] = 0;
        }
        count
    }

    /// Replace the whole content with `data`, truncated to capacity.
    pub fn replace(&mut self, data: &[u8]) -> usize {
        self.clear();
        self.write(0, data)
    }

    /// Drop all content.
    pub fn clear(&mut self) {
        self.len = 0;
        if let Some(first) = self.bytes.first_mut() {
            *first = 0;
        }
    }

    fn index(&self, offset: u64) -> Option<usize> {
        usize::try_from(offset).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let mut buf = ContentBuffer::with_capacity(16);
        assert_eq!(buf.write(0, b"hello world"), 11);
        assert_eq!(buf.len(), 11);

        let mut out = [0u8; 32];
        let n = buf.read(0, &mut out);
        assert_eq!(&out[..n], b"hello world");
    }

    #[test]
    fn test_partial_read() {
        let buf = ContentBuffer::from_slice(16, b"hello world");
        let mut out = [0u8; 5];
        assert_eq!(buf.read(6, &mut out), 5);
        assert_eq!(&out, b"world");
    }

    #[test]
    fn test_short_write_at_capacity() {
        let mut buf = ContentBuffer::with_capacity(8);
        assert_eq!(buf.write(0, b"0123456789ab"), 8);
        assert_eq!(buf.len(), 8);
        assert_eq!(buf.as_bytes(), b"01234567");
    }

    #[test]
    fn test_write_past_capacity_is_noop() {
        let mut buf = ContentBuffer::from_slice(8, b"abc");
        assert_eq!(buf.write(8, b"zzz"), 0);
        assert_eq!(buf.write(100, b"zzz"), 0);
        assert_eq!(buf.as_bytes(), b"abc");
    }

    #[test]
    fn test_read_at_end_is_empty() {
        let buf = ContentBuffer::from_slice(8, b"abc");
        let mut out = [0u8; 4];
        assert_eq!(buf.read(3, &mut out), 0);
        assert_eq!(buf.read(1000, &mut out), 0);
    }

    #[test]
    fn test_overwrite_in_middle_keeps_tail() {
        let mut buf = ContentBuffer::from_slice(16, b"hello world");
        assert_eq!(buf.write(2, b"XY"), 2);
        assert_eq!(buf.as_bytes(), b"heXYo world");
        assert_eq!(buf.write(0, b"J"), 1);
        assert_eq!(buf.as_bytes(), b"JeXYo world");
    }

    #[test]
    fn test_empty_write_changes_nothing() {
        let mut buf = ContentBuffer::from_slice(16, b"hello");
        assert_eq!(buf.write(0, b""), 0);
        assert_eq!(buf.write(9, b""), 0);
        assert_eq!(buf.as_bytes(), b"hello");
    }

    #[test]
    fn test_replace_shrinks() {
        let mut buf = ContentBuffer::from_slice(16, b"hello world");
        assert_eq!(buf.replace(b"bye"), 3);
        assert_eq!(buf.as_bytes(), b"bye");
        let mut out = [0u8; 8];
        assert_eq!(buf.read(3, &mut out), 0);
    }

    #[test]
    fn test_write_after_gap_zero_fills() {
        let mut buf = ContentBuffer::from_slice(8, b"ab");
        assert_eq!(buf.write(4, b"cd"), 2);
        assert_eq!(buf.as_bytes(), b"ab\0\0cd");
    }

    #[test]
    fn test_clear() {
        let mut buf = ContentBuffer::from_slice(8, b"abc");
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 8);
    }
}
