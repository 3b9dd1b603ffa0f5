use std::borrow::Cow;
use std::sync::Arc;

use crate::io::ReadAt;

use super::error::{PackError, PackResult};
use super::structures::PackEntry;

/// A read-only window onto one file inside a PACK archive
///
/// Each view carries its own cursor for [`read`](Self::read). Reads always go
/// to an absolute offset in the shared source, so any number of views can be
/// used interleaved without disturbing each other.
pub struct PackFile<R: ReadAt + ?Sized> {
    source: Arc<R>,
    entry: PackEntry,
    pos: u64,
}

impl<R: ReadAt + ?Sized> Clone for PackFile<R> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            entry: self.entry.clone(),
            pos: self.pos,
        }
    }
}

impl<R: ReadAt + ?Sized> PackFile<R> {
    pub(crate) fn new(source: Arc<R>, entry: PackEntry) -> Self {
        Self {
            source,
            entry,
            pos: 0,
        }
    }

    /// Size of the file in bytes
    pub fn size(&self) -> u64 {
        self.entry.size() as u64
    }

    /// Offset relative to the start of the file from which the next read
    /// begins
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Whether the cursor has reached or passed the end of the file
    pub fn eof(&self) -> bool {
        self.pos >= self.size()
    }

    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Move the cursor to `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not inside the file, i.e. `pos >= size()`.
    pub fn seek(&mut self, pos: u64) {
        assert!(
            pos < self.size(),
            "seek position {} outside file of {} bytes",
            pos,
            self.size()
        );
        self.pos = pos;
    }

    /// Read `bytes` bytes starting at the cursor.
    ///
    /// The cursor advances by however many bytes the source delivered, even
    /// when that is fewer than requested, in which case the call fails with
    /// [`PackError::ShortRead`]. Reads are not clipped at `size()`: bytes
    /// that physically follow the file in the archive are returned as-is.
    pub fn read(&mut self, bytes: usize) -> PackResult<Vec<u8>> {
        let offset = self.entry.offset() as u64 + self.pos;
        tracing::trace!(offset, bytes, "pack file read");

        // never allocate past the end of the source
        let available = self.source.size().saturating_sub(offset);
        let mut buf = vec![0u8; bytes.min(available.try_into().unwrap_or(usize::MAX))];
        let read = self.source.read_full_at(offset, &mut buf)?;
        buf.truncate(read);
        self.pos += read as u64;

        if read < bytes {
            return Err(PackError::ShortRead {
                offset,
                expected: bytes,
                actual: read,
            });
        }

        Ok(buf)
    }

    /// Whole content of the file; the cursor is left untouched.
    ///
    /// Fails with [`PackError::ShortRead`] if the archive ends before
    /// `size()` bytes could be read.
    pub fn contents(&self) -> PackResult<Vec<u8>> {
        let offset = self.entry.offset() as u64;
        let size = self.entry.size() as usize;

        let available = self.source.size().saturating_sub(offset);
        if available < size as u64 {
            return Err(PackError::ShortRead {
                offset,
                expected: size,
                actual: available as usize,
            });
        }

        let mut buf = vec![0u8; size];
        let read = self.source.read_full_at(offset, &mut buf)?;
        if read < size {
            return Err(PackError::ShortRead {
                offset,
                expected: size,
                actual: read,
            });
        }

        Ok(buf)
    }

    /// Index record backing this view
    pub fn entry(&self) -> &PackEntry {
        &self.entry
    }

    pub fn name(&self) -> &[u8] {
        self.entry.name()
    }

    pub fn display_name(&self) -> Cow<'_, str> {
        self.entry.display_name()
    }

    /// Absolute offset of the file's first byte in the archive
    pub fn offset(&self) -> u64 {
        self.entry.offset() as u64
    }

    pub fn position(&self) -> usize {
        self.entry.position()
    }
}

impl<R: ReadAt + ?Sized> std::fmt::Debug for PackFile<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackFile")
            .field("name", &self.display_name())
            .field("offset", &self.entry.offset())
            .field("size", &self.entry.size())
            .field("pos", &self.pos)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryReader;
    use crate::pack::structures::IndexRecord;

    /// View over `size` bytes at `offset` of "0123456789abcdef".
    fn view(offset: u32, size: u32) -> PackFile<MemoryReader> {
        let mut raw = [0u8; IndexRecord::SIZE];
        raw[..4].copy_from_slice(b"test");
        raw[56..60].copy_from_slice(&offset.to_le_bytes());
        raw[60..64].copy_from_slice(&size.to_le_bytes());
        let source = Arc::new(MemoryReader::new(b"0123456789abcdef".to_vec()));
        PackFile::new(source, PackEntry::from_bytes(&raw, 0))
    }

    #[test]
    fn read_advances_cursor() {
        let mut file = view(4, 6);
        assert_eq!(file.read(2).unwrap(), b"45");
        assert_eq!(file.pos(), 2);
        assert_eq!(file.read(4).unwrap(), b"6789");
        assert!(file.eof());
    }

    #[test]
    fn read_past_end_of_file_is_not_clipped() {
        let mut file = view(4, 2);
        assert_eq!(file.read(4).unwrap(), b"4567");
        assert_eq!(file.pos(), 4);
        assert!(file.eof());
    }

    #[test]
    fn short_read_fails_but_advances() {
        let mut file = view(12, 4);
        let err = file.read(6).unwrap_err();
        assert!(matches!(
            err,
            PackError::ShortRead { offset: 12, expected: 6, actual: 4 }
        ));
        assert_eq!(file.pos(), 4);

        file.reset();
        assert_eq!(file.read(4).unwrap(), b"cdef");
    }

    #[test]
    fn contents_ignores_cursor() {
        let mut file = view(10, 3);
        file.seek(2);
        assert_eq!(file.contents().unwrap(), b"abc");
        assert_eq!(file.pos(), 2);
        assert_eq!(file.read(1).unwrap(), b"c");
    }

    #[test]
    fn contents_of_truncated_file_fails() {
        let file = view(14, 8);
        assert!(matches!(
            file.contents(),
            Err(PackError::ShortRead { expected: 8, actual: 2, .. })
        ));
    }

    #[test]
    fn oversized_record_fails_before_allocating() {
        let mut file = view(0, u32::MAX);
        assert!(matches!(
            file.contents(),
            Err(PackError::ShortRead { offset: 0, expected, actual: 16 }) if expected == u32::MAX as usize
        ));
        assert!(matches!(
            file.read(usize::MAX),
            Err(PackError::ShortRead { actual: 16, .. })
        ));
        assert_eq!(file.pos(), 16);
    }

    #[test]
    fn views_do_not_share_cursors() {
        let mut a = view(0, 8);
        let mut b = a.clone();
        a.read(3).unwrap();
        assert_eq!(b.pos(), 0);
        assert_eq!(b.read(2).unwrap(), b"01");
        assert_eq!(a.read(2).unwrap(), b"34");
    }

    #[test]
    #[should_panic(expected = "outside file")]
    fn seek_to_size_panics() {
        let mut file = view(0, 4);
        file.seek(4);
    }

    #[test]
    #[should_panic]
    fn seek_in_empty_file_panics() {
        let mut file = view(0, 0);
        file.seek(0);
    }
}
