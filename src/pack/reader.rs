use std::io::{Read, Seek, Write};
use std::iter::FusedIterator;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::io::{HttpRangeReader, LocalFileReader, MemoryReader, ReadAt, StreamReader};

use super::error::PackResult;
use super::file::PackFile;
use super::index::PackIndex;
use super::structures::{Header, PackEntry};

/// Selects one file in an archive, either by position or by exact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Index(usize),
    Name(&'a [u8]),
}

impl From<usize> for Lookup<'_> {
    fn from(index: usize) -> Self {
        Lookup::Index(index)
    }
}

impl<'a> From<&'a str> for Lookup<'a> {
    fn from(name: &'a str) -> Self {
        Lookup::Name(name.as_bytes())
    }
}

impl<'a> From<&'a String> for Lookup<'a> {
    fn from(name: &'a String) -> Self {
        Lookup::Name(name.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for Lookup<'a> {
    fn from(name: &'a [u8]) -> Self {
        Lookup::Name(name)
    }
}

/// Reader for id Software PACK archives
///
/// The header is parsed when the reader is created; the index is loaded the
/// first time anything asks about the files and kept for the life of the
/// reader.
pub struct PackReader<R: ReadAt + ?Sized> {
    source: Arc<R>,
    header: Header,
    index: OnceLock<PackIndex>,
}

impl PackReader<LocalFileReader> {
    /// Open an archive on the local filesystem.
    pub fn open(path: impl AsRef<Path>) -> PackResult<Self> {
        let reader = LocalFileReader::new(path.as_ref())?;
        Self::new(Arc::new(reader))
    }
}

impl PackReader<MemoryReader> {
    /// Read an archive held in memory.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> PackResult<Self> {
        Self::new(Arc::new(MemoryReader::new(data)))
    }
}

impl<S: Read + Seek> PackReader<StreamReader<S>> {
    /// Read an archive from any seekable stream.
    pub fn from_stream(stream: S) -> PackResult<Self> {
        Self::new(Arc::new(StreamReader::new(stream)?))
    }
}

impl PackReader<HttpRangeReader> {
    /// Read a remote archive using HTTP Range requests.
    pub fn open_url(url: impl Into<String>) -> PackResult<Self> {
        Self::new(Arc::new(HttpRangeReader::new(url.into())?))
    }
}

impl<R: ReadAt + ?Sized> PackReader<R> {
    /// Create a reader over a shared source and parse its header.
    ///
    /// The caller may keep its own handle to `source`; every read names an
    /// absolute offset, so outside use of the source does not disturb the
    /// reader.
    ///
    /// # Errors
    ///
    /// Fails with a format error if the source does not start with the
    /// `PACK` identifier. Nothing past the identifier is read in that case.
    pub fn new(source: Arc<R>) -> PackResult<Self> {
        let magic_len = Header::MAGIC.len();
        let mut buf = [0u8; Header::SIZE];

        let read = source.read_full_at(0, &mut buf[..magic_len])?;
        Header::check_magic(&buf[..read])?;

        let read = source.read_full_at(magic_len as u64, &mut buf[magic_len..])?;
        let header = Header::from_bytes(&buf[..magic_len + read])?;

        tracing::debug!(
            index_offset = header.index_offset,
            index_size = header.index_size,
            "parsed pack header"
        );

        Ok(Self {
            source,
            header,
            index: OnceLock::new(),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The underlying byte source
    pub fn source(&self) -> &Arc<R> {
        &self.source
    }

    /// Load the index if it has not been loaded yet.
    ///
    /// A failed load leaves the reader unloaded; the next call tries again.
    pub fn ensure_index(&self) -> PackResult<&PackIndex> {
        if let Some(index) = self.index.get() {
            return Ok(index);
        }
        let loaded = PackIndex::load(&*self.source, &self.header)?;
        Ok(self.index.get_or_init(|| loaded))
    }

    /// Number of files, derived from the header without loading the index
    pub fn file_count(&self) -> usize {
        self.header.record_count()
    }

    /// Whether a file with exactly this name exists
    pub fn has(&self, name: impl AsRef<[u8]>) -> PackResult<bool> {
        Ok(self.ensure_index()?.contains(name.as_ref()))
    }

    /// Index record for a file
    pub fn entry<'a>(&self, lookup: impl Into<Lookup<'a>>) -> PackResult<&PackEntry> {
        let index = self.ensure_index()?;
        match lookup.into() {
            Lookup::Index(position) => index.get(position),
            Lookup::Name(name) => index.find(name),
        }
    }

    /// All records in on-disk order
    pub fn entries(&self) -> PackResult<&[PackEntry]> {
        Ok(self.ensure_index()?.entries())
    }

    /// Stored name of the file at `index`
    pub fn file_name(&self, index: usize) -> PackResult<&[u8]> {
        Ok(self.entry(index)?.name())
    }

    /// Position of the file called `name`
    pub fn file_index(&self, name: impl AsRef<[u8]>) -> PackResult<usize> {
        Ok(self.entry(name.as_ref())?.position())
    }

    pub fn file_offset<'a>(&self, lookup: impl Into<Lookup<'a>>) -> PackResult<u64> {
        Ok(self.entry(lookup)?.offset() as u64)
    }

    pub fn file_size<'a>(&self, lookup: impl Into<Lookup<'a>>) -> PackResult<u64> {
        Ok(self.entry(lookup)?.size() as u64)
    }

    /// A fresh view onto one file, with its cursor at the start
    pub fn file<'a>(&self, lookup: impl Into<Lookup<'a>>) -> PackResult<PackFile<R>> {
        let entry = self.entry(lookup)?.clone();
        Ok(PackFile::new(Arc::clone(&self.source), entry))
    }

    /// Views onto every file in on-disk order
    ///
    /// Each call starts a new pass from the first file.
    pub fn files(&self) -> PackResult<Files<'_, R>> {
        let index = self.ensure_index()?;
        Ok(Files {
            source: &self.source,
            entries: index.entries(),
            next: 0,
        })
    }

    /// Write the full content of one file to `out`.
    pub fn extract<'a, W: Write + ?Sized>(
        &self,
        lookup: impl Into<Lookup<'a>>,
        out: &mut W,
    ) -> PackResult<()> {
        let data = self.file(lookup)?.contents()?;
        out.write_all(&data)?;
        Ok(())
    }

    /// Write the full content of one file to a new file at `path`.
    ///
    /// Missing parent directories are created. An existing file is
    /// overwritten.
    pub fn extract_to<'a>(
        &self,
        lookup: impl Into<Lookup<'a>>,
        path: impl AsRef<Path>,
    ) -> PackResult<()> {
        let path = path.as_ref();
        let data = self.file(lookup)?.contents()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, &data)?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "extracted");
        Ok(())
    }
}

impl<R: ReadAt + ?Sized> std::fmt::Debug for PackReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackReader")
            .field("header", &self.header)
            .field("index_loaded", &self.index.get().is_some())
            .finish()
    }
}

/// Iterator over the files of a [`PackReader`], in on-disk order
pub struct Files<'a, R: ReadAt + ?Sized> {
    source: &'a Arc<R>,
    entries: &'a [PackEntry],
    next: usize,
}

impl<R: ReadAt + ?Sized> Clone for Files<'_, R> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            entries: self.entries,
            next: self.next,
        }
    }
}

impl<R: ReadAt + ?Sized> std::fmt::Debug for Files<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Files")
            .field("next", &self.next)
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<R: ReadAt + ?Sized> Iterator for Files<'_, R> {
    type Item = PackFile<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.next)?;
        self.next += 1;
        Some(PackFile::new(Arc::clone(self.source), entry.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.entries.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl<R: ReadAt + ?Sized> ExactSizeIterator for Files<'_, R> {}

impl<R: ReadAt + ?Sized> FusedIterator for Files<'_, R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::{ErrorKind, PackError};
    use crate::pack::structures::IndexRecord;
    use std::io::Cursor;

    /// The two-record archive used by most tests below:
    /// `readme.txt` = "abcdefgh" and `data/x.bin` = [1, 2, 3].
    fn sample() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(b"PACK");
        data.extend_from_slice(&23u32.to_le_bytes());
        data.extend_from_slice(&128u32.to_le_bytes());
        data.extend_from_slice(b"abcdefgh");
        data.extend_from_slice(&[1, 2, 3]);
        for (name, offset, size) in [("readme.txt", 12u32, 8u32), ("data/x.bin", 20, 3)] {
            let mut raw = [0u8; IndexRecord::SIZE];
            raw[..name.len()].copy_from_slice(name.as_bytes());
            raw[56..60].copy_from_slice(&offset.to_le_bytes());
            raw[60..64].copy_from_slice(&size.to_le_bytes());
            data.extend_from_slice(&raw);
        }
        data
    }

    #[test]
    fn index_loads_lazily() {
        let reader = PackReader::from_bytes(sample()).unwrap();
        assert_eq!(reader.file_count(), 2);
        assert!(reader.index.get().is_none());

        assert!(reader.has("readme.txt").unwrap());
        assert!(reader.index.get().is_some());
    }

    #[test]
    fn lookups_by_name_and_position_agree() {
        let reader = PackReader::from_bytes(sample()).unwrap();
        assert_eq!(reader.file_index("data/x.bin").unwrap(), 1);
        assert_eq!(reader.file_name(1).unwrap(), b"data/x.bin");
        assert_eq!(reader.file_offset("data/x.bin").unwrap(), 20);
        assert_eq!(reader.file_offset(1usize).unwrap(), 20);
        assert_eq!(reader.file_size(0usize).unwrap(), 8);
    }

    #[test]
    fn missing_lookups_are_lookup_errors() {
        let reader = PackReader::from_bytes(sample()).unwrap();
        assert!(!reader.has("README.TXT").unwrap());
        assert_eq!(reader.file("nope").unwrap_err().kind(), ErrorKind::Lookup);
        assert_eq!(reader.file(2usize).unwrap_err().kind(), ErrorKind::Lookup);
    }

    #[test]
    fn extract_writes_to_sink() {
        let reader = PackReader::from_bytes(sample()).unwrap();
        let mut out = Vec::new();
        reader.extract("readme.txt", &mut out).unwrap();
        reader.extract(1usize, &mut out).unwrap();
        assert_eq!(out, b"abcdefgh\x01\x02\x03");
    }

    #[test]
    fn files_iterates_in_order_and_restarts() {
        let reader = PackReader::from_bytes(sample()).unwrap();
        let names: Vec<_> = reader.files().unwrap().map(|f| f.name().to_vec()).collect();
        assert_eq!(names, vec![b"readme.txt".to_vec(), b"data/x.bin".to_vec()]);

        let mut files = reader.files().unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files.next().unwrap().position(), 0);
        assert_eq!(files.next().unwrap().position(), 1);
        assert!(files.next().is_none());
        assert!(files.next().is_none());
        assert_eq!(reader.files().unwrap().count(), 2);
    }

    #[test]
    fn stream_source_is_repositioned_per_read() {
        let reader = PackReader::from_stream(Cursor::new(sample())).unwrap();
        let mut a = reader.file("readme.txt").unwrap();
        let mut b = reader.file(1usize).unwrap();
        assert_eq!(a.read(3).unwrap(), b"abc");
        assert_eq!(b.read(2).unwrap(), [1, 2]);
        assert_eq!(a.read(2).unwrap(), b"de");
    }

    #[test]
    fn bad_magic_fails_construction() {
        let mut data = sample();
        data[..4].copy_from_slice(b"WAD2");
        let err = PackReader::from_bytes(data).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn truncated_index_is_retryable_error() {
        let mut data = sample();
        data.truncate(data.len() - 10);
        let reader = PackReader::from_bytes(data).unwrap();
        assert_eq!(reader.has("readme.txt").unwrap_err().kind(), ErrorKind::Truncated);
        assert_eq!(reader.files().unwrap_err().kind(), ErrorKind::Truncated);
        // the file count comes from the header alone
        assert_eq!(reader.file_count(), 2);
    }

    #[test]
    fn files_debug_shows_progress() {
        let reader = PackReader::from_bytes(sample()).unwrap();
        let mut files = reader.files().unwrap();
        files.next();
        assert_eq!(format!("{:?}", files), "Files { next: 1, len: 2 }");
    }

    #[test]
    fn two_byte_source_is_truncated_header() {
        let err = PackReader::from_bytes(b"PA".to_vec()).unwrap_err();
        assert!(matches!(err, PackError::TruncatedHeader { actual: 2, .. }));
    }
}
