mod http;
mod local;
mod memory;
mod stream;

pub use http::HttpRangeReader;
pub use local::LocalFileReader;
pub use memory::MemoryReader;
pub use stream::StreamReader;

use std::io;
use std::sync::Arc;

/// Trait for random access reading from a data source
///
/// Every read names its absolute offset, so any number of readers can share
/// one source without tracking where a previous caller left a cursor.
pub trait ReadAt {
    /// Read data at the specified offset into the buffer
    ///
    /// Returns the number of bytes read, which may be less than `buf.len()`.
    /// A return of `0` for a non-empty buffer means the offset is at or past
    /// the end of the source.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Keep reading at increasing offsets until `buf` is full or the source
    /// runs out, returning how many bytes were filled.
    fn read_full_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read_at(offset + filled as u64, &mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<T: ReadAt + ?Sized> ReadAt for &T {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

impl<T: ReadAt + ?Sized> ReadAt for Arc<T> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}
