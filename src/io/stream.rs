use super::ReadAt;
use parking_lot::Mutex;
use std::io::{self, Read, Seek, SeekFrom};

/// Random access over a caller-supplied `Read + Seek` stream
///
/// The stream has a single cursor, so each `read_at` holds the lock for one
/// seek followed by one read. Nothing outside the lock ever observes the
/// cursor.
pub struct StreamReader<S> {
    stream: Mutex<S>,
    size: u64,
}

impl<S: Read + Seek> StreamReader<S> {
    /// Wrap a stream, measuring its length by seeking to the end.
    pub fn new(mut stream: S) -> io::Result<Self> {
        let size = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(0))?;
        Ok(Self {
            stream: Mutex::new(stream),
            size,
        })
    }

    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}

impl<S: Read + Seek> ReadAt for StreamReader<S> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut stream = self.stream.lock();
        stream.seek(SeekFrom::Start(offset))?;
        stream.read(buf)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_ignore_previous_cursor() {
        let reader = StreamReader::new(Cursor::new(b"hello world".to_vec())).unwrap();
        assert_eq!(reader.size(), 11);

        let mut buf = [0u8; 5];
        reader.read_full_at(6, &mut buf).unwrap();
        assert_eq!(&buf, b"world");
        reader.read_full_at(0, &mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn measuring_leaves_stream_rewound() {
        let reader = StreamReader::new(Cursor::new(vec![0u8; 32])).unwrap();
        assert_eq!(reader.into_inner().position(), 0);
    }
}
