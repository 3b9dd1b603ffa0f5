use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use super::error::{PackError, PackResult};

/// PACK header - 12 bytes at offset 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub index_offset: u32,
    pub index_size: u32,
}

impl Header {
    pub const MAGIC: &'static [u8; 4] = b"PACK";
    pub const SIZE: usize = 12;

    /// Verify the leading identifier of a source.
    pub fn check_magic(data: &[u8]) -> PackResult<()> {
        if data.len() < Self::MAGIC.len() {
            return Err(PackError::TruncatedHeader {
                expected: Self::SIZE,
                actual: data.len(),
            });
        }

        let mut found = [0u8; 4];
        found.copy_from_slice(&data[0..4]);
        if &found != Self::MAGIC {
            return Err(PackError::InvalidMagic { found });
        }

        Ok(())
    }

    /// Decode a header, checking the magic before anything else.
    pub fn from_bytes(data: &[u8]) -> PackResult<Self> {
        Self::check_magic(data)?;

        if data.len() < Self::SIZE {
            return Err(PackError::TruncatedHeader {
                expected: Self::SIZE,
                actual: data.len(),
            });
        }

        let mut cursor = Cursor::new(&data[4..Self::SIZE]);

        let header = Self {
            index_offset: cursor.read_u32::<LittleEndian>()?,
            index_size: cursor.read_u32::<LittleEndian>()?,
        };

        if header.index_size as usize % IndexRecord::SIZE != 0 {
            return Err(PackError::MisalignedIndex {
                index_size: header.index_size,
                record_size: IndexRecord::SIZE,
            });
        }

        Ok(header)
    }

    /// Number of index records, always derived from the on-disk record size.
    pub fn record_count(&self) -> usize {
        self.index_size as usize / IndexRecord::SIZE
    }
}

/// Layout of one on-disk index record - 64 bytes
pub struct IndexRecord;

impl IndexRecord {
    pub const NAME_SIZE: usize = 56;
    pub const SIZE: usize = Self::NAME_SIZE + 4 + 4;
}

/// One file in the archive, as loaded from the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    name: Vec<u8>,
    offset: u32,
    size: u32,
    position: usize,
}

impl PackEntry {
    /// Decode a 64-byte index record; `position` is its ordinal in the index.
    pub fn from_bytes(data: &[u8; IndexRecord::SIZE], position: usize) -> Self {
        let raw_name = &data[..IndexRecord::NAME_SIZE];
        let name_len = raw_name
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |last| last + 1);

        Self {
            name: raw_name[..name_len].to_vec(),
            offset: LittleEndian::read_u32(&data[56..60]),
            size: LittleEndian::read_u32(&data[60..64]),
            position,
        }
    }

    /// Stored name with trailing NUL padding removed
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Name as text, replacing invalid UTF-8
    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Name as a relative path that cannot leave the directory it is
    /// joined onto.
    ///
    /// `.` components are dropped. Names that are empty, absolute, carry a
    /// drive prefix or contain `..` fail with [`PackError::UnsafeName`].
    pub fn relative_path(&self) -> PackResult<PathBuf> {
        let name = self.display_name();
        let mut path = PathBuf::new();

        for component in Path::new(name.as_ref()).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(PackError::UnsafeName(name.into_owned()));
                }
            }
        }

        if path.as_os_str().is_empty() {
            return Err(PackError::UnsafeName(name.into_owned()));
        }
        Ok(path)
    }

    /// Byte offset of the content from the start of the archive
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Ordinal within the index
    pub fn position(&self) -> usize {
        self.position
    }
}
