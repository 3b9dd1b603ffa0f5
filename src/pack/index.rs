//! Loading the index table into memory.
//!
//! The whole table is fetched with a single positional read and then split
//! into fixed-size records, which keeps the number of requests to one even
//! for remote sources.

use std::collections::HashMap;

use crate::io::ReadAt;

use super::error::{PackError, PackResult};
use super::structures::{Header, IndexRecord, PackEntry};

/// The archive's file table: records in on-disk order plus a name lookup.
///
/// When two records share a name, the lookup points at the later one; both
/// remain reachable by position.
#[derive(Debug, Clone, Default)]
pub struct PackIndex {
    entries: Vec<PackEntry>,
    by_name: HashMap<Vec<u8>, usize>,
}

impl PackIndex {
    /// Read every record described by `header` from `source`.
    pub fn load<R: ReadAt + ?Sized>(source: &R, header: &Header) -> PackResult<Self> {
        let count = header.record_count();
        let offset = header.index_offset as u64;
        let table_len = count * IndexRecord::SIZE;

        tracing::debug!(offset, count, "loading pack index");

        // Avoid allocating for a table the source cannot possibly hold
        let available = source.size().saturating_sub(offset);
        if available < table_len as u64 {
            return Err(PackError::TruncatedIndex {
                position: available as usize / IndexRecord::SIZE,
                count,
            });
        }

        let mut table = vec![0u8; table_len];
        let read = source.read_full_at(offset, &mut table)?;
        if read < table_len {
            return Err(PackError::TruncatedIndex {
                position: read / IndexRecord::SIZE,
                count,
            });
        }

        let mut index = Self {
            entries: Vec::with_capacity(count),
            by_name: HashMap::with_capacity(count),
        };

        for (position, chunk) in table.chunks_exact(IndexRecord::SIZE).enumerate() {
            let mut raw = [0u8; IndexRecord::SIZE];
            raw.copy_from_slice(chunk);
            index.push(PackEntry::from_bytes(&raw, position));
        }

        Ok(index)
    }

    fn push(&mut self, entry: PackEntry) {
        if let Some(previous) = self.by_name.insert(entry.name().to_vec(), entry.position()) {
            tracing::debug!(
                name = %entry.display_name(),
                previous,
                current = entry.position(),
                "duplicate name in pack index, later record wins"
            );
        }
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in on-disk order
    pub fn entries(&self) -> &[PackEntry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> PackResult<&PackEntry> {
        self.entries.get(position).ok_or(PackError::OutOfRange {
            index: position,
            count: self.entries.len(),
        })
    }

    /// Exact, case-sensitive byte match on the stored name
    pub fn find(&self, name: &[u8]) -> PackResult<&PackEntry> {
        self.by_name
            .get(name)
            .map(|&position| &self.entries[position])
            .ok_or_else(|| PackError::NotFound(String::from_utf8_lossy(name).into_owned()))
    }

    pub fn contains(&self, name: &[u8]) -> bool {
        self.by_name.contains_key(name)
    }
}
