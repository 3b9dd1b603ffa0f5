//! PACK archive parsing and reading.
//!
//! This module reads the archive format used by Quake and other id Software
//! games: a flat set of named files behind a 12-byte header and an index of
//! fixed-size records.
//!
//! ## Architecture
//!
//! - [`structures`]: the on-disk header and index record layouts
//! - [`index`]: loading the index table into an ordered list and name map
//! - [`file`]: [`PackFile`], a cursor-bearing view onto one archived file
//! - [`reader`]: [`PackReader`], the high-level API for end users
//!
//! ## PACK Format Overview
//!
//! ```text
//! offset 0:            "PACK"
//! offset 4:            index offset, u32 little-endian
//! offset 8:            index size in bytes, u32 little-endian
//! offset index offset: index size / 64 records of
//!                        56 bytes  name, NUL padded
//!                         4 bytes  file offset, u32 little-endian
//!                         4 bytes  file size, u32 little-endian
//! ```
//!
//! File content lives wherever a record's offset points, usually between
//! the header and the index.
//!
//! ## Names
//!
//! Names are compared as raw bytes. There is no case folding and no path
//! normalization. If two records carry the same name, lookup by name returns
//! the later one; both are still reachable by position.
//!
//! ## Limitations
//!
//! - Read only, no archive creation
//! - No compression or checksums (the format has neither)

pub mod error;
pub mod file;
pub mod index;
pub mod reader;
pub mod structures;

pub use error::{ErrorKind, PackError, PackResult};
pub use file::PackFile;
pub use index::PackIndex;
pub use reader::{Files, Lookup, PackReader};
pub use structures::{Header, IndexRecord, PackEntry};
