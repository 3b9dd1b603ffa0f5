//! # packfile
//!
//! Reader for id Software PACK (`.pak`) archives, as used by Quake and Quake II.
//!
//! Archives can be read from the local filesystem, from memory, from any
//! `Read + Seek` stream, or from a remote HTTP server. Remote archives are
//! read with HTTP Range requests, so listing an archive only fetches its
//! header and index.
//!
//! ## Features
//!
//! - Lazy index loading: opening an archive reads only its 12-byte header
//! - Lookup by exact name or by position
//! - Independent per-file cursors over a single shared source
//! - Extraction to any `Write` sink or to a path
//!
//! ## Example
//!
//! ```no_run
//! use packfile::PackReader;
//!
//! fn main() -> anyhow::Result<()> {
//!     let reader = PackReader::open("id1/pak0.pak")?;
//!
//!     for file in reader.files()? {
//!         println!("{} ({} bytes)", file.display_name(), file.size());
//!     }
//!
//!     let config = reader.file("default.cfg")?.contents()?;
//!     println!("{}", String::from_utf8_lossy(&config));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Every read is positional, so views never depend on where another view
//! left a cursor. Sources built from a `Read + Seek` stream serialize their
//! seek-then-read pairs behind a lock.

pub mod cli;
pub mod io;
pub mod pack;

pub use cli::{Cli, ExitCode};
pub use io::{HttpRangeReader, LocalFileReader, MemoryReader, ReadAt, StreamReader};
pub use pack::{ErrorKind, PackEntry, PackError, PackFile, PackReader, PackResult};
