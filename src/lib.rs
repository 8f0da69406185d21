//! # simple-zip: In-Memory Store-Only ZIP Builder
//!
//! `simple-zip` assembles valid ZIP archives in memory from named byte payloads.
//! Entries are stored without compression, so the output is readable by any
//! standard unzip tool and the whole build is a single pass over the data.
//!
//! ## Features
//!
//! - **Store-only**: method 0, compressed size equals uncompressed size
//! - **Batch sizing**: the buffer grows once per batch, exact-fit, no reallocation storms
//! - **Atomic batches**: an invalid entry rejects the whole batch before any byte is written
//! - **Timestamps**: one DOS date/time per archive, optional NTFS extra field
//!
//! Not supported: compression, ZIP64, encryption, multi-disk archives.
//!
//! ## Quick Start
//!
//! ### One-shot build
//!
//! ```
//! use simple_zip::{build_archive, PendingFile};
//!
//! let files = vec![
//!     PendingFile::new("FirstFile.txt", "The contents"),
//!     PendingFile::new("SecondFile.txt", b"Also, the contents".to_vec()),
//! ];
//! let bytes = build_archive(&files)?;
//! assert_eq!(&bytes[..2], b"PK");
//! # Ok::<(), simple_zip::ZipError>(())
//! ```
//!
//! ### Incremental build
//!
//! ```
//! use simple_zip::{ArchiveOptions, PendingFile, ZipArchive};
//!
//! let options = ArchiveOptions::default().with_ntfs_timestamps(true);
//! let mut zip = ZipArchive::with_options(4096, options);
//!
//! zip.append_file(&PendingFile::new("readme.txt", "hello"))?;
//! zip.append_files(&[
//!     PendingFile::new("data/a.bin", vec![1u8, 2, 3]),
//!     PendingFile::new("data/b.bin", vec![4u8, 5, 6]),
//! ])?;
//!
//! // generate() consumes the archive
//! let bytes = zip.generate()?;
//! println!("Created ZIP with {} bytes", bytes.len());
//! # Ok::<(), simple_zip::ZipError>(())
//! ```
//!
//! ### Text payloads and names
//!
//! Text is written one byte per character using the low 8 bits of each code
//! point (Latin-1). Characters above U+00FF are truncated; encode such text to
//! bytes yourself (e.g. `s.as_bytes().to_vec()` for UTF-8) before archiving.

pub mod buffer;
pub mod crc32;
pub mod datetime;
pub mod error;
pub mod options;
pub mod payload;
pub mod writer;

pub use buffer::ByteBuffer;
pub use crc32::{crc32, Crc32};
pub use datetime::ZipDateTime;
pub use error::{Result, ZipError};
pub use options::{ArchiveOptions, ExternalAttributes};
pub use payload::{Payload, PendingFile};
pub use writer::{
    build_archive, build_archive_with, estimate_archive_size, write_to, ArchivedEntry, ZipArchive,
};
