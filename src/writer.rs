//! In-memory store-only ZIP writer
//!
//! Entries are written in two phases:
//! - `append_file(s)`: local file header + raw data for each entry, recording
//!   the offset where each header starts
//! - `generate`: central directory (one record per entry, pointing back at the
//!   recorded offsets) followed by the end of central directory record
//!
//! Every batch is validated completely before any byte is written, and the
//! buffer is grown once per batch rather than once per entry.

use crate::buffer::{latin1_len, ByteBuffer};
use crate::crc32::crc32;
use crate::datetime::ArchiveTimestamp;
use crate::error::{Result, ZipError};
use crate::options::ArchiveOptions;
use crate::payload::PendingFile;
use std::borrow::Cow;
use std::io::Write;

/// ZIP local file header signature
const LOCAL_FILE_HEADER_SIGNATURE: u32 = 0x04034b50;

/// ZIP central directory signature
const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x02014b50;

/// ZIP end of central directory signature
const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x06054b50;

/// Fixed part of a local file header
pub const LOCAL_HEADER_LEN: usize = 30;
/// Fixed part of a central directory record
pub const CENTRAL_HEADER_LEN: usize = 46;
/// End of central directory record without comment
pub const EOCD_LEN: usize = 22;

/// Version needed to extract: 1.0, stored entries only
const VERSION_NEEDED: u16 = 0x000A;
const METHOD_STORED: u16 = 0;

/// NTFS extra field header id and its timestamp attribute tag
const NTFS_EXTRA_ID: u16 = 0x000A;
const NTFS_EXTRA_DATA_LEN: u16 = 32;
const NTFS_TIMES_TAG: u16 = 0x0001;
const NTFS_TIMES_LEN: u16 = 24;

/// Entry already written to the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedEntry {
    name: String,
    size: u32,
    crc32: u32,
    offset: u32,
}

impl ArchivedEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes (compressed and uncompressed are equal for stored entries)
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn crc32(&self) -> u32 {
        self.crc32
    }

    /// Offset of the entry's local file header within the archive
    pub fn offset(&self) -> u32 {
        self.offset
    }
}

/// Entry that passed validation but has not been written yet
struct StagedEntry<'a> {
    name: &'a str,
    name_len: u16,
    data: Cow<'a, [u8]>,
    crc32: u32,
}

/// Store-only ZIP archive built in memory
///
/// The archive is finalized by [`ZipArchive::generate`], which consumes it:
/// nothing can be appended after the central directory has been written.
///
/// ```
/// use simple_zip::{PendingFile, ZipArchive};
///
/// let mut zip = ZipArchive::new(1024);
/// zip.append_file(&PendingFile::new("hello.txt", "Hello, World!"))?;
/// zip.append_files(&[
///     PendingFile::new("a.bin", vec![0u8, 1, 2]),
///     PendingFile::new("b.txt", "Another file"),
/// ])?;
/// let bytes = zip.generate()?;
/// assert_eq!(&bytes[..4], b"PK\x03\x04");
/// # Ok::<(), simple_zip::ZipError>(())
/// ```
pub struct ZipArchive {
    buf: ByteBuffer,
    entries: Vec<ArchivedEntry>,
    /// Bytes the central directory will need for every entry appended so far
    cdr_accumulate: usize,
    options: ArchiveOptions,
    timestamp: ArchiveTimestamp,
}

impl ZipArchive {
    /// Create an archive with default options.
    ///
    /// `expected_size` only pre-sizes the buffer; it grows on demand.
    pub fn new(expected_size: usize) -> Self {
        Self::with_options(expected_size, ArchiveOptions::default())
    }

    /// Create an archive with custom options
    pub fn with_options(expected_size: usize, options: ArchiveOptions) -> Self {
        let timestamp = ArchiveTimestamp::new(&options.timestamp, &options.dos_offset);
        Self {
            buf: ByteBuffer::new(expected_size),
            entries: Vec::new(),
            cdr_accumulate: 0,
            options,
            timestamp,
        }
    }

    /// Make sure `extra` more bytes can be written without reallocating
    pub fn reserve(&mut self, extra: usize) -> Result<()> {
        self.buf.ensure_remaining(extra)
    }

    /// Entries appended so far, in append order
    pub fn entries(&self) -> &[ArchivedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes written so far
    pub fn position(&self) -> usize {
        self.buf.position()
    }

    /// Current buffer capacity
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Append a single file
    pub fn append_file(&mut self, file: &PendingFile) -> Result<()> {
        self.append_files(std::slice::from_ref(file))
    }

    /// Append a batch of files.
    ///
    /// If any entry is invalid the whole batch is rejected and nothing is written.
    pub fn append_files(&mut self, files: &[PendingFile]) -> Result<()> {
        let cd_record_len = CENTRAL_HEADER_LEN + self.options.central_extra_len();

        let mut staged = Vec::with_capacity(files.len());
        let mut header_accumulate = 0usize;
        let mut cdr_batch = 0usize;

        for file in files {
            let data = file.validate()?;
            let name_len = latin1_len(&file.name);
            let name_len = u16::try_from(name_len).map_err(|_| {
                ZipError::ArchiveTooLarge(format!(
                    "name of '{}' is {} bytes, limit is {}",
                    file.name,
                    name_len,
                    u16::MAX
                ))
            })?;
            if u32::try_from(data.len()).is_err() {
                return Err(ZipError::ArchiveTooLarge(format!(
                    "entry '{}' is {} bytes, limit is {}",
                    file.name,
                    data.len(),
                    u32::MAX
                )));
            }

            header_accumulate += LOCAL_HEADER_LEN + name_len as usize + data.len();
            cdr_batch += cd_record_len + name_len as usize;
            staged.push(StagedEntry {
                name: &file.name,
                name_len,
                crc32: crc32(&data),
                data,
            });
        }

        if self.entries.len() + staged.len() > u16::MAX as usize {
            return Err(ZipError::ArchiveTooLarge(format!(
                "{} entries, limit is {}",
                self.entries.len() + staged.len(),
                u16::MAX
            )));
        }
        // the central directory starts right after the last entry and its
        // offset has to fit in the EOCD
        let central_dir_start = self.buf.position() + header_accumulate;
        if u32::try_from(central_dir_start).is_err() {
            return Err(ZipError::ArchiveTooLarge(format!(
                "entries would end at byte {}, limit is {}",
                central_dir_start,
                u32::MAX
            )));
        }

        self.buf
            .ensure_remaining(header_accumulate + self.cdr_accumulate + cdr_batch + EOCD_LEN)?;
        self.cdr_accumulate += cdr_batch;

        tracing::debug!(
            entries = staged.len(),
            bytes = header_accumulate,
            "appending batch"
        );

        for entry in staged {
            self.write_entry(entry)?;
        }

        Ok(())
    }

    fn write_entry(&mut self, entry: StagedEntry<'_>) -> Result<()> {
        // both fit in u32, checked while staging
        let offset = self.buf.position() as u32;
        let size = entry.data.len() as u32;
        let dos = self.timestamp.dos;

        self.buf.write_u32(LOCAL_FILE_HEADER_SIGNATURE)?;
        self.buf.write_u16(VERSION_NEEDED)?;
        self.buf.write_u16(0)?; // general purpose bit flag
        self.buf.write_u16(METHOD_STORED)?;
        self.buf.write_u16(dos.time())?;
        self.buf.write_u16(dos.date())?;
        self.buf.write_u32(entry.crc32)?;
        self.buf.write_u32(size)?; // compressed size
        self.buf.write_u32(size)?; // uncompressed size
        self.buf.write_u16(entry.name_len)?;
        self.buf.write_u16(0)?; // extra len
        self.buf.write_text(entry.name)?;
        self.buf.append(&entry.data)?;

        tracing::trace!(entry = entry.name, offset, size, "wrote local header");

        self.entries.push(ArchivedEntry {
            name: entry.name.to_string(),
            size,
            crc32: entry.crc32,
            offset,
        });
        Ok(())
    }

    /// Write the central directory and end of central directory record, and
    /// return the finished archive.
    pub fn generate(mut self) -> Result<Vec<u8>> {
        let central_dir_start = self.buf.position();
        let extra_len = self.options.central_extra_len();

        let required: usize = EOCD_LEN
            + self
                .entries
                .iter()
                .map(|e| CENTRAL_HEADER_LEN + latin1_len(&e.name) + extra_len)
                .sum::<usize>();
        self.buf.ensure_remaining(required)?;

        for entry in &self.entries {
            write_central_record(&mut self.buf, entry, &self.options, &self.timestamp)?;
        }

        let central_dir_end = self.buf.position();
        let central_dir_size = u32::try_from(central_dir_end - central_dir_start).map_err(|_| {
            ZipError::ArchiveTooLarge(format!(
                "central directory is {} bytes, limit is {}",
                central_dir_end - central_dir_start,
                u32::MAX
            ))
        })?;
        let central_dir_offset = u32::try_from(central_dir_start).map_err(|_| {
            ZipError::ArchiveTooLarge(format!(
                "central directory starts at byte {}, limit is {}",
                central_dir_start,
                u32::MAX
            ))
        })?;
        // limited to u16::MAX entries while appending
        let count = self.entries.len() as u16;

        self.buf.write_u32(END_OF_CENTRAL_DIRECTORY_SIGNATURE)?;
        self.buf.write_u16(0)?; // disk number
        self.buf.write_u16(0)?; // disk with central dir
        self.buf.write_u16(count)?; // entries on this disk
        self.buf.write_u16(count)?; // total entries
        self.buf.write_u32(central_dir_size)?;
        self.buf.write_u32(central_dir_offset)?;
        self.buf.write_u16(0)?; // comment len

        tracing::debug!(
            entries = count,
            central_dir_offset,
            central_dir_size,
            total = self.buf.position(),
            "generated archive"
        );

        Ok(self.buf.into_bytes())
    }
}

fn write_central_record(
    buf: &mut ByteBuffer,
    entry: &ArchivedEntry,
    options: &ArchiveOptions,
    timestamp: &ArchiveTimestamp,
) -> Result<()> {
    let name_len = latin1_len(&entry.name) as u16;
    let extra_len = options.central_extra_len() as u16;

    buf.write_u32(CENTRAL_DIRECTORY_SIGNATURE)?;
    buf.write_u16(options.version_made_by)?;
    buf.write_u16(VERSION_NEEDED)?;
    buf.write_u16(0)?; // general purpose bit flag
    buf.write_u16(METHOD_STORED)?;
    buf.write_u16(timestamp.dos.time())?;
    buf.write_u16(timestamp.dos.date())?;
    buf.write_u32(entry.crc32)?;
    buf.write_u32(entry.size)?; // compressed size
    buf.write_u32(entry.size)?; // uncompressed size
    buf.write_u16(name_len)?;
    buf.write_u16(extra_len)?;
    buf.write_u16(0)?; // file comment len
    buf.write_u16(0)?; // disk number start
    buf.write_u16(0)?; // internal attrs
    buf.write_u32(options.external_attributes.to_raw())?;
    buf.write_u32(entry.offset)?;
    buf.write_text(&entry.name)?;

    if options.ntfs_timestamps {
        buf.write_u16(NTFS_EXTRA_ID)?;
        buf.write_u16(NTFS_EXTRA_DATA_LEN)?;
        buf.write_u32(0)?; // reserved
        buf.write_u16(NTFS_TIMES_TAG)?;
        buf.write_u16(NTFS_TIMES_LEN)?;
        buf.write_u64(timestamp.ntfs)?; // modified
        buf.write_u64(timestamp.ntfs)?; // accessed
        buf.write_u64(timestamp.ntfs)?; // created
    }
    Ok(())
}

/// Capacity needed to build `files` in one go without reallocating:
/// local header + central record + both copies of the name + data per entry,
/// plus the end of central directory record.
pub fn estimate_archive_size(files: &[PendingFile], options: &ArchiveOptions) -> usize {
    let per_entry = LOCAL_HEADER_LEN + CENTRAL_HEADER_LEN + options.central_extra_len();
    EOCD_LEN
        + files
            .iter()
            .map(|file| {
                let data_len = file.data.as_ref().map_or(0, |data| data.len());
                latin1_len(&file.name) * 2 + per_entry + data_len
            })
            .sum::<usize>()
}

/// Build a complete archive from `files` with default options
pub fn build_archive(files: &[PendingFile]) -> Result<Vec<u8>> {
    build_archive_with(files, ArchiveOptions::default())
}

/// Build a complete archive from `files`
pub fn build_archive_with(files: &[PendingFile], options: ArchiveOptions) -> Result<Vec<u8>> {
    let expected = estimate_archive_size(files, &options);
    let mut zip = ZipArchive::with_options(expected, options);
    zip.append_files(files)?;
    zip.generate()
}

/// Build a complete archive and write it to `writer`, returning the number of
/// bytes written. The archive is assembled in memory first.
pub fn write_to<W: Write>(
    files: &[PendingFile],
    options: ArchiveOptions,
    writer: &mut W,
) -> Result<usize> {
    let bytes = build_archive_with(files, options)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(bytes.len())
}
