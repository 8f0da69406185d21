//! Archive-wide configuration

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};

/// Value written to the "external file attributes" field of every
/// central-directory record.
///
/// Tools interpret this field according to the host byte of
/// `version_made_by`, so pick the variant matching the platform convention
/// you target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExternalAttributes {
    /// Unix regular file, mode 0644 (`0o100644 << 16`)
    #[default]
    UnixRegularFile,
    /// The literal `0x00000002` written by earlier releases
    Legacy,
    /// Any other raw value
    Custom(u32),
}

impl ExternalAttributes {
    pub fn to_raw(self) -> u32 {
        match self {
            ExternalAttributes::UnixRegularFile => 0o100644 << 16,
            ExternalAttributes::Legacy => 0x0000_0002,
            ExternalAttributes::Custom(raw) => raw,
        }
    }
}

/// Configuration for a [`ZipArchive`](crate::ZipArchive)
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Add an NTFS timestamp extra field to each central-directory record (default: false)
    pub ntfs_timestamps: bool,
    /// External attributes constant (default: Unix regular file)
    pub external_attributes: ExternalAttributes,
    /// "Version made by" field (default: 0x033F, Unix host, APPNOTE 6.3)
    pub version_made_by: u16,
    /// Creation time shared by all entries (default: now)
    pub timestamp: DateTime<Utc>,
    /// Zone whose wall clock is packed into the DOS date/time fields. ZIP
    /// readers show those fields as local time, so this defaults to the
    /// machine's local offset; NTFS ticks are always UTC.
    pub dos_offset: FixedOffset,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        let now = Local::now();
        Self {
            ntfs_timestamps: false,
            external_attributes: ExternalAttributes::default(),
            version_made_by: 0x033F,
            timestamp: now.with_timezone(&Utc),
            dos_offset: *now.offset(),
        }
    }
}

impl ArchiveOptions {
    /// Byte-for-byte compatible with earlier releases: fixed timestamp
    /// (2018-09-04 18:39:48, DOS time 0x94F8 / date 0x4D24), legacy external
    /// attributes and no NTFS block.
    pub fn legacy() -> Self {
        Self {
            ntfs_timestamps: false,
            external_attributes: ExternalAttributes::Legacy,
            version_made_by: 0x033F,
            timestamp: Utc
                .with_ymd_and_hms(2018, 9, 4, 18, 39, 48)
                .single()
                .unwrap_or_default(),
            dos_offset: Utc.fix(),
        }
    }

    /// Enable or disable the NTFS timestamp extra field
    pub fn with_ntfs_timestamps(mut self, enabled: bool) -> Self {
        self.ntfs_timestamps = enabled;
        self
    }

    /// Set the external attributes constant
    pub fn with_external_attributes(mut self, attributes: ExternalAttributes) -> Self {
        self.external_attributes = attributes;
        self
    }

    /// Set the "version made by" field
    pub fn with_version_made_by(mut self, version: u16) -> Self {
        self.version_made_by = version;
        self
    }

    /// Set the creation time used for every entry; DOS fields are packed in UTC
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self.dos_offset = Utc.fix();
        self
    }

    /// Set the creation time and pack the DOS fields in `timestamp`'s own zone
    pub fn with_zoned_timestamp<Tz: TimeZone>(mut self, timestamp: DateTime<Tz>) -> Self {
        self.dos_offset = timestamp.offset().fix();
        self.timestamp = timestamp.with_timezone(&Utc);
        self
    }

    /// Size of the extra field attached to each central-directory record
    pub fn central_extra_len(&self) -> usize {
        if self.ntfs_timestamps {
            NTFS_EXTRA_FIELD_LEN
        } else {
            0
        }
    }
}

/// Tag (2) + size (2) + reserved (4) + attribute tag (2) + size (2) + 3 x 8 byte times
pub(crate) const NTFS_EXTRA_FIELD_LEN: usize = 36;
