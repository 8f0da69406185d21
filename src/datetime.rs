//! Archive timestamps: MS-DOS packed date/time and NTFS ticks

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike, Utc};

/// Seconds between 1601-01-01 (NTFS epoch) and 1970-01-01 (Unix epoch)
const NTFS_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;
/// NTFS ticks are 100 ns
const NTFS_TICKS_PER_SEC: i64 = 10_000_000;

/// A date and time stored as per the MS-DOS representation used by ZIP files.
///
/// `time` is `hour << 11 | minute << 5 | second / 2` and `date` is
/// `(year - 1980) << 9 | month << 5 | day`.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct ZipDateTime {
    date: u16,
    time: u16,
}

impl ZipDateTime {
    /// Construct from already packed values
    pub fn from_raw(date: u16, time: u16) -> Self {
        Self { date, time }
    }

    /// Pack the wall-clock fields of `dt` in its own time zone. Values outside
    /// 1980..=2107 are clamped to the nearest representable instant.
    ///
    /// DOS fields carry no zone; readers display them as local time.
    pub fn from_chrono<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        let dt = dt.naive_local();
        let year = dt.year();
        if year < 1980 {
            return Self::pack(1980, 1, 1, 0, 0, 0);
        }
        if year > 2107 {
            return Self::pack(2107, 12, 31, 23, 59, 58);
        }
        Self::pack(
            year as u32,
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            // leap seconds show up as 60
            dt.second().min(59),
        )
    }

    fn pack(year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        let date = ((year - 1980) << 9) | (month << 5) | day;
        let time = (hour << 11) | (minute << 5) | (second / 2);
        Self {
            date: date as u16,
            time: time as u16,
        }
    }

    /// Packed DOS date
    pub fn date(&self) -> u16 {
        self.date
    }

    /// Packed DOS time
    pub fn time(&self) -> u16 {
        self.time
    }

    pub fn year(&self) -> i32 {
        (((self.date & 0xFE00) >> 9) + 1980).into()
    }

    pub fn month(&self) -> u32 {
        ((self.date & 0x1E0) >> 5).into()
    }

    pub fn day(&self) -> u32 {
        (self.date & 0x1F).into()
    }

    pub fn hour(&self) -> u32 {
        ((self.time & 0xF800) >> 11).into()
    }

    pub fn minute(&self) -> u32 {
        ((self.time & 0x7E0) >> 5).into()
    }

    /// MS-DOS has a granularity of two seconds.
    pub fn second(&self) -> u32 {
        ((self.time & 0x1F) << 1).into()
    }
}

impl From<&DateTime<Utc>> for ZipDateTime {
    fn from(value: &DateTime<Utc>) -> Self {
        Self::from_chrono(value)
    }
}

/// Convert to NTFS ticks (100 ns units since 1601-01-01 UTC).
///
/// Instants before 1601 saturate to zero.
pub fn ntfs_ticks(dt: &DateTime<Utc>) -> u64 {
    let secs = dt.timestamp() + NTFS_EPOCH_OFFSET_SECS;
    if secs < 0 {
        return 0;
    }
    let sub = i64::from(dt.timestamp_subsec_nanos() / 100);
    (secs as u64)
        .saturating_mul(NTFS_TICKS_PER_SEC as u64)
        .saturating_add(sub as u64)
}

/// The single creation time shared by every entry of an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveTimestamp {
    pub dos: ZipDateTime,
    pub ntfs: u64,
}

impl ArchiveTimestamp {
    /// NTFS ticks are zone independent; the DOS fields are packed from the
    /// wall clock at `dos_offset`.
    pub fn new(dt: &DateTime<Utc>, dos_offset: &FixedOffset) -> Self {
        Self {
            dos: ZipDateTime::from_chrono(&dt.with_timezone(dos_offset)),
            ntfs: ntfs_ticks(dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_dos_fields() {
        let dt = Utc.with_ymd_and_hms(2018, 9, 4, 18, 39, 48).unwrap();
        let packed = ZipDateTime::from_chrono(&dt);
        assert_eq!(packed.time(), 0x94F8);
        assert_eq!(packed.date(), 0x4D24);

        assert_eq!(packed.year(), 2018);
        assert_eq!(packed.month(), 9);
        assert_eq!(packed.day(), 4);
        assert_eq!(packed.hour(), 18);
        assert_eq!(packed.minute(), 39);
        assert_eq!(packed.second(), 48);
    }

    #[test]
    fn odd_seconds_round_down() {
        let dt = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        assert_eq!(ZipDateTime::from_chrono(&dt).second(), 58);
    }

    #[test]
    fn clamps_out_of_range_years() {
        let early = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        let packed = ZipDateTime::from_chrono(&early);
        assert_eq!((packed.year(), packed.month(), packed.day()), (1980, 1, 1));
        assert_eq!(packed.time(), 0);

        let late = Utc.with_ymd_and_hms(2200, 6, 1, 12, 0, 0).unwrap();
        let packed = ZipDateTime::from_chrono(&late);
        assert_eq!((packed.year(), packed.month(), packed.day()), (2107, 12, 31));
        assert_eq!(packed.second(), 58);
    }

    #[test]
    fn ntfs_tick_conversion() {
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(ntfs_ticks(&epoch), 116_444_736_000_000_000);

        let dt = Utc.timestamp_opt(1, 500).unwrap();
        assert_eq!(ntfs_ticks(&dt), 116_444_736_000_000_000 + 10_000_000 + 5);
    }

    #[test]
    fn archive_timestamp_combines_both() {
        let dt = Utc.with_ymd_and_hms(2018, 9, 4, 18, 39, 48).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let ts = ArchiveTimestamp::new(&dt, &utc);
        assert_eq!(ts.dos, ZipDateTime::from_raw(0x4D24, 0x94F8));
        assert_eq!(ts.ntfs, ntfs_ticks(&dt));
    }

    #[test]
    fn dos_fields_follow_the_offset() {
        let dt = Utc.with_ymd_and_hms(2018, 9, 4, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let ts = ArchiveTimestamp::new(&dt, &plus_two);

        // 23:30 UTC is 01:30 the next day at +02:00
        assert_eq!((ts.dos.year(), ts.dos.month(), ts.dos.day()), (2018, 9, 5));
        assert_eq!((ts.dos.hour(), ts.dos.minute()), (1, 30));
        // the instant itself does not move
        assert_eq!(ts.ntfs, ntfs_ticks(&dt));

        let zoned = dt.with_timezone(&plus_two);
        assert_eq!(ZipDateTime::from_chrono(&zoned), ts.dos);
    }
}
