//! Works out which day's menu a run is about.
//!
//! The site posts the lunch menu late in the morning, so before the cutoff
//! hour a run still looks at the previous day.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Timelike, Utc, Weekday};

/// Japanese weekday names, Sunday first.
const WEEKDAY_KANJI: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];

pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;
pub const DEFAULT_CUTOFF_HOUR: u32 = 11;

#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    offset: FixedOffset,
    cutoff_hour: u32,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(Self::default_offset(), DEFAULT_CUTOFF_HOUR)
    }
}

impl Calendar {
    pub const fn new(offset: FixedOffset, cutoff_hour: u32) -> Self {
        Self {
            offset,
            cutoff_hour,
        }
    }

    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn default_offset() -> FixedOffset {
        FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600).expect("+9 is a valid offset")
    }

    /// `None` when `hours` is not a valid UTC offset.
    pub fn offset_from_hours(hours: i32) -> Option<FixedOffset> {
        hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
    }

    pub fn today(&self) -> ResolvedDate {
        self.resolve(Utc::now())
    }

    pub fn resolve(&self, now: DateTime<Utc>) -> ResolvedDate {
        let mut local = now.with_timezone(&self.offset);
        tracing::info!("The current time is {local}");
        if local.hour() < self.cutoff_hour {
            local -= Duration::days(1);
        }
        ResolvedDate { instant: local }
    }
}

/// The day a run resolved to, in the site's timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDate {
    instant: DateTime<FixedOffset>,
}

impl ResolvedDate {
    pub const fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }

    pub fn year(&self) -> i32 {
        self.instant.year()
    }

    pub fn month(&self) -> u32 {
        self.instant.month()
    }

    pub fn day(&self) -> u32 {
        self.instant.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.instant.weekday()
    }

    /// 0 = Sunday .. 6 = Saturday
    pub fn weekday_index(&self) -> u32 {
        self.weekday().num_days_from_sunday()
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn timestamp(&self) -> i64 {
        self.instant.timestamp()
    }

    /// e.g. `2024年6月27日(木)`
    pub fn japanese(&self) -> String {
        let kanji = WEEKDAY_KANJI[self.weekday_index() as usize];
        format!(
            "{}年{}月{}日({kanji})",
            self.year(),
            self.month(),
            self.day()
        )
    }
}

#[cfg(test)]
pub(crate) fn date_at(y: i32, m: u32, d: u32, hour: u32) -> ResolvedDate {
    use chrono::TimeZone;
    let instant = Calendar::default_offset()
        .with_ymd_and_hms(y, m, d, hour, 0, 0)
        .single()
        .expect("test date should be valid");
    ResolvedDate { instant }
}
