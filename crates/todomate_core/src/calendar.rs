//! Week-boundary arithmetic over local calendar days.
//!
//! # Responsibility
//! - Normalize timestamps to canonical week starts (Monday 00:00 local).
//! - Navigate between weeks and format week ranges for display.
//! - Guard navigation so callers never move past the current week.
//!
//! # Invariants
//! - Arithmetic runs on calendar dates; time-of-day never leaks into
//!   week-boundary comparisons.
//! - Sunday belongs to the week that started the previous Monday.
//! - `week_start(week_start(t)) == week_start(t)`.
//! - Timestamps chrono cannot represent are returned unchanged.

use chrono::{
    DateTime, Datelike, Days, Duration, Local, NaiveDate, NaiveDateTime, TimeZone,
};

const DAYS_PER_WEEK: u64 = 7;
const GAP_PROBE_STEPS: i64 = 4;
const GAP_PROBE_MINUTES: i64 = 30;

/// Inclusive millisecond bounds of one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekWindow {
    /// Monday 00:00:00.000 local.
    pub start_ms: i64,
    /// Sunday 23:59:59.999 local.
    pub end_ms: i64,
}

impl WeekWindow {
    pub fn contains(&self, timestamp_ms: i64) -> bool {
        (self.start_ms..=self.end_ms).contains(&timestamp_ms)
    }
}

/// Week arithmetic bound to one timezone.
#[derive(Debug, Clone)]
pub struct WeekCalendar<Tz: TimeZone> {
    tz: Tz,
}

impl WeekCalendar<Local> {
    /// Calendar in the process-local timezone.
    pub fn local() -> Self {
        Self::new(Local)
    }
}

impl Default for WeekCalendar<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz: TimeZone> WeekCalendar<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Returns the Monday 00:00 local of the week containing `timestamp_ms`.
    pub fn week_start(&self, timestamp_ms: i64) -> i64 {
        self.monday_of(timestamp_ms)
            .and_then(|monday| self.start_of_day(monday))
            .unwrap_or(timestamp_ms)
    }

    /// Returns Sunday 23:59:59.999 local of the week starting at `week_start`.
    ///
    /// Non-canonical input is normalized first.
    pub fn week_end(&self, week_start: i64) -> i64 {
        self.monday_of(week_start)
            .and_then(|monday| monday.checked_add_days(Days::new(DAYS_PER_WEEK - 1)))
            .and_then(|sunday| sunday.and_hms_milli_opt(23, 59, 59, 999))
            .and_then(|last| self.tz.from_local_datetime(&last).latest())
            .map(|dt| dt.timestamp_millis())
            .unwrap_or_else(|| self.next_week_start(week_start).saturating_sub(1))
    }

    /// Returns the canonical start of the week before `week_start`.
    pub fn previous_week_start(&self, week_start: i64) -> i64 {
        self.shift_weeks(week_start, -1)
    }

    /// Returns the canonical start of the week after `week_start`.
    pub fn next_week_start(&self, week_start: i64) -> i64 {
        self.shift_weeks(week_start, 1)
    }

    /// Formats `"M/D ~ M/D"` from the week's Monday to its Sunday.
    pub fn format_range(&self, week_start: i64) -> String {
        let Some(monday) = self.monday_of(week_start) else {
            return String::new();
        };
        let sunday = monday
            .checked_add_days(Days::new(DAYS_PER_WEEK - 1))
            .unwrap_or(monday);
        format!(
            "{}/{} ~ {}/{}",
            monday.month(),
            monday.day(),
            sunday.month(),
            sunday.day()
        )
    }

    /// Returns the inclusive bounds for the week containing `week_start`.
    pub fn window(&self, week_start: i64) -> WeekWindow {
        let start_ms = self.week_start(week_start);
        WeekWindow {
            start_ms,
            end_ms: self.week_end(start_ms),
        }
    }

    /// Returns whether `target_week_start` may be viewed at `now_ms`.
    ///
    /// Weeks strictly after the current one are not navigable.
    pub fn is_navigable(&self, target_week_start: i64, now_ms: i64) -> bool {
        self.week_start(target_week_start) <= self.week_start(now_ms)
    }

    pub fn is_current_week(&self, week_start: i64, now_ms: i64) -> bool {
        self.week_start(week_start) == self.week_start(now_ms)
    }

    fn shift_weeks(&self, week_start: i64, weeks: i64) -> i64 {
        let Some(monday) = self.monday_of(week_start) else {
            return week_start;
        };
        let days = Days::new(DAYS_PER_WEEK * weeks.unsigned_abs());
        let shifted = if weeks < 0 {
            monday.checked_sub_days(days)
        } else {
            monday.checked_add_days(days)
        };
        shifted
            .and_then(|date| self.start_of_day(date))
            .unwrap_or(week_start)
    }

    fn monday_of(&self, timestamp_ms: i64) -> Option<NaiveDate> {
        let date = self
            .tz
            .timestamp_millis_opt(timestamp_ms)
            .single()?
            .date_naive();
        let back = u64::from(date.weekday().num_days_from_monday());
        date.checked_sub_days(Days::new(back))
    }

    fn start_of_day(&self, date: NaiveDate) -> Option<i64> {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        first_valid_instant(&self.tz, midnight).map(|dt| dt.timestamp_millis())
    }
}

// DST transitions can skip local midnight; take the first instant that exists.
fn first_valid_instant<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    (0..=GAP_PROBE_STEPS).find_map(|step| {
        let candidate = local.checked_add_signed(Duration::minutes(GAP_PROBE_MINUTES * step))?;
        tz.from_local_datetime(&candidate).earliest()
    })
}

/// [`WeekCalendar::week_start`] in the local timezone.
pub fn week_start(timestamp_ms: i64) -> i64 {
    WeekCalendar::local().week_start(timestamp_ms)
}

/// [`WeekCalendar::week_end`] in the local timezone.
pub fn week_end(week_start: i64) -> i64 {
    WeekCalendar::local().week_end(week_start)
}

/// [`WeekCalendar::previous_week_start`] in the local timezone.
pub fn previous_week_start(week_start: i64) -> i64 {
    WeekCalendar::local().previous_week_start(week_start)
}

/// [`WeekCalendar::next_week_start`] in the local timezone.
pub fn next_week_start(week_start: i64) -> i64 {
    WeekCalendar::local().next_week_start(week_start)
}

/// [`WeekCalendar::format_range`] in the local timezone.
pub fn format_week_range(week_start: i64) -> String {
    WeekCalendar::local().format_range(week_start)
}

#[cfg(test)]
mod tests {
    use super::{WeekCalendar, WeekWindow};
    use chrono::{FixedOffset, TimeZone, Utc};

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    const WEEK_MS: i64 = 7 * DAY_MS;

    fn seoul() -> WeekCalendar<FixedOffset> {
        WeekCalendar::new(FixedOffset::east_opt(9 * 3600).expect("valid offset"))
    }

    fn seoul_ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        FixedOffset::east_opt(9 * 3600)
            .expect("valid offset")
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("valid local time")
            .timestamp_millis()
    }

    fn samples() -> Vec<i64> {
        // 2024-01-01 (Monday) through ~3 weeks in 7h13m steps, plus odd edges.
        let base = seoul_ms(2024, 1, 1, 0, 0);
        let mut values = (0..80)
            .map(|i| base + i * (7 * 3_600_000 + 13 * 60_000))
            .collect::<Vec<_>>();
        values.push(0);
        values.push(seoul_ms(2024, 2, 29, 23, 59));
        values.push(seoul_ms(2023, 12, 31, 23, 59));
        values
    }

    #[test]
    fn wednesday_normalizes_to_monday_midnight() {
        let cal = seoul();
        let wednesday = seoul_ms(2024, 5, 15, 14, 30);
        assert_eq!(cal.week_start(wednesday), seoul_ms(2024, 5, 13, 0, 0));
    }

    #[test]
    fn sunday_belongs_to_previous_monday() {
        let cal = seoul();
        let sunday_night = seoul_ms(2024, 5, 19, 23, 59);
        assert_eq!(cal.week_start(sunday_night), seoul_ms(2024, 5, 13, 0, 0));
        let monday = seoul_ms(2024, 5, 20, 0, 0);
        assert_eq!(cal.week_start(monday), monday);
    }

    #[test]
    fn week_start_is_idempotent_and_brackets_input() {
        let cal = seoul();
        for t in samples() {
            let start = cal.week_start(t);
            assert_eq!(cal.week_start(start), start, "t={t}");
            assert!(start <= t && t < start + WEEK_MS, "t={t} start={start}");
        }
    }

    #[test]
    fn week_end_is_last_millisecond_of_sunday() {
        let cal = seoul();
        for t in samples() {
            let start = cal.week_start(t);
            assert_eq!(cal.week_end(start), start + 6 * DAY_MS + DAY_MS - 1);
        }
    }

    #[test]
    fn previous_of_next_is_identity() {
        let cal = seoul();
        for t in samples() {
            let start = cal.week_start(t);
            assert_eq!(cal.previous_week_start(cal.next_week_start(start)), start);
            assert_eq!(cal.next_week_start(start), start + WEEK_MS);
        }
    }

    #[test]
    fn utc_calendar_uses_utc_midnight() {
        let cal = WeekCalendar::new(Utc);
        let thursday = Utc
            .with_ymd_and_hms(1970, 1, 1, 12, 0, 0)
            .single()
            .expect("valid")
            .timestamp_millis();
        // 1970-01-01 was a Thursday; its week started Monday 1969-12-29.
        assert_eq!(cal.week_start(thursday), -3 * DAY_MS);
    }

    #[test]
    fn format_range_spans_month_boundary_without_padding() {
        let cal = seoul();
        let start = cal.week_start(seoul_ms(2024, 1, 31, 9, 0));
        assert_eq!(cal.format_range(start), "1/29 ~ 2/4");
    }

    #[test]
    fn navigation_guard_blocks_future_weeks_only() {
        let cal = seoul();
        let now = seoul_ms(2024, 5, 15, 10, 0);
        let current = cal.week_start(now);
        assert!(cal.is_navigable(current, now));
        assert!(cal.is_navigable(cal.previous_week_start(current), now));
        assert!(!cal.is_navigable(cal.next_week_start(current), now));
        assert!(cal.is_current_week(current, now));
    }

    #[test]
    fn window_contains_whole_week_inclusive() {
        let cal = seoul();
        let start = seoul_ms(2024, 5, 13, 0, 0);
        let window = cal.window(seoul_ms(2024, 5, 16, 8, 0));
        assert_eq!(
            window,
            WeekWindow {
                start_ms: start,
                end_ms: start + WEEK_MS - 1
            }
        );
        assert!(window.contains(start));
        assert!(window.contains(start + WEEK_MS - 1));
        assert!(!window.contains(start + WEEK_MS));
        assert!(!window.contains(start - 1));
    }
}
