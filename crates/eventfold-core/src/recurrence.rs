//! Recurrence rules and occurrence generation.
//!
//! A stored event carries its rule as a loosely typed [`RecurrencePattern`]
//! (the shape the content store persists). Before expansion the pattern is
//! validated into a [`RecurrenceRule`]; a pattern that cannot be validated is
//! an [`ExpansionError`] and the event is dropped by the caller.
//!
//! [`OccurrenceGenerator`] turns `(event, rule, exceptions)` into an ordered
//! list of [`Occurrence`]s. Generation is pure and always terminates: each
//! frequency has a hard cap on emitted occurrences ([`GenerationLimits`]),
//! independent of the rule's own end date.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{Event, Occurrence};
use crate::time::{
    first_of_month_after, last_weekday_of_month, nth_weekday_of_month, parse_date,
    weekday_from_index, weekday_index,
};

/// Errors raised while validating or expanding a recurring event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    /// The base event has no start date.
    #[error("event has no start date")]
    MissingStartDate,

    /// The event has no recurrence pattern.
    #[error("event is not recurring")]
    NotRecurring,

    /// The pattern type is not daily, weekly or monthly.
    #[error("unknown recurrence type: {0}")]
    UnknownType(String),

    /// The interval is not a positive integer.
    #[error("invalid recurrence interval: {0}")]
    InvalidInterval(String),

    /// A weekday number outside `0..=6`.
    #[error("invalid weekday: {0}")]
    InvalidWeekday(String),

    /// A week-of-month outside `1..=5` and not `-1`.
    #[error("invalid week of month: {0}")]
    InvalidWeekOfMonth(String),

    /// A day-of-month outside `1..=31`.
    #[error("invalid day of month: {0}")]
    InvalidDayOfMonth(String),

    /// A monthly pattern lacks the field its mode needs.
    #[error("recurrence pattern is missing {0}")]
    MissingField(&'static str),

    /// A date field could not be parsed.
    #[error("invalid {field}: {value}")]
    InvalidDate {
        /// Name of the offending field.
        field: &'static str,
        /// The raw value.
        value: String,
    },
}

/// A number that the store may have persisted either as a JSON number or as
/// a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    /// A JSON integer.
    Int(i64),
    /// A string expected to hold an integer.
    Text(String),
}

impl Numeric {
    /// Returns the integer value, if any.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for Numeric {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

/// A recurrence pattern as persisted alongside an event.
///
/// ```json
/// { "type": "monthly", "interval": 1, "monthlyType": "weekday",
///   "monthlyWeekday": "-1,5", "endDate": "2025-12-31" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePattern {
    /// `none`, `daily`, `weekly` or `monthly`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Repeat every N units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<Numeric>,
    /// Weekday numbers (`0 = Sunday`) for weekly patterns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<Numeric>,
    /// Inclusive last date, `YYYY-MM-DD`. Empty means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// `date` or `weekday` for monthly patterns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_type: Option<String>,
    /// Day of month for `monthlyType = date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_date: Option<Numeric>,
    /// `"week,weekday"` for `monthlyType = weekday`, e.g. `"2,1"` for the
    /// second Monday or `"-1,5"` for the last Friday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_weekday: Option<String>,
}

impl RecurrencePattern {
    fn with_kind(kind: &str, interval: Option<u32>) -> Self {
        Self {
            kind: kind.to_string(),
            interval: interval.map(|n| Numeric::Int(i64::from(n))),
            weekdays: Vec::new(),
            end_date: None,
            monthly_type: None,
            monthly_date: None,
            monthly_weekday: None,
        }
    }

    /// A pattern meaning "does not repeat".
    pub fn none() -> Self {
        Self::with_kind("none", None)
    }

    /// Every `interval` days.
    pub fn daily(interval: u32) -> Self {
        Self::with_kind("daily", Some(interval))
    }

    /// Every `interval` weeks on the given weekdays (`0 = Sunday`).
    pub fn weekly(interval: u32, weekdays: &[u8]) -> Self {
        let mut pattern = Self::with_kind("weekly", Some(interval));
        pattern.weekdays = weekdays.iter().map(|d| Numeric::Int(i64::from(*d))).collect();
        pattern
    }

    /// Every `interval` months on a fixed day of the month.
    pub fn monthly_by_date(interval: u32, day: u32) -> Self {
        let mut pattern = Self::with_kind("monthly", Some(interval));
        pattern.monthly_type = Some("date".to_string());
        pattern.monthly_date = Some(Numeric::Int(i64::from(day)));
        pattern
    }

    /// Every `interval` months on the n-th (`-1` = last) weekday.
    pub fn monthly_by_weekday(interval: u32, week: i8, weekday: u8) -> Self {
        let mut pattern = Self::with_kind("monthly", Some(interval));
        pattern.monthly_type = Some("weekday".to_string());
        pattern.monthly_weekday = Some(format!("{week},{weekday}"));
        pattern
    }

    /// Builder method to set the inclusive end date.
    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end.format("%Y-%m-%d").to_string());
        self
    }

    /// Returns true if this pattern means "does not repeat".
    pub fn is_none(&self) -> bool {
        let kind = self.kind.trim();
        kind.is_empty() || kind.eq_ignore_ascii_case("none")
    }
}

/// How often a rule repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// Which week of the month a `byWeekday` rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekOfMonth {
    /// The n-th occurrence (`1..=5`).
    Nth(u8),
    /// The last occurrence.
    Last,
}

/// Day selection for monthly rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyMode {
    /// A fixed day of the month (`1..=31`).
    ByDate { day: u32 },
    /// The n-th or last given weekday of the month.
    ByWeekday { week: WeekOfMonth, weekday: Weekday },
}

/// A validated recurrence rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// Daily, weekly or monthly.
    pub frequency: Frequency,
    /// Repeat every N units; always `>= 1`.
    pub interval: u32,
    /// Weekday numbers (`0 = Sunday`), weekly rules only.
    pub weekdays: BTreeSet<u8>,
    /// Day selection, monthly rules only.
    pub monthly: Option<MonthlyMode>,
    /// Inclusive last date.
    pub end_date: Option<NaiveDate>,
}

impl TryFrom<&RecurrencePattern> for RecurrenceRule {
    type Error = ExpansionError;

    fn try_from(pattern: &RecurrencePattern) -> Result<Self, Self::Error> {
        let frequency = match pattern.kind.trim().to_ascii_lowercase().as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            "" | "none" => return Err(ExpansionError::NotRecurring),
            other => return Err(ExpansionError::UnknownType(other.to_string())),
        };

        let interval = match &pattern.interval {
            None => 1,
            Some(raw) => raw
                .as_i64()
                .filter(|n| *n >= 1)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| ExpansionError::InvalidInterval(raw.describe()))?,
        };

        let end_date = match pattern.end_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_date(raw).ok_or_else(|| ExpansionError::InvalidDate {
                field: "endDate",
                value: raw.to_string(),
            })?),
        };

        let mut weekdays = BTreeSet::new();
        if frequency == Frequency::Weekly {
            for raw in &pattern.weekdays {
                let day = raw
                    .as_i64()
                    .filter(|n| (0..=6).contains(n))
                    .ok_or_else(|| ExpansionError::InvalidWeekday(raw.describe()))?;
                weekdays.insert(day as u8);
            }
        }

        let monthly = match frequency {
            Frequency::Monthly => Some(parse_monthly_mode(pattern)?),
            _ => None,
        };

        Ok(Self {
            frequency,
            interval,
            weekdays,
            monthly,
            end_date,
        })
    }
}

fn parse_monthly_mode(pattern: &RecurrencePattern) -> Result<MonthlyMode, ExpansionError> {
    let by_date = pattern
        .monthly_type
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("date"));

    if by_date {
        let raw = pattern
            .monthly_date
            .as_ref()
            .ok_or(ExpansionError::MissingField("monthlyDate"))?;
        let day = raw
            .as_i64()
            .filter(|n| (1..=31).contains(n))
            .ok_or_else(|| ExpansionError::InvalidDayOfMonth(raw.describe()))?;
        return Ok(MonthlyMode::ByDate { day: day as u32 });
    }

    let raw = pattern
        .monthly_weekday
        .as_deref()
        .ok_or(ExpansionError::MissingField("monthlyWeekday"))?;
    let (week_raw, weekday_raw) = raw
        .split_once(',')
        .ok_or_else(|| ExpansionError::InvalidWeekOfMonth(raw.to_string()))?;

    let week = match week_raw.trim().parse::<i64>() {
        Ok(-1) => WeekOfMonth::Last,
        Ok(n @ 1..=5) => WeekOfMonth::Nth(n as u8),
        _ => return Err(ExpansionError::InvalidWeekOfMonth(week_raw.trim().to_string())),
    };
    let weekday = weekday_raw
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(weekday_from_index)
        .ok_or_else(|| ExpansionError::InvalidWeekday(weekday_raw.trim().to_string()))?;

    Ok(MonthlyMode::ByWeekday { week, weekday })
}

/// Hard bounds on occurrence generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationLimits {
    /// Maximum occurrences of a daily rule (5 years).
    pub daily: usize,
    /// Maximum occurrences of a weekly rule (5 years).
    pub weekly: usize,
    /// Maximum occurrences of a monthly rule (5 years).
    pub monthly: usize,
    /// Consecutive months without a valid date after which a monthly rule
    /// stops, e.g. "day 31 every 12 months" anchored in February.
    pub max_consecutive_skips: usize,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            daily: Self::DEFAULT_DAILY,
            weekly: Self::DEFAULT_WEEKLY,
            monthly: Self::DEFAULT_MONTHLY,
            max_consecutive_skips: Self::DEFAULT_MAX_CONSECUTIVE_SKIPS,
        }
    }
}

impl GenerationLimits {
    /// Default daily cap.
    pub const DEFAULT_DAILY: usize = 365 * 5;
    /// Default weekly cap.
    pub const DEFAULT_WEEKLY: usize = 52 * 5;
    /// Default monthly cap.
    pub const DEFAULT_MONTHLY: usize = 12 * 5;
    /// Default bound on consecutive skipped months.
    pub const DEFAULT_MAX_CONSECUTIVE_SKIPS: usize = 48;

    /// Returns the cap for a frequency.
    pub fn cap(&self, frequency: Frequency) -> usize {
        match frequency {
            Frequency::Daily => self.daily,
            Frequency::Weekly => self.weekly,
            Frequency::Monthly => self.monthly,
        }
    }
}

/// Expands recurring events into concrete occurrences.
///
/// The generator holds no state besides its limits; the same inputs always
/// yield the same ordered output.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceGenerator {
    limits: GenerationLimits,
}

impl OccurrenceGenerator {
    /// Creates a generator with the given limits.
    pub fn new(limits: GenerationLimits) -> Self {
        Self { limits }
    }

    /// Returns the configured limits.
    pub fn limits(&self) -> &GenerationLimits {
        &self.limits
    }

    /// Validates the event's stored pattern and generates its occurrences.
    ///
    /// # Errors
    ///
    /// Returns [`ExpansionError::NotRecurring`] for events without a pattern,
    /// and the validation error for corrupt patterns or a missing start date.
    pub fn expand(&self, event: &Event) -> Result<Vec<Occurrence>, ExpansionError> {
        let pattern = event
            .recurrence
            .as_ref()
            .ok_or(ExpansionError::NotRecurring)?;
        let rule = RecurrenceRule::try_from(pattern)?;
        self.generate(event, &rule)
    }

    /// Generates the ordered occurrences of `event` under `rule`, skipping
    /// the event's exception dates.
    ///
    /// # Errors
    ///
    /// Returns [`ExpansionError::MissingStartDate`] if the event has no
    /// start date.
    pub fn generate(
        &self,
        event: &Event,
        rule: &RecurrenceRule,
    ) -> Result<Vec<Occurrence>, ExpansionError> {
        let start = event.start_date.ok_or(ExpansionError::MissingStartDate)?;
        let cap = self.limits.cap(rule.frequency);

        let dates = match rule.frequency {
            Frequency::Daily => daily_dates(start, rule, &event.exceptions, cap),
            Frequency::Weekly => weekly_dates(start, rule, &event.exceptions, cap),
            Frequency::Monthly => monthly_dates(
                start,
                rule,
                &event.exceptions,
                cap,
                self.limits.max_consecutive_skips,
            ),
        };

        Ok(dates
            .into_iter()
            .map(|date| Occurrence::instance(event, date))
            .collect())
    }
}

fn past_end(date: NaiveDate, end: Option<NaiveDate>) -> bool {
    end.is_some_and(|e| date > e)
}

fn daily_dates(
    start: NaiveDate,
    rule: &RecurrenceRule,
    exceptions: &BTreeSet<NaiveDate>,
    cap: usize,
) -> Vec<NaiveDate> {
    let step = Days::new(u64::from(rule.interval));
    let mut dates = Vec::new();
    let mut current = Some(start);

    while let Some(date) = current {
        if dates.len() >= cap || past_end(date, rule.end_date) {
            break;
        }
        if !exceptions.contains(&date) {
            dates.push(date);
        }
        current = date.checked_add_days(step);
    }

    dates
}

fn weekly_dates(
    start: NaiveDate,
    rule: &RecurrenceRule,
    exceptions: &BTreeSet<NaiveDate>,
    cap: usize,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if rule.weekdays.is_empty() {
        return dates;
    }

    let step = Days::new(7 * u64::from(rule.interval));
    let mut block = Some(start);

    'blocks: while let Some(block_start) = block {
        if dates.len() >= cap || past_end(block_start, rule.end_date) {
            break;
        }

        for offset in 0..7 {
            let Some(day) = block_start.checked_add_days(Days::new(offset)) else {
                break 'blocks;
            };
            if past_end(day, rule.end_date) {
                break 'blocks;
            }
            if rule.weekdays.contains(&weekday_index(day)) && !exceptions.contains(&day) {
                dates.push(day);
                if dates.len() >= cap {
                    break 'blocks;
                }
            }
        }

        block = block_start.checked_add_days(step);
    }

    dates
}

fn monthly_dates(
    start: NaiveDate,
    rule: &RecurrenceRule,
    exceptions: &BTreeSet<NaiveDate>,
    cap: usize,
    max_consecutive_skips: usize,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let Some(mode) = rule.monthly else {
        return dates;
    };

    let mut month = first_of_month_after(start, rule.interval);
    let mut skipped = 0;

    while let Some(first) = month {
        if dates.len() >= cap || past_end(first, rule.end_date) {
            break;
        }

        match day_in_month(first, mode) {
            Some(date) => {
                skipped = 0;
                if past_end(date, rule.end_date) {
                    break;
                }
                if !exceptions.contains(&date) {
                    dates.push(date);
                }
            }
            None => {
                skipped += 1;
                if skipped >= max_consecutive_skips {
                    break;
                }
            }
        }

        month = first_of_month_after(first, rule.interval);
    }

    dates
}

/// Resolves the target day inside the month starting at `first`, or `None`
/// when the month has no such day.
fn day_in_month(first: NaiveDate, mode: MonthlyMode) -> Option<NaiveDate> {
    use chrono::Datelike;

    let (year, month) = (first.year(), first.month());
    match mode {
        MonthlyMode::ByDate { day } => NaiveDate::from_ymd_opt(year, month, day),
        MonthlyMode::ByWeekday {
            week: WeekOfMonth::Nth(n),
            weekday,
        } => nth_weekday_of_month(year, month, weekday, n),
        MonthlyMode::ByWeekday {
            week: WeekOfMonth::Last,
            weekday,
        } => last_weekday_of_month(year, month, weekday),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn starts(occurrences: &[Occurrence]) -> Vec<NaiveDate> {
        occurrences.iter().map(|o| o.start_date.unwrap()).collect()
    }

    fn expand(event: &Event) -> Vec<NaiveDate> {
        starts(&OccurrenceGenerator::default().expand(event).unwrap())
    }

    mod validation {
        use super::*;

        #[test]
        fn stored_weekly_pattern() {
            let json = r#"{"type": "weekly", "interval": "2", "weekdays": [1, "3"], "endDate": "2025-06-30"}"#;
            let pattern: RecurrencePattern = serde_json::from_str(json).unwrap();
            let rule = RecurrenceRule::try_from(&pattern).unwrap();

            assert_eq!(rule.frequency, Frequency::Weekly);
            assert_eq!(rule.interval, 2);
            assert_eq!(rule.weekdays, BTreeSet::from([1, 3]));
            assert_eq!(rule.end_date, Some(date(2025, 6, 30)));
            assert_eq!(rule.monthly, None);
        }

        #[test]
        fn stored_monthly_patterns() {
            let json = r#"{"type": "monthly", "interval": 1, "monthlyType": "date", "monthlyDate": "15"}"#;
            let pattern: RecurrencePattern = serde_json::from_str(json).unwrap();
            let rule = RecurrenceRule::try_from(&pattern).unwrap();
            assert_eq!(rule.monthly, Some(MonthlyMode::ByDate { day: 15 }));

            let json = r#"{"type": "monthly", "interval": 1, "monthlyType": "weekday", "monthlyWeekday": "-1,5"}"#;
            let pattern: RecurrencePattern = serde_json::from_str(json).unwrap();
            let rule = RecurrenceRule::try_from(&pattern).unwrap();
            assert_eq!(
                rule.monthly,
                Some(MonthlyMode::ByWeekday {
                    week: WeekOfMonth::Last,
                    weekday: Weekday::Fri
                })
            );
        }

        #[test]
        fn missing_interval_defaults_to_one() {
            let pattern = RecurrencePattern {
                interval: None,
                ..RecurrencePattern::daily(1)
            };
            assert_eq!(RecurrenceRule::try_from(&pattern).unwrap().interval, 1);
        }

        #[test]
        fn corrupt_patterns() {
            let zero = RecurrencePattern::daily(0);
            assert!(matches!(
                RecurrenceRule::try_from(&zero),
                Err(ExpansionError::InvalidInterval(_))
            ));

            let unknown = RecurrencePattern {
                kind: "yearly".to_string(),
                ..RecurrencePattern::daily(1)
            };
            assert_eq!(
                RecurrenceRule::try_from(&unknown),
                Err(ExpansionError::UnknownType("yearly".to_string()))
            );

            let bad_weekday = RecurrencePattern::weekly(1, &[7]);
            assert!(matches!(
                RecurrenceRule::try_from(&bad_weekday),
                Err(ExpansionError::InvalidWeekday(_))
            ));

            let sixth_week = RecurrencePattern::monthly_by_weekday(1, 6, 1);
            assert!(matches!(
                RecurrenceRule::try_from(&sixth_week),
                Err(ExpansionError::InvalidWeekOfMonth(_))
            ));

            let day_zero = RecurrencePattern::monthly_by_date(1, 0);
            assert!(matches!(
                RecurrenceRule::try_from(&day_zero),
                Err(ExpansionError::InvalidDayOfMonth(_))
            ));

            let no_weekday = RecurrencePattern {
                kind: "monthly".to_string(),
                ..RecurrencePattern::daily(1)
            };
            assert_eq!(
                RecurrenceRule::try_from(&no_weekday),
                Err(ExpansionError::MissingField("monthlyWeekday"))
            );

            let bad_end = RecurrencePattern {
                end_date: Some("someday".to_string()),
                ..RecurrencePattern::daily(1)
            };
            assert!(matches!(
                RecurrenceRule::try_from(&bad_end),
                Err(ExpansionError::InvalidDate { field: "endDate", .. })
            ));
        }

        #[test]
        fn empty_end_date_is_unbounded() {
            let pattern = RecurrencePattern {
                end_date: Some(String::new()),
                ..RecurrencePattern::daily(1)
            };
            assert_eq!(RecurrenceRule::try_from(&pattern).unwrap().end_date, None);
        }
    }

    mod daily {
        use super::*;

        #[test]
        fn every_other_day_until_end() {
            let event = Event::new("1", "Daily", date(2025, 3, 1)).with_recurrence(
                RecurrencePattern::daily(2).with_end_date(date(2025, 3, 9)),
            );
            assert_eq!(
                expand(&event),
                vec![
                    date(2025, 3, 1),
                    date(2025, 3, 3),
                    date(2025, 3, 5),
                    date(2025, 3, 7),
                    date(2025, 3, 9)
                ]
            );
        }

        #[test]
        fn unbounded_hits_cap() {
            let event = Event::new("1", "Daily", date(2025, 1, 1))
                .with_recurrence(RecurrencePattern::daily(1));
            let dates = expand(&event);
            assert_eq!(dates.len(), GenerationLimits::DEFAULT_DAILY);
            assert_eq!(dates[0], date(2025, 1, 1));
        }

        #[test]
        fn exceptions_removed() {
            let event = Event::new("1", "Daily", date(2025, 3, 1))
                .with_recurrence(RecurrencePattern::daily(1).with_end_date(date(2025, 3, 4)))
                .with_exception(date(2025, 3, 2));
            assert_eq!(
                expand(&event),
                vec![date(2025, 3, 1), date(2025, 3, 3), date(2025, 3, 4)]
            );
        }

        #[test]
        fn end_date_carries_span() {
            let event = Event::new("1", "Two days", date(2025, 3, 1))
                .with_end_date(date(2025, 3, 2))
                .with_recurrence(RecurrencePattern::daily(7).with_end_date(date(2025, 3, 8)));
            let occurrences = OccurrenceGenerator::default().expand(&event).unwrap();
            assert_eq!(occurrences[1].start_date, Some(date(2025, 3, 8)));
            assert_eq!(occurrences[1].end_date, Some(date(2025, 3, 9)));
            assert!(occurrences.iter().all(|o| o.is_recurring));
        }
    }

    mod weekly {
        use super::*;

        #[test]
        fn mon_wed_fri_in_january() {
            let event = Event::new("1", "MWF", date(2025, 1, 15)).with_recurrence(
                RecurrencePattern::weekly(1, &[1, 3, 5]).with_end_date(date(2025, 1, 31)),
            );
            assert_eq!(
                expand(&event),
                vec![
                    date(2025, 1, 15),
                    date(2025, 1, 17),
                    date(2025, 1, 20),
                    date(2025, 1, 22),
                    date(2025, 1, 24),
                    date(2025, 1, 27),
                    date(2025, 1, 29),
                    date(2025, 1, 31)
                ]
            );
        }

        #[test]
        fn biweekly_blocks() {
            // 2025-01-06 is a Monday
            let event = Event::new("1", "Fortnightly", date(2025, 1, 6)).with_recurrence(
                RecurrencePattern::weekly(2, &[2]).with_end_date(date(2025, 2, 28)),
            );
            assert_eq!(
                expand(&event),
                vec![
                    date(2025, 1, 7),
                    date(2025, 1, 21),
                    date(2025, 2, 4),
                    date(2025, 2, 18)
                ]
            );
        }

        #[test]
        fn no_weekdays_means_no_occurrences() {
            let event = Event::new("1", "Empty", date(2025, 1, 6))
                .with_recurrence(RecurrencePattern::weekly(1, &[]));
            assert!(expand(&event).is_empty());
        }

        #[test]
        fn unbounded_hits_cap() {
            let event = Event::new("1", "Weekly", date(2025, 1, 6))
                .with_recurrence(RecurrencePattern::weekly(1, &[1]));
            assert_eq!(expand(&event).len(), GenerationLimits::DEFAULT_WEEKLY);
        }

        #[test]
        fn exception_only_hits_its_day() {
            let event = Event::new("1", "MWF", date(2025, 1, 15))
                .with_recurrence(
                    RecurrencePattern::weekly(1, &[1, 3, 5]).with_end_date(date(2025, 1, 24)),
                )
                .with_exception(date(2025, 1, 20));
            assert_eq!(
                expand(&event),
                vec![
                    date(2025, 1, 15),
                    date(2025, 1, 17),
                    date(2025, 1, 22),
                    date(2025, 1, 24)
                ]
            );
        }
    }

    mod monthly {
        use super::*;

        #[test]
        fn first_occurrence_is_one_interval_ahead() {
            let event = Event::new("1", "Monthly", date(2025, 1, 10)).with_recurrence(
                RecurrencePattern::monthly_by_date(1, 10).with_end_date(date(2025, 4, 30)),
            );
            assert_eq!(
                expand(&event),
                vec![date(2025, 2, 10), date(2025, 3, 10), date(2025, 4, 10)]
            );
        }

        #[test]
        fn day_31_skips_short_months() {
            let event = Event::new("1", "Month end", date(2024, 12, 15)).with_recurrence(
                RecurrencePattern::monthly_by_date(1, 31).with_end_date(date(2025, 3, 31)),
            );
            assert_eq!(expand(&event), vec![date(2025, 1, 31), date(2025, 3, 31)]);
        }

        #[test]
        fn last_friday_in_five_friday_month() {
            let event = Event::new("1", "Last Friday", date(2024, 12, 1)).with_recurrence(
                RecurrencePattern::monthly_by_weekday(1, -1, 5).with_end_date(date(2025, 2, 28)),
            );
            assert_eq!(expand(&event), vec![date(2025, 1, 31), date(2025, 2, 28)]);
        }

        #[test]
        fn second_monday() {
            let event = Event::new("1", "Second Monday", date(2025, 1, 1)).with_recurrence(
                RecurrencePattern::monthly_by_weekday(1, 2, 1).with_end_date(date(2025, 4, 30)),
            );
            assert_eq!(
                expand(&event),
                vec![date(2025, 2, 10), date(2025, 3, 10), date(2025, 4, 14)]
            );
        }

        #[test]
        fn missing_fifth_week_is_skipped() {
            // Fifth Monday: March and June 2025 have one, April and May do not
            let event = Event::new("1", "Fifth Monday", date(2025, 2, 1)).with_recurrence(
                RecurrencePattern::monthly_by_weekday(1, 5, 1).with_end_date(date(2025, 6, 30)),
            );
            assert_eq!(expand(&event), vec![date(2025, 3, 31), date(2025, 6, 30)]);
        }

        #[test]
        fn unbounded_hits_cap() {
            let event = Event::new("1", "Monthly", date(2025, 1, 1))
                .with_recurrence(RecurrencePattern::monthly_by_date(1, 1));
            let dates = expand(&event);
            assert_eq!(dates.len(), GenerationLimits::DEFAULT_MONTHLY);
            assert_eq!(dates[0], date(2025, 2, 1));
        }

        #[test]
        fn never_matching_rule_terminates() {
            // Every 12 months from February never reaches a 31st
            let event = Event::new("1", "Never", date(2025, 2, 15))
                .with_recurrence(RecurrencePattern::monthly_by_date(12, 31));
            let generator = OccurrenceGenerator::new(GenerationLimits {
                max_consecutive_skips: 5,
                ..GenerationLimits::default()
            });
            assert!(generator.expand(&event).unwrap().is_empty());
        }

        #[test]
        fn exceptions_removed() {
            let event = Event::new("1", "Monthly", date(2025, 1, 10))
                .with_recurrence(
                    RecurrencePattern::monthly_by_date(1, 10).with_end_date(date(2025, 4, 30)),
                )
                .with_exception(date(2025, 3, 10));
            assert_eq!(expand(&event), vec![date(2025, 2, 10), date(2025, 4, 10)]);
        }
    }

    mod properties {
        use super::*;

        fn bounded_events() -> Vec<Event> {
            let end = date(2025, 9, 30);
            vec![
                Event::new("d", "d", date(2025, 1, 3))
                    .with_recurrence(RecurrencePattern::daily(3).with_end_date(end)),
                Event::new("w", "w", date(2025, 1, 3))
                    .with_recurrence(RecurrencePattern::weekly(2, &[0, 4]).with_end_date(end)),
                Event::new("m", "m", date(2025, 1, 3))
                    .with_recurrence(RecurrencePattern::monthly_by_date(2, 30).with_end_date(end)),
                Event::new("l", "l", date(2025, 1, 3)).with_recurrence(
                    RecurrencePattern::monthly_by_weekday(1, -1, 0).with_end_date(end),
                ),
            ]
        }

        #[test]
        fn nothing_outside_bounds() {
            for event in bounded_events() {
                let dates = expand(&event);
                assert!(!dates.is_empty(), "event {} produced nothing", event.id);
                assert!(dates.iter().all(|d| *d <= date(2025, 9, 30)));
                assert!(dates.iter().all(|d| *d >= date(2025, 1, 3)));
                if event.id == "m" || event.id == "l" {
                    assert!(dates.iter().all(|d| *d >= date(2025, 2, 1)));
                }
            }
        }

        #[test]
        fn generation_is_idempotent() {
            let generator = OccurrenceGenerator::default();
            for event in bounded_events() {
                assert_eq!(
                    generator.expand(&event).unwrap(),
                    generator.expand(&event).unwrap()
                );
            }
        }

        #[test]
        fn output_is_ascending() {
            for event in bounded_events() {
                let dates = expand(&event);
                assert!(dates.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn missing_start_date() {
            let mut event = Event::new("1", "No start", date(2025, 1, 1))
                .with_recurrence(RecurrencePattern::daily(1));
            event.start_date = None;
            assert_eq!(
                OccurrenceGenerator::default().expand(&event),
                Err(ExpansionError::MissingStartDate)
            );
        }

        #[test]
        fn not_recurring() {
            let event = Event::new("1", "Once", date(2025, 1, 1));
            assert_eq!(
                OccurrenceGenerator::default().expand(&event),
                Err(ExpansionError::NotRecurring)
            );
        }
    }
}
