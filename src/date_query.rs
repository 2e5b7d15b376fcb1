//! Resolution of the date expressions accepted by the `/jobs` routes.
//!
//! Expressions arrive as opaque strings and are only interpreted here, at the
//! store boundary. Calendar forms (`2017`, `2017-06`, `2017-06-01`,
//! `2017-06-01 10:30[:00]`) expand to the edge of the period they name, so an
//! inclusive `2017`..`2017` range covers the whole year. Relative forms
//! (`yesterday`, `3 days ago`, `last month`, ...) are resolved against the
//! supplied clock on a best-effort basis; `this month` means "now", exactly as
//! the usual `strtotime` parser would have it.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Layout of `post_date_gmt` values in the posts table.
pub const MYSQL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static CALENDAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(?:-(\d{2})(?:-(\d{2})(?:[ t](\d{2}):(\d{2})(?::(\d{2}))?)?)?)?$")
        .expect("calendar pattern compiles")
});

static OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?)\s*(\d+)\s*([a-z]+?)s?(\s+ago)?$").expect("offset pattern compiles")
});

static NAMED_OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(this|last|next)\s+([a-z]+)$").expect("named offset pattern compiles")
});

static DAY_OF_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(first|last)\s+day\s+of\s+(this|last|next)\s+month$")
        .expect("day of month pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    After,
    Before,
}

/// An unresolved date filter, as handed to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateQuery {
    pub after: Option<String>,
    pub before: Option<String>,
    pub inclusive: bool,
}

impl DateQuery {
    /// Builds an inclusive filter, or `None` when neither side is bounded.
    pub fn inclusive(after: Option<String>, before: Option<String>) -> Option<Self> {
        if after.is_none() && before.is_none() {
            return None;
        }
        Some(Self {
            after,
            before,
            inclusive: true,
        })
    }

    /// Resolves both sides against `now`. `None` means an expression could not be
    /// understood, which callers treat as "nothing matches".
    pub fn resolve(&self, now: NaiveDateTime) -> Option<ResolvedRange> {
        let after = match &self.after {
            Some(expr) => Some(resolve_bound(expr, Boundary::After, self.inclusive, now)?),
            None => None,
        };
        let before = match &self.before {
            Some(expr) => Some(resolve_bound(expr, Boundary::Before, self.inclusive, now)?),
            None => None,
        };

        Some(ResolvedRange {
            after,
            before,
            inclusive: self.inclusive,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub after: Option<NaiveDateTime>,
    pub before: Option<NaiveDateTime>,
    pub inclusive: bool,
}

impl ResolvedRange {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let after_ok = self.after.map_or(true, |bound| {
            if self.inclusive {
                at >= bound
            } else {
                at > bound
            }
        });
        let before_ok = self.before.map_or(true, |bound| {
            if self.inclusive {
                at <= bound
            } else {
                at < bound
            }
        });
        after_ok && before_ok
    }
}

/// Turns one side of a date filter into a concrete timestamp.
pub fn resolve_bound(
    expr: &str,
    boundary: Boundary,
    inclusive: bool,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let expr = expr.trim().to_ascii_lowercase();
    if expr.is_empty() {
        return None;
    }

    if let Some(caps) = CALENDAR.captures(&expr) {
        // Inclusive upper bounds and exclusive lower bounds reach to the end of the period.
        let to_max = match boundary {
            Boundary::After => !inclusive,
            Boundary::Before => inclusive,
        };
        return calendar(&caps, to_max);
    }

    relative(&expr, now)
}

fn calendar(caps: &Captures<'_>, to_max: bool) -> Option<NaiveDateTime> {
    let part = |index: usize| caps.get(index).and_then(|m| m.as_str().parse::<u32>().ok());
    let fill = |max: u32| if to_max { max } else { 0 };

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let month = part(2).unwrap_or(if to_max { 12 } else { 1 });
    let day = match part(3) {
        Some(day) => day,
        None if to_max => last_day_of_month(year, month)?,
        None => 1,
    };
    let hour = part(4).unwrap_or(fill(23));
    let minute = part(5).unwrap_or(fill(59));
    let second = part(6).unwrap_or(fill(59));

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

fn relative(expr: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now.date();
    match expr {
        "now" => return Some(now),
        "today" | "midnight" => return today.and_hms_opt(0, 0, 0),
        "yesterday" => return today.pred_opt()?.and_hms_opt(0, 0, 0),
        "tomorrow" => return today.succ_opt()?.and_hms_opt(0, 0, 0),
        _ => {}
    }

    if let Some(caps) = DAY_OF_MONTH.captures(expr) {
        let shifted = shift_months(now, step(&caps[2]))?;
        let day = match &caps[1] {
            "first" => 1,
            _ => last_day_of_month(shifted.year(), shifted.month())?,
        };
        return shifted.date().with_day(day).map(|date| date.and_time(now.time()));
    }

    if let Some(caps) = NAMED_OFFSET.captures(expr) {
        return offset(now, step(&caps[1]), &caps[2]);
    }

    if let Some(caps) = OFFSET.captures(expr) {
        let mut amount = caps[2].parse::<i64>().ok()?;
        if &caps[1] == "-" {
            amount = -amount;
        }
        if caps.get(4).is_some() {
            amount = -amount;
        }
        return offset(now, amount, &caps[3]);
    }

    None
}

fn step(word: &str) -> i64 {
    match word {
        "last" => -1,
        "next" => 1,
        _ => 0,
    }
}

fn offset(now: NaiveDateTime, amount: i64, unit: &str) -> Option<NaiveDateTime> {
    let delta = match unit.trim_end_matches('s') {
        "sec" | "second" => TimeDelta::try_seconds(amount)?,
        "min" | "minute" => TimeDelta::try_minutes(amount)?,
        "hour" => TimeDelta::try_hours(amount)?,
        "day" => TimeDelta::try_days(amount)?,
        "week" => TimeDelta::try_weeks(amount)?,
        "fortnight" => TimeDelta::try_weeks(amount.checked_mul(2)?)?,
        "month" => return shift_months(now, amount),
        "year" => return shift_months(now, amount.checked_mul(12)?),
        _ => return None,
    };
    now.checked_add_signed(delta)
}

fn shift_months(at: NaiveDateTime, amount: i64) -> Option<NaiveDateTime> {
    let months = Months::new(u32::try_from(amount.unsigned_abs()).ok()?);
    if amount >= 0 {
        at.checked_add_months(months)
    } else {
        at.checked_sub_months(months)
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some(next.pred_opt()?.day())
}
