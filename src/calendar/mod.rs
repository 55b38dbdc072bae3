//! Financial calendar: national holidays and the per-day projection of
//! recurring obligations and credit-card bills.

pub(crate) mod holidays;
pub(crate) mod projection;

use chrono::{Datelike, Days, Months, NaiveDate};

/// A viewed month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct YearMonth {
    pub(crate) year: i32,
    pub(crate) month: u32,
}

impl YearMonth {
    pub(crate) fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub(crate) fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Accepts "2024-03" or "2024-3".
    pub(crate) fn parse(s: &str) -> Option<Self> {
        let (y, m) = s.trim().split_once('-')?;
        Self::new(y.parse().ok()?, m.parse().ok()?)
    }

    pub(crate) fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub(crate) fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first)
    }

    pub(crate) fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub(crate) fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub(crate) fn shift(&self, months: i32) -> Self {
        let total = self.year * 12 + self.month as i32 - 1 + months;
        Self {
            year: total.div_euclid(12),
            month: (total.rem_euclid(12) + 1) as u32,
        }
    }

    /// Every month touched by an inclusive date range, in order.
    pub(crate) fn spanning(from: NaiveDate, to: NaiveDate) -> Vec<YearMonth> {
        let mut months = Vec::new();
        if to < from {
            return months;
        }
        let last = Self::of(to);
        let mut cur = Self::of(from);
        while cur <= last {
            months.push(cur);
            cur = cur.shift(1);
        }
        months
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Granularity of the calendar screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CalendarView {
    Month,
    Week,
    Day,
}

impl CalendarView {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "month" | "m" => Some(Self::Month),
            "week" | "w" => Some(Self::Week),
            "day" | "d" => Some(Self::Day),
            _ => None,
        }
    }
}

impl std::fmt::Display for CalendarView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Month => write!(f, "Month"),
            Self::Week => write!(f, "Week"),
            Self::Day => write!(f, "Day"),
        }
    }
}

/// Weeks start on Sunday, as Brazilian wall calendars do.
pub(crate) fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

pub(crate) fn week_end(date: NaiveDate) -> NaiveDate {
    let start = week_start(date);
    start.checked_add_days(Days::new(6)).unwrap_or(start)
}

/// Inclusive iterator over `from..=to`.
pub(crate) fn each_day(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}
