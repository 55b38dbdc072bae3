use chrono::{Datelike, Days, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// National holidays that fall on the same date every year, keyed "MM-DD".
const FIXED_HOLIDAYS: &[(&str, &str)] = &[
    ("01-01", "Confraternização Universal"),
    ("04-21", "Tiradentes"),
    ("05-01", "Dia do Trabalho"),
    ("09-07", "Independência do Brasil"),
    ("10-12", "Nossa Senhora Aparecida"),
    ("11-02", "Finados"),
    ("11-15", "Proclamação da República"),
    ("12-25", "Natal"),
];

/// Holidays defined as an offset in days from Easter Sunday.
const MOVABLE_HOLIDAYS: &[(i64, &str)] = &[
    (-47, "Carnaval"),
    (-2, "Sexta-feira Santa"),
    (60, "Corpus Christi"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Holiday {
    pub(crate) month_day: String,
    pub(crate) name: &'static str,
}

/// Easter Sunday for a Gregorian year (anonymous algorithm, Meeus).
///
/// Integer floor division throughout; `div_euclid`/`rem_euclid` keep the
/// terms correct for negative intermediates as well. `None` for a year
/// chrono cannot represent.
pub(crate) fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let y = year as i64;
    let a = y.rem_euclid(19);
    let b = y.div_euclid(100);
    let c = y.rem_euclid(100);
    let d = b.div_euclid(4);
    let e = b.rem_euclid(4);
    let f = (b + 8).div_euclid(25);
    let g = (b - f + 1).div_euclid(3);
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c.div_euclid(4);
    let k = c.rem_euclid(4);
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l).div_euclid(451);
    let n = h + l - 7 * m + 114;
    let month = n.div_euclid(31) as u32;
    let day = (n.rem_euclid(31) + 1) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whole years chrono can represent; holidays outside them are unknown.
pub(crate) fn is_supported_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 1, 1).is_some()
        && NaiveDate::from_ymd_opt(year, 12, 31).is_some()
}

fn month_day(date: NaiveDate) -> String {
    format!("{:02}-{:02}", date.month(), date.day())
}

fn offset(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// The merged holiday table for `year`.
///
/// Fixed entries go in first and movable ones overwrite them, so on the rare
/// shared date (Good Friday on 21 April, e.g. in 2000) the movable name wins.
pub(crate) fn holidays(year: i32) -> BTreeMap<String, &'static str> {
    let mut table: BTreeMap<String, &'static str> = FIXED_HOLIDAYS
        .iter()
        .map(|(md, name)| (md.to_string(), *name))
        .collect();

    if let Some(easter) = easter_sunday(year) {
        for (days, name) in MOVABLE_HOLIDAYS {
            if let Some(date) = offset(easter, *days) {
                table.insert(month_day(date), *name);
            }
        }
    }
    table
}

/// The year's holidays as a list, ordered by date.
pub(crate) fn holiday_list(year: i32) -> Vec<Holiday> {
    holidays(year)
        .into_iter()
        .map(|(month_day, name)| Holiday { month_day, name })
        .collect()
}

pub(crate) fn holiday_on(date: NaiveDate) -> Option<&'static str> {
    holidays(date.year()).get(&month_day(date)).copied()
}

/// Lookup that computes each year's table once.
#[derive(Debug, Default)]
pub(crate) struct HolidayCalendar {
    years: HashMap<i32, BTreeMap<String, &'static str>>,
}

impl HolidayCalendar {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn holiday_on(&mut self, date: NaiveDate) -> Option<&'static str> {
        self.years
            .entry(date.year())
            .or_insert_with(|| holidays(date.year()))
            .get(&month_day(date))
            .copied()
    }
}
