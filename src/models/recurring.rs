use rust_decimal::Decimal;
use std::collections::BTreeSet;

use super::TransactionKind;
use crate::error::ValidationError;

/// A template that recurs on fixed days of every month.
///
/// Occurrences are never stored: a month's instances are derived by
/// intersecting `days_of_month` with the days that month actually has.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecurringObligation {
    pub(crate) id: Option<i64>,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) kind: TransactionKind,
    pub(crate) value: Decimal,
    pub(crate) days_of_month: BTreeSet<u32>,
    pub(crate) icon: String,
}

impl RecurringObligation {
    pub(crate) fn new(
        description: String,
        category: String,
        kind: TransactionKind,
        value: Decimal,
        days_of_month: BTreeSet<u32>,
    ) -> Result<Self, ValidationError> {
        if description.trim().is_empty() {
            return Err(ValidationError::Blank("description"));
        }
        if value <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveValue(value));
        }
        validate_days(&days_of_month)?;
        Ok(Self {
            id: None,
            description,
            category,
            kind,
            value,
            days_of_month,
            icon: String::new(),
        })
    }

    pub(crate) fn occurs_on(&self, day: u32) -> bool {
        self.days_of_month.contains(&day)
    }

    /// Days rendered as "5, 20".
    pub(crate) fn days_label(&self) -> String {
        self.days_of_month
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Stored form: comma-separated day numbers.
    pub(crate) fn encode_days(&self) -> String {
        self.days_of_month
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Out-of-range or malformed entries are dropped.
    pub(crate) fn decode_days(s: &str) -> BTreeSet<u32> {
        s.split(',')
            .filter_map(|p| p.trim().parse::<u32>().ok())
            .filter(|d| (1..=31).contains(d))
            .collect()
    }
}

pub(crate) fn validate_days(days: &BTreeSet<u32>) -> Result<(), ValidationError> {
    if days.is_empty() {
        return Err(ValidationError::EmptyDaySelection);
    }
    if let Some(bad) = days.iter().find(|d| !(1..=31).contains(*d)) {
        return Err(ValidationError::DayOutOfRange(*bad));
    }
    Ok(())
}
