use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

use super::holidays::HolidayCalendar;
use super::{each_day, week_end, week_start, YearMonth};
use crate::error::ValidationError;
use crate::models::{
    CreditCard, NewTransaction, PaymentMethod, RecurringObligation, Transaction, TransactionKind,
};

pub(crate) const BILL_PAYMENT_CATEGORY: &str = "Fatura do Cartão";

/// Everything the projector reads. Borrowed so the ledger is never copied.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProjectionInputs<'a> {
    pub(crate) recurring: &'a [RecurringObligation],
    pub(crate) transactions: &'a [Transaction],
    pub(crate) cards: &'a [CreditCard],
}

/// A card's statement total for one month. Derived, never stored.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ProjectedBill {
    pub(crate) card_id: Option<i64>,
    pub(crate) card_name: String,
    /// The card's closing day.
    pub(crate) day: u32,
    pub(crate) amount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DayProjection {
    pub(crate) date: NaiveDate,
    pub(crate) holiday: Option<&'static str>,
    pub(crate) obligations: Vec<RecurringObligation>,
    pub(crate) bills: Vec<ProjectedBill>,
}

impl DayProjection {
    pub(crate) fn expected_income(&self) -> Decimal {
        self.obligations
            .iter()
            .filter(|o| o.kind == TransactionKind::Income)
            .map(|o| o.value)
            .sum()
    }

    pub(crate) fn expected_outflow(&self) -> Decimal {
        let obligations: Decimal = self
            .obligations
            .iter()
            .filter(|o| o.kind == TransactionKind::Expense)
            .map(|o| o.value)
            .sum();
        obligations + self.bills.iter().map(|b| b.amount).sum::<Decimal>()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.holiday.is_none() && self.obligations.is_empty() && self.bills.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ProjectionTotals {
    pub(crate) income: Decimal,
    pub(crate) outflow: Decimal,
}

impl ProjectionTotals {
    pub(crate) fn net(&self) -> Decimal {
        self.income - self.outflow
    }

    fn of(days: &[DayProjection]) -> Self {
        days.iter().fold(Self::default(), |acc, d| Self {
            income: acc.income + d.expected_income(),
            outflow: acc.outflow + d.expected_outflow(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthProjection {
    pub(crate) month: YearMonth,
    pub(crate) days: Vec<DayProjection>,
    /// All of the month's bills, including any whose closing day the month lacks.
    pub(crate) bills: Vec<ProjectedBill>,
}

impl MonthProjection {
    /// Totals over the placed days only.
    pub(crate) fn totals(&self) -> ProjectionTotals {
        ProjectionTotals::of(&self.days)
    }

    pub(crate) fn day(&self, day: u32) -> Option<&DayProjection> {
        self.days.get(day.checked_sub(1)? as usize)
    }
}

pub(crate) fn window_totals(days: &[DayProjection]) -> ProjectionTotals {
    ProjectionTotals::of(days)
}

/// Does this credit-card transaction belong to `card`?
///
/// An explicit card id decides. Without one, the free-text brand is compared
/// with the card's name or brand as a best guess.
pub(crate) fn charged_to(txn: &Transaction, card: &CreditCard) -> bool {
    match (txn.card_id, card.id) {
        (Some(txn_card), Some(card_id)) => txn_card == card_id,
        (Some(_), None) => false,
        (None, _) => txn
            .card_brand
            .as_deref()
            .is_some_and(|brand| card.matches_label(brand)),
    }
}

pub(crate) fn project_bills(
    transactions: &[Transaction],
    cards: &[CreditCard],
    month: YearMonth,
) -> Vec<ProjectedBill> {
    cards
        .iter()
        .filter_map(|card| {
            let amount: Decimal = transactions
                .iter()
                .filter(|t| t.is_credit_card() && t.is_expense() && !t.is_bill_payment)
                .filter(|t| month.contains(t.date))
                .filter(|t| charged_to(t, card))
                .map(|t| t.value)
                .sum();
            (amount > Decimal::ZERO).then(|| ProjectedBill {
                card_id: card.id,
                card_name: card.name.clone(),
                day: card.closing_day,
                amount,
            })
        })
        .collect()
}

fn project_days(
    inputs: &ProjectionInputs<'_>,
    month: YearMonth,
    bills: &[ProjectedBill],
    holidays: &mut HolidayCalendar,
) -> Vec<DayProjection> {
    each_day(month.first_day(), month.last_day())
        .map(|date| {
            let day = date.day();
            DayProjection {
                date,
                holiday: holidays.holiday_on(date),
                obligations: inputs
                    .recurring
                    .iter()
                    .filter(|o| o.occurs_on(day))
                    .cloned()
                    .collect(),
                bills: bills.iter().filter(|b| b.day == day).cloned().collect(),
            }
        })
        .collect()
}

/// One entry per day of the month, in order.
///
/// A day number the month doesn't have (31 in April, 30 in February) simply
/// never appears, for obligations and bills alike.
pub(crate) fn project_month(inputs: &ProjectionInputs<'_>, month: YearMonth) -> MonthProjection {
    let mut holidays = HolidayCalendar::new();
    let bills = project_bills(inputs.transactions, inputs.cards, month);
    let days = project_days(inputs, month, &bills, &mut holidays);
    MonthProjection { month, days, bills }
}

/// Days in `from..=to`, each projected as part of its own month.
pub(crate) fn project_window(
    inputs: &ProjectionInputs<'_>,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<DayProjection> {
    let mut holidays = HolidayCalendar::new();
    YearMonth::spanning(from, to)
        .into_iter()
        .flat_map(|month| {
            let bills = project_bills(inputs.transactions, inputs.cards, month);
            project_days(inputs, month, &bills, &mut holidays)
        })
        .filter(|d| d.date >= from && d.date <= to)
        .collect()
}

/// The Sunday-to-Saturday week containing `date`.
pub(crate) fn project_week(inputs: &ProjectionInputs<'_>, date: NaiveDate) -> Vec<DayProjection> {
    project_window(inputs, week_start(date), week_end(date))
}

pub(crate) fn project_day(inputs: &ProjectionInputs<'_>, date: NaiveDate) -> DayProjection {
    project_window(inputs, date, date)
        .into_iter()
        .next()
        .unwrap_or(DayProjection {
            date,
            holiday: None,
            obligations: Vec::new(),
            bills: Vec::new(),
        })
}

/// Day-of-month numbers covered by an inclusive date range.
///
/// Used when an obligation is created from a range picked on the calendar.
/// A range longer than a month yields every day 1-31.
pub(crate) fn days_from_range(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BTreeSet<u32>, ValidationError> {
    if end < start {
        return Err(ValidationError::EmptyDaySelection);
    }
    Ok(each_day(start, end).take(31).map(|d| d.day()).collect())
}

/// The expense that records paying `month`'s `bill` on `date`.
///
/// Only a new transaction: the card purchases behind the bill stay as they are.
/// It carries the card id and the bill month (in its notes), since a bill is
/// often paid in the month after it closes.
pub(crate) fn bill_payment(
    bill: &ProjectedBill,
    month: YearMonth,
    date: NaiveDate,
) -> NewTransaction {
    let mut txn = NewTransaction::new(
        date,
        format!("Fatura {}", bill.card_name),
        BILL_PAYMENT_CATEGORY,
        TransactionKind::Expense,
        bill.amount,
    );
    txn.payment_method = PaymentMethod::Debit;
    txn.card_id = bill.card_id;
    txn.is_bill_payment = true;
    txn.notes = month.to_string();
    txn
}

/// Has the card's bill for `month` been paid, whenever the payment happened?
pub(crate) fn bill_paid(
    transactions: &[Transaction],
    card_id: Option<i64>,
    month: YearMonth,
) -> bool {
    card_id.is_some()
        && transactions.iter().any(|t| {
            t.is_bill_payment
                && t.card_id == card_id
                && YearMonth::parse(&t.notes) == Some(month)
        })
}
