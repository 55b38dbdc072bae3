use chrono::Months;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::ValidationError;
use crate::models::{validate_amount, Installment, NewTransaction, TransactionKind};

/// Split an installment purchase into one record per month.
///
/// Installment `i` (0-based) is dated `i` months after the purchase; chrono
/// clamps a day the target month lacks to its last day (Jan 31 → Feb 29).
/// Each share is the total over N truncated to cents, and the last one takes
/// whatever is left so the group sums to the original value. A value below
/// one cent per installment is rejected.
pub(crate) fn expand(purchase: &NewTransaction) -> Result<Vec<NewTransaction>, ValidationError> {
    let n = purchase.total_installments;
    if n < 2 {
        return Err(ValidationError::TooFewInstallments(n));
    }
    if purchase.kind != TransactionKind::Expense {
        return Err(ValidationError::InstallmentsOnIncome);
    }
    if purchase.value <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveValue(purchase.value));
    }
    validate_amount(purchase.value)?;
    // Every installment needs at least one cent
    if purchase.value < Decimal::new(i64::from(n), 2) {
        return Err(ValidationError::TooSmallToSplit {
            value: purchase.value,
            installments: n,
        });
    }

    let share = (purchase.value / Decimal::from(n))
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let last_share = purchase.value - share * Decimal::from(n - 1);

    (0..n)
        .map(|i| {
            let date = purchase
                .date
                .checked_add_months(Months::new(i))
                .ok_or(ValidationError::DateOverflow)?;
            let mut record = purchase.clone();
            record.date = date;
            record.value = if i + 1 == n { last_share } else { share };
            record.total_installments = 1;
            record.installment = Some(Installment {
                number: i + 1,
                total: n,
            });
            Ok(record)
        })
        .collect()
}

/// Sum of a group's values; equals the purchase value after `expand`.
pub(crate) fn group_total(records: &[NewTransaction]) -> Decimal {
    records.iter().map(|r| r.value).sum()
}
