mod category;
mod credit_card;
mod goal;
mod investment;
mod recurring;
mod transaction;

pub(crate) use category::Category;
pub(crate) use credit_card::CreditCard;
pub(crate) use goal::Goal;
pub(crate) use investment::{Dividend, Investment, NewInvestment};
pub(crate) use recurring::{validate_days, RecurringObligation};
pub(crate) use transaction::{
    Installment, NewTransaction, PaymentMethod, Transaction, TransactionKind,
};

use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Largest value, price or quantity taken from input (one trillion).
/// Sums and products of in-range values stay well inside `Decimal`.
const MAX_INPUT: i64 = 1_000_000_000_000;

pub(crate) fn validate_amount(value: Decimal) -> Result<(), ValidationError> {
    if value.abs() > Decimal::from(MAX_INPUT) {
        return Err(ValidationError::TooLarge(value));
    }
    Ok(())
}
