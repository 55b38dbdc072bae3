use rust_decimal::Decimal;
use thiserror::Error;

/// Input rejected before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ValidationError {
    #[error("an installment purchase needs at least 2 installments (got {0})")]
    TooFewInstallments(u32),

    #[error("only expenses can be split into installments")]
    InstallmentsOnIncome,

    #[error("select at least one day (the range ends before it starts)")]
    EmptyDaySelection,

    #[error("day {0} is outside 1-31")]
    DayOutOfRange(u32),

    #[error("quantity must be positive (got {0})")]
    NonPositiveQuantity(Decimal),

    #[error("value must be positive (got {0})")]
    NonPositiveValue(Decimal),

    #[error("{0} is above the 1 trillion limit")]
    TooLarge(Decimal),

    #[error("{value} cannot be split into {installments} installments of at least 0.01")]
    TooSmallToSplit { value: Decimal, installments: u32 },

    #[error("{0} cannot be blank")]
    Blank(&'static str),

    #[error("date arithmetic overflowed")]
    DateOverflow,
}
