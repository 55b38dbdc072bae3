use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Goal {
    pub(crate) id: Option<i64>,
    pub(crate) name: String,
    pub(crate) target_amount: Decimal,
    pub(crate) current_amount: Decimal,
    pub(crate) deadline: Option<NaiveDate>,
    pub(crate) icon: String,
}

impl Goal {
    pub(crate) fn new(name: String, target_amount: Decimal, deadline: Option<NaiveDate>) -> Self {
        Self {
            id: None,
            name,
            target_amount,
            current_amount: Decimal::ZERO,
            deadline,
            icon: String::new(),
        }
    }

    /// Progress in [0, 1]. A non-positive target counts as reached.
    pub(crate) fn progress(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ONE;
        }
        (self.current_amount / self.target_amount)
            .max(Decimal::ZERO)
            .min(Decimal::ONE)
    }

    pub(crate) fn remaining(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    pub(crate) fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}
