use chrono::NaiveDate;
use rust_decimal::Decimal;

/// An aggregated position in one asset.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Investment {
    pub(crate) id: Option<i64>,
    pub(crate) name: String,
    pub(crate) ticker: Option<String>,
    pub(crate) category: String,
    pub(crate) quantity: Decimal,
    /// Quantity-weighted average cost.
    pub(crate) purchase_price: Decimal,
    pub(crate) current_price: Decimal,
    /// `quantity * current_price`, kept in sync on every save.
    pub(crate) total_value: Decimal,
    /// Share of the portfolio's total value, 0-100.
    pub(crate) percentage: Decimal,
    pub(crate) color: String,
    pub(crate) icon: String,
}

impl Investment {
    pub(crate) fn invested(&self) -> Decimal {
        self.quantity * self.purchase_price
    }

    pub(crate) fn gain(&self) -> Decimal {
        self.total_value - self.invested()
    }

    pub(crate) fn display_name(&self) -> String {
        match &self.ticker {
            Some(t) if !t.is_empty() => format!("{t} - {}", self.name),
            _ => self.name.clone(),
        }
    }
}

/// A holding that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewInvestment {
    pub(crate) name: String,
    pub(crate) ticker: Option<String>,
    pub(crate) category: String,
    pub(crate) quantity: Decimal,
    pub(crate) purchase_price: Decimal,
    pub(crate) current_price: Decimal,
    pub(crate) total_value: Decimal,
    pub(crate) color: String,
    pub(crate) icon: String,
}

impl NewInvestment {
    pub(crate) fn into_investment(self, id: i64) -> Investment {
        Investment {
            id: Some(id),
            name: self.name,
            ticker: self.ticker,
            category: self.category,
            quantity: self.quantity,
            purchase_price: self.purchase_price,
            current_price: self.current_price,
            total_value: self.total_value,
            percentage: Decimal::ZERO,
            color: self.color,
            icon: self.icon,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Dividend {
    pub(crate) id: Option<i64>,
    /// `None` when the payout could not be tied to a holding.
    pub(crate) investment_id: Option<i64>,
    pub(crate) asset_name: String,
    pub(crate) amount: Decimal,
    pub(crate) date: NaiveDate,
    pub(crate) transaction_id: Option<i64>,
}
