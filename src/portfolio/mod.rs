//! Position averaging, allocation and dividend linkage.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{
    validate_amount, Dividend, Investment, NewInvestment, NewTransaction, Transaction,
    TransactionKind,
};

pub(crate) const CONTRIBUTION_CATEGORY: &str = "Investimento";
pub(crate) const DIVIDEND_CATEGORIES: &[&str] = &["Dividendos", "Proventos", "Rendimentos"];

/// One buy order as entered.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Purchase {
    pub(crate) ticker: Option<String>,
    pub(crate) name: String,
    pub(crate) category: String,
    pub(crate) quantity: Decimal,
    pub(crate) purchase_price: Decimal,
    /// Market price after the buy; defaults to the purchase price.
    pub(crate) current_price: Option<Decimal>,
    pub(crate) date: NaiveDate,
    pub(crate) color: String,
    pub(crate) icon: String,
}

impl Purchase {
    pub(crate) fn cost(&self) -> Decimal {
        self.quantity * self.purchase_price
    }

    fn market_price(&self) -> Decimal {
        self.current_price.unwrap_or(self.purchase_price)
    }

    fn label(&self) -> String {
        match self.ticker.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HoldingChange {
    /// Existing holding with the new lot folded in.
    Merge(Investment),
    Create(NewInvestment),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PurchasePlan {
    pub(crate) change: HoldingChange,
    /// Outflow recorded for the lot just bought.
    pub(crate) contribution: NewTransaction,
}

/// Ticker identifies a holding when the purchase has one; otherwise name
/// and category together do.
pub(crate) fn find_holding<'a>(
    purchase: &Purchase,
    holdings: &'a [Investment],
) -> Option<&'a Investment> {
    match purchase.ticker.as_deref().map(str::trim) {
        Some(ticker) if !ticker.is_empty() => holdings.iter().find(|h| {
            h.ticker
                .as_deref()
                .is_some_and(|t| t.trim().eq_ignore_ascii_case(ticker))
        }),
        _ => holdings.iter().find(|h| {
            h.name.trim().to_lowercase() == purchase.name.trim().to_lowercase()
                && h.category.trim().to_lowercase() == purchase.category.trim().to_lowercase()
        }),
    }
}

/// Weighted-average merge of a new lot into an existing position.
pub(crate) fn merge_lot(holding: &Investment, purchase: &Purchase) -> Investment {
    let quantity = holding.quantity + purchase.quantity;
    let cost = holding.quantity * holding.purchase_price + purchase.cost();
    let mut merged = holding.clone();
    merged.quantity = quantity;
    if !quantity.is_zero() {
        merged.purchase_price = cost / quantity;
    }
    apply_quote(&mut merged, purchase.market_price());
    merged
}

/// Decide what a purchase writes: the holding change plus its contribution.
///
/// Price is taken as entered apart from the size limit every input shares;
/// quantity must also be positive.
pub(crate) fn plan_purchase(
    purchase: &Purchase,
    holdings: &[Investment],
) -> Result<PurchasePlan, ValidationError> {
    if purchase.quantity <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveQuantity(purchase.quantity));
    }
    if purchase.label().trim().is_empty() {
        return Err(ValidationError::Blank("asset name"));
    }
    validate_amount(purchase.quantity)?;
    validate_amount(purchase.purchase_price)?;
    validate_amount(purchase.market_price())?;

    let change = match find_holding(purchase, holdings) {
        Some(existing) => HoldingChange::Merge(merge_lot(existing, purchase)),
        None => {
            let current_price = purchase.market_price();
            let name = if purchase.name.trim().is_empty() {
                purchase.label()
            } else {
                purchase.name.trim().to_string()
            };
            HoldingChange::Create(NewInvestment {
                name,
                ticker: purchase
                    .ticker
                    .as_deref()
                    .map(|t| t.trim().to_uppercase())
                    .filter(|t| !t.is_empty()),
                category: purchase.category.clone(),
                quantity: purchase.quantity,
                purchase_price: purchase.purchase_price,
                current_price,
                total_value: purchase.quantity * current_price,
                color: purchase.color.clone(),
                icon: purchase.icon.clone(),
            })
        }
    };

    let contribution = NewTransaction::new(
        purchase.date,
        format!("Aporte {}", purchase.label()),
        CONTRIBUTION_CATEGORY,
        TransactionKind::Expense,
        purchase.cost(),
    );

    Ok(PurchasePlan {
        change,
        contribution,
    })
}

pub(crate) fn apply_quote(holding: &mut Investment, price: Decimal) {
    holding.current_price = price;
    holding.total_value = holding.quantity * price;
}

/// Each holding's share of total market value, 0-100.
pub(crate) fn rebalance(holdings: &mut [Investment]) {
    let total: Decimal = holdings.iter().map(|h| h.total_value).sum();
    for h in holdings.iter_mut() {
        h.percentage = if total.is_zero() {
            Decimal::ZERO
        } else {
            (h.total_value / total * Decimal::ONE_HUNDRED).round_dp(2)
        };
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct PortfolioTotals {
    pub(crate) invested: Decimal,
    pub(crate) market_value: Decimal,
    pub(crate) gain: Decimal,
}

pub(crate) fn portfolio_totals(holdings: &[Investment]) -> PortfolioTotals {
    let invested: Decimal = holdings.iter().map(|h| h.invested()).sum();
    let market_value: Decimal = holdings.iter().map(|h| h.total_value).sum();
    PortfolioTotals {
        invested,
        market_value,
        gain: market_value - invested,
    }
}

pub(crate) fn is_dividend_category(category: &str) -> bool {
    let category = category.trim().to_lowercase();
    DIVIDEND_CATEGORIES
        .iter()
        .any(|c| c.to_lowercase() == category)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DividendLink {
    /// Holding picked by id when the income was entered.
    Explicit(Investment),
    /// Best guess: ticker or name found in the description.
    Guessed(Investment),
    Unmatched,
}

impl DividendLink {
    pub(crate) fn investment(&self) -> Option<&Investment> {
        match self {
            Self::Explicit(inv) | Self::Guessed(inv) => Some(inv),
            Self::Unmatched => None,
        }
    }
}

pub(crate) fn link_dividend(
    description: &str,
    explicit_id: Option<i64>,
    holdings: &[Investment],
) -> DividendLink {
    if let Some(inv) = explicit_id.and_then(|id| holdings.iter().find(|h| h.id == Some(id))) {
        return DividendLink::Explicit(inv.clone());
    }
    let text = description.to_lowercase();
    let contains = |needle: &str| {
        let needle = needle.trim().to_lowercase();
        !needle.is_empty() && text.contains(&needle)
    };
    holdings
        .iter()
        .find(|h| h.ticker.as_deref().is_some_and(|t| contains(t)) || contains(&h.name))
        .map(|h| DividendLink::Guessed(h.clone()))
        .unwrap_or(DividendLink::Unmatched)
}

/// The dividend row recorded alongside an income in a dividend category.
pub(crate) fn new_dividend(txn: &Transaction, link: &DividendLink) -> Dividend {
    let (investment_id, asset_name) = match link.investment() {
        Some(inv) => (inv.id, inv.display_name()),
        None => (None, txn.description.clone()),
    };
    Dividend {
        id: None,
        investment_id,
        asset_name,
        amount: txn.value,
        date: txn.date,
        transaction_id: txn.id,
    }
}

#[cfg(test)]
mod tests;
