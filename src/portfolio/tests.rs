#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn buy(ticker: Option<&str>, name: &str, qty: Decimal, price: Decimal) -> Purchase {
    Purchase {
        ticker: ticker.map(String::from),
        name: name.into(),
        category: "Ações".into(),
        quantity: qty,
        purchase_price: price,
        current_price: None,
        date: date(2024, 3, 10),
        color: String::new(),
        icon: String::new(),
    }
}

fn holding(id: i64, ticker: Option<&str>, name: &str, qty: Decimal, avg: Decimal) -> Investment {
    NewInvestment {
        name: name.into(),
        ticker: ticker.map(String::from),
        category: "Ações".into(),
        quantity: qty,
        purchase_price: avg,
        current_price: avg,
        total_value: qty * avg,
        color: String::new(),
        icon: String::new(),
    }
    .into_investment(id)
}

#[test]
fn test_new_holding_when_none_matches() {
    let plan = plan_purchase(&buy(Some(" petr4 "), "Petrobras", dec!(100), dec!(32.50)), &[]).unwrap();
    let HoldingChange::Create(new) = plan.change else {
        panic!("expected a new holding");
    };
    assert_eq!(new.ticker.as_deref(), Some("PETR4"));
    assert_eq!(new.quantity, dec!(100));
    assert_eq!(new.total_value, dec!(3250.00));
    assert_eq!(plan.contribution.value, dec!(3250.00));
    assert_eq!(plan.contribution.category, CONTRIBUTION_CATEGORY);
    assert_eq!(plan.contribution.kind, TransactionKind::Expense);
}

#[test]
fn test_merge_weighted_average() {
    let holdings = vec![holding(1, Some("VALE3"), "Vale", dec!(10), dec!(80))];
    let mut p = buy(Some("vale3"), "Vale", dec!(10), dec!(100));
    p.current_price = Some(dec!(105));
    let plan = plan_purchase(&p, &holdings).unwrap();
    let HoldingChange::Merge(merged) = plan.change else {
        panic!("expected a merge");
    };
    assert_eq!(merged.id, Some(1));
    assert_eq!(merged.quantity, dec!(20));
    assert_eq!(merged.purchase_price, dec!(90));
    assert_eq!(merged.current_price, dec!(105));
    assert_eq!(merged.total_value, dec!(2100));
    // Contribution covers only the new lot.
    assert_eq!(plan.contribution.value, dec!(1000));
}

#[test]
fn test_match_by_name_and_category_without_ticker() {
    let holdings = vec![holding(7, None, "Tesouro Selic 2029", dec!(2), dec!(14000))];
    let mut p = buy(None, "tesouro selic 2029", dec!(1), dec!(14500));
    p.category = "Renda Fixa".into();
    assert!(find_holding(&p, &holdings).is_none(), "category differs");
    p.category = "ações".into();
    assert_eq!(find_holding(&p, &holdings).unwrap().id, Some(7));
}

#[test]
fn test_ticker_purchase_ignores_name_match() {
    let holdings = vec![holding(1, None, "Petrobras", dec!(10), dec!(30))];
    let p = buy(Some("PETR4"), "Petrobras", dec!(10), dec!(30));
    assert!(find_holding(&p, &holdings).is_none());
}

#[test]
fn test_rejects_non_positive_quantity() {
    let err = plan_purchase(&buy(Some("ITSA4"), "Itaúsa", dec!(0), dec!(10)), &[]).unwrap_err();
    assert_eq!(err, ValidationError::NonPositiveQuantity(dec!(0)));
}

#[test]
fn test_zero_price_is_accepted() {
    let plan = plan_purchase(&buy(Some("BONUS"), "Bonificação", dec!(5), dec!(0)), &[]).unwrap();
    assert_eq!(plan.contribution.value, Decimal::ZERO);
}

#[test]
fn test_quote_keeps_total_in_sync() {
    let mut inv = holding(1, Some("PETR4"), "Petrobras", dec!(100), dec!(32.50));
    apply_quote(&mut inv, dec!(35));
    assert_eq!(inv.total_value, dec!(3500));
    assert_eq!(inv.gain(), dec!(250));
}

#[test]
fn test_rebalance_percentages() {
    let mut holdings = vec![
        holding(1, Some("A"), "A", dec!(1), dec!(300)),
        holding(2, Some("B"), "B", dec!(1), dec!(100)),
    ];
    rebalance(&mut holdings);
    assert_eq!(holdings[0].percentage, dec!(75));
    assert_eq!(holdings[1].percentage, dec!(25));

    let mut empty = vec![holding(3, Some("C"), "C", dec!(1), dec!(0))];
    rebalance(&mut empty);
    assert_eq!(empty[0].percentage, Decimal::ZERO);
}

#[test]
fn test_portfolio_totals() {
    let mut holdings = vec![
        holding(1, Some("A"), "A", dec!(10), dec!(10)),
        holding(2, Some("B"), "B", dec!(5), dec!(20)),
    ];
    apply_quote(&mut holdings[0], dec!(12));
    let totals = portfolio_totals(&holdings);
    assert_eq!(totals.invested, dec!(200));
    assert_eq!(totals.market_value, dec!(220));
    assert_eq!(totals.gain, dec!(20));
}

#[test]
fn test_dividend_category() {
    assert!(is_dividend_category("Dividendos"));
    assert!(is_dividend_category(" proventos "));
    assert!(!is_dividend_category("Salário"));
}

#[test]
fn test_dividend_link_priority() {
    let holdings = vec![
        holding(1, Some("PETR4"), "Petrobras", dec!(10), dec!(30)),
        holding(2, Some("VALE3"), "Vale", dec!(10), dec!(60)),
    ];
    // Explicit id wins over text that names another asset.
    let link = link_dividend("Dividendos PETR4", Some(2), &holdings);
    assert!(matches!(&link, DividendLink::Explicit(inv) if inv.id == Some(2)));

    let link = link_dividend("JCP petr4 março", None, &holdings);
    assert!(matches!(&link, DividendLink::Guessed(inv) if inv.id == Some(1)));

    let link = link_dividend("Rendimento vale", Some(99), &holdings);
    assert!(matches!(&link, DividendLink::Guessed(inv) if inv.id == Some(2)));

    assert_eq!(link_dividend("FII XPML11", None, &holdings), DividendLink::Unmatched);
}

#[test]
fn test_new_dividend_from_link() {
    let holdings = vec![holding(1, Some("PETR4"), "Petrobras", dec!(10), dec!(30))];
    let txn = NewTransaction::new(
        date(2024, 3, 20),
        "Dividendos PETR4",
        "Dividendos",
        TransactionKind::Income,
        dec!(45.10),
    )
    .into_transaction(12, String::new());

    let link = link_dividend(&txn.description, None, &holdings);
    let div = new_dividend(&txn, &link);
    assert_eq!(div.investment_id, Some(1));
    assert_eq!(div.asset_name, "PETR4 - Petrobras");
    assert_eq!(div.amount, dec!(45.10));
    assert_eq!(div.transaction_id, Some(12));

    let orphan = new_dividend(&txn, &DividendLink::Unmatched);
    assert_eq!(orphan.investment_id, None);
    assert_eq!(orphan.asset_name, "Dividendos PETR4");
}

#[test]
fn test_oversized_lot_is_rejected() {
    let holdings = vec![holding(1, Some("PETR4"), "Petrobras", dec!(100), dec!(30))];
    let err = plan_purchase(&buy(Some("PETR4"), "Petrobras", Decimal::MAX, dec!(2)), &holdings);
    assert_eq!(err, Err(ValidationError::TooLarge(Decimal::MAX)));

    let err = plan_purchase(&buy(Some("PETR4"), "Petrobras", dec!(1), Decimal::MAX), &[]);
    assert_eq!(err, Err(ValidationError::TooLarge(Decimal::MAX)));

    let mut p = buy(Some("PETR4"), "Petrobras", dec!(1), dec!(30));
    p.current_price = Some(Decimal::MIN);
    assert_eq!(plan_purchase(&p, &[]), Err(ValidationError::TooLarge(Decimal::MIN)));
}
