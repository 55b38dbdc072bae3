#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (Database, Ledger) {
    let db = Database::open_in_memory("ana").unwrap();
    let ledger = Ledger::load(&db).unwrap();
    (db, ledger)
}

fn run(db: &mut Database, ledger: &mut Ledger, action: Action) -> String {
    let patch = dispatch(db, ledger, action).unwrap();
    ledger.apply(patch)
}

fn buy(ticker: &str, qty: Decimal, price: Decimal) -> Action {
    Action::BuyInvestment(Purchase {
        ticker: Some(ticker.into()),
        name: ticker.into(),
        category: "Ações".into(),
        quantity: qty,
        purchase_price: price,
        current_price: None,
        date: date(2024, 3, 10),
        color: String::new(),
        icon: String::new(),
    })
}

#[test]
fn test_add_plain_transaction() {
    let (mut db, mut ledger) = setup();
    let txn = NewTransaction::new(
        date(2024, 3, 5),
        "Mercado",
        "Alimentação",
        TransactionKind::Expense,
        dec!(230),
    );
    let status = run(&mut db, &mut ledger, Action::AddTransaction(txn));
    assert_eq!(status, "Added: Mercado");
    assert_eq!(ledger.transactions.len(), 1);
}

#[test]
fn test_installment_purchase_expands() {
    let (mut db, mut ledger) = setup();
    let txn = NewTransaction::new(
        date(2024, 3, 10),
        "Geladeira",
        "Casa",
        TransactionKind::Expense,
        dec!(3000),
    )
    .with_installments(10);
    run(&mut db, &mut ledger, Action::AddTransaction(txn));
    assert_eq!(ledger.transactions.len(), 10);
    let total: Decimal = ledger.transactions.iter().map(|t| t.value).sum();
    assert_eq!(total, dec!(3000));
}

#[test]
fn test_rejected_action_leaves_ledger_alone() {
    let (mut db, mut ledger) = setup();
    let txn = NewTransaction::new(
        date(2024, 3, 10),
        "Salário",
        "Salário",
        TransactionKind::Income,
        dec!(5000),
    )
    .with_installments(3);
    let err = dispatch(&mut db, &ledger, Action::AddTransaction(txn)).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::InstallmentsOnIncome)
    );
    assert!(ledger.transactions.is_empty());
    assert_eq!(db.get_transaction_count().unwrap(), 0);

    let err = dispatch(&mut db, &ledger, Action::DeleteTransaction(42)).unwrap_err();
    assert!(err.to_string().contains("not found"));
    ledger.apply(Patch::default());
    assert!(ledger.transactions.is_empty());
}

#[test]
fn test_recurring_lifecycle() {
    let (mut db, mut ledger) = setup();
    let days: BTreeSet<u32> = [5, 20].into_iter().collect();
    let r = RecurringObligation::new(
        "Aluguel".into(),
        "Moradia".into(),
        TransactionKind::Expense,
        dec!(1500),
        days,
    )
    .unwrap();
    let status = run(&mut db, &mut ledger, Action::AddRecurring(r));
    assert_eq!(status, "Recurring: Aluguel on day(s) 5, 20");

    let mut edited = ledger.recurring[0].clone();
    edited.days_of_month = BTreeSet::new();
    assert!(dispatch(&mut db, &ledger, Action::UpdateRecurring(edited.clone())).is_err());

    edited.days_of_month = [10].into_iter().collect();
    run(&mut db, &mut ledger, Action::UpdateRecurring(edited.clone()));
    assert!(ledger.recurring[0].occurs_on(10));

    run(&mut db, &mut ledger, Action::DeleteRecurring(edited.id.unwrap()));
    assert!(ledger.recurring.is_empty());
}

#[test]
fn test_pay_bill_records_tagged_expense() {
    let (mut db, mut ledger) = setup();
    let card = CreditCard::new("Nubank".into(), "Mastercard".into(), 10, 17, dec!(5000)).unwrap();
    run(&mut db, &mut ledger, Action::AddCard(card));
    let card_id = ledger.cards[0].id.unwrap();

    for value in [dec!(100), dec!(25)] {
        let txn = NewTransaction::new(
            date(2024, 3, 2),
            "Compra",
            "Compras",
            TransactionKind::Expense,
            value,
        )
        .with_card(Some(card_id), Some("Nubank".into()));
        run(&mut db, &mut ledger, Action::AddTransaction(txn));
    }

    let month = YearMonth::new(2024, 3).unwrap();
    run(
        &mut db,
        &mut ledger,
        Action::PayBill {
            card_id,
            month,
            date: date(2024, 3, 17),
        },
    );
    let payment = ledger.transactions.iter().find(|t| t.is_bill_payment).unwrap();
    assert_eq!(payment.value, dec!(125));
    assert_eq!(payment.payment_method, PaymentMethod::Debit);
    // The bill itself is unchanged: payments are not card purchases.
    let bills = projection::project_bills(&ledger.transactions, &ledger.cards, month);
    assert_eq!(bills[0].amount, dec!(125));

    let empty = dispatch(
        &mut db,
        &ledger,
        Action::PayBill {
            card_id,
            month: month.shift(1),
            date: date(2024, 4, 17),
        },
    );
    assert!(empty.is_err());
}

#[test]
fn test_buy_merges_and_rebalances() {
    let (mut db, mut ledger) = setup();
    run(&mut db, &mut ledger, buy("VALE3", dec!(10), dec!(80)));
    let status = run(&mut db, &mut ledger, buy("VALE3", dec!(10), dec!(100)));
    assert!(status.starts_with("Added to VALE3"), "{status}");
    run(&mut db, &mut ledger, buy("PETR4", dec!(100), dec!(20)));

    assert_eq!(ledger.investments.len(), 2);
    let vale = ledger
        .investments
        .iter()
        .find(|i| i.ticker.as_deref() == Some("VALE3"))
        .unwrap();
    assert_eq!(vale.purchase_price, dec!(90));
    assert_eq!(vale.quantity, dec!(20));
    assert_eq!(vale.percentage, dec!(50));
    // Three contributions recorded as expenses.
    let contributions: Decimal = ledger
        .transactions
        .iter()
        .filter(|t| t.category == portfolio::CONTRIBUTION_CATEGORY)
        .map(|t| t.value)
        .sum();
    assert_eq!(contributions, dec!(3800));
}

#[test]
fn test_quote_and_delete_investment() {
    let (mut db, mut ledger) = setup();
    run(&mut db, &mut ledger, buy("A", dec!(10), dec!(10)));
    run(&mut db, &mut ledger, buy("B", dec!(10), dec!(10)));
    let a = ledger.investments[0].id.unwrap();
    run(
        &mut db,
        &mut ledger,
        Action::UpdateQuote {
            investment_id: a,
            price: dec!(30),
        },
    );
    assert_eq!(ledger.investments[0].total_value, dec!(300));
    assert_eq!(ledger.investments[0].percentage, dec!(75));

    run(&mut db, &mut ledger, Action::DeleteInvestment(a));
    assert_eq!(ledger.investments.len(), 1);
    assert_eq!(ledger.investments[0].percentage, dec!(100));
    assert_eq!(ledger.transactions.len(), 2);
}

#[test]
fn test_dividend_income_links_asset() {
    let (mut db, mut ledger) = setup();
    run(&mut db, &mut ledger, buy("PETR4", dec!(10), dec!(30)));
    let id = ledger.investments[0].id.unwrap();

    let status = run(
        &mut db,
        &mut ledger,
        Action::RecordDividend {
            investment_id: Some(id),
            description: String::new(),
            amount: dec!(12.30),
            date: date(2024, 3, 25),
        },
    );
    assert!(status.ends_with("(linked)"), "{status}");

    let income = NewTransaction::new(
        date(2024, 4, 25),
        "Proventos petr4",
        "Proventos",
        TransactionKind::Income,
        dec!(8),
    );
    let status = run(&mut db, &mut ledger, Action::AddTransaction(income));
    assert!(status.ends_with("(best guess)"), "{status}");

    let income = NewTransaction::new(
        date(2024, 4, 26),
        "FII XPML11",
        "Dividendos",
        TransactionKind::Income,
        dec!(5),
    );
    let status = run(&mut db, &mut ledger, Action::AddTransaction(income));
    assert!(status.ends_with("(no matching asset)"), "{status}");

    assert_eq!(ledger.dividends.len(), 3);
    let linked = ledger
        .dividends
        .iter()
        .filter(|d| d.investment_id == Some(id))
        .count();
    assert_eq!(linked, 2);
}

#[test]
fn test_goal_contributions() {
    let (mut db, mut ledger) = setup();
    run(
        &mut db,
        &mut ledger,
        Action::AddGoal(Goal::new("Viagem".into(), dec!(1000), None)),
    );
    let id = ledger.goals[0].id.unwrap();
    run(
        &mut db,
        &mut ledger,
        Action::ContributeGoal {
            goal_id: id,
            amount: dec!(400),
        },
    );
    run(
        &mut db,
        &mut ledger,
        Action::ContributeGoal {
            goal_id: id,
            amount: dec!(100),
        },
    );
    assert_eq!(ledger.goals[0].current_amount, dec!(500));
    assert_eq!(ledger.goals[0].progress(), dec!(0.5));

    assert!(dispatch(
        &mut db,
        &ledger,
        Action::AddGoal(Goal::new(" ".into(), dec!(10), None))
    )
    .is_err());
    run(&mut db, &mut ledger, Action::DeleteGoal(id));
    assert!(ledger.goals.is_empty());
}

#[test]
fn test_month_summary_and_trend() {
    let (mut db, mut ledger) = setup();
    let entries = [
        (date(2024, 2, 10), "Salário", "Salário", TransactionKind::Income, dec!(5000)),
        (date(2024, 3, 5), "Salário", "Salário", TransactionKind::Income, dec!(5000)),
        (date(2024, 3, 6), "Aluguel", "Moradia", TransactionKind::Expense, dec!(1500)),
        (date(2024, 3, 7), "Mercado", "Alimentação", TransactionKind::Expense, dec!(400)),
        (date(2024, 3, 8), "Feira", "Alimentação", TransactionKind::Expense, dec!(100)),
    ];
    for (on, desc, cat, kind, value) in entries {
        let txn = NewTransaction::new(on, desc, cat, kind, value);
        run(&mut db, &mut ledger, Action::AddTransaction(txn));
    }
    let march = ledger.month_summary(YearMonth::new(2024, 3).unwrap());
    assert_eq!(march.income, dec!(5000));
    assert_eq!(march.expenses, dec!(2000));
    assert_eq!(march.net(), dec!(3000));
    assert_eq!(march.by_category[0], ("Moradia".to_string(), dec!(1500)));
    assert_eq!(march.by_category[1], ("Alimentação".to_string(), dec!(500)));

    let trend = ledger.monthly_trend(YearMonth::new(2024, 3).unwrap(), 3);
    let months: Vec<_> = trend.iter().map(|m| m.month.to_string()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
    assert_eq!(trend[1].income, dec!(5000));
}

#[test]
fn test_add_category_rejects_duplicates() {
    let (mut db, mut ledger) = setup();
    let seeded = ledger.categories.len();
    let status = run(
        &mut db,
        &mut ledger,
        Action::AddCategory(Category::new("Pets".into(), TransactionKind::Expense)),
    );
    assert_eq!(status, "Category Pets (expense)");
    assert_eq!(ledger.categories.len(), seeded + 1);

    let dup = Action::AddCategory(Category::new("pets".into(), TransactionKind::Expense));
    assert!(dispatch(&mut db, &ledger, dup).is_err());
    assert_eq!(ledger.categories.len(), seeded + 1);
}

#[test]
fn test_oversized_amounts_are_rejected() {
    let (mut db, mut ledger) = setup();
    let txn = NewTransaction::new(
        date(2024, 3, 5),
        "Mercado",
        "Alimentação",
        TransactionKind::Expense,
        Decimal::MAX,
    );
    let err = dispatch(&mut db, &ledger, Action::AddTransaction(txn)).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::TooLarge(Decimal::MAX))
    );
    assert_eq!(db.get_transaction_count().unwrap(), 0);

    assert!(dispatch(&mut db, &ledger, buy("PETR4", Decimal::MAX, dec!(2))).is_err());
    assert!(ledger.investments.is_empty());

    run(&mut db, &mut ledger, buy("PETR4", dec!(10), dec!(30)));
    let id = ledger.investments[0].id.unwrap();
    let quote = Action::UpdateQuote {
        investment_id: id,
        price: Decimal::MAX,
    };
    assert!(dispatch(&mut db, &ledger, quote).is_err());
    assert_eq!(ledger.investments[0].current_price, dec!(30));

    run(
        &mut db,
        &mut ledger,
        Action::AddGoal(Goal::new("Viagem".into(), dec!(1000), None)),
    );
    let goal = ledger.goals[0].id.unwrap();
    let contribution = Action::ContributeGoal {
        goal_id: goal,
        amount: Decimal::MAX,
    };
    assert!(dispatch(&mut db, &ledger, contribution).is_err());
    assert_eq!(ledger.goals[0].current_amount, dec!(0));
}

#[test]
fn test_unsplittable_installments_store_nothing() {
    let (mut db, mut ledger) = setup();
    let txn = NewTransaction::new(
        date(2024, 3, 10),
        "Chiclete",
        "Alimentação",
        TransactionKind::Expense,
        dec!(0.02),
    )
    .with_installments(3);
    let err = dispatch(&mut db, &ledger, Action::AddTransaction(txn)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ValidationError>(),
        Some(ValidationError::TooSmallToSplit { .. })
    ));
    assert!(ledger.transactions.is_empty());
    assert_eq!(db.get_transaction_count().unwrap(), 0);
}
