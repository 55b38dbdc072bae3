#![allow(clippy::unwrap_used)]

use super::*;
use crate::installments;
use crate::portfolio::{plan_purchase, Purchase};
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn expense(on: NaiveDate, desc: &str, value: Decimal) -> NewTransaction {
    NewTransaction::new(on, desc, "Outros", TransactionKind::Expense, value)
}

fn purchase(ticker: &str, qty: Decimal, price: Decimal) -> Purchase {
    Purchase {
        ticker: Some(ticker.into()),
        name: ticker.into(),
        category: "Ações".into(),
        quantity: qty,
        purchase_price: price,
        current_price: None,
        date: date(2024, 3, 10),
        color: String::new(),
        icon: String::new(),
    }
}

// ── Schema & defaults ─────────────────────────────────────────

#[test]
fn test_fresh_database_is_current() {
    let db = Database::open_in_memory("ana").unwrap();
    assert_eq!(db.schema_version().unwrap(), schema::CURRENT_VERSION);
    assert!(db.get_goals().unwrap().is_empty());
}

#[test]
fn test_v1_database_is_migrated() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(schema::SCHEMA_V1).unwrap();
    conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])
        .unwrap();
    let db = Database::init(conn, "ana").unwrap();
    assert_eq!(db.schema_version().unwrap(), 2);
    let goal = db
        .insert_goal(&Goal::new("Reserva".into(), dec!(10000), None))
        .unwrap();
    assert!(goal.id.is_some());
}

#[test]
fn test_default_categories_seeded() {
    let db = Database::open_in_memory("ana").unwrap();
    let cats = db.get_categories().unwrap();
    let investimento = Category::find_by_name(&cats, "Investimento").unwrap();
    assert_eq!(investimento.kind, TransactionKind::Expense);
    let dividendos = Category::find_by_name(&cats, "Dividendos").unwrap();
    assert_eq!(dividendos.kind, TransactionKind::Income);
    assert!(Category::find_by_name(&cats, "Fatura do Cartão").is_some());
}

#[test]
fn test_insert_category() {
    let db = Database::open_in_memory("ana").unwrap();
    let before = db.get_categories().unwrap().len();
    db.insert_category(&Category::new("Pets".into(), TransactionKind::Expense))
        .unwrap();
    assert_eq!(db.get_categories().unwrap().len(), before + 1);
    // Names are unique per owner.
    assert!(db
        .insert_category(&Category::new("Pets".into(), TransactionKind::Expense))
        .is_err());
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_transaction_round_trip() {
    let db = Database::open_in_memory("ana").unwrap();
    let mut new = expense(date(2024, 3, 5), "Mercado", dec!(123.45))
        .with_card(Some(4), Some("Nubank".into()));
    new.installment = Some(Installment {
        number: 2,
        total: 3,
    });
    new.notes = "semana".into();
    let saved = db.insert_transaction(&new).unwrap();

    let all = db.get_transactions(None).unwrap();
    assert_eq!(all.len(), 1);
    let t = &all[0];
    assert_eq!(t.id, saved.id);
    assert_eq!(t.date, date(2024, 3, 5));
    assert_eq!(t.value, dec!(123.45));
    assert_eq!(t.payment_method, PaymentMethod::CreditCard);
    assert_eq!(t.card_id, Some(4));
    assert_eq!(t.card_brand.as_deref(), Some("Nubank"));
    assert_eq!(t.installment.unwrap().to_string(), "2/3");
    assert_eq!(t.notes, "semana");
    assert!(!t.created_at.is_empty());
}

#[test]
fn test_transaction_month_filter_and_order() {
    let db = Database::open_in_memory("ana").unwrap();
    db.insert_transaction(&expense(date(2024, 3, 1), "A", dec!(1)))
        .unwrap();
    db.insert_transaction(&expense(date(2024, 3, 20), "B", dec!(2)))
        .unwrap();
    db.insert_transaction(&expense(date(2024, 4, 2), "C", dec!(3)))
        .unwrap();

    let march = db.get_transactions(YearMonth::new(2024, 3)).unwrap();
    let names: Vec<_> = march.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(names, vec!["B", "A"]);
    assert_eq!(db.get_transaction_count().unwrap(), 3);
}

#[test]
fn test_delete_transaction() {
    let db = Database::open_in_memory("ana").unwrap();
    let saved = db
        .insert_transaction(&expense(date(2024, 3, 1), "A", dec!(1)))
        .unwrap();
    assert!(db.delete_transaction(saved.id.unwrap()).unwrap());
    assert!(!db.delete_transaction(saved.id.unwrap()).unwrap());
    assert_eq!(db.get_transaction_count().unwrap(), 0);
}

#[test]
fn test_installment_batch_is_persisted() {
    let mut db = Database::open_in_memory("ana").unwrap();
    let group = installments::expand(
        &expense(date(2024, 1, 31), "Geladeira", dec!(1000.00)).with_installments(3),
    )
    .unwrap();
    let saved = db.insert_transactions_batch(&group).unwrap();
    assert_eq!(saved.len(), 3);

    let all = db.get_transactions(None).unwrap();
    let total: Decimal = all.iter().map(|t| t.value).sum();
    assert_eq!(total, dec!(1000.00));
    assert!(all.iter().any(|t| t.date == date(2024, 2, 29)));
}

#[test]
fn test_failed_batch_writes_nothing() {
    let mut db = Database::open_in_memory("ana").unwrap();
    let batch = vec![
        expense(date(2024, 3, 1), "Ok", dec!(10)),
        expense(date(2024, 4, 1), "   ", dec!(10)),
    ];
    assert!(db.insert_transactions_batch(&batch).is_err());
    assert_eq!(db.get_transaction_count().unwrap(), 0);
}

// ── Owner isolation ───────────────────────────────────────────

#[test]
fn test_owners_do_not_see_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("finboard.db");

    let ana = Database::open(&path, "ana").unwrap();
    let txn = ana
        .insert_transaction(&expense(date(2024, 3, 1), "Aluguel", dec!(1500)))
        .unwrap();
    let card = ana
        .insert_card(&CreditCard::new("Nubank".into(), "Mastercard".into(), 10, 17, dec!(5000)).unwrap())
        .unwrap();

    let bruno = Database::open(&path, "bruno").unwrap();
    assert!(bruno.get_transactions(None).unwrap().is_empty());
    assert!(bruno.get_cards().unwrap().is_empty());
    assert!(!bruno.get_categories().unwrap().is_empty());
    // Deleting by id does not reach across owners.
    assert!(!bruno.delete_transaction(txn.id.unwrap()).unwrap());
    assert!(!bruno.delete_card(card.id.unwrap()).unwrap());

    assert_eq!(ana.get_transactions(None).unwrap().len(), 1);
    assert_eq!(ana.get_cards().unwrap().len(), 1);
}

// ── Recurring & cards ─────────────────────────────────────────

#[test]
fn test_recurring_crud() {
    let db = Database::open_in_memory("ana").unwrap();
    let days: BTreeSet<u32> = [5, 20].into_iter().collect();
    let r = RecurringObligation::new(
        "Aluguel".into(),
        "Moradia".into(),
        TransactionKind::Expense,
        dec!(1500),
        days,
    )
    .unwrap();
    let mut saved = db.insert_recurring(&r).unwrap();

    saved.days_of_month = [10].into_iter().collect();
    saved.value = dec!(1600);
    assert!(db.update_recurring(&saved).unwrap());

    let all = db.get_recurring().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].encode_days(), "10");
    assert_eq!(all[0].value, dec!(1600));

    assert!(db.delete_recurring(saved.id.unwrap()).unwrap());
    assert!(db.get_recurring().unwrap().is_empty());
}

#[test]
fn test_card_crud() {
    let db = Database::open_in_memory("ana").unwrap();
    let card = db
        .insert_card(&CreditCard::new("Inter".into(), "Visa".into(), 5, 12, dec!(2500)).unwrap())
        .unwrap();
    let cards = db.get_cards().unwrap();
    assert_eq!(cards, vec![card.clone()]);
    assert!(db.delete_card(card.id.unwrap()).unwrap());
}

// ── Investments & dividends ───────────────────────────────────

#[test]
fn test_purchase_creates_then_merges() {
    let mut db = Database::open_in_memory("ana").unwrap();

    let plan = plan_purchase(&purchase("PETR4", dec!(10), dec!(80)), &[]).unwrap();
    let (first, contribution) = db.record_purchase(&plan).unwrap();
    assert_eq!(contribution.category, "Investimento");
    assert_eq!(contribution.value, dec!(800));

    let holdings = db.get_investments().unwrap();
    let plan = plan_purchase(&purchase("PETR4", dec!(10), dec!(100)), &holdings).unwrap();
    let (merged, _) = db.record_purchase(&plan).unwrap();
    assert_eq!(merged.id, first.id);

    let holdings = db.get_investments().unwrap();
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].quantity, dec!(20));
    assert_eq!(holdings[0].purchase_price, dec!(90));
    assert_eq!(holdings[0].total_value, dec!(2000));
    assert_eq!(db.get_transaction_count().unwrap(), 2);
}

#[test]
fn test_save_percentages() {
    let mut db = Database::open_in_memory("ana").unwrap();
    for (t, p) in [("A", dec!(300)), ("B", dec!(100))] {
        let plan = plan_purchase(&purchase(t, dec!(1), p), &[]).unwrap();
        db.record_purchase(&plan).unwrap();
    }
    let mut holdings = db.get_investments().unwrap();
    portfolio::rebalance(&mut holdings);
    db.save_percentages(&holdings).unwrap();
    let reloaded = db.get_investments().unwrap();
    assert_eq!(reloaded[0].percentage, dec!(75));
    assert_eq!(reloaded[1].percentage, dec!(25));
}

#[test]
fn test_deleting_holding_keeps_orphans() {
    let mut db = Database::open_in_memory("ana").unwrap();
    let plan = plan_purchase(&purchase("PETR4", dec!(10), dec!(30)), &[]).unwrap();
    let (holding, _) = db.record_purchase(&plan).unwrap();

    let income = NewTransaction::new(
        date(2024, 3, 20),
        "Dividendos PETR4",
        "Dividendos",
        TransactionKind::Income,
        dec!(45),
    );
    let holdings = db.get_investments().unwrap();
    let link = portfolio::link_dividend(&income.description, None, &holdings);
    let (_, dividend) = db.record_income_with_dividend(&income, &link).unwrap();
    assert_eq!(dividend.investment_id, holding.id);

    assert!(db.delete_investment(holding.id.unwrap()).unwrap());
    assert!(db.get_investments().unwrap().is_empty());
    let dividends = db.get_dividends().unwrap();
    assert_eq!(dividends.len(), 1);
    assert_eq!(dividends[0].investment_id, holding.id);
    // Contribution and dividend income both survive.
    assert_eq!(db.get_transaction_count().unwrap(), 2);
}

// ── Goals ─────────────────────────────────────────────────────

#[test]
fn test_goal_crud() {
    let db = Database::open_in_memory("ana").unwrap();
    let goal = db
        .insert_goal(&Goal::new("Viagem".into(), dec!(8000), Some(date(2025, 1, 1))))
        .unwrap();
    assert!(db.update_goal_amount(goal.id.unwrap(), dec!(2000)).unwrap());
    let goals = db.get_goals().unwrap();
    assert_eq!(goals[0].current_amount, dec!(2000));
    assert_eq!(goals[0].deadline, Some(date(2025, 1, 1)));
    assert!(db.delete_goal(goal.id.unwrap()).unwrap());
}

// ── Export ────────────────────────────────────────────────────

#[test]
fn test_export_to_csv() {
    let db = Database::open_in_memory("ana").unwrap();
    db.insert_transaction(&expense(date(2024, 3, 1), "Padaria", dec!(12.50)))
        .unwrap();
    db.insert_transaction(&expense(date(2024, 4, 1), "Farmácia", dec!(30)))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let count = db.export_to_csv(&path, YearMonth::new(2024, 3)).unwrap();
    assert_eq!(count, 1);

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("date,description"));
    assert!(lines.next().unwrap().starts_with("2024-03-01,Padaria,Outros,expense,12.50"));
    assert!(lines.next().is_none());

    let empty = dir.path().join("none.csv");
    assert_eq!(db.export_to_csv(&empty, YearMonth::new(2020, 1)).unwrap(), 0);
    assert!(!empty.exists());
}
