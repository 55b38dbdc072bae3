#![allow(clippy::unwrap_used, clippy::panic)]

use rust_decimal_macros::dec;

use super::*;
use crate::store::Ledger;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn app() -> App {
    let mut card = CreditCard::new("Nubank".into(), "Mastercard".into(), 10, 17, dec!(5000)).unwrap();
    card.id = Some(7);
    let holding = NewInvestment {
        name: "Petrobras".into(),
        ticker: Some("PETR4".into()),
        category: "Ações".into(),
        quantity: dec!(100),
        purchase_price: dec!(30),
        current_price: dec!(30),
        total_value: dec!(3000),
        color: String::new(),
        icon: String::new(),
    }
    .into_investment(3);
    let mut goal = Goal::new("Viagem".into(), dec!(8000), None);
    goal.id = Some(5);
    let ledger = Ledger {
        cards: vec![card],
        investments: vec![holding],
        goals: vec![goal],
        categories: vec![
            Category::new("Casa".into(), TransactionKind::Expense),
            Category::new("Salário".into(), TransactionKind::Income),
        ],
        ..Ledger::default()
    };
    App::new(ledger, date(2024, 3, 15))
}

#[test]
fn test_args_split_words_and_flags() {
    let args = Args::parse("Tesouro Selic 100 name=Tesouro_Selic_2029 n=3");
    assert_eq!(args.words, vec!["Tesouro", "Selic", "100"]);
    assert_eq!(args.flags["name"], "Tesouro Selic 2029");
    assert_eq!(args.flags["n"], "3");
}

#[test]
fn test_parse_amount_formats() {
    assert_eq!(parse_amount("-4.50"), Some(dec!(-4.50)));
    assert_eq!(parse_amount("1.234,56"), Some(dec!(1234.56)));
    assert_eq!(parse_amount("R$10"), Some(dec!(10)));
    assert_eq!(parse_amount("-R$ 3,5"), Some(dec!(-3.5)));
    assert_eq!(parse_amount("abc"), None);
}

#[test]
fn test_parse_date_formats() {
    let today = date(2024, 3, 15);
    assert_eq!(parse_date("2024-01-31", today), Some(date(2024, 1, 31)));
    assert_eq!(parse_date("25/12/2023", today), Some(date(2023, 12, 25)));
    assert_eq!(parse_date("07/09", today), Some(date(2024, 9, 7)));
    assert_eq!(parse_date("today", today), Some(today));
    assert_eq!(parse_date("31/02", today), None);
    assert_eq!(parse_date("Mercado", today), None);
}

#[test]
fn test_add_txn_installments_on_known_card() {
    let app = app();
    let action = parse_add_txn("2024-03-10 Geladeira Nova -3000 card=nubank n=10 cat=casa", &app).unwrap();
    let Action::AddTransaction(txn) = action else {
        panic!("expected AddTransaction");
    };
    assert_eq!(txn.date, date(2024, 3, 10));
    assert_eq!(txn.description, "Geladeira Nova");
    assert_eq!(txn.kind, TransactionKind::Expense);
    assert_eq!(txn.value, dec!(3000));
    assert_eq!(txn.category, "Casa");
    assert_eq!(txn.payment_method, PaymentMethod::CreditCard);
    assert_eq!(txn.card_id, Some(7));
    assert_eq!(txn.total_installments, 10);
}

#[test]
fn test_add_txn_unknown_card_keeps_label() {
    let app = app();
    let Action::AddTransaction(txn) = parse_add_txn("Uber -25 card=Inter", &app).unwrap() else {
        panic!("expected AddTransaction");
    };
    assert_eq!(txn.date, app.today);
    assert_eq!(txn.card_id, None);
    assert_eq!(txn.card_brand.as_deref(), Some("Inter"));
    assert_eq!(txn.category, "Outros");
}

#[test]
fn test_add_txn_positive_is_income() {
    let app = app();
    let Action::AddTransaction(txn) = parse_add_txn("05/03/2024 Salário 5000 cat=salário", &app).unwrap()
    else {
        panic!("expected AddTransaction");
    };
    assert_eq!(txn.kind, TransactionKind::Income);
    assert_eq!(txn.category, "Salário");
    assert_eq!(txn.payment_method, PaymentMethod::Cash);
}

#[test]
fn test_add_txn_dividend_with_asset() {
    let app = app();
    let Action::AddTransaction(txn) =
        parse_add_txn("Proventos 12,30 cat=Dividendos inv=PETR4", &app).unwrap()
    else {
        panic!("expected AddTransaction");
    };
    assert_eq!(txn.investment_id, Some(3));
    assert_eq!(txn.value, dec!(12.30));
}

#[test]
fn test_add_txn_payment_method() {
    let app = app();
    let Action::AddTransaction(txn) = parse_add_txn("Feira -40 pay=pix", &app).unwrap() else {
        panic!("expected AddTransaction");
    };
    assert_eq!(txn.payment_method, PaymentMethod::Pix);

    let err = parse_add_txn("Feira -40 pay=cheque", &app).unwrap_err();
    assert_eq!(
        err,
        "Unknown payment method cheque (use Cash, Debit, Pix, Credit Card, Bank Slip)"
    );
}

#[test]
fn test_add_txn_usage_errors() {
    let app = app();
    assert!(parse_add_txn("", &app).is_err());
    assert!(parse_add_txn("2024-03-10 -30", &app).is_err());
    assert!(parse_add_txn("Mercado trinta", &app).is_err());
    assert!(parse_add_txn("Mercado -30 n=dez", &app).is_err());
    assert!(parse_add_txn("Mercado -30 inv=XPTO11", &app).is_err());
}

#[test]
fn test_buy_defaults_name_to_ticker() {
    let app = app();
    let Action::BuyInvestment(p) = parse_buy("vale3 10 80 current=82,5", &app).unwrap() else {
        panic!("expected BuyInvestment");
    };
    assert_eq!(p.ticker.as_deref(), Some("vale3"));
    assert_eq!(p.name, "vale3");
    assert_eq!(p.category, "Ações");
    assert_eq!(p.current_price, Some(dec!(82.5)));
    assert_eq!(p.date, app.today);

    let Action::BuyInvestment(p) =
        parse_buy("- 1 1000 name=Tesouro_Selic cat=Renda_Fixa", &app).unwrap()
    else {
        panic!("expected BuyInvestment");
    };
    assert_eq!(p.ticker, None);
    assert_eq!(p.name, "Tesouro Selic");
    assert_eq!(p.category, "Renda Fixa");

    assert!(parse_buy("PETR4 100", &app).is_err());
}

#[test]
fn test_recurring_with_day_list_and_range() {
    let app = app();
    let Action::AddRecurring(r) = parse_recurring("Aluguel -1500 days=5,20 cat=Moradia", &app).unwrap()
    else {
        panic!("expected AddRecurring");
    };
    assert_eq!(r.kind, TransactionKind::Expense);
    assert_eq!(r.value, dec!(1500));
    assert_eq!(r.days_label(), "5, 20");

    let Action::AddRecurring(r) =
        parse_recurring("Academia -99 from=2024-03-28 to=2024-04-02", &app).unwrap()
    else {
        panic!("expected AddRecurring");
    };
    let days: Vec<u32> = r.days_of_month.iter().copied().collect();
    assert_eq!(days, vec![1, 2, 28, 29, 30, 31]);
}

#[test]
fn test_recurring_rejections() {
    let app = app();
    assert!(parse_recurring("Aluguel -1500", &app).is_err());
    assert!(parse_recurring("Aluguel -1500 days=0", &app).is_err());
    assert!(parse_recurring("Aluguel -1500 from=2024-03-10", &app).is_err());
    let err = parse_recurring("Aluguel -1500 from=2024-03-10 to=2024-03-01", &app).unwrap_err();
    assert!(err.contains("select at least one day"), "{err}");
}

#[test]
fn test_edit_recurring_needs_selection() {
    let mut app = app();
    assert!(parse_edit_recurring("100", &app).is_err());

    let mut entry = RecurringObligation::new(
        "Internet".into(),
        "Contas".into(),
        TransactionKind::Expense,
        dec!(120),
        [10].into_iter().collect(),
    )
    .unwrap();
    entry.id = Some(1);
    app.ledger.recurring.push(entry);

    let Action::UpdateRecurring(edited) = parse_edit_recurring("130 days=12 desc=Fibra", &app).unwrap()
    else {
        panic!("expected UpdateRecurring");
    };
    assert_eq!(edited.id, Some(1));
    assert_eq!(edited.value, dec!(130));
    assert_eq!(edited.kind, TransactionKind::Expense);
    assert!(edited.occurs_on(12));
    assert!(!edited.occurs_on(10));
    assert_eq!(edited.description, "Fibra");
}

#[test]
fn test_card_name_with_spaces() {
    let Action::AddCard(card) = parse_card("Itaú Black 3 10 limit=20000 brand=Visa").unwrap() else {
        panic!("expected AddCard");
    };
    assert_eq!(card.name, "Itaú Black");
    assert_eq!(card.closing_day, 3);
    assert_eq!(card.due_day, 10);
    assert_eq!(card.credit_limit, dec!(20000));
    assert_eq!(card.brand, "Visa");

    assert!(parse_card("Nubank 10").is_err());
    assert!(parse_card("Nubank 32 10").is_err());
}

#[test]
fn test_pay_bill_resolves_card_and_month() {
    let mut app = app();
    let action = parse_pay_bill("Nubank 2024-02 date=2024-03-17", &app).unwrap();
    assert_eq!(
        action,
        Action::PayBill {
            card_id: 7,
            month: YearMonth::new(2024, 2).unwrap(),
            date: date(2024, 3, 17),
        }
    );

    // No card named: the selected card and the viewed month.
    app.set_month(YearMonth::new(2024, 4).unwrap());
    let action = parse_pay_bill("", &app).unwrap();
    assert_eq!(
        action,
        Action::PayBill {
            card_id: 7,
            month: YearMonth::new(2024, 4).unwrap(),
            date: app.today,
        }
    );
    assert!(parse_pay_bill("Inter", &app).is_err());
}

#[test]
fn test_dividend_targets() {
    let app = app();
    let action = parse_dividend("#3 12.30 date=2024-03-25", &app).unwrap();
    assert_eq!(
        action,
        Action::RecordDividend {
            investment_id: Some(3),
            description: String::new(),
            amount: dec!(12.30),
            date: date(2024, 3, 25),
        }
    );
    let Action::RecordDividend { investment_id, .. } = parse_dividend("- 5 desc=FII_XPML11", &app).unwrap()
    else {
        panic!("expected RecordDividend");
    };
    assert_eq!(investment_id, None);
    assert!(parse_dividend("XPTO11 5", &app).is_err());
}

#[test]
fn test_goal_and_contribution() {
    let app = app();
    let Action::AddGoal(goal) = parse_goal("Reserva de Emergência 20000 by=2025-12-31", &app).unwrap()
    else {
        panic!("expected AddGoal");
    };
    assert_eq!(goal.name, "Reserva de Emergência");
    assert_eq!(goal.target_amount, dec!(20000));
    assert_eq!(goal.deadline, Some(date(2025, 12, 31)));

    let action = parse_contribute("viagem 500", &app).unwrap();
    assert_eq!(
        action,
        Action::ContributeGoal {
            goal_id: 5,
            amount: dec!(500),
        }
    );
    assert!(parse_contribute("Carro 500", &app).is_err());
}

#[test]
fn test_unknown_command_suggests_closest() {
    assert_eq!(find_closest("add-tx"), "add-txn");
    assert_eq!(find_closest("pay-bil"), "pay-bill");
}

#[test]
fn test_levenshtein() {
    assert_eq!(levenshtein("kitten", "sitting"), 3);
    assert_eq!(levenshtein("", "abc"), 3);
    assert_eq!(levenshtein("same", "same"), 0);
}

#[test]
fn test_parse_category() {
    let action = parse_category("Freela kind=income").unwrap();
    let Action::AddCategory(cat) = action else {
        panic!("expected AddCategory");
    };
    assert_eq!(cat.name, "Freela");
    assert_eq!(cat.kind, TransactionKind::Income);

    let Action::AddCategory(cat) = parse_category("Pet Shop").unwrap() else {
        panic!("expected AddCategory");
    };
    assert_eq!(cat.name, "Pet Shop");
    assert_eq!(cat.kind, TransactionKind::Expense);
    assert!(parse_category("").is_err());
}
