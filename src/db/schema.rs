pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id  TEXT NOT NULL,
    name      TEXT NOT NULL,
    kind      TEXT NOT NULL DEFAULT 'expense',
    icon      TEXT NOT NULL DEFAULT '',
    UNIQUE(owner_id, name)
);

CREATE TABLE IF NOT EXISTS transactions (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id            TEXT NOT NULL,
    date                TEXT NOT NULL,
    description         TEXT NOT NULL CHECK (length(trim(description)) > 0),
    category            TEXT NOT NULL DEFAULT '',
    kind                TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
    value               TEXT NOT NULL,
    payment_method      TEXT NOT NULL DEFAULT 'Cash',
    card_id             INTEGER,
    card_brand          TEXT,
    installment_number  INTEGER,
    total_installments  INTEGER,
    is_bill_payment     BOOLEAN NOT NULL DEFAULT 0,
    notes               TEXT NOT NULL DEFAULT '',
    created_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_owner_date ON transactions(owner_id, date);
CREATE INDEX IF NOT EXISTS idx_transactions_card ON transactions(card_id);

CREATE TABLE IF NOT EXISTS recurring (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id       TEXT NOT NULL,
    description    TEXT NOT NULL,
    category       TEXT NOT NULL DEFAULT '',
    kind           TEXT NOT NULL,
    value          TEXT NOT NULL,
    days_of_month  TEXT NOT NULL,
    icon           TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS credit_cards (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id      TEXT NOT NULL,
    name          TEXT NOT NULL,
    brand         TEXT NOT NULL DEFAULT '',
    closing_day   INTEGER NOT NULL,
    due_day       INTEGER NOT NULL,
    credit_limit  TEXT NOT NULL DEFAULT '0'
);

CREATE TABLE IF NOT EXISTS investments (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id        TEXT NOT NULL,
    name            TEXT NOT NULL,
    ticker          TEXT,
    category        TEXT NOT NULL DEFAULT '',
    quantity        TEXT NOT NULL,
    purchase_price  TEXT NOT NULL,
    current_price   TEXT NOT NULL,
    total_value     TEXT NOT NULL,
    percentage      TEXT NOT NULL DEFAULT '0',
    color           TEXT NOT NULL DEFAULT '',
    icon            TEXT NOT NULL DEFAULT ''
);

-- No foreign keys: a dividend outlives the holding it was paid by.
CREATE TABLE IF NOT EXISTS dividends (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id        TEXT NOT NULL,
    investment_id   INTEGER,
    asset_name      TEXT NOT NULL,
    amount          TEXT NOT NULL,
    date            TEXT NOT NULL,
    transaction_id  INTEGER
);
"#;

pub(crate) const CURRENT_VERSION: i32 = 2;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[(
    1,
    "CREATE TABLE IF NOT EXISTS goals (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        owner_id        TEXT NOT NULL,
        name            TEXT NOT NULL,
        target_amount   TEXT NOT NULL,
        current_amount  TEXT NOT NULL DEFAULT '0',
        deadline        TEXT,
        icon            TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS idx_dividends_investment ON dividends(investment_id);",
)];
