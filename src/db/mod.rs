mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::calendar::YearMonth;
use crate::models::*;
use crate::portfolio::{self, DividendLink, HoldingChange, PurchasePlan};

/// SQLite store. Every read and write is scoped to `owner`.
pub(crate) struct Database {
    conn: Connection,
    owner: String,
}

const TRANSACTION_COLUMNS: &str = "id, date, description, category, kind, value, payment_method,
     card_id, card_brand, installment_number, total_installments, is_bill_payment, notes, created_at";

const INVESTMENT_COLUMNS: &str = "id, name, ticker, category, quantity, purchase_price,
     current_price, total_value, percentage, color, icon";

fn decimal(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    Ok(Decimal::from_str(&s).unwrap_or_default())
}

fn now_stamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let number: Option<u32> = row.get(9)?;
    let total: Option<u32> = row.get(10)?;
    Ok(Transaction {
        id: Some(row.get(0)?),
        date: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        kind: TransactionKind::parse(&row.get::<_, String>(4)?),
        value: decimal(row, 5)?,
        payment_method: PaymentMethod::parse(&row.get::<_, String>(6)?),
        card_id: row.get(7)?,
        card_brand: row.get(8)?,
        installment: number
            .zip(total)
            .map(|(number, total)| Installment { number, total }),
        is_bill_payment: row.get(11)?,
        notes: row.get(12)?,
        created_at: row.get(13)?,
    })
}

fn investment_from_row(row: &Row<'_>) -> rusqlite::Result<Investment> {
    Ok(Investment {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        ticker: row.get(2)?,
        category: row.get(3)?,
        quantity: decimal(row, 4)?,
        purchase_price: decimal(row, 5)?,
        current_price: decimal(row, 6)?,
        total_value: decimal(row, 7)?,
        percentage: decimal(row, 8)?,
        color: row.get(9)?,
        icon: row.get(10)?,
    })
}

/// Shared by single and batch inserts so both go through the same statement.
fn insert_transaction_row(
    conn: &Connection,
    owner: &str,
    txn: &NewTransaction,
    created_at: &str,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (owner_id, date, description, category, kind, value, payment_method,
             card_id, card_brand, installment_number, total_installments, is_bill_payment, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            owner,
            txn.date,
            txn.description,
            txn.category,
            txn.kind.as_str(),
            txn.value.to_string(),
            txn.payment_method.as_str(),
            txn.card_id,
            txn.card_brand,
            txn.installment.map(|i| i.number),
            txn.installment.map(|i| i.total),
            txn.is_bill_payment,
            txn.notes,
            created_at,
        ],
    )
    .with_context(|| format!("Failed to save transaction '{}'", txn.description))?;
    Ok(conn.last_insert_rowid())
}

fn insert_investment_row(conn: &Connection, owner: &str, inv: &NewInvestment) -> Result<i64> {
    conn.execute(
        "INSERT INTO investments (owner_id, name, ticker, category, quantity, purchase_price,
             current_price, total_value, percentage, color, icon)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, '0', ?9, ?10)",
        params![
            owner,
            inv.name,
            inv.ticker,
            inv.category,
            inv.quantity.to_string(),
            inv.purchase_price.to_string(),
            inv.current_price.to_string(),
            inv.total_value.to_string(),
            inv.color,
            inv.icon,
        ],
    )
    .with_context(|| format!("Failed to save investment '{}'", inv.name))?;
    Ok(conn.last_insert_rowid())
}

fn update_investment_row(conn: &Connection, owner: &str, inv: &Investment) -> Result<usize> {
    Ok(conn.execute(
        "UPDATE investments SET name = ?1, ticker = ?2, category = ?3, quantity = ?4,
             purchase_price = ?5, current_price = ?6, total_value = ?7, percentage = ?8,
             color = ?9, icon = ?10
         WHERE id = ?11 AND owner_id = ?12",
        params![
            inv.name,
            inv.ticker,
            inv.category,
            inv.quantity.to_string(),
            inv.purchase_price.to_string(),
            inv.current_price.to_string(),
            inv.total_value.to_string(),
            inv.percentage.to_string(),
            inv.color,
            inv.icon,
            inv.id,
            owner,
        ],
    )?)
}

impl Database {
    pub(crate) fn open(path: &Path, owner: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        Self::init(conn, owner)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory(owner: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::init(conn, owner)
    }

    fn init(conn: Connection, owner: &str) -> Result<Self> {
        let mut db = Self {
            conn,
            owner: owner.to_string(),
        };
        db.migrate().context("Database migration failed")?;
        db.seed_default_categories()?;
        Ok(db)
    }

    pub(crate) fn owner(&self) -> &str {
        &self.owner
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        let current: i32 = if has_version_table {
            self.conn
                .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                    row.get(0)
                })
                .unwrap_or(0)
        } else {
            // Fresh database: lay down v1, then run the same upgrades as an old file.
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn
                .execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
            1
        };

        let tx = self.conn.transaction()?;
        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tx.execute_batch(sql)
                    .with_context(|| format!("Migration from v{from_version} failed"))?;
            }
        }
        if current < schema::CURRENT_VERSION {
            tx.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(from = current, to = schema::CURRENT_VERSION, "migrated schema");
        }
        tx.commit()?;
        Ok(())
    }

    #[cfg(test)]
    fn schema_version(&self) -> Result<i32> {
        Ok(self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?)
    }

    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE owner_id = ?1",
            params![self.owner],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Ok(());
        }

        let expenses = [
            "Alimentação",
            "Casa",
            "Compras",
            "Contas",
            "Educação",
            "Fatura do Cartão",
            "Investimento",
            "Lazer",
            "Moradia",
            "Outros",
            "Saúde",
            "Transporte",
        ];
        let incomes = [
            "Dividendos",
            "Freelance",
            "Outras Receitas",
            "Rendimentos",
            "Salário",
        ];

        let tx = self.conn.transaction()?;
        for (names, kind) in [
            (&expenses[..], TransactionKind::Expense),
            (&incomes[..], TransactionKind::Income),
        ] {
            for name in names {
                tx.execute(
                    "INSERT OR IGNORE INTO categories (owner_id, name, kind, icon) VALUES (?1, ?2, ?3, '')",
                    params![self.owner, name, kind.as_str()],
                )?;
            }
        }
        tx.commit()?;
        tracing::debug!(owner = %self.owner, "seeded default categories");
        Ok(())
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, kind, icon FROM categories WHERE owner_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![self.owner], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                kind: TransactionKind::parse(&row.get::<_, String>(2)?),
                icon: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (owner_id, name, kind, icon) VALUES (?1, ?2, ?3, ?4)",
            params![self.owner, cat.name, cat.kind.as_str(), cat.icon],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &NewTransaction) -> Result<Transaction> {
        let created_at = now_stamp();
        let id = insert_transaction_row(&self.conn, &self.owner, txn, &created_at)?;
        tracing::debug!(id, value = %txn.value, "inserted transaction");
        Ok(txn.clone().into_transaction(id, created_at))
    }

    /// All-or-nothing insert; used for installment groups.
    pub(crate) fn insert_transactions_batch(
        &mut self,
        txns: &[NewTransaction],
    ) -> Result<Vec<Transaction>> {
        let created_at = now_stamp();
        let tx = self.conn.transaction()?;
        let mut saved = Vec::with_capacity(txns.len());
        for txn in txns {
            let id = insert_transaction_row(&tx, &self.owner, txn, &created_at)?;
            saved.push(txn.clone().into_transaction(id, created_at.clone()));
        }
        tx.commit()?;
        tracing::info!(count = saved.len(), "inserted transaction batch");
        Ok(saved)
    }

    /// Newest first; `month` narrows to one calendar month.
    pub(crate) fn get_transactions(&self, month: Option<YearMonth>) -> Result<Vec<Transaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE owner_id = ?1 AND (?2 IS NULL OR date LIKE ?2)
             ORDER BY date DESC, id DESC"
        );
        let month_pat = month.map(|m| format!("{m}%"));
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![self.owner, month_pat], transaction_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transaction_count(&self) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE owner_id = ?1",
            params![self.owner],
            |row| row.get(0),
        )?)
    }

    /// Returns whether a row was removed.
    pub(crate) fn delete_transaction(&self, id: i64) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM transactions WHERE id = ?1 AND owner_id = ?2",
            params![id, self.owner],
        )?;
        Ok(n > 0)
    }

    /// Income plus the dividend row it pays, written together.
    pub(crate) fn record_income_with_dividend(
        &mut self,
        txn: &NewTransaction,
        link: &DividendLink,
    ) -> Result<(Transaction, Dividend)> {
        let created_at = now_stamp();
        let tx = self.conn.transaction()?;
        let id = insert_transaction_row(&tx, &self.owner, txn, &created_at)?;
        let saved = txn.clone().into_transaction(id, created_at);
        let mut dividend = portfolio::new_dividend(&saved, link);
        tx.execute(
            "INSERT INTO dividends (owner_id, investment_id, asset_name, amount, date, transaction_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.owner,
                dividend.investment_id,
                dividend.asset_name,
                dividend.amount.to_string(),
                dividend.date,
                dividend.transaction_id,
            ],
        )?;
        dividend.id = Some(tx.last_insert_rowid());
        tx.commit()?;
        tracing::info!(
            transaction = id,
            investment = ?dividend.investment_id,
            amount = %dividend.amount,
            "recorded dividend"
        );
        Ok((saved, dividend))
    }

    /// Write transactions to CSV. Returns the number of rows written.
    pub(crate) fn export_to_csv(&self, path: &Path, month: Option<YearMonth>) -> Result<usize> {
        let txns = self.get_transactions(month)?;
        if txns.is_empty() {
            return Ok(0);
        }
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        wtr.write_record([
            "date",
            "description",
            "category",
            "kind",
            "value",
            "payment_method",
            "card",
            "installment",
            "bill_payment",
            "notes",
        ])?;
        for t in &txns {
            wtr.write_record([
                t.date.to_string(),
                t.description.clone(),
                t.category.clone(),
                t.kind.as_str().to_string(),
                t.value.to_string(),
                t.payment_method.as_str().to_string(),
                t.card_brand.clone().unwrap_or_default(),
                t.installment.map(|i| i.to_string()).unwrap_or_default(),
                t.is_bill_payment.to_string(),
                t.notes.clone(),
            ])?;
        }
        wtr.flush()?;
        tracing::info!(rows = txns.len(), path = %path.display(), "exported transactions");
        Ok(txns.len())
    }

    // ── Recurring obligations ─────────────────────────────────

    pub(crate) fn insert_recurring(&self, r: &RecurringObligation) -> Result<RecurringObligation> {
        self.conn.execute(
            "INSERT INTO recurring (owner_id, description, category, kind, value, days_of_month, icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                self.owner,
                r.description,
                r.category,
                r.kind.as_str(),
                r.value.to_string(),
                r.encode_days(),
                r.icon,
            ],
        )?;
        let mut saved = r.clone();
        saved.id = Some(self.conn.last_insert_rowid());
        Ok(saved)
    }

    pub(crate) fn update_recurring(&self, r: &RecurringObligation) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE recurring SET description = ?1, category = ?2, kind = ?3, value = ?4,
                 days_of_month = ?5, icon = ?6
             WHERE id = ?7 AND owner_id = ?8",
            params![
                r.description,
                r.category,
                r.kind.as_str(),
                r.value.to_string(),
                r.encode_days(),
                r.icon,
                r.id,
                self.owner,
            ],
        )?;
        Ok(n > 0)
    }

    pub(crate) fn get_recurring(&self) -> Result<Vec<RecurringObligation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, category, kind, value, days_of_month, icon
             FROM recurring WHERE owner_id = ?1 ORDER BY description",
        )?;
        let rows = stmt.query_map(params![self.owner], |row| {
            Ok(RecurringObligation {
                id: Some(row.get(0)?),
                description: row.get(1)?,
                category: row.get(2)?,
                kind: TransactionKind::parse(&row.get::<_, String>(3)?),
                value: decimal(row, 4)?,
                days_of_month: RecurringObligation::decode_days(&row.get::<_, String>(5)?),
                icon: row.get(6)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn delete_recurring(&self, id: i64) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM recurring WHERE id = ?1 AND owner_id = ?2",
            params![id, self.owner],
        )?;
        Ok(n > 0)
    }

    // ── Credit cards ──────────────────────────────────────────

    pub(crate) fn insert_card(&self, card: &CreditCard) -> Result<CreditCard> {
        self.conn.execute(
            "INSERT INTO credit_cards (owner_id, name, brand, closing_day, due_day, credit_limit)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.owner,
                card.name,
                card.brand,
                card.closing_day,
                card.due_day,
                card.credit_limit.to_string(),
            ],
        )?;
        let mut saved = card.clone();
        saved.id = Some(self.conn.last_insert_rowid());
        Ok(saved)
    }

    pub(crate) fn get_cards(&self) -> Result<Vec<CreditCard>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, brand, closing_day, due_day, credit_limit
             FROM credit_cards WHERE owner_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![self.owner], |row| {
            Ok(CreditCard {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                brand: row.get(2)?,
                closing_day: row.get(3)?,
                due_day: row.get(4)?,
                credit_limit: decimal(row, 5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Purchases charged to the card keep their `card_id` and brand text.
    pub(crate) fn delete_card(&self, id: i64) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM credit_cards WHERE id = ?1 AND owner_id = ?2",
            params![id, self.owner],
        )?;
        Ok(n > 0)
    }

    // ── Investments ───────────────────────────────────────────

    pub(crate) fn get_investments(&self) -> Result<Vec<Investment>> {
        let sql = format!(
            "SELECT {INVESTMENT_COLUMNS} FROM investments WHERE owner_id = ?1 ORDER BY name"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![self.owner], investment_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn update_investment(&self, inv: &Investment) -> Result<bool> {
        Ok(update_investment_row(&self.conn, &self.owner, inv)? > 0)
    }

    /// Holding change and contribution expense in one transaction.
    pub(crate) fn record_purchase(&mut self, plan: &PurchasePlan) -> Result<(Investment, Transaction)> {
        let created_at = now_stamp();
        let tx = self.conn.transaction()?;
        let holding = match &plan.change {
            HoldingChange::Merge(merged) => {
                if update_investment_row(&tx, &self.owner, merged)? == 0 {
                    anyhow::bail!("Investment '{}' no longer exists", merged.name);
                }
                merged.clone()
            }
            HoldingChange::Create(new) => {
                let id = insert_investment_row(&tx, &self.owner, new)?;
                new.clone().into_investment(id)
            }
        };
        let txn_id = insert_transaction_row(&tx, &self.owner, &plan.contribution, &created_at)?;
        tx.commit()?;
        tracing::info!(
            holding = ?holding.id,
            quantity = %holding.quantity,
            average = %holding.purchase_price,
            "recorded purchase"
        );
        Ok((holding, plan.contribution.clone().into_transaction(txn_id, created_at)))
    }

    /// Persist recomputed allocation percentages.
    pub(crate) fn save_percentages(&mut self, holdings: &[Investment]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for h in holdings {
            tx.execute(
                "UPDATE investments SET percentage = ?1 WHERE id = ?2 AND owner_id = ?3",
                params![h.percentage.to_string(), h.id, self.owner],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Dividends and contribution transactions that reference the holding stay.
    pub(crate) fn delete_investment(&self, id: i64) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM investments WHERE id = ?1 AND owner_id = ?2",
            params![id, self.owner],
        )?;
        Ok(n > 0)
    }

    // ── Dividends ─────────────────────────────────────────────

    pub(crate) fn get_dividends(&self) -> Result<Vec<Dividend>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, investment_id, asset_name, amount, date, transaction_id
             FROM dividends WHERE owner_id = ?1 ORDER BY date DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![self.owner], |row| {
            Ok(Dividend {
                id: Some(row.get(0)?),
                investment_id: row.get(1)?,
                asset_name: row.get(2)?,
                amount: decimal(row, 3)?,
                date: row.get::<_, NaiveDate>(4)?,
                transaction_id: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Goals ─────────────────────────────────────────────────

    pub(crate) fn insert_goal(&self, goal: &Goal) -> Result<Goal> {
        self.conn.execute(
            "INSERT INTO goals (owner_id, name, target_amount, current_amount, deadline, icon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.owner,
                goal.name,
                goal.target_amount.to_string(),
                goal.current_amount.to_string(),
                goal.deadline,
                goal.icon,
            ],
        )?;
        let mut saved = goal.clone();
        saved.id = Some(self.conn.last_insert_rowid());
        Ok(saved)
    }

    pub(crate) fn get_goals(&self) -> Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, target_amount, current_amount, deadline, icon
             FROM goals WHERE owner_id = ?1 ORDER BY deadline IS NULL, deadline, name",
        )?;
        let rows = stmt.query_map(params![self.owner], |row| {
            Ok(Goal {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                target_amount: decimal(row, 2)?,
                current_amount: decimal(row, 3)?,
                deadline: row.get(4)?,
                icon: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn update_goal_amount(&self, id: i64, amount: Decimal) -> Result<bool> {
        let n = self.conn.execute(
            "UPDATE goals SET current_amount = ?1 WHERE id = ?2 AND owner_id = ?3",
            params![amount.to_string(), id, self.owner],
        )?;
        Ok(n > 0)
    }

    pub(crate) fn delete_goal(&self, id: i64) -> Result<bool> {
        let n = self.conn.execute(
            "DELETE FROM goals WHERE id = ?1 AND owner_id = ?2",
            params![id, self.owner],
        )?;
        Ok(n > 0)
    }
}

#[cfg(test)]
mod tests;
