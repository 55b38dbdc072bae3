//! In-memory view of the owner's data and the only path that changes it.
//!
//! A front end builds an [`Action`], [`dispatch`] validates it and performs
//! the write, and only a successful write yields a [`Patch`]. Applying the
//! patch replaces whole collections on the [`Ledger`]; nothing is updated
//! optimistically.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::calendar::projection::{self, ProjectionInputs};
use crate::calendar::YearMonth;
use crate::db::Database;
use crate::error::ValidationError;
use crate::installments;
use crate::models::*;
use crate::portfolio::{self, Purchase};

pub(crate) const DIVIDEND_CATEGORY: &str = "Dividendos";

#[derive(Debug, Clone, Default)]
pub(crate) struct Ledger {
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) recurring: Vec<RecurringObligation>,
    pub(crate) cards: Vec<CreditCard>,
    pub(crate) investments: Vec<Investment>,
    pub(crate) dividends: Vec<Dividend>,
    pub(crate) categories: Vec<Category>,
    pub(crate) goals: Vec<Goal>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Action {
    AddTransaction(NewTransaction),
    DeleteTransaction(i64),
    AddRecurring(RecurringObligation),
    UpdateRecurring(RecurringObligation),
    DeleteRecurring(i64),
    AddCard(CreditCard),
    DeleteCard(i64),
    PayBill {
        card_id: i64,
        month: YearMonth,
        date: NaiveDate,
    },
    BuyInvestment(Purchase),
    UpdateQuote {
        investment_id: i64,
        price: Decimal,
    },
    DeleteInvestment(i64),
    RecordDividend {
        investment_id: Option<i64>,
        description: String,
        amount: Decimal,
        date: NaiveDate,
    },
    AddGoal(Goal),
    ContributeGoal {
        goal_id: i64,
        amount: Decimal,
    },
    DeleteGoal(i64),
    AddCategory(Category),
}

/// Replacement collections produced by a successful write.
#[derive(Debug, Default)]
pub(crate) struct Patch {
    pub(crate) transactions: Option<Vec<Transaction>>,
    pub(crate) recurring: Option<Vec<RecurringObligation>>,
    pub(crate) cards: Option<Vec<CreditCard>>,
    pub(crate) investments: Option<Vec<Investment>>,
    pub(crate) dividends: Option<Vec<Dividend>>,
    pub(crate) goals: Option<Vec<Goal>>,
    pub(crate) categories: Option<Vec<Category>>,
    pub(crate) status: String,
}

impl Patch {
    fn status(msg: impl Into<String>) -> Self {
        Self {
            status: msg.into(),
            ..Self::default()
        }
    }

    fn with_transactions(mut self, db: &Database) -> Result<Self> {
        self.transactions = Some(db.get_transactions(None)?);
        Ok(self)
    }

    fn with_recurring(mut self, db: &Database) -> Result<Self> {
        self.recurring = Some(db.get_recurring()?);
        Ok(self)
    }

    fn with_cards(mut self, db: &Database) -> Result<Self> {
        self.cards = Some(db.get_cards()?);
        Ok(self)
    }

    fn with_dividends(mut self, db: &Database) -> Result<Self> {
        self.dividends = Some(db.get_dividends()?);
        Ok(self)
    }

    fn with_goals(mut self, db: &Database) -> Result<Self> {
        self.goals = Some(db.get_goals()?);
        Ok(self)
    }

    fn with_categories(mut self, db: &Database) -> Result<Self> {
        self.categories = Some(db.get_categories()?);
        Ok(self)
    }

    /// Recompute allocation, persist it, then take the fresh holdings.
    fn with_rebalanced_investments(mut self, db: &mut Database) -> Result<Self> {
        let mut holdings = db.get_investments()?;
        portfolio::rebalance(&mut holdings);
        db.save_percentages(&holdings)?;
        self.investments = Some(holdings);
        Ok(self)
    }
}

impl Ledger {
    pub(crate) fn load(db: &Database) -> Result<Self> {
        Ok(Self {
            transactions: db.get_transactions(None)?,
            recurring: db.get_recurring()?,
            cards: db.get_cards()?,
            investments: db.get_investments()?,
            dividends: db.get_dividends()?,
            categories: db.get_categories()?,
            goals: db.get_goals()?,
        })
    }

    /// Swap in every collection the patch carries; returns its status line.
    pub(crate) fn apply(&mut self, patch: Patch) -> String {
        if let Some(v) = patch.transactions {
            self.transactions = v;
        }
        if let Some(v) = patch.recurring {
            self.recurring = v;
        }
        if let Some(v) = patch.cards {
            self.cards = v;
        }
        if let Some(v) = patch.investments {
            self.investments = v;
        }
        if let Some(v) = patch.dividends {
            self.dividends = v;
        }
        if let Some(v) = patch.goals {
            self.goals = v;
        }
        if let Some(v) = patch.categories {
            self.categories = v;
        }
        patch.status
    }

    pub(crate) fn projection_inputs(&self) -> ProjectionInputs<'_> {
        ProjectionInputs {
            recurring: &self.recurring,
            transactions: &self.transactions,
            cards: &self.cards,
        }
    }

    pub(crate) fn card(&self, id: i64) -> Option<&CreditCard> {
        self.cards.iter().find(|c| c.id == Some(id))
    }

    pub(crate) fn investment(&self, id: i64) -> Option<&Investment> {
        self.investments.iter().find(|i| i.id == Some(id))
    }

    pub(crate) fn goal(&self, id: i64) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == Some(id))
    }

    pub(crate) fn month_summary(&self, month: YearMonth) -> MonthSummary {
        MonthSummary::of(&self.transactions, month)
    }

    /// Income and expenses for `months` months ending at `last`, oldest first.
    pub(crate) fn monthly_trend(&self, last: YearMonth, months: u32) -> Vec<MonthSummary> {
        (0..months as i32)
            .rev()
            .map(|back| MonthSummary::of(&self.transactions, last.shift(-back)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthSummary {
    pub(crate) month: YearMonth,
    pub(crate) income: Decimal,
    pub(crate) expenses: Decimal,
    /// Expense totals per category, largest first.
    pub(crate) by_category: Vec<(String, Decimal)>,
}

impl MonthSummary {
    pub(crate) fn of(transactions: &[Transaction], month: YearMonth) -> Self {
        let mut income = Decimal::ZERO;
        let mut expenses = Decimal::ZERO;
        let mut by_category: Vec<(String, Decimal)> = Vec::new();
        for t in transactions.iter().filter(|t| month.contains(t.date)) {
            if t.is_income() {
                income += t.value;
                continue;
            }
            expenses += t.value;
            match by_category.iter_mut().find(|(c, _)| *c == t.category) {
                Some((_, total)) => *total += t.value,
                None => by_category.push((t.category.clone(), t.value)),
            }
        }
        by_category.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self {
            month,
            income,
            expenses,
            by_category,
        }
    }

    pub(crate) fn net(&self) -> Decimal {
        self.income - self.expenses
    }
}

fn add_transaction(db: &mut Database, ledger: &Ledger, txn: NewTransaction) -> Result<Patch> {
    if txn.description.trim().is_empty() {
        return Err(ValidationError::Blank("description").into());
    }
    if txn.value <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveValue(txn.value).into());
    }
    validate_amount(txn.value)?;

    if txn.is_installment_purchase() {
        let group = installments::expand(&txn)?;
        let saved = db.insert_transactions_batch(&group)?;
        let label = group
            .first()
            .and_then(|g| g.installment)
            .map(|i| i.label())
            .unwrap_or_default();
        return Patch::status(format!(
            "Added {label} {} ({} installments, {} each, {} total)",
            txn.description,
            saved.len(),
            group.first().map(|g| g.value).unwrap_or_default(),
            installments::group_total(&group)
        ))
        .with_transactions(db);
    }

    if txn.kind == TransactionKind::Income && portfolio::is_dividend_category(&txn.category) {
        let link = portfolio::link_dividend(&txn.description, txn.investment_id, &ledger.investments);
        let (_, dividend) = db.record_income_with_dividend(&txn, &link)?;
        let how = match link {
            portfolio::DividendLink::Explicit(_) => "linked",
            portfolio::DividendLink::Guessed(_) => "best guess",
            portfolio::DividendLink::Unmatched => "no matching asset",
        };
        return Patch::status(format!(
            "Recorded dividend {} from {} ({how})",
            dividend.amount, dividend.asset_name
        ))
        .with_transactions(db)?
        .with_dividends(db);
    }

    let saved = db.insert_transaction(&txn)?;
    Patch::status(format!("Added: {}", saved.description)).with_transactions(db)
}

/// Perform the write an action describes and report what changed.
///
/// Validation failures and database errors come back as `Err`; the caller's
/// ledger is untouched in that case.
pub(crate) fn dispatch(db: &mut Database, ledger: &Ledger, action: Action) -> Result<Patch> {
    let patch = match action {
        Action::AddTransaction(txn) => add_transaction(db, ledger, txn)?,
        Action::DeleteTransaction(id) => {
            if !db.delete_transaction(id)? {
                anyhow::bail!("Transaction #{id} not found");
            }
            Patch::status(format!("Deleted transaction #{id}")).with_transactions(db)?
        }
        Action::AddRecurring(r) => {
            validate_recurring(&r)?;
            let saved = db.insert_recurring(&r)?;
            Patch::status(format!(
                "Recurring: {} on day(s) {}",
                saved.description,
                saved.days_label()
            ))
            .with_recurring(db)?
        }
        Action::UpdateRecurring(r) => {
            validate_recurring(&r)?;
            if !db.update_recurring(&r)? {
                anyhow::bail!("Recurring entry not found");
            }
            Patch::status(format!("Updated: {}", r.description)).with_recurring(db)?
        }
        Action::DeleteRecurring(id) => {
            if !db.delete_recurring(id)? {
                anyhow::bail!("Recurring entry #{id} not found");
            }
            Patch::status(format!("Deleted recurring #{id}")).with_recurring(db)?
        }
        Action::AddCard(card) => {
            let card = CreditCard::new(
                card.name,
                card.brand,
                card.closing_day,
                card.due_day,
                card.credit_limit,
            )?;
            let saved = db.insert_card(&card)?;
            Patch::status(format!(
                "Card {} closes on day {}",
                saved.name, saved.closing_day
            ))
            .with_cards(db)?
        }
        Action::DeleteCard(id) => {
            if !db.delete_card(id)? {
                anyhow::bail!("Card #{id} not found");
            }
            Patch::status(format!("Deleted card #{id}")).with_cards(db)?
        }
        Action::PayBill {
            card_id,
            month,
            date,
        } => {
            let card = ledger
                .card(card_id)
                .with_context(|| format!("Card #{card_id} not found"))?;
            let bill = projection::project_bills(
                &ledger.transactions,
                std::slice::from_ref(card),
                month,
            )
            .into_iter()
            .next()
            .with_context(|| format!("No {month} bill for {}", card.name))?;
            let payment = projection::bill_payment(&bill, month, date);
            let saved = db.insert_transaction(&payment)?;
            Patch::status(format!("Paid {} ({})", saved.description, saved.value))
                .with_transactions(db)?
        }
        Action::BuyInvestment(purchase) => {
            let plan = portfolio::plan_purchase(&purchase, &ledger.investments)?;
            let merged = matches!(plan.change, portfolio::HoldingChange::Merge(_));
            let (holding, contribution) = db.record_purchase(&plan)?;
            let verb = if merged { "Added to" } else { "Bought" };
            Patch::status(format!(
                "{verb} {}: {} @ avg {} ({} invested)",
                holding.display_name(),
                holding.quantity,
                holding.purchase_price.round_dp(2),
                contribution.value
            ))
            .with_transactions(db)?
            .with_rebalanced_investments(db)?
        }
        Action::UpdateQuote {
            investment_id,
            price,
        } => {
            validate_amount(price)?;
            let mut holding = ledger
                .investment(investment_id)
                .cloned()
                .with_context(|| format!("Investment #{investment_id} not found"))?;
            portfolio::apply_quote(&mut holding, price);
            db.update_investment(&holding)?;
            Patch::status(format!(
                "{} now {} ({} total)",
                holding.display_name(),
                price,
                holding.total_value
            ))
            .with_rebalanced_investments(db)?
        }
        Action::DeleteInvestment(id) => {
            if !db.delete_investment(id)? {
                anyhow::bail!("Investment #{id} not found");
            }
            Patch::status(format!("Deleted investment #{id}")).with_rebalanced_investments(db)?
        }
        Action::RecordDividend {
            investment_id,
            description,
            amount,
            date,
        } => {
            let description = match (description.trim().is_empty(), investment_id) {
                (false, _) => description,
                (true, Some(id)) => ledger
                    .investment(id)
                    .map(|inv| format!("Dividendos {}", inv.display_name()))
                    .unwrap_or_else(|| DIVIDEND_CATEGORY.to_string()),
                (true, None) => DIVIDEND_CATEGORY.to_string(),
            };
            let mut txn = NewTransaction::new(
                date,
                description,
                DIVIDEND_CATEGORY,
                TransactionKind::Income,
                amount,
            );
            txn.investment_id = investment_id;
            add_transaction(db, ledger, txn)?
        }
        Action::AddGoal(goal) => {
            if goal.name.trim().is_empty() {
                return Err(ValidationError::Blank("goal name").into());
            }
            if goal.target_amount <= Decimal::ZERO {
                return Err(ValidationError::NonPositiveValue(goal.target_amount).into());
            }
            validate_amount(goal.target_amount)?;
            let saved = db.insert_goal(&goal)?;
            Patch::status(format!("Goal {} ({})", saved.name, saved.target_amount))
                .with_goals(db)?
        }
        Action::ContributeGoal { goal_id, amount } => {
            let goal = ledger
                .goal(goal_id)
                .with_context(|| format!("Goal #{goal_id} not found"))?;
            validate_amount(amount)?;
            let total = goal.current_amount + amount;
            validate_amount(total)?;
            db.update_goal_amount(goal_id, total)?;
            Patch::status(format!("{}: {} of {}", goal.name, total, goal.target_amount))
                .with_goals(db)?
        }
        Action::DeleteGoal(id) => {
            if !db.delete_goal(id)? {
                anyhow::bail!("Goal #{id} not found");
            }
            Patch::status(format!("Deleted goal #{id}")).with_goals(db)?
        }
        Action::AddCategory(category) => {
            if category.name.trim().is_empty() {
                return Err(ValidationError::Blank("category name").into());
            }
            if Category::find_by_name(&ledger.categories, &category.name).is_some() {
                anyhow::bail!("Category {} already exists", category.name);
            }
            db.insert_category(&category)?;
            Patch::status(format!("Category {} ({})", category.name, category.kind.as_str()))
                .with_categories(db)?
        }
    };
    tracing::info!(status = %patch.status, "dispatched");
    Ok(patch)
}

fn validate_recurring(r: &RecurringObligation) -> Result<(), ValidationError> {
    if r.description.trim().is_empty() {
        return Err(ValidationError::Blank("description"));
    }
    if r.value <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveValue(r.value));
    }
    validate_amount(r.value)?;
    validate_days(&r.days_of_month)
}

#[cfg(test)]
mod tests;
