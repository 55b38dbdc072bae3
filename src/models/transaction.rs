use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub(crate) fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "income" | "receita" | "in" => Self::Income,
            _ => Self::Expense,
        }
    }

    /// Signed view of a positive value: expenses are negative.
    pub(crate) fn signed(&self, value: Decimal) -> Decimal {
        match self {
            Self::Income => value,
            Self::Expense => -value,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PaymentMethod {
    Cash,
    Debit,
    Pix,
    CreditCard,
    BankSlip,
}

impl PaymentMethod {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Debit => "Debit",
            Self::Pix => "Pix",
            Self::CreditCard => "Credit Card",
            Self::BankSlip => "Bank Slip",
        }
    }

    /// Lenient: unknown labels fall back to cash.
    pub(crate) fn parse(s: &str) -> Self {
        Self::try_parse(s).unwrap_or(Self::Cash)
    }

    pub(crate) fn try_parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "dinheiro" => Some(Self::Cash),
            "credit card" | "creditcard" | "credit" | "credito" | "crédito" => Some(Self::CreditCard),
            "debit" | "debito" | "débito" => Some(Self::Debit),
            "pix" => Some(Self::Pix),
            "bank slip" | "bankslip" | "boleto" => Some(Self::BankSlip),
            _ => None,
        }
    }

    pub(crate) fn all() -> &'static [PaymentMethod] {
        &[
            Self::Cash,
            Self::Debit,
            Self::Pix,
            Self::CreditCard,
            Self::BankSlip,
        ]
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Position of a record inside an installment group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Installment {
    pub(crate) number: u32,
    pub(crate) total: u32,
}

impl Installment {
    /// The group tag, e.g. "10x".
    pub(crate) fn label(&self) -> String {
        format!("{}x", self.total)
    }
}

impl std::fmt::Display for Installment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.number, self.total)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transaction {
    pub(crate) id: Option<i64>,
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) kind: TransactionKind,
    /// Always positive; `kind` carries the direction.
    pub(crate) value: Decimal,
    pub(crate) payment_method: PaymentMethod,
    pub(crate) card_id: Option<i64>,
    pub(crate) card_brand: Option<String>,
    pub(crate) installment: Option<Installment>,
    pub(crate) is_bill_payment: bool,
    pub(crate) notes: String,
    pub(crate) created_at: String,
}

impl Transaction {
    pub(crate) fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub(crate) fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    pub(crate) fn signed_value(&self) -> Decimal {
        self.kind.signed(self.value)
    }

    pub(crate) fn is_credit_card(&self) -> bool {
        self.payment_method == PaymentMethod::CreditCard
    }
}

/// Form input for a transaction before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewTransaction {
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) kind: TransactionKind,
    pub(crate) value: Decimal,
    pub(crate) payment_method: PaymentMethod,
    pub(crate) card_id: Option<i64>,
    pub(crate) card_brand: Option<String>,
    /// 1 means a plain transaction; more routes through the installment expander.
    pub(crate) total_installments: u32,
    pub(crate) installment: Option<Installment>,
    pub(crate) is_bill_payment: bool,
    /// Holding chosen explicitly for a dividend, if any.
    pub(crate) investment_id: Option<i64>,
    pub(crate) notes: String,
}

impl NewTransaction {
    pub(crate) fn new(
        date: NaiveDate,
        description: impl Into<String>,
        category: impl Into<String>,
        kind: TransactionKind,
        value: Decimal,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            category: category.into(),
            kind,
            value,
            payment_method: PaymentMethod::Cash,
            card_id: None,
            card_brand: None,
            total_installments: 1,
            installment: None,
            is_bill_payment: false,
            investment_id: None,
            notes: String::new(),
        }
    }

    pub(crate) fn with_card(mut self, card_id: Option<i64>, brand: Option<String>) -> Self {
        self.payment_method = PaymentMethod::CreditCard;
        self.card_id = card_id;
        self.card_brand = brand;
        self
    }

    pub(crate) fn with_installments(mut self, n: u32) -> Self {
        self.total_installments = n;
        self
    }

    pub(crate) fn is_installment_purchase(&self) -> bool {
        self.total_installments > 1
    }

    pub(crate) fn into_transaction(self, id: i64, created_at: String) -> Transaction {
        Transaction {
            id: Some(id),
            date: self.date,
            description: self.description,
            category: self.category,
            kind: self.kind,
            value: self.value,
            payment_method: self.payment_method,
            card_id: self.card_id,
            card_brand: self.card_brand,
            installment: self.installment,
            is_bill_payment: self.is_bill_payment,
            notes: self.notes,
            created_at,
        }
    }
}
