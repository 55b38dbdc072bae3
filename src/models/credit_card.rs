use rust_decimal::Decimal;

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CreditCard {
    pub(crate) id: Option<i64>,
    pub(crate) name: String,
    pub(crate) brand: String,
    /// Statement closing day; the projected bill lands here.
    pub(crate) closing_day: u32,
    pub(crate) due_day: u32,
    pub(crate) credit_limit: Decimal,
}

impl CreditCard {
    pub(crate) fn new(
        name: String,
        brand: String,
        closing_day: u32,
        due_day: u32,
        credit_limit: Decimal,
    ) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::Blank("card name"));
        }
        for day in [closing_day, due_day] {
            if !(1..=31).contains(&day) {
                return Err(ValidationError::DayOutOfRange(day));
            }
        }
        super::validate_amount(credit_limit)?;
        Ok(Self {
            id: None,
            name,
            brand,
            closing_day,
            due_day,
            credit_limit,
        })
    }

    /// Best-guess match of a free-text brand against this card's name or brand.
    pub(crate) fn matches_label(&self, label: &str) -> bool {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return false;
        }
        self.name.to_lowercase() == label || self.brand.to_lowercase() == label
    }

    pub(crate) fn find_by_name<'a>(cards: &'a [CreditCard], name: &str) -> Option<&'a CreditCard> {
        cards.iter().find(|c| c.matches_label(name))
    }
}
