use super::TransactionKind;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Category {
    pub(crate) id: Option<i64>,
    pub(crate) name: String,
    pub(crate) kind: TransactionKind,
    pub(crate) icon: String,
}

impl Category {
    pub(crate) fn new(name: String, kind: TransactionKind) -> Self {
        Self {
            id: None,
            name,
            kind,
            icon: String::new(),
        }
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub(crate) fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
