use std::fmt;

use crate::ast::Select;

#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Table { name: String, alias: Option<String> },
    Subquery { query: Box<Select>, alias: String },
}

impl Collection {
    pub fn table(name: &str, alias: Option<&str>) -> Self {
        Collection::Table { name: name.to_string(), alias: alias.map(str::to_string) }
    }

    /// Name the collection is visible under in the enclosing scope.
    pub fn visible_name(&self) -> &str {
        match self {
            Collection::Table { name, alias } => alias.as_deref().unwrap_or(name),
            Collection::Subquery { alias, .. } => alias,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Table { name, alias: Some(alias) } => write!(f, "{} {}", name, alias),
            Collection::Table { name, alias: None } => write!(f, "{}", name),
            Collection::Subquery { query, alias } => write!(f, "({}) {}", query, alias),
        }
    }
}
