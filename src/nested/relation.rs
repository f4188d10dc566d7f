use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    One,
    Many,
}

/// One table source of a FROM clause and how it hangs off its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub name: String,
    pub alias: String,
    /// Empty for the root relation.
    pub parent_relation: String,
    pub cardinality: Cardinality,
    /// Column whose NULL means "no matching row": the primary key, renamed to
    /// its projected alias when it was selected under one.
    pub join_column: String,
}

impl Relation {
    pub fn root(name: &str, alias: &str, join_column: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: alias.to_string(),
            parent_relation: String::new(),
            cardinality: Cardinality::One,
            join_column: join_column.to_string(),
        }
    }

    /// Name the relation is referred to by in column prefixes.
    pub fn key(&self) -> &str {
        if self.alias.is_empty() { &self.name } else { &self.alias }
    }

    pub fn is_root(&self) -> bool {
        self.parent_relation.is_empty()
    }

    pub fn matches(&self, table: &str) -> bool {
        !table.is_empty() && (self.name.eq_ignore_ascii_case(table) || self.alias.eq_ignore_ascii_case(table))
    }
}
