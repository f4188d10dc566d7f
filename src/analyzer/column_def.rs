use crate::{analyzer::TypeVar, schema::ColumnKey};

/// A column visible to expressions: either declared by a physical table or
/// synthesized from a derived table (subquery or CTE).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub table: String,
    pub table_alias: String,
    pub column_name: String,
    pub column_type: TypeVar,
    pub column_key: ColumnKey,
    pub not_null: bool,
}

impl ColumnDef {
    /// Name the column's table is visible under.
    pub fn visible_table(&self) -> &str {
        if self.table_alias.is_empty() { &self.table } else { &self.table_alias }
    }

    pub fn matches_prefix(&self, prefix: &str) -> bool {
        self.visible_table().eq_ignore_ascii_case(prefix)
            || (self.table_alias.is_empty() && self.table.eq_ignore_ascii_case(prefix))
    }

    pub fn matches(&self, prefix: &str, name: &str) -> bool {
        self.column_name.eq_ignore_ascii_case(name) && (prefix.is_empty() || self.matches_prefix(prefix))
    }

    pub fn same_column(&self, other: &ColumnDef) -> bool {
        self.visible_table().eq_ignore_ascii_case(other.visible_table())
            && self.column_name.eq_ignore_ascii_case(&other.column_name)
    }
}

/// Visible columns of one query level, chained to the enclosing level so
/// that correlated subqueries can see outer columns.
#[derive(Debug, Clone, Default)]
pub struct Scope<'s> {
    pub columns: Vec<ColumnDef>,
    pub outer: Option<&'s Scope<'s>>,
}

impl<'s> Scope<'s> {
    pub fn new(columns: Vec<ColumnDef>, outer: Option<&'s Scope<'s>>) -> Self {
        Self { columns, outer }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Levels from innermost to outermost.
    pub fn levels(&self) -> impl Iterator<Item = &Scope<'s>> {
        std::iter::successors(Some(self), |scope| scope.outer)
    }
}
