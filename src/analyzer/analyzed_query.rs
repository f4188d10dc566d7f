use crate::{
    analyzer::{ColumnDef, InferredExpr, TypeVar},
    nested::Relation,
    schema::ColumnKey,
};

/// One projected column before the constraints are solved.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedColumn {
    pub name: String,
    pub var: TypeVar,
    /// Same position in the other UNION branches.
    pub union_vars: Vec<TypeVar>,
    pub not_null: bool,
    pub table: String,
    pub source: Option<ColumnDef>,
    pub parameter: Option<usize>,
    pub aggregate: bool,
}

impl AnalyzedColumn {
    pub fn new(name: impl Into<String>, inferred: InferredExpr) -> Self {
        Self {
            name: name.into(),
            table: inferred.table(),
            var: inferred.var,
            union_vars: Vec::new(),
            not_null: inferred.not_null,
            source: inferred.source,
            parameter: inferred.parameter,
            aggregate: inferred.aggregate,
        }
    }

    /// The column as seen from an enclosing query that selects from it.
    pub fn as_column_def(&self, table: &str) -> ColumnDef {
        ColumnDef {
            table: table.to_string(),
            table_alias: String::new(),
            column_name: self.name.clone(),
            column_type: self.var.as_select_item(),
            column_key: ColumnKey::None,
            not_null: self.not_null,
        }
    }
}

/// Result of analyzing a SELECT, its UNION branches merged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalyzedSelect {
    pub columns: Vec<AnalyzedColumn>,
    pub relations: Vec<Relation>,
    pub multiple_rows: bool,
    /// Set when an ORDER BY term is a placeholder.
    pub orderable_columns: Option<Vec<String>>,
}
