use crate::analyzer::{ColumnDef, TypeVar};

/// Type and nullability of one analyzed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredExpr {
    pub var: TypeVar,
    pub not_null: bool,
    /// Index into the run's parameter list when the expression is a bare placeholder.
    pub parameter: Option<usize>,
    /// The column when the expression is a direct column reference.
    pub source: Option<ColumnDef>,
    pub aggregate: bool,
}

impl InferredExpr {
    pub fn new(var: TypeVar, not_null: bool) -> Self {
        Self { var, not_null, parameter: None, source: None, aggregate: false }
    }

    pub fn parameter(var: TypeVar, index: usize) -> Self {
        Self { parameter: Some(index), ..Self::new(var, false) }
    }

    pub fn column(var: TypeVar, def: ColumnDef) -> Self {
        Self { not_null: def.not_null, source: Some(def), ..Self::new(var, false) }
    }

    pub fn aggregated(mut self) -> Self {
        self.aggregate = true;
        self
    }

    pub fn is_parameter(&self) -> bool {
        self.parameter.is_some()
    }

    /// Visible table of the source column, empty for computed expressions.
    pub fn table(&self) -> String {
        self.source.as_ref().map(|def| def.visible_table().to_string()).unwrap_or_default()
    }
}
