pub mod sql_type;
pub use sql_type::*;

pub mod column_schema;
pub use column_schema::*;

pub mod schema_error;
pub use schema_error::*;

pub mod schema_view;
pub use schema_view::*;

/// Read-only access to declared table columns.
///
/// Implementations must be shareable between analyses running on different
/// threads; the analyzer never mutates a provider.
pub trait SchemaProvider: Send + Sync {
    /// Columns of `table` in declaration order, or `None` when the table is unknown.
    fn table_columns(&self, table: &str) -> Option<Vec<ColumnSchema>>;
}
