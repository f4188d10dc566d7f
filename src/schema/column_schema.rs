use serde::{Deserialize, Serialize};

use crate::schema::SqlType;

/// Index role of a column, as reported by `information_schema.columns.column_key`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKey {
    #[serde(rename = "PRI")]
    Primary,
    #[serde(rename = "UNI")]
    Unique,
    #[default]
    #[serde(rename = "")]
    None,
}

impl ColumnKey {
    pub fn is_unique(self) -> bool {
        matches!(self, ColumnKey::Primary | ColumnKey::Unique)
    }
}

/// One declared column of a physical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub table: String,
    pub column: String,
    #[serde(rename = "type")]
    pub column_type: SqlType,
    #[serde(rename = "key", default)]
    pub column_key: ColumnKey,
    #[serde(rename = "notNull")]
    pub not_null: bool,
}

impl ColumnSchema {
    pub fn new(table: &str, column: &str, column_type: SqlType, column_key: ColumnKey, not_null: bool) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
            column_type,
            column_key,
            not_null,
        }
    }
}
