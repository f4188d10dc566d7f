use std::{fs, path::Path};

use indexmap::IndexMap;
use serde_json::Value;

use crate::schema::{ColumnSchema, SchemaError, SchemaProvider};

/// Immutable table -> columns index built from the flat schema records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaView {
    tables: IndexMap<String, Vec<ColumnSchema>>,
}

impl SchemaView {
    pub fn new(records: Vec<ColumnSchema>) -> Self {
        let mut tables: IndexMap<String, Vec<ColumnSchema>> = IndexMap::new();
        for record in records {
            tables.entry(record.table.clone()).or_default().push(record);
        }
        Self { tables }
    }

    /// Build a view from a JSON array of `{table, column, type, key, notNull}` records.
    pub fn from_json(json_value: Value) -> Result<Self, SchemaError> {
        let Value::Array(_) = json_value else {
            return Err(SchemaError::InvalidJson("schema JSON must be an array of column records".to_string()));
        };
        let records: Vec<ColumnSchema> = serde_json::from_value(json_value)
            .map_err(|err| SchemaError::InvalidJson(err.to_string()))?;
        Ok(Self::new(records))
    }

    pub fn load_from_file(file_path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = file_path.as_ref();
        let path_lossy = path.to_string_lossy().to_string();

        let file_content = fs::read_to_string(path)
            .map_err(|err| SchemaError::Io { path: path_lossy.clone(), message: err.to_string() })?;

        let json_value = serde_json::from_str::<Value>(&file_content)
            .map_err(|err| SchemaError::InvalidJson(format!("{}: {}", path_lossy, err)))?;

        let view = Self::from_json(json_value)?;
        tracing::debug!(path = %path_lossy, tables = view.tables.len(), "loaded schema");
        Ok(view)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&ColumnSchema> {
        self.lookup(table)?.iter().find(|c| c.column.eq_ignore_ascii_case(column))
    }

    fn lookup(&self, table: &str) -> Option<&Vec<ColumnSchema>> {
        self.tables.get(table).or_else(|| {
            self.tables
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(table))
                .map(|(_, columns)| columns)
        })
    }
}

impl SchemaProvider for SchemaView {
    fn table_columns(&self, table: &str) -> Option<Vec<ColumnSchema>> {
        self.lookup(table).cloned()
    }
}
