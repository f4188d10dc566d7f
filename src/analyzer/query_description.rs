use serde::Serialize;

use crate::{dynamic::DynamicSqlInfoResult, nested::{NestedDescriptor, Relation}, schema::SqlType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
}

/// A resolved output column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: SqlType,
    pub not_null: bool,
    /// Visible name of the source table, empty for computed columns.
    pub table: String,
}

/// A resolved placeholder, in the order it appears in the statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: SqlType,
    pub not_null: bool,
    /// Bound to a whole `IN (...)` list.
    pub list: bool,
}

impl ParameterInfo {
    /// `int`, or `int[]` for list parameters.
    pub fn type_name(&self) -> String {
        if self.list { format!("{}[]", self.column_type) } else { self.column_type.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescription {
    pub sql: String,
    pub query_type: QueryType,
    pub multiple_rows_result: bool,
    pub columns: Vec<ColumnInfo>,
    pub parameters: Vec<ParameterInfo>,
    /// Placeholders of an UPDATE's SET list; `parameters` then holds the WHERE ones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<ParameterInfo>,
    pub relations: Vec<Relation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_info: Option<NestedDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_sql_query: Option<DynamicSqlInfoResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by_columns: Option<Vec<String>>,
}

/// Just the type names: one per output column and one per placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeInferenceResult {
    pub columns: Vec<String>,
    pub parameters: Vec<String>,
}

impl From<&QueryDescription> for TypeInferenceResult {
    fn from(description: &QueryDescription) -> Self {
        Self {
            columns: description.columns.iter().map(|column| column.column_type.to_string()).collect(),
            parameters: description.data
                .iter()
                .chain(&description.parameters)
                .map(ParameterInfo::type_name)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_in_camel_case_and_skips_empty_parts() {
        let description = QueryDescription {
            sql: "SELECT id FROM mytable1 WHERE id IN (:ids)".into(),
            query_type: QueryType::Select,
            multiple_rows_result: true,
            columns: vec![ColumnInfo { name: "id".into(), column_type: SqlType::Int, not_null: true, table: "mytable1".into() }],
            parameters: vec![ParameterInfo { name: "ids".into(), column_type: SqlType::Int, not_null: true, list: true }],
            data: Vec::new(),
            relations: Vec::new(),
            nested_info: None,
            dynamic_sql_query: None,
            order_by_columns: None,
        };

        assert_eq!(serde_json::to_value(&description).unwrap(), json!({
            "sql": "SELECT id FROM mytable1 WHERE id IN (:ids)",
            "queryType": "Select",
            "multipleRowsResult": true,
            "columns": [{ "name": "id", "type": "int", "notNull": true, "table": "mytable1" }],
            "parameters": [{ "name": "ids", "type": "int", "notNull": true, "list": true }],
            "relations": []
        }));

        let inferred = TypeInferenceResult::from(&description);
        assert_eq!(inferred.parameters, vec!["int[]"]);
    }
}
