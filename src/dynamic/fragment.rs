use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableField {
    pub table: String,
    pub field: String,
}

impl TableField {
    pub fn new(table: &str, field: &str) -> Self {
        Self { table: table.to_string(), field: field.to_string() }
    }

    pub fn same_as(&self, other: &TableField) -> bool {
        self.table.eq_ignore_ascii_case(&other.table) && self.field.eq_ignore_ascii_case(&other.field)
    }
}

/// One optional slice of a dynamic statement's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FragmentInfo {
    pub fragment: String,
    /// Projection item text without its `AS alias`.
    pub fragment_without_alias: Option<String>,
    /// Visible name of the table a FROM/JOIN or WITH fragment introduces.
    pub relation: Option<String>,
    pub parent_relation: Option<String>,
    /// Columns the fragment introduces (FROM) or reads (SELECT, WHERE).
    pub fields: Vec<TableField>,
    /// Relations a SELECT fragment reads from.
    pub depend_on: Vec<String>,
    /// Indexes into the statement's named parameters referenced by a WHERE fragment.
    pub depend_on_params: Vec<usize>,
    /// Indexes of named parameters written inside the fragment itself.
    pub parameters: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicSqlInfo {
    pub with: Vec<FragmentInfo>,
    pub select: Vec<FragmentInfo>,
    pub from: Vec<FragmentInfo>,
    #[serde(rename = "where")]
    pub where_: Vec<FragmentInfo>,
}

/// A fragment and what must be present for it to be kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentInfoResult {
    pub fragment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment_without_alias: Option<String>,
    /// Indexes of the SELECT fragments that need this fragment.
    pub depend_on_fields: Vec<usize>,
    /// Named parameters whose presence needs this fragment.
    pub depend_on_params: Vec<String>,
    pub parameters: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depend_on_order_by: Vec<String>,
}

impl FragmentInfoResult {
    /// Always emitted, whatever the caller selects or binds.
    pub fn required(fragment: &FragmentInfo, parameters: Vec<String>) -> Self {
        Self { fragment: fragment.fragment.clone(), parameters, ..Default::default() }
    }

    pub fn is_required(&self) -> bool {
        self.depend_on_fields.is_empty() && self.depend_on_params.is_empty() && self.depend_on_order_by.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DynamicSqlInfoResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub with: Vec<FragmentInfoResult>,
    pub select: Vec<FragmentInfoResult>,
    pub from: Vec<FragmentInfoResult>,
    #[serde(rename = "where")]
    pub where_: Vec<FragmentInfoResult>,
}
