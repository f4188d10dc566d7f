use serde::{Deserialize, Serialize};

use crate::schema::SqlType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    MySql,
    Sqlite,
}

/// Dialect-dependent type choices used while collecting and solving constraints.
///
/// - `text_type` is the type of string literals and the fallback for anything
///   never pinned by a constraint.
/// - `float_type` is what the numeric placeholder resolves to at read time.
/// - `predicate_type` is the boolean-like type of comparisons and CASE conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub dialect: Dialect,
    pub text_type: SqlType,
    pub float_type: SqlType,
    pub integer_literal_type: SqlType,
    pub float_literal_type: SqlType,
    pub predicate_type: SqlType,
    pub count_type: SqlType,
    pub avg_type: SqlType,
    pub sum_integer_type: SqlType,
    pub floor_type: SqlType,
    pub date_type: SqlType,
    pub limit_type: SqlType,
}

impl Default for Config {
    fn default() -> Self {
        Self::mysql()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(dialect: Dialect) -> Self {
        match dialect {
            Dialect::MySql => Self::mysql(),
            Dialect::Sqlite => Self::sqlite(),
        }
    }

    pub fn mysql() -> Self {
        Self {
            dialect: Dialect::MySql,
            text_type: SqlType::Varchar,
            float_type: SqlType::Double,
            integer_literal_type: SqlType::BigInt,
            float_literal_type: SqlType::Double,
            predicate_type: SqlType::TinyInt,
            count_type: SqlType::BigInt,
            avg_type: SqlType::Decimal,
            sum_integer_type: SqlType::Decimal,
            floor_type: SqlType::BigInt,
            date_type: SqlType::Date,
            limit_type: SqlType::BigInt,
        }
    }

    pub fn sqlite() -> Self {
        Self {
            dialect: Dialect::Sqlite,
            text_type: SqlType::SqliteText,
            float_type: SqlType::Real,
            integer_literal_type: SqlType::Integer,
            float_literal_type: SqlType::Real,
            predicate_type: SqlType::Integer,
            count_type: SqlType::Integer,
            avg_type: SqlType::Real,
            sum_integer_type: SqlType::Integer,
            floor_type: SqlType::Integer,
            date_type: SqlType::SqliteDate,
            limit_type: SqlType::Integer,
        }
    }
}
