//! Static description of SQL statements: the type and nullability of every
//! result column and placeholder, whether a SELECT can return more than one
//! row, how joined tables nest, and which fragments of a dynamic query each
//! field or parameter needs.

pub mod config;
pub use config::{Config, Dialect};

pub mod schema;
pub use schema::{ColumnKey, ColumnSchema, SchemaError, SchemaProvider, SchemaView, SqlType};

pub mod ast;

pub mod analyzer;
pub use analyzer::{AnalyzerError, ColumnInfo, ParameterInfo, QueryDescription, QueryType, TypeInferenceResult};

pub mod nested;
pub use nested::{Cardinality, NestedDescriptor, Relation};

pub mod dynamic;
pub use dynamic::DynamicSqlInfoResult;

pub mod describe;
pub use describe::Analyzer;
