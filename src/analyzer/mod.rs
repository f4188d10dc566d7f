pub mod analyzer_error;
pub use analyzer_error::*;

pub mod type_var;
pub use type_var::*;

pub mod constraint;
pub use constraint::*;

pub mod unifier;
pub use unifier::*;

pub mod column_def;
pub use column_def::*;

pub mod inferred_expr;
pub use inferred_expr::*;

pub mod analysis_context;
pub use analysis_context::*;

pub mod functions_helper;
pub use functions_helper::*;

pub mod analyzed_query;
pub use analyzed_query::*;

pub mod query_description;
pub use query_description::*;

pub mod cardinality;
pub use cardinality::*;

pub mod resolvers;
pub use resolvers::*;

#[cfg(test)]
pub use _tests::fixtures;
