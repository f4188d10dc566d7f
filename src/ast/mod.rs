//! Typed syntax tree consumed by the analyzer.
//!
//! The tree is produced by an external SQL parser; every node prints back to
//! SQL text through `Display`, which is what error messages and provenance
//! labels use.

pub mod literal;
pub use literal::*;

pub mod column;
pub use column::*;

pub mod operators;
pub use operators::*;

pub mod function;
pub use function::*;

pub mod expr;
pub use expr::*;

pub mod collection;
pub use collection::*;

pub mod join;
pub use join::*;

pub mod select;
pub use select::*;

pub mod statement;
pub use statement::*;
