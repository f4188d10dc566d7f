//! Object shape of a flat join result: which columns belong to which table
//! and how the tables hang off each other.

pub mod relation;
pub use relation::*;

pub mod nested_descriptor;
pub use nested_descriptor::*;
