//! Dependency analysis for `-- @dynamicQuery` statements, whose optional
//! fragments are emitted only when a selected field or a bound parameter
//! needs them.

pub mod fragment;
pub use fragment::*;

pub mod annotations;
pub use annotations::*;

pub mod fragment_splitter;
pub use fragment_splitter::*;

pub mod dynamic_analyzer;
pub use dynamic_analyzer::*;
