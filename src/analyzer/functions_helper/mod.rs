pub mod function_impl;
pub use function_impl::*;

pub mod function_registry;
pub use function_registry::*;

pub mod functions;
pub use functions::*;
