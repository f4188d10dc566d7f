pub mod column_resolver;
pub use column_resolver::*;

pub mod expr_resolver;
pub use expr_resolver::*;

pub mod from_resolver;
pub use from_resolver::*;

pub mod select_resolver;
pub use select_resolver::*;

pub mod insert_resolver;
pub use insert_resolver::*;

pub mod update_resolver;
pub use update_resolver::*;

pub mod delete_resolver;
pub use delete_resolver::*;
