pub mod count_impl;
pub use count_impl::*;

pub mod sum_impl;
pub use sum_impl::*;

pub mod avg_impl;
pub use avg_impl::*;

pub mod minmax_impl;
pub use minmax_impl::*;

pub mod concat_impl;
pub use concat_impl::*;

pub mod coalesce_impl;
pub use coalesce_impl::*;

pub mod numeric_impl;
pub use numeric_impl::*;

pub mod date_impl;
pub use date_impl::*;

pub mod text_impl;
pub use text_impl::*;
