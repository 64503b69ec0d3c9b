//! Command implementations.

mod convert;
mod info;
mod validate;

pub use convert::run_convert;
pub use info::run_info;
pub use validate::run_validate;
