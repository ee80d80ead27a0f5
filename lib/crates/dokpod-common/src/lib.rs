pub mod api;
pub mod types;

pub use types::*;
