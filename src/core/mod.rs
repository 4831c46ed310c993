//! Shared building blocks: error types, the error list, the bilingual
//! message catalogue, settings, and decimal rounding.

pub mod codes;
mod error;
mod error_list;
pub mod rounding;
mod settings;
mod text;

pub use error::*;
pub use error_list::*;
pub use settings::*;
pub use text::*;
