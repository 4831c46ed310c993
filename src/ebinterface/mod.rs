//! Austrian ebInterface invoice model (versions 4.0 to 6.0), with XML
//! reading and writing.

#[cfg(feature = "xml")]
mod parse;
mod types;
mod version;
#[cfg(feature = "xml")]
mod write;

#[cfg(feature = "xml")]
pub use parse::from_xml;
pub use types::*;
pub use version::EbVersion;
#[cfg(feature = "xml")]
pub use write::to_xml;
