//! Structural patchers that register generated artifacts in existing
//! project files.

pub mod properties;
pub mod source;
pub mod xml;

pub use source::{RegexSourcePatcher, SourcePatcher};
pub use xml::XmlElement;
