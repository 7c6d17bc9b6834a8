//! PROV serializations
//!
//! Converters between [`ProvDocument`]s and their textual forms.
//!
//! Supported formats:
//! - PROV-JSON: https://www.w3.org/Submission/prov-json/ (read and write)
//! - PROV-N: https://www.w3.org/TR/prov-n/ (write only)

mod json;
mod provn;

pub use json::ProvJsonConverter;
pub use provn::ProvNConverter;

use crate::documents::ProvDocument;
use crate::error::{Error, Result};
use std::fmt;

/// Trait for document serializations
pub trait DocumentConverter {
    /// Serialize a document
    fn serialize(&self, doc: &ProvDocument) -> Result<String>;

    /// Parse a document
    fn deserialize(&self, text: &str) -> Result<ProvDocument>;

    /// Returns true if this format can be read back
    fn is_readable(&self) -> bool;
}

/// Serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// PROV-JSON
    #[default]
    Json,
    /// PROV-N
    ProvN,
}

impl Format {
    /// Parse a format name such as `json` or `provn`
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" | "prov-json" => Ok(Format::Json),
            "provn" | "prov-n" => Ok(Format::ProvN),
            other => Err(Error::Decode(format!("unknown format '{}'", other))),
        }
    }

    /// Usual file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::ProvN => "provn",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "PROV-JSON"),
            Format::ProvN => write!(f, "PROV-N"),
        }
    }
}

/// Create a converter for a format
pub fn create_converter(format: Format) -> Box<dyn DocumentConverter> {
    match format {
        Format::Json => Box::new(ProvJsonConverter::new()),
        Format::ProvN => Box::new(ProvNConverter::new()),
    }
}
