//! Error types for provdm
//!
//! This module defines all error types used throughout the library.
//! Construction errors identify the record kind and the offending attribute
//! so they can be shown to a user or logged as-is.

use thiserror::Error;

/// Result type alias using provdm Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for provdm operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required attribute was not supplied
    #[error("{kind} is missing required attribute '{attribute}'")]
    MissingRequiredAttribute {
        /// Record kind label
        kind: &'static str,
        /// Attribute key
        attribute: &'static str,
    },

    /// A value could not be coerced to any accepted type
    #[error("{kind}: value '{value}' for '{attribute}' is not one of [{expected}]")]
    InvalidAttributeType {
        /// Record kind label
        kind: &'static str,
        /// Attribute key
        attribute: &'static str,
        /// Offending value, as text
        value: String,
        /// Accepted types, comma separated
        expected: String,
    },

    /// A kind-specific semantic rule was violated
    #[error("{kind} constraint violated: {detail}")]
    DomainConstraint {
        /// Record kind label
        kind: &'static str,
        /// What went wrong
        detail: String,
    },

    /// The identifier is already used by another record or bundle in the same bundle
    #[error("duplicate identifier: {identifier}")]
    DuplicateIdentifier {
        /// The clashing identifier
        identifier: String,
    },

    /// A reference could not be dereferenced to any known record
    #[error("{kind}: cannot resolve '{reference}' for '{attribute}'")]
    UnresolvedReference {
        /// Record kind label
        kind: &'static str,
        /// Attribute key
        attribute: &'static str,
        /// The reference text
        reference: String,
    },

    /// Unknown record kind label in a PROV-JSON document
    #[error("unknown record kind: {0}")]
    UnknownRecordKind(String),

    /// Malformed typed literal
    #[error("typed literal error: {0}")]
    TypedLiteral(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid identifier or attribute name)
    #[error("name error: {0}")]
    Name(String),

    /// Decoding error (PROV-JSON structure)
    #[error("decoding error: {0}")]
    Decode(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// JSON syntax error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Record kind label this error is about, if any
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Error::MissingRequiredAttribute { kind, .. }
            | Error::InvalidAttributeType { kind, .. }
            | Error::DomainConstraint { kind, .. }
            | Error::UnresolvedReference { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// True for errors raised while building a single record
    pub fn is_construction_error(&self) -> bool {
        self.kind().is_some()
    }
}
