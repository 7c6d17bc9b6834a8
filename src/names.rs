//! Lexical helpers for PROV names
//!
//! This module classifies the raw strings that appear where an identifier is
//! expected: blank (document-local) names, prefixed names and absolute URIs.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Marker that starts a blank, document-local name
pub const BLANK_PREFIX: &str = "_:";

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\-\.0-9\u{B7}]*$")
        .unwrap()
});

/// Check if a name is blank (`_:` prefixed)
pub fn is_blank(name: &str) -> bool {
    name.starts_with(BLANK_PREFIX)
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Check if a string is a usable namespace prefix
///
/// The empty prefix is reserved for the default namespace.
pub fn is_valid_prefix(prefix: &str) -> bool {
    is_valid_ncname(prefix)
}

/// Validate a namespace prefix and return an error if invalid
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if is_valid_prefix(prefix) {
        Ok(())
    } else {
        Err(Error::Namespace(format!("Invalid prefix: '{}'", prefix)))
    }
}

/// Check if a string parses as an absolute URI
pub fn is_absolute_uri(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Validate a namespace URI and return an error if it is not absolute
pub fn validate_namespace_uri(uri: &str) -> Result<()> {
    if is_absolute_uri(uri) {
        Ok(())
    } else {
        Err(Error::Namespace(format!("Namespace URI is not absolute: '{}'", uri)))
    }
}

/// Split a prefixed name into prefix and local part
pub fn split_prefixed(name: &str) -> Option<(&str, &str)> {
    name.split_once(':')
}
