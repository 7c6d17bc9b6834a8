//! Attribute values
//!
//! Resolved values of PROV attributes and extra attributes, plus the raw
//! inputs accepted by the record factories before resolution.

use super::datatypes::{typed_literal_qname, BuiltinDatatype, Literal, Timestamp};
use crate::documents::RecordId;
use crate::namespaces::{Identifier, QName};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde_json::{Number, Value as JsonValue};
use std::fmt;

/// Resolved value of a PROV attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Reference to another record of the same document
    Reference(RecordId),
    /// An identifier that is not dereferenced (e.g. a mention's bundle)
    Identifier(Identifier),
    /// An xsd:dateTime value
    Timestamp(Timestamp),
}

impl AttributeValue {
    /// Get the referenced record, if this is a reference
    pub fn as_reference(&self) -> Option<RecordId> {
        match self {
            AttributeValue::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// Get the identifier, if this is an identifier
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            AttributeValue::Identifier(id) => Some(id),
            _ => None,
        }
    }

    /// Get the timestamp, if this is a timestamp
    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            AttributeValue::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }
}

/// Value of an extra (non-PROV) attribute
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraValue {
    /// Identifier or qualified name
    Identifier(Identifier),
    /// Typed literal
    Literal(Literal),
    /// xsd:dateTime value
    Timestamp(Timestamp),
    /// Plain string
    String(String),
    /// JSON number
    Number(Number),
    /// JSON boolean
    Boolean(bool),
}

impl ExtraValue {
    /// PROV-JSON representation
    pub fn json_representation(&self) -> JsonValue {
        match self {
            ExtraValue::Identifier(Identifier::QName(qname)) => JsonValue::String(
                typed_literal_qname(&qname.to_string(), BuiltinDatatype::QName.prefixed()),
            ),
            ExtraValue::Identifier(Identifier::Uri(uri)) => JsonValue::String(
                typed_literal_qname(uri, BuiltinDatatype::AnyUri.prefixed()),
            ),
            ExtraValue::Literal(literal) => JsonValue::String(literal.json_representation()),
            ExtraValue::Timestamp(ts) => JsonValue::String(typed_literal_qname(
                &ts.to_iso(),
                BuiltinDatatype::DateTime.prefixed(),
            )),
            ExtraValue::String(s) => JsonValue::String(s.clone()),
            ExtraValue::Number(n) => JsonValue::Number(n.clone()),
            ExtraValue::Boolean(b) => JsonValue::Bool(*b),
        }
    }

    /// PROV-N representation
    pub fn provn_representation(&self) -> String {
        match self {
            ExtraValue::Identifier(Identifier::QName(qname)) => format!("'{}'", qname),
            ExtraValue::Identifier(Identifier::Uri(uri)) => format!("\"{}\" %% xsd:anyURI", uri),
            ExtraValue::Literal(literal) => literal.provn_representation(),
            ExtraValue::Timestamp(ts) => format!("\"{}\" %% xsd:dateTime", ts),
            ExtraValue::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
            ExtraValue::Number(n) => n.to_string(),
            ExtraValue::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for ExtraValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.provn_representation())
    }
}

impl From<&str> for ExtraValue {
    fn from(s: &str) -> Self {
        ExtraValue::String(s.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(s: String) -> Self {
        ExtraValue::String(s)
    }
}

impl From<i64> for ExtraValue {
    fn from(n: i64) -> Self {
        ExtraValue::Number(n.into())
    }
}

impl From<bool> for ExtraValue {
    fn from(b: bool) -> Self {
        ExtraValue::Boolean(b)
    }
}

impl From<Identifier> for ExtraValue {
    fn from(id: Identifier) -> Self {
        ExtraValue::Identifier(id)
    }
}

impl From<QName> for ExtraValue {
    fn from(qname: QName) -> Self {
        ExtraValue::Identifier(Identifier::QName(qname))
    }
}

impl From<Literal> for ExtraValue {
    fn from(literal: Literal) -> Self {
        ExtraValue::Literal(literal)
    }
}

impl From<Timestamp> for ExtraValue {
    fn from(ts: Timestamp) -> Self {
        ExtraValue::Timestamp(ts)
    }
}

/// Unresolved input for a PROV attribute
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// An existing record
    Record(RecordId),
    /// An identifier
    Identifier(Identifier),
    /// Text to resolve: an identifier or an ISO-8601 timestamp
    Text(String),
    /// A timestamp
    Timestamp(Timestamp),
    /// A typed literal
    Literal(Literal),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Record(id) => write!(f, "{}", id),
            RawValue::Identifier(id) => write!(f, "{}", id),
            RawValue::Text(s) => write!(f, "{}", s),
            RawValue::Timestamp(ts) => write!(f, "{}", ts),
            RawValue::Literal(literal) => write!(f, "{}", literal),
        }
    }
}

impl From<RecordId> for RawValue {
    fn from(id: RecordId) -> Self {
        RawValue::Record(id)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<Identifier> for RawValue {
    fn from(id: Identifier) -> Self {
        RawValue::Identifier(id)
    }
}

impl From<QName> for RawValue {
    fn from(qname: QName) -> Self {
        RawValue::Identifier(Identifier::QName(qname))
    }
}

impl From<Timestamp> for RawValue {
    fn from(ts: Timestamp) -> Self {
        RawValue::Timestamp(ts)
    }
}

impl From<NaiveDateTime> for RawValue {
    fn from(local: NaiveDateTime) -> Self {
        RawValue::Timestamp(local.into())
    }
}

impl From<DateTime<FixedOffset>> for RawValue {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        RawValue::Timestamp(datetime.into())
    }
}

impl From<Literal> for RawValue {
    fn from(literal: Literal) -> Self {
        RawValue::Literal(literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::Namespace;

    #[test]
    fn test_extra_value_json_representation() {
        let ex = Namespace::new("ex", "http://example.org/");
        assert_eq!(
            ExtraValue::from(ex.qname("x")).json_representation(),
            JsonValue::String("\"ex:x\"^^xsd:QName".to_string())
        );
        assert_eq!(
            ExtraValue::from(Identifier::uri_ref("http://a.org/b")).json_representation(),
            JsonValue::String("\"http://a.org/b\"^^xsd:anyURI".to_string())
        );
        assert_eq!(ExtraValue::from(3i64).json_representation(), serde_json::json!(3));
        assert_eq!(ExtraValue::from("plain").json_representation(), serde_json::json!("plain"));
    }

    #[test]
    fn test_extra_value_provn_representation() {
        let ts = Timestamp::parse("2020-01-01T00:00:00").unwrap();
        assert_eq!(
            ExtraValue::from(ts).provn_representation(),
            "\"2020-01-01T00:00:00\" %% xsd:dateTime"
        );
        assert_eq!(ExtraValue::from(true).provn_representation(), "true");
    }

    #[test]
    fn test_attribute_value_accessors() {
        let ts = Timestamp::parse("2020-01-01T00:00:00").unwrap();
        let value = AttributeValue::Timestamp(ts);
        assert_eq!(value.as_timestamp(), Some(&ts));
        assert_eq!(value.as_reference(), None);
        assert_eq!(value.as_identifier(), None);
    }
}
