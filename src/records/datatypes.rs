//! Built-in datatypes
//!
//! Timestamps (`xsd:dateTime`), typed literals and the lexical typed-literal
//! form used by PROV-JSON: `"<value>"^^<absolute-uri>` or
//! `"<value>"^^prefix:local`.

use crate::error::{Error, Result};
use crate::namespaces::{Identifier, XSD_NAMESPACE};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

// =============================================================================
// XSD type names
// =============================================================================

/// XSD string type name
pub const XSD_STRING: &str = "string";
/// XSD dateTime type name
pub const XSD_DATETIME: &str = "dateTime";
/// XSD anyURI type name
pub const XSD_ANY_URI: &str = "anyURI";
/// XSD QName type name
pub const XSD_QNAME: &str = "QName";

/// Datatypes with a dedicated in-memory representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinDatatype {
    /// xsd:anyURI, decoded to a bare identifier
    AnyUri,
    /// xsd:QName, decoded to a qualified name
    QName,
    /// xsd:dateTime, decoded to a [`Timestamp`]
    DateTime,
}

impl BuiltinDatatype {
    /// Recognize a datatype by its absolute URI
    pub fn from_uri(uri: &str) -> Option<Self> {
        let local = uri.strip_prefix(XSD_NAMESPACE)?;
        match local {
            XSD_ANY_URI => Some(BuiltinDatatype::AnyUri),
            XSD_QNAME => Some(BuiltinDatatype::QName),
            XSD_DATETIME => Some(BuiltinDatatype::DateTime),
            _ => None,
        }
    }

    /// Prefixed name used when writing this datatype
    pub fn prefixed(&self) -> &'static str {
        match self {
            BuiltinDatatype::AnyUri => "xsd:anyURI",
            BuiltinDatatype::QName => "xsd:QName",
            BuiltinDatatype::DateTime => "xsd:dateTime",
        }
    }
}

// =============================================================================
// Timestamps
// =============================================================================

static XSD_DATETIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<year>-?\d{4})-(?P<month>\d{2})-(?P<day>\d{2})T(?P<hour>\d{2}):(?P<minute>\d{2}):(?P<second>\d{2})(?:\.(?P<fraction>\d+))?(?P<tz>Z|(?P<tz_sign>[-+])(?P<tz_hour>\d{2}):(?P<tz_minute>\d{2}))?$",
    )
    .unwrap()
});

/// An `xsd:dateTime` value at microsecond precision
///
/// The local date-time is kept as written; the offset, when present, is
/// retained so that encoding reproduces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl Timestamp {
    /// Create a timestamp without an offset
    pub fn naive(local: NaiveDateTime) -> Self {
        Self {
            local: truncate_micros(local),
            offset: None,
        }
    }

    /// Create a timestamp with an offset
    pub fn with_offset(datetime: DateTime<FixedOffset>) -> Self {
        Self {
            local: truncate_micros(datetime.naive_local()),
            offset: Some(*datetime.offset()),
        }
    }

    /// Parse an ISO-8601 `xsd:dateTime` lexical value
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || Error::TypedLiteral(format!("invalid xsd:dateTime value: '{}'", value));
        let caps = XSD_DATETIME_RE.captures(value).ok_or_else(invalid)?;
        let num = |name: &str| -> Result<i64> {
            caps.name(name)
                .map(|m| m.as_str())
                .unwrap_or("0")
                .parse::<i64>()
                .map_err(|_| invalid())
        };

        let micros = match caps.name("fraction") {
            Some(m) => {
                let mut digits: String = m.as_str().chars().take(6).collect();
                while digits.len() < 6 {
                    digits.push('0');
                }
                digits.parse::<u32>().map_err(|_| invalid())?
            }
            None => 0,
        };

        let date = NaiveDate::from_ymd_opt(num("year")? as i32, num("month")? as u32, num("day")? as u32)
            .ok_or_else(invalid)?;
        let local = date
            .and_hms_micro_opt(num("hour")? as u32, num("minute")? as u32, num("second")? as u32, micros)
            .ok_or_else(invalid)?;

        let offset = match caps.name("tz").map(|m| m.as_str()) {
            None => None,
            Some("Z") => FixedOffset::east_opt(0),
            Some(_) => {
                let seconds = (num("tz_hour")? * 3600 + num("tz_minute")? * 60) as i32;
                let seconds = if caps.name("tz_sign").map(|m| m.as_str()) == Some("-") {
                    -seconds
                } else {
                    seconds
                };
                Some(FixedOffset::east_opt(seconds).ok_or_else(invalid)?)
            }
        };

        Ok(Self { local, offset })
    }

    /// The local date-time
    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    /// The offset, if one was given
    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// The instant in UTC; a timestamp without offset is read as UTC
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self
            .offset
            .and_then(|offset| offset.from_local_datetime(&self.local).single())
        {
            Some(datetime) => datetime.with_timezone(&Utc),
            None => Utc.from_utc_datetime(&self.local),
        }
    }

    /// ISO-8601 lexical form
    ///
    /// Microseconds are written only when non-zero.
    pub fn to_iso(&self) -> String {
        let mut out = self.local.format("%Y-%m-%dT%H:%M:%S").to_string();
        let micros = self.local.nanosecond() / 1_000;
        if micros != 0 {
            out.push_str(&format!(".{:06}", micros));
        }
        if let Some(offset) = self.offset {
            let seconds = offset.local_minus_utc();
            let sign = if seconds < 0 { '-' } else { '+' };
            let seconds = seconds.abs();
            out.push_str(&format!("{}{:02}:{:02}", sign, seconds / 3600, (seconds % 3600) / 60));
        }
        out
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iso())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(local: NaiveDateTime) -> Self {
        Timestamp::naive(local)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        Timestamp::with_offset(datetime)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Timestamp::with_offset(datetime.into())
    }
}

fn truncate_micros(local: NaiveDateTime) -> NaiveDateTime {
    let micros = local.nanosecond() / 1_000;
    local.with_nanosecond(micros * 1_000).unwrap_or(local)
}

// =============================================================================
// Literals
// =============================================================================

/// A value with an explicit datatype
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    value: String,
    datatype: Identifier,
}

impl Literal {
    /// Create a new literal
    pub fn new(value: impl Into<String>, datatype: Identifier) -> Self {
        Self {
            value: value.into(),
            datatype,
        }
    }

    /// Get the lexical value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get the datatype
    pub fn datatype(&self) -> &Identifier {
        &self.datatype
    }

    /// PROV-JSON typed-literal form
    pub fn json_representation(&self) -> String {
        match &self.datatype {
            Identifier::QName(qname) => typed_literal_qname(&self.value, &qname.to_string()),
            Identifier::Uri(uri) => typed_literal_uri(&self.value, uri),
        }
    }

    /// PROV-N form: `"value" %% datatype`
    pub fn provn_representation(&self) -> String {
        match &self.datatype {
            Identifier::QName(qname) => format!("\"{}\" %% {}", escape(&self.value), qname),
            Identifier::Uri(uri) => format!("\"{}\" %% <{}>", escape(&self.value), uri),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.provn_representation())
    }
}

// =============================================================================
// Typed-literal lexical form
// =============================================================================

static TYPED_LITERAL_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^"(?P<value>[^"\\]*(?:\\.[^"\\]*)*)"\^\^<(?P<datatype>[^>\\]*(?:\\.[^>\\]*)*)>$"#)
        .unwrap()
});

static TYPED_LITERAL_QNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^"(?P<value>[^"\\]*(?:\\.[^"\\]*)*)"\^\^(?P<datatype>[^<>"\\\s]+)$"#).unwrap()
});

/// Datatype part of a typed literal, as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatatypeRef {
    /// `<absolute-uri>`
    Uri(String),
    /// `prefix:local`
    Prefixed(String),
}

/// A typed literal split into value and datatype
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedLiteral {
    /// Unescaped value
    pub value: String,
    /// Datatype reference
    pub datatype: DatatypeRef,
}

/// Parse a string in typed-literal form
///
/// Returns `Ok(None)` for plain strings and an error for strings that start
/// like a typed literal but are malformed.
pub fn parse_typed_literal(text: &str) -> Result<Option<TypedLiteral>> {
    if let Some(caps) = TYPED_LITERAL_URI.captures(text) {
        return Ok(Some(TypedLiteral {
            value: unescape(&caps["value"]),
            datatype: DatatypeRef::Uri(caps["datatype"].to_string()),
        }));
    }
    if let Some(caps) = TYPED_LITERAL_QNAME.captures(text) {
        return Ok(Some(TypedLiteral {
            value: unescape(&caps["value"]),
            datatype: DatatypeRef::Prefixed(caps["datatype"].to_string()),
        }));
    }
    if text.starts_with('"') && text.contains("\"^^") {
        return Err(Error::TypedLiteral(format!("malformed typed literal: {}", text)));
    }
    Ok(None)
}

/// `"value"^^<uri>`
pub fn typed_literal_uri(value: &str, uri: &str) -> String {
    format!("\"{}\"^^<{}>", escape(value), uri)
}

/// `"value"^^prefix:local`
pub fn typed_literal_qname(value: &str, datatype: &str) -> String {
    format!("\"{}\"^^{}", escape(value), datatype)
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::Namespace;

    #[test]
    fn test_parse_timestamp_without_offset() {
        let ts = Timestamp::parse("2020-01-01T00:30:00").unwrap();
        assert_eq!(ts.offset(), None);
        assert_eq!(ts.to_iso(), "2020-01-01T00:30:00");
    }

    #[test]
    fn test_parse_timestamp_fraction_is_normalized() {
        let ts = Timestamp::parse("2020-01-01T00:30:00.5").unwrap();
        assert_eq!(ts.local().nanosecond(), 500_000_000);
        assert_eq!(ts.to_iso(), "2020-01-01T00:30:00.500000");

        let ts = Timestamp::parse("2020-01-01T00:30:00.123456789").unwrap();
        assert_eq!(ts.to_iso(), "2020-01-01T00:30:00.123456");
    }

    #[test]
    fn test_parse_timestamp_keeps_offset() {
        let ts = Timestamp::parse("2020-01-01T10:00:00-05:30").unwrap();
        assert_eq!(ts.offset().unwrap().local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert_eq!(ts.to_iso(), "2020-01-01T10:00:00-05:30");
        assert_eq!(
            ts.to_utc().naive_utc(),
            Timestamp::parse("2020-01-01T15:30:00").unwrap().local()
        );

        let zulu = Timestamp::parse("2020-01-01T10:00:00Z").unwrap();
        assert_eq!(zulu.to_iso(), "2020-01-01T10:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(Timestamp::parse("yesterday").is_err());
        assert!(Timestamp::parse("2020-13-01T00:00:00").is_err());
        assert!(Timestamp::parse("2020-01-01 00:00:00").is_err());
    }

    #[test]
    fn test_typed_literal_forms() {
        let lit = parse_typed_literal("\"42\"^^xsd:int").unwrap().unwrap();
        assert_eq!(lit.value, "42");
        assert_eq!(lit.datatype, DatatypeRef::Prefixed("xsd:int".to_string()));

        let lit = parse_typed_literal("\"a\"^^<http://example.org/t>").unwrap().unwrap();
        assert_eq!(lit.datatype, DatatypeRef::Uri("http://example.org/t".to_string()));

        assert_eq!(parse_typed_literal("just text").unwrap(), None);
        assert!(parse_typed_literal("\"broken\"^^<http://x").is_err());
    }

    #[test]
    fn test_escaped_quotes_survive() {
        let encoded = typed_literal_qname("say \"hi\"", "xsd:string");
        let lit = parse_typed_literal(&encoded).unwrap().unwrap();
        assert_eq!(lit.value, "say \"hi\"");
    }

    #[test]
    fn test_literal_json_representation() {
        let ex = Namespace::new("ex", "http://example.org/");
        let lit = Literal::new("v", Identifier::QName(ex.qname("t")));
        assert_eq!(lit.json_representation(), "\"v\"^^ex:t");

        let lit = Literal::new("v", Identifier::uri_ref("http://example.org/t"));
        assert_eq!(lit.json_representation(), "\"v\"^^<http://example.org/t>");
    }

    #[test]
    fn test_builtin_datatype_from_uri() {
        assert_eq!(
            BuiltinDatatype::from_uri(&format!("{}dateTime", XSD_NAMESPACE)),
            Some(BuiltinDatatype::DateTime)
        );
        assert_eq!(BuiltinDatatype::from_uri("http://example.org/dateTime"), None);
    }
}
