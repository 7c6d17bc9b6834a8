//! PROV-N rendering

use super::DocumentConverter;
use crate::documents::{Bundle, ProvDocument};
use crate::error::{Error, Result};
use crate::records::{AttributeId, AttributeValue, Record, RecordKind};
use std::fmt;

const INDENT: &str = "  ";

/// PROV-N converter (write only)
#[derive(Debug, Clone, Default)]
pub struct ProvNConverter;

impl ProvNConverter {
    /// Create a new converter
    pub fn new() -> Self {
        Self
    }
}

impl DocumentConverter for ProvNConverter {
    fn serialize(&self, doc: &ProvDocument) -> Result<String> {
        Ok(doc.get_provn())
    }

    fn deserialize(&self, _text: &str) -> Result<ProvDocument> {
        Err(Error::Decode("PROV-N documents cannot be read".to_string()))
    }

    fn is_readable(&self) -> bool {
        false
    }
}

impl ProvDocument {
    /// Render as PROV-N
    pub fn get_provn(&self) -> String {
        self.root().get_provn()
    }
}

impl fmt::Display for ProvDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.get_provn())
    }
}

impl<'a> Bundle<'a> {
    /// Render this bundle and everything nested in it as PROV-N
    pub fn get_provn(&self) -> String {
        bundle_provn(*self, 0)
    }

    /// Render one record of this document as PROV-N
    pub fn record_provn(&self, record: &Record) -> String {
        record_provn(self.document(), record)
    }
}

fn bundle_provn(bundle: Bundle<'_>, level: usize) -> String {
    let doc = bundle.document();
    let inner = INDENT.repeat(level + 1);
    let mut lines = Vec::with_capacity(bundle.len() + 2);

    match bundle.identifier() {
        Some(identifier) if !bundle.is_top_level() => lines.push(format!("bundle {}", identifier)),
        _ => lines.push("bundle".to_string()),
    }
    if bundle.is_top_level() {
        for namespace in doc.registered_namespaces() {
            lines.push(format!("{}prefix {} <{}>", inner, namespace.prefix(), namespace.uri()));
        }
        lines.push(String::new());
    }

    for record in bundle.records() {
        match record.sub_bundle() {
            Some(sub) => lines.push(format!("{}{}", inner, bundle_provn(doc.bundle(sub), level + 1))),
            None => lines.push(format!("{}{}", inner, record_provn(doc, record))),
        }
    }

    lines.push(format!("{}endBundle", INDENT.repeat(level)));
    lines.join("\n")
}

fn record_provn(doc: &ProvDocument, record: &Record) -> String {
    let mut items = Vec::new();

    if record.kind() == RecordKind::Association {
        items.push(value_provn(doc, record.attribute(AttributeId::Activity)));
        let agent = value_provn(doc, record.attribute(AttributeId::Agent));
        match record.attribute(AttributeId::Plan) {
            Some(plan) => items.push(format!("{} @ {}", agent, value_provn(doc, Some(plan)))),
            None => items.push(agent),
        }
    } else {
        if let Some(identifier) = record.identifier() {
            items.push(identifier.to_string());
        }
        items.extend(record.attributes().map(|(_, value)| value_provn(doc, value)));
    }

    let extras: Vec<String> = record
        .extra_attributes()
        .iter()
        .map(|(key, value)| format!("{}={}", key, value.provn_representation()))
        .collect();
    if !extras.is_empty() {
        items.push(format!("[{}]", extras.join(", ")));
    }

    format!("{}({})", record.kind().label(), items.join(", "))
}

fn value_provn(doc: &ProvDocument, value: Option<&AttributeValue>) -> String {
    match value {
        None => "-".to_string(),
        Some(AttributeValue::Reference(target)) => doc
            .record(*target)
            .identifier()
            .map_or_else(|| "-".to_string(), ToString::to_string),
        Some(AttributeValue::Identifier(identifier)) => identifier.to_string(),
        Some(AttributeValue::Timestamp(ts)) => ts.to_iso(),
    }
}
