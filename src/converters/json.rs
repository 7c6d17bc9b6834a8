//! PROV-JSON converter
//!
//! Records are grouped by kind label and keyed by identifier. Records
//! without an identifier are written under a generated blank id that is not
//! stored back on the record. Decoding registers namespace prefixes first,
//! creates every record of a bundle as an empty shell, then fills in their
//! attributes so that references between records resolve in any order.
//! Mentions are completed last, once the bundles they point into exist.

use super::DocumentConverter;
use crate::config::DocumentConfig;
use crate::documents::{Bundle, BundleId, ProvDocument, RecordId};
use crate::error::{Error, Result};
use crate::names::{split_prefixed, BLANK_PREFIX};
use crate::namespaces::{Identifier, Name, QName};
use crate::records::attributes;
use crate::records::datatypes::{parse_typed_literal, typed_literal_qname, BuiltinDatatype, DatatypeRef, TypedLiteral};
use crate::records::{
    AttributeId, AttributeValue, ExtraValue, Extras, Literal, RawAttributes, RawValue, Record,
    RecordKind, Timestamp,
};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::HashMap;

/// Key of the namespace prefix table
const PREFIX_KEY: &str = "prefix";

/// Prefix table key for the default namespace
const DEFAULT_NAMESPACE_KEY: &str = "$";

/// PROV-JSON converter
#[derive(Debug, Clone, Default)]
pub struct ProvJsonConverter {
    config: DocumentConfig,
}

impl ProvJsonConverter {
    /// Create a converter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter whose decoded documents use `config`
    pub fn with_config(config: DocumentConfig) -> Self {
        Self { config }
    }

    /// Configuration given to decoded documents
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Encode a document as a PROV-JSON value
    pub fn encode(&self, doc: &ProvDocument) -> JsonValue {
        tracing::debug!(records = doc.len(), "encoding PROV-JSON document");
        JsonValue::Object(Encoder::new(doc).encode_bundle(doc.root()))
    }

    /// Decode a PROV-JSON value
    pub fn decode(&self, value: &JsonValue) -> Result<ProvDocument> {
        let container = value
            .as_object()
            .ok_or_else(|| Error::Decode(format!("expected a JSON object, found {}", json_type(value))))?;
        let mut doc = ProvDocument::with_config(self.config.clone());
        let mut mentions = Vec::new();
        decode_bundle(&mut doc, BundleId::TOP_LEVEL, container, &mut mentions)?;
        decode_mentions(&mut doc, mentions)?;
        tracing::debug!(records = doc.len(), "decoded PROV-JSON document");
        Ok(doc)
    }
}

impl DocumentConverter for ProvJsonConverter {
    fn serialize(&self, doc: &ProvDocument) -> Result<String> {
        let value = self.encode(doc);
        let text = if doc.config().pretty() {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }

    fn deserialize(&self, text: &str) -> Result<ProvDocument> {
        let value: JsonValue = serde_json::from_str(text)?;
        self.decode(&value)
    }

    fn is_readable(&self) -> bool {
        true
    }
}

impl ProvDocument {
    /// Encode as a PROV-JSON value
    pub fn to_json(&self) -> JsonValue {
        ProvJsonConverter::new().encode(self)
    }

    /// Encode as PROV-JSON text
    pub fn to_json_string(&self) -> Result<String> {
        ProvJsonConverter::new().serialize(self)
    }

    /// Decode PROV-JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        ProvJsonConverter::new().deserialize(text)
    }

    /// Decode a PROV-JSON value
    pub fn from_json_value(value: &JsonValue) -> Result<Self> {
        ProvJsonConverter::new().decode(value)
    }
}

struct Encoder<'a> {
    ids: HashMap<RecordId, String>,
    doc: &'a ProvDocument,
}

impl<'a> Encoder<'a> {
    fn new(doc: &'a ProvDocument) -> Self {
        let prefix = doc.config().anonymous_prefix();
        let mut counter = doc.namespaces().anonymous_count();
        let ids = doc
            .records()
            .map(|record| {
                let id = match record.identifier() {
                    Some(identifier) => identifier.to_string(),
                    None => {
                        counter += 1;
                        format!("{}{}{}", BLANK_PREFIX, prefix, counter)
                    }
                };
                (record.id(), id)
            })
            .collect();
        Self { ids, doc }
    }

    fn id_of(&self, record: RecordId) -> &str {
        self.ids.get(&record).map(String::as_str).unwrap_or_default()
    }

    fn encode_bundle(&self, bundle: Bundle<'_>) -> JsonMap<String, JsonValue> {
        let mut container = JsonMap::new();

        if bundle.is_top_level() {
            let mut prefixes = JsonMap::new();
            for namespace in self.doc.registered_namespaces() {
                prefixes.insert(namespace.prefix().to_string(), namespace.uri().into());
            }
            if let Some(default) = self.doc.default_namespace() {
                prefixes.insert(DEFAULT_NAMESPACE_KEY.to_string(), default.uri().into());
            }
            if !prefixes.is_empty() {
                container.insert(PREFIX_KEY.to_string(), JsonValue::Object(prefixes));
            }
        }

        for record in bundle.records() {
            let content = match record.sub_bundle() {
                Some(sub) => self.encode_bundle(self.doc.bundle(sub)),
                None => self.encode_record(record),
            };
            let section = container
                .entry(record.kind().label())
                .or_insert_with(|| JsonValue::Object(JsonMap::new()));
            if let JsonValue::Object(section) = section {
                section.insert(self.id_of(record.id()).to_string(), JsonValue::Object(content));
            }
        }
        container
    }

    fn encode_record(&self, record: &Record) -> JsonMap<String, JsonValue> {
        let mut content = JsonMap::new();
        for (attr, value) in record.attributes() {
            if let Some(value) = value {
                content.insert(attr.key().to_string(), self.encode_value(value));
            }
        }

        for (key, value) in record.extra_attributes() {
            let key = key.to_string();
            let value = value.json_representation();
            match content.get_mut(&key) {
                Some(JsonValue::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = JsonValue::Array(vec![first, value]);
                }
                None => {
                    content.insert(key, value);
                }
            }
        }
        content
    }

    fn encode_value(&self, value: &AttributeValue) -> JsonValue {
        match value {
            AttributeValue::Reference(record) => self.id_of(*record).into(),
            AttributeValue::Identifier(identifier) => identifier.to_string().into(),
            AttributeValue::Timestamp(ts) => {
                typed_literal_qname(&ts.to_iso(), BuiltinDatatype::DateTime.prefixed()).into()
            }
        }
    }
}

/// Mention records whose attributes are set once every bundle is decoded
type PendingMentions = Vec<(RecordId, RawAttributes, Extras)>;

fn decode_bundle(
    doc: &mut ProvDocument,
    bundle: BundleId,
    container: &JsonMap<String, JsonValue>,
    mentions: &mut PendingMentions,
) -> Result<()> {
    let mut entries = Vec::new();
    for (label, section) in container {
        if label == PREFIX_KEY {
            decode_prefixes(doc, section)?;
            continue;
        }
        let kind = RecordKind::from_label(label)?;
        let section = section
            .as_object()
            .ok_or_else(|| Error::Decode(format!("'{}' must map identifiers to records", label)))?;
        for (identifier, content) in section {
            entries.push((kind, identifier.as_str(), content));
        }
    }
    entries.sort_by_key(|(kind, _, _)| kind.precedence());

    let mut known: HashMap<&str, RecordId> = HashMap::with_capacity(entries.len());
    let mut shells = Vec::with_capacity(entries.len());
    for (kind, identifier, content) in entries {
        let resolved = doc.valid_identifier(identifier);
        let record = doc.insert_record(bundle, kind, resolved)?;
        known.insert(identifier, record);
        shells.push((record, kind, content));
    }

    let mut nested = Vec::new();
    for (record, kind, content) in shells {
        let content = content.as_object().ok_or_else(|| {
            Error::Decode(format!("{} record content must be an object, found {}", kind, json_type(content)))
        })?;
        if let Some(sub) = doc.record(record).sub_bundle() {
            nested.push((sub, content));
            continue;
        }
        let (attributes, extras) = split_attributes(doc, kind, content, &known)?;
        if kind == RecordKind::Mention {
            mentions.push((record, attributes, extras));
        } else {
            doc.set_attributes(record, attributes, extras)?;
        }
    }

    for (sub, content) in nested {
        decode_bundle(doc, sub, content, mentions)?;
    }
    Ok(())
}

/// Set mention attributes, checking the general entity inside known bundles
fn decode_mentions(doc: &mut ProvDocument, mentions: PendingMentions) -> Result<()> {
    for (record, mut attributes, extras) in mentions {
        let from = doc.record(record).bundle();
        let mentioned = attributes
            .iter()
            .find(|(id, _)| *id == AttributeId::Bundle)
            .map(|(_, value)| value.clone());
        let general = attributes.iter().position(|(id, _)| *id == AttributeId::GeneralEntity);
        if let (Some(mentioned), Some(index)) = (mentioned, general) {
            let (id, value) = attributes.swap_remove(index);
            attributes.push((id, doc.resolve_mentioned(from, value, &mentioned)?));
        }
        doc.set_attributes(record, attributes, extras)?;
    }
    Ok(())
}

fn decode_prefixes(doc: &mut ProvDocument, prefixes: &JsonValue) -> Result<()> {
    let prefixes = prefixes
        .as_object()
        .ok_or_else(|| Error::Decode("prefix table must be an object".to_string()))?;
    for (prefix, uri) in prefixes {
        let uri = uri
            .as_str()
            .ok_or_else(|| Error::Decode(format!("namespace URI for '{}' must be a string", prefix)))?;
        if prefix == DEFAULT_NAMESPACE_KEY {
            doc.set_default_namespace(uri)?;
        } else {
            let bound = doc.add_namespace(prefix, uri)?;
            if bound.prefix() != prefix {
                tracing::debug!(prefix = %prefix, bound = bound.prefix(), "prefix renamed while decoding");
            }
        }
    }
    Ok(())
}

/// Separate PROV attributes of `kind` from extra attributes
fn split_attributes(
    doc: &ProvDocument,
    kind: RecordKind,
    content: &JsonMap<String, JsonValue>,
    known: &HashMap<&str, RecordId>,
) -> Result<(RawAttributes, Extras)> {
    let mut raw = RawAttributes::new();
    let mut extras = Extras::new();
    for (key, value) in content {
        let declared = AttributeId::from_key(key).filter(|id| attributes::lookup(kind, *id).is_ok());
        match (declared, value) {
            (Some(id), value) => raw.push((id, decode_attribute_value(doc, value, known)?)),
            (None, JsonValue::Array(values)) => {
                for value in values {
                    extras.push((Name::Text(key.clone()), decode_extra_value(doc, value)?));
                }
            }
            (None, value) => extras.push((Name::Text(key.clone()), decode_extra_value(doc, value)?)),
        }
    }
    Ok((raw, extras))
}

fn decode_attribute_value(
    doc: &ProvDocument,
    value: &JsonValue,
    known: &HashMap<&str, RecordId>,
) -> Result<RawValue> {
    let text = value
        .as_str()
        .ok_or_else(|| Error::Decode(format!("PROV attribute value must be a string, found {}", json_type(value))))?;
    if let Some(record) = known.get(text) {
        return Ok(RawValue::Record(*record));
    }
    match parse_typed_literal(text)? {
        Some(literal) => Ok(match decode_literal(doc, literal)? {
            ExtraValue::Identifier(identifier) => RawValue::Identifier(identifier),
            ExtraValue::Timestamp(ts) => RawValue::Timestamp(ts),
            ExtraValue::Literal(literal) => RawValue::Literal(literal),
            other => RawValue::Text(other.to_string()),
        }),
        None => Ok(RawValue::Text(text.to_string())),
    }
}

fn decode_extra_value(doc: &ProvDocument, value: &JsonValue) -> Result<ExtraValue> {
    match value {
        JsonValue::String(text) => match parse_typed_literal(text)? {
            Some(literal) => decode_literal(doc, literal),
            None => Ok(ExtraValue::String(text.clone())),
        },
        JsonValue::Number(number) => Ok(ExtraValue::Number(number.clone())),
        JsonValue::Bool(flag) => Ok(ExtraValue::Boolean(*flag)),
        other => Err(Error::Decode(format!("unsupported attribute value: {}", json_type(other)))),
    }
}

fn decode_literal(doc: &ProvDocument, literal: TypedLiteral) -> Result<ExtraValue> {
    let datatype = match &literal.datatype {
        DatatypeRef::Uri(uri) => Identifier::Uri(uri.clone()),
        DatatypeRef::Prefixed(name) => Identifier::QName(bound_qname(doc, name)?),
    };
    let value = literal.value;
    match BuiltinDatatype::from_uri(&datatype.uri()) {
        Some(BuiltinDatatype::AnyUri) => Ok(ExtraValue::Identifier(Identifier::Uri(value))),
        Some(BuiltinDatatype::QName) => match split_prefixed(&value) {
            Some((prefix, _)) if !prefix.is_empty() => Ok(ExtraValue::Identifier(Identifier::QName(bound_qname(doc, &value)?))),
            _ => doc
                .namespaces()
                .lookup(&value)
                .map(ExtraValue::Identifier)
                .ok_or_else(|| Error::Name(format!("'{}' is not a valid qualified name", value))),
        },
        Some(BuiltinDatatype::DateTime) => Timestamp::parse(&value).map(ExtraValue::Timestamp),
        None => Ok(ExtraValue::Literal(Literal::new(value, datatype))),
    }
}

/// Resolve `prefix:local` against the bound prefixes
fn bound_qname(doc: &ProvDocument, name: &str) -> Result<QName> {
    let (prefix, local) =
        split_prefixed(name).ok_or_else(|| Error::Name(format!("'{}' has no prefix", name)))?;
    doc.namespaces()
        .get_namespace(prefix)
        .map(|namespace| namespace.qname(local))
        .ok_or_else(|| Error::Namespace(format!("unknown prefix '{}' in '{}'", prefix, name)))
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
