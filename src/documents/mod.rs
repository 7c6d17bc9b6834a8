//! PROV documents and bundles
//!
//! A [`ProvDocument`] is the top-level bundle. It owns the namespace table,
//! every record and every nested bundle; records and bundles are addressed
//! by [`RecordId`] and [`BundleId`] handles. Nested bundles keep a parent
//! link so identifier lookup can walk outward without searching siblings.

mod equality;
mod factory;

use crate::config::DocumentConfig;
use crate::error::{Error, Result};
use crate::names;
use crate::namespaces::{Identifier, Name, Namespace, NamespaceManager};
use crate::records::{
    resolve_extras, validate_attributes, ExtraValue, Extras, RawAttributes, Record, RecordKind,
};
use std::collections::HashMap;
use std::fmt;

/// Handle of a record within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(usize);

impl RecordId {
    /// Position of the record in creation order
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of a bundle within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleId(usize);

impl BundleId {
    /// The document itself
    pub const TOP_LEVEL: BundleId = BundleId(0);

    /// Check if this is the document itself
    pub fn is_top_level(&self) -> bool {
        *self == Self::TOP_LEVEL
    }
}

#[derive(Debug, Clone, Default)]
struct BundleData {
    identifier: Option<Identifier>,
    parent: Option<BundleId>,
    /// Record standing for this bundle in its parent
    record: Option<RecordId>,
    depth: usize,
    contents: Vec<RecordId>,
    records_by_id: HashMap<Identifier, RecordId>,
    bundles_by_id: HashMap<Identifier, BundleId>,
}

/// A PROV document
#[derive(Debug, Clone)]
pub struct ProvDocument {
    config: DocumentConfig,
    namespaces: NamespaceManager,
    records: Vec<Record>,
    bundles: Vec<BundleData>,
}

impl ProvDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// Create an empty document with a configuration
    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            config,
            namespaces: NamespaceManager::new(),
            records: Vec::new(),
            bundles: vec![BundleData::default()],
        }
    }

    /// Document configuration
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Namespace table
    pub fn namespaces(&self) -> &NamespaceManager {
        &self.namespaces
    }

    pub(crate) fn namespaces_mut(&mut self) -> &mut NamespaceManager {
        &mut self.namespaces
    }

    /// Register a prefix/URI pair
    ///
    /// A prefix that is already bound to another URI is renamed; the
    /// returned namespace carries the prefix actually bound.
    pub fn add_namespace(&mut self, prefix: &str, uri: &str) -> Result<Namespace> {
        self.config.limits().check_namespaces(self.namespaces.len() + 1)?;
        self.namespaces.add_namespace(prefix, uri)
    }

    /// Register an existing namespace
    pub fn register_namespace(&mut self, namespace: Namespace) -> Result<Namespace> {
        self.config.limits().check_namespaces(self.namespaces.len() + 1)?;
        Ok(self.namespaces.register(namespace))
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, uri: &str) -> Result<()> {
        names::validate_namespace_uri(uri)?;
        self.namespaces.set_default_namespace(uri);
        Ok(())
    }

    /// Get the default namespace
    pub fn default_namespace(&self) -> Option<&Namespace> {
        self.namespaces.default_namespace()
    }

    /// Namespaces registered by this document
    pub fn registered_namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.registered_namespaces()
    }

    /// Resolve a name to an identifier, registering QName namespaces
    ///
    /// Blank names resolve to `None`.
    pub fn valid_identifier(&mut self, name: impl Into<Name>) -> Option<Identifier> {
        self.namespaces.resolve(&name.into())
    }

    /// Generate a fresh anonymous identifier
    pub fn anonymous(&mut self) -> Identifier {
        let prefix = self.config.anonymous_prefix().to_string();
        self.namespaces.anonymous(&prefix)
    }

    /// The document as a bundle
    pub fn root(&self) -> Bundle<'_> {
        self.bundle(BundleId::TOP_LEVEL)
    }

    /// The document as a mutable bundle, for adding records
    pub fn root_mut(&mut self) -> BundleMut<'_> {
        self.bundle_mut(BundleId::TOP_LEVEL)
    }

    /// Read view of a bundle
    pub fn bundle(&self, id: BundleId) -> Bundle<'_> {
        Bundle { doc: self, id }
    }

    /// Mutable view of a bundle
    pub fn bundle_mut(&mut self, id: BundleId) -> BundleMut<'_> {
        BundleMut { doc: self, id }
    }

    /// Get a record by handle
    ///
    /// Handles are only minted by the document that owns the record.
    pub fn record(&self, id: RecordId) -> &Record {
        &self.records[id.0]
    }

    /// Look up a record of the top-level bundle
    pub fn get_record(&self, name: impl Into<Name>) -> Option<&Record> {
        self.root().get_record(name)
    }

    /// Look up a sub-bundle of the top-level bundle
    pub fn get_bundle(&self, name: impl Into<Name>) -> Option<Bundle<'_>> {
        self.root().get_bundle(name)
    }

    /// Every record, depth-first in document order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        let mut order = Vec::with_capacity(self.records.len());
        let mut stack = vec![self.bundles[0].contents.iter()];
        while let Some(contents) = stack.last_mut() {
            match contents.next() {
                Some(id) => {
                    order.push(*id);
                    if let Some(sub) = self.records[id.0].contents {
                        stack.push(self.bundles[sub.0].contents.iter());
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
        order.into_iter().map(move |id| &self.records[id.0])
    }

    /// Total number of records, across all bundles
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the document has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append extra attributes to a record
    pub fn add_extra_attributes(&mut self, record: RecordId, extras: Extras) -> Result<()> {
        let kind = self.records[record.0].kind;
        let extras = resolve_extras(self, kind, extras)?;
        self.records[record.0].extra.extend(extras);
        Ok(())
    }

    /// Add a `prov:type` value to a record
    pub fn add_asserted_type(&mut self, record: RecordId, value: impl Into<ExtraValue>) -> Result<()> {
        let value = value.into();
        if self.record(record).asserted_types().contains(&&value) {
            return Ok(());
        }
        let key = Name::Identifier(Namespace::prov().qname("type").into());
        self.add_extra_attributes(record, vec![(key, value)])
    }

    pub(crate) fn bundle_record(&self, bundle: BundleId) -> Option<RecordId> {
        self.bundles[bundle.0].record
    }

    pub(crate) fn bundle_identifier(&self, bundle: BundleId) -> Option<&Identifier> {
        self.bundles[bundle.0].identifier.as_ref()
    }

    pub(crate) fn local_record(&self, bundle: BundleId, id: &Identifier) -> Option<RecordId> {
        self.bundles[bundle.0].records_by_id.get(id).copied()
    }

    pub(crate) fn local_bundle(&self, bundle: BundleId, id: &Identifier) -> Option<BundleId> {
        self.bundles[bundle.0].bundles_by_id.get(id).copied()
    }

    /// Find a record in `bundle` or, failing that, in its enclosing bundles
    pub(crate) fn find_record(&self, bundle: BundleId, id: &Identifier) -> Option<RecordId> {
        self.ancestors(bundle).find_map(|b| self.local_record(b, id))
    }

    /// Find a sub-bundle of `bundle` or of its enclosing bundles
    pub(crate) fn find_bundle(&self, bundle: BundleId, id: &Identifier) -> Option<BundleId> {
        self.ancestors(bundle).find_map(|b| self.local_bundle(b, id))
    }

    /// Check that `record` exists and is owned by `bundle` or an enclosing bundle
    pub(crate) fn is_visible(&self, bundle: BundleId, record: RecordId) -> bool {
        self.get_record_by_id(record)
            .map_or(false, |record| self.ancestors(bundle).any(|b| b == record.bundle))
    }

    pub(crate) fn get_record_by_id(&self, record: RecordId) -> Option<&Record> {
        self.records.get(record.0)
    }

    fn ancestors(&self, bundle: BundleId) -> impl Iterator<Item = BundleId> + '_ {
        std::iter::successors(Some(bundle), move |b| self.bundles[b.0].parent)
    }

    /// Append a record with no attributes to `bundle`
    ///
    /// For the bundle kind this also creates the nested bundle.
    pub(crate) fn insert_record(
        &mut self,
        bundle: BundleId,
        kind: RecordKind,
        identifier: Option<Identifier>,
    ) -> Result<RecordId> {
        self.check_insert(bundle, identifier.as_ref())?;
        let id = RecordId(self.records.len());
        let mut record = Record::shell(id, kind, bundle, identifier.clone());

        if kind == RecordKind::Bundle {
            let depth = self.bundles[bundle.0].depth + 1;
            self.config.limits().check_bundle_depth(depth)?;
            let sub = BundleId(self.bundles.len());
            self.bundles.push(BundleData {
                identifier: identifier.clone(),
                parent: Some(bundle),
                record: Some(id),
                depth,
                ..BundleData::default()
            });
            record.contents = Some(sub);
            if let Some(identifier) = identifier {
                self.bundles[bundle.0].bundles_by_id.insert(identifier, sub);
            }
        } else if let Some(identifier) = identifier {
            self.bundles[bundle.0].records_by_id.insert(identifier, id);
        }

        tracing::trace!(record = %id, kind = kind.label(), "record created");
        self.bundles[bundle.0].contents.push(id);
        self.records.push(record);
        Ok(id)
    }

    /// Validate and store the attributes of an existing record
    pub(crate) fn set_attributes(
        &mut self,
        record: RecordId,
        attributes: RawAttributes,
        extras: Extras,
    ) -> Result<()> {
        let (bundle, kind) = {
            let record = &self.records[record.0];
            (record.bundle, record.kind)
        };
        let extras = resolve_extras(self, kind, extras)?;
        let has_extras = !extras.is_empty() || !self.records[record.0].extra.is_empty();
        let attributes = validate_attributes(self, bundle, kind, attributes, has_extras)?;

        let record = &mut self.records[record.0];
        record.attributes = attributes;
        record.extra.extend(extras);
        Ok(())
    }

    fn check_insert(&self, bundle: BundleId, identifier: Option<&Identifier>) -> Result<()> {
        self.config.limits().check_records(self.records.len() + 1)?;
        if let Some(identifier) = identifier {
            let data = &self.bundles[bundle.0];
            if data.records_by_id.contains_key(identifier) || data.bundles_by_id.contains_key(identifier) {
                return Err(Error::DuplicateIdentifier {
                    identifier: identifier.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for ProvDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Read view of a bundle
#[derive(Debug, Clone, Copy)]
pub struct Bundle<'a> {
    doc: &'a ProvDocument,
    id: BundleId,
}

impl<'a> Bundle<'a> {
    /// Handle of this bundle
    pub fn id(&self) -> BundleId {
        self.id
    }

    /// Owning document
    pub fn document(&self) -> &'a ProvDocument {
        self.doc
    }

    /// Identifier of a nested bundle; `None` for the document
    pub fn identifier(&self) -> Option<&'a Identifier> {
        self.doc.bundle_identifier(self.id)
    }

    /// Check if this bundle is the document itself
    pub fn is_top_level(&self) -> bool {
        self.id.is_top_level()
    }

    /// Enclosing bundle
    pub fn parent(&self) -> Option<Bundle<'a>> {
        self.doc.bundles[self.id.0].parent.map(|id| self.doc.bundle(id))
    }

    /// Record standing for this bundle in its parent
    pub fn record(&self) -> Option<&'a Record> {
        self.doc.bundle_record(self.id).map(|id| self.doc.record(id))
    }

    /// Records directly contained in this bundle, in insertion order
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + 'a {
        let doc = self.doc;
        doc.bundles[self.id.0].contents.iter().map(move |id| doc.record(*id))
    }

    /// Directly nested bundles
    pub fn bundles(&self) -> impl Iterator<Item = Bundle<'a>> + 'a {
        let doc = self.doc;
        self.records()
            .filter_map(|record| record.contents)
            .map(move |id| doc.bundle(id))
    }

    /// Number of records directly contained in this bundle
    pub fn len(&self) -> usize {
        self.doc.bundles[self.id.0].contents.len()
    }

    /// Check if this bundle has no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a record here or in an enclosing bundle
    pub fn get_record(&self, name: impl Into<Name>) -> Option<&'a Record> {
        let id = self.lookup(name.into())?;
        self.doc.find_record(self.id, &id).map(|id| self.doc.record(id))
    }

    /// Look up a sub-bundle here or in an enclosing bundle
    pub fn get_bundle(&self, name: impl Into<Name>) -> Option<Bundle<'a>> {
        let id = self.lookup(name.into())?;
        self.doc.find_bundle(self.id, &id).map(|id| self.doc.bundle(id))
    }

    fn lookup(&self, name: Name) -> Option<Identifier> {
        match name {
            Name::Text(text) => self.doc.namespaces.lookup(&text),
            Name::Identifier(id) if id.is_blank() => None,
            Name::Identifier(id) => Some(id),
        }
    }
}

/// Mutable view of a bundle
///
/// Record factories live here; see the `factory` module.
#[derive(Debug)]
pub struct BundleMut<'a> {
    doc: &'a mut ProvDocument,
    id: BundleId,
}

impl<'a> BundleMut<'a> {
    /// Handle of this bundle
    pub fn id(&self) -> BundleId {
        self.id
    }

    /// Read view of this bundle
    pub fn as_bundle(&self) -> Bundle<'_> {
        self.doc.bundle(self.id)
    }

    /// Owning document
    pub fn document(&mut self) -> &mut ProvDocument {
        self.doc
    }

    /// Validate and append a record of any kind
    pub fn add_record(
        &mut self,
        kind: RecordKind,
        identifier: Option<Name>,
        attributes: RawAttributes,
        extras: Extras,
    ) -> Result<RecordId> {
        let identifier = identifier.and_then(|name| self.doc.namespaces.resolve(&name));
        self.doc.check_insert(self.id, identifier.as_ref())?;

        let extras = resolve_extras(self.doc, kind, extras)?;
        let attributes = validate_attributes(self.doc, self.id, kind, attributes, !extras.is_empty())?;

        let id = self.doc.insert_record(self.id, kind, identifier)?;
        let record = &mut self.doc.records[id.0];
        record.attributes = attributes;
        record.extra = extras;
        Ok(id)
    }

    /// Create a nested bundle
    pub fn bundle(&mut self, identifier: impl Into<Name>) -> Result<BundleMut<'_>> {
        let identifier = self.doc.namespaces.resolve(&identifier.into());
        self.doc.insert_record(self.id, RecordKind::Bundle, identifier)?;
        let sub = BundleId(self.doc.bundles.len() - 1);
        Ok(self.doc.bundle_mut(sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;

    fn example_document() -> ProvDocument {
        let mut doc = ProvDocument::new();
        doc.add_namespace("ex", "http://example.org/").unwrap();
        doc
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let mut doc = example_document();
        let mut root = doc.root_mut();
        root.entity("ex:e1", vec![]).unwrap();
        let err = root.agent("ex:e1", vec![]).unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentifier { .. }));
    }

    #[test]
    fn test_bundle_identifier_shares_index_space() {
        let mut doc = example_document();
        let mut root = doc.root_mut();
        root.bundle("ex:b1").unwrap();
        let err = root.entity("ex:b1", vec![]).unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentifier { .. }));
    }

    #[test]
    fn test_lookup_walks_outward_only() {
        let mut doc = example_document();
        doc.root_mut().entity("ex:outer", vec![]).unwrap();
        let b1 = {
            let mut root = doc.root_mut();
            let mut b1 = root.bundle("ex:b1").unwrap();
            b1.entity("ex:inner", vec![]).unwrap();
            b1.id()
        };
        {
            let mut root = doc.root_mut();
            let mut b2 = root.bundle("ex:b2").unwrap();
            b2.entity("ex:sibling", vec![]).unwrap();
        }

        let inner = doc.bundle(b1);
        assert!(inner.get_record("ex:outer").is_some());
        assert!(inner.get_record("ex:inner").is_some());
        assert!(inner.get_record("ex:sibling").is_none());
        assert!(doc.get_record("ex:inner").is_none());
        assert!(doc.get_bundle("ex:b1").unwrap().get_record("ex:inner").is_some());
    }

    #[test]
    fn test_records_depth_first() {
        let mut doc = example_document();
        {
            let mut root = doc.root_mut();
            root.entity("ex:a", vec![]).unwrap();
            let mut b = root.bundle("ex:b").unwrap();
            b.entity("ex:c", vec![]).unwrap();
        }
        doc.root_mut().entity("ex:d", vec![]).unwrap();

        let order: Vec<String> = doc
            .records()
            .map(|r| r.identifier().unwrap().to_string())
            .collect();
        assert_eq!(order, vec!["ex:a", "ex:b", "ex:c", "ex:d"]);
    }

    #[test]
    fn test_bundle_depth_limit() {
        let config = DocumentConfig::default().with_limits(Limits {
            max_bundle_depth: 1,
            ..Limits::default()
        });
        let mut doc = ProvDocument::with_config(config);
        let mut root = doc.root_mut();
        let mut b1 = root.bundle("b1").unwrap();
        assert!(matches!(b1.bundle("b2"), Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_record_limit() {
        let config = DocumentConfig::default().with_limits(Limits {
            max_records: 1,
            ..Limits::default()
        });
        let mut doc = ProvDocument::with_config(config);
        doc.root_mut().entity("e1", vec![]).unwrap();
        assert!(matches!(
            doc.root_mut().entity("e2", vec![]),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_anonymous_identifiers_use_configured_prefix() {
        let mut doc = ProvDocument::with_config(DocumentConfig::default().with_anonymous_prefix("n"));
        assert_eq!(doc.anonymous().to_string(), "_:n1");
        assert_eq!(doc.anonymous().to_string(), "_:n2");
    }

    #[test]
    fn test_asserted_types() {
        let mut doc = example_document();
        let e1 = doc.root_mut().entity("ex:e1", vec![]).unwrap();
        doc.add_asserted_type(e1, Namespace::prov().qname("Plan")).unwrap();
        doc.add_asserted_type(e1, Namespace::prov().qname("Plan")).unwrap();
        let types = doc.record(e1).asserted_types();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].to_string(), "'prov:Plan'");

        doc.add_asserted_type(e1, "draft").unwrap();
        doc.add_asserted_type(e1, "draft").unwrap();
        assert_eq!(doc.record(e1).asserted_types().len(), 2);
    }
}
