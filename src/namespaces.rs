//! PROV namespace handling
//!
//! This module provides identifiers, qualified names (QNames), namespaces and
//! the per-document [`NamespaceManager`] that maps prefixes to namespaces,
//! renames colliding prefixes and hands out anonymous identifiers.

use crate::error::Result;
use crate::names::{self, BLANK_PREFIX};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// PROV namespace prefix
pub const PROV_PREFIX: &str = "prov";
/// PROV namespace URI
pub const PROV_NAMESPACE: &str = "http://www.w3.org/ns/prov#";
/// XSD prefix
pub const XSD_PREFIX: &str = "xsd";
/// XSD namespace URI
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

/// A namespace: a prefix bound to a base URI
///
/// Two namespaces are equal iff both prefix and URI match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    prefix: Arc<str>,
    uri: Arc<str>,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl AsRef<str>, uri: impl AsRef<str>) -> Self {
        Self {
            prefix: Arc::from(prefix.as_ref()),
            uri: Arc::from(uri.as_ref()),
        }
    }

    /// The PROV namespace
    pub fn prov() -> Self {
        Self::new(PROV_PREFIX, PROV_NAMESPACE)
    }

    /// The XSD namespace
    pub fn xsd() -> Self {
        Self::new(XSD_PREFIX, XSD_NAMESPACE)
    }

    /// Get the prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the base URI
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Check whether a URI falls under this namespace
    pub fn contains(&self, uri: &str) -> bool {
        !self.uri.is_empty() && uri.starts_with(&*self.uri)
    }

    /// Create a QName in this namespace
    pub fn qname(&self, local_part: impl Into<String>) -> QName {
        QName::new(self.clone(), local_part)
    }

    /// Compact an absolute URI against this namespace
    pub fn compact(&self, uri: &str) -> Option<QName> {
        if self.contains(uri) {
            Some(self.qname(&uri[self.uri.len()..]))
        } else {
            None
        }
    }

    fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            prefix: Arc::from(prefix),
            uri: self.uri.clone(),
        }
    }
}

/// Qualified name: a namespace plus a local part
///
/// The URI is always derived from the namespace and never stored.
#[derive(Debug, Clone)]
pub struct QName {
    namespace: Namespace,
    local_part: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Namespace, local_part: impl Into<String>) -> Self {
        Self {
            namespace,
            local_part: local_part.into(),
        }
    }

    /// Get the namespace
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Get the local part
    pub fn local_part(&self) -> &str {
        &self.local_part
    }

    /// The absolute URI this name stands for
    pub fn uri(&self) -> String {
        format!("{}{}", self.namespace.uri(), self.local_part)
    }

    fn rebind(&self, namespace: &Namespace) -> Self {
        Self::new(namespace.clone(), self.local_part.clone())
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.uri() == other.uri()
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri().hash(state);
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.prefix().is_empty() {
            write!(f, "{}", self.local_part)
        } else {
            write!(f, "{}:{}", self.namespace.prefix(), self.local_part)
        }
    }
}

/// An identifier: a bare URI or a qualified name
///
/// Equality and hashing use the URI only, so `ex:e1` equals the bare URI
/// it expands to.
#[derive(Debug, Clone)]
pub enum Identifier {
    /// Bare URI (or an unqualified name)
    Uri(String),
    /// Qualified name
    QName(QName),
}

impl Identifier {
    /// Create a bare URI identifier
    pub fn uri_ref(uri: impl Into<String>) -> Self {
        Identifier::Uri(uri.into())
    }

    /// The absolute URI of this identifier
    pub fn uri(&self) -> Cow<'_, str> {
        match self {
            Identifier::Uri(uri) => Cow::Borrowed(uri),
            Identifier::QName(qname) => Cow::Owned(qname.uri()),
        }
    }

    /// Get the QName, if this identifier is one
    pub fn as_qname(&self) -> Option<&QName> {
        match self {
            Identifier::QName(qname) => Some(qname),
            Identifier::Uri(_) => None,
        }
    }

    /// Check whether this is a blank (document-local) name
    pub fn is_blank(&self) -> bool {
        matches!(self, Identifier::Uri(uri) if names::is_blank(uri))
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.uri() == other.uri()
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri().hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Uri(uri) => write!(f, "{}", uri),
            Identifier::QName(qname) => write!(f, "{}", qname),
        }
    }
}

impl From<QName> for Identifier {
    fn from(qname: QName) -> Self {
        Identifier::QName(qname)
    }
}

/// A raw name to be resolved through a [`NamespaceManager`]
#[derive(Debug, Clone, PartialEq)]
pub enum Name {
    /// Unresolved text, e.g. `"ex:e1"` or `"http://example.org/e1"`
    Text(String),
    /// Already an identifier
    Identifier(Identifier),
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::Text(s.to_string())
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::Text(s)
    }
}

impl From<Identifier> for Name {
    fn from(id: Identifier) -> Self {
        Name::Identifier(id)
    }
}

impl From<QName> for Name {
    fn from(qname: QName) -> Self {
        Name::Identifier(Identifier::QName(qname))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Text(s) => write!(f, "{}", s),
            Name::Identifier(id) => write!(f, "{}", id),
        }
    }
}

/// Per-document namespace table and anonymous-identifier counter
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    /// Every bound prefix, including the built-in ones and `""` for the default
    bound: IndexMap<String, Namespace>,
    /// Namespaces registered by the document (in registration order)
    registered: IndexMap<String, Namespace>,
    /// Default namespace, bound to the empty prefix
    default: Option<Namespace>,
    /// Original namespace -> namespace it was registered as
    renamed: HashMap<Namespace, Namespace>,
    /// Anonymous identifier counter
    anon_count: u64,
}

impl NamespaceManager {
    /// Create a manager with `prov` and `xsd` pre-bound
    pub fn new() -> Self {
        let mut bound = IndexMap::new();
        for ns in [Namespace::prov(), Namespace::xsd()] {
            bound.insert(ns.prefix().to_string(), ns);
        }
        Self {
            bound,
            registered: IndexMap::new(),
            default: None,
            renamed: HashMap::new(),
            anon_count: 0,
        }
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, uri: impl AsRef<str>) {
        let ns = Namespace::new("", uri);
        self.bound.insert(String::new(), ns.clone());
        self.default = Some(ns);
    }

    /// Get the default namespace
    pub fn default_namespace(&self) -> Option<&Namespace> {
        self.default.as_ref()
    }

    /// Get the namespace bound to a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&Namespace> {
        self.bound.get(prefix)
    }

    /// Find a bound namespace by URI
    pub fn namespace_for_uri(&self, uri: &str) -> Option<&Namespace> {
        self.bound.values().find(|ns| ns.uri() == uri)
    }

    /// Namespaces registered by this document, in registration order
    pub fn registered_namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.registered.values()
    }

    /// Number of registered namespaces
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    /// Check if no namespace has been registered
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Validate and register a prefix/URI pair
    pub fn add_namespace(&mut self, prefix: &str, uri: &str) -> Result<Namespace> {
        names::validate_prefix(prefix)?;
        names::validate_namespace_uri(uri)?;
        Ok(self.register(Namespace::new(prefix, uri)))
    }

    /// Register a namespace, renaming it if its prefix is taken
    ///
    /// Returns the namespace as it is bound in this document.
    pub fn register(&mut self, namespace: Namespace) -> Namespace {
        if self.bound.get(namespace.prefix()) == Some(&namespace) {
            return namespace;
        }
        if let Some(renamed) = self.renamed.get(&namespace) {
            return renamed.clone();
        }

        let mut bound_as = namespace.clone();
        if self.bound.contains_key(namespace.prefix()) {
            let new_prefix = self.unused_prefix(namespace.prefix());
            bound_as = namespace.with_prefix(&new_prefix);
            tracing::debug!(
                prefix = namespace.prefix(),
                renamed = %new_prefix,
                uri = namespace.uri(),
                "namespace prefix collision, renaming"
            );
            self.renamed.insert(namespace, bound_as.clone());
        }

        let prefix = bound_as.prefix().to_string();
        self.bound.insert(prefix.clone(), bound_as.clone());
        self.registered.insert(prefix, bound_as.clone());
        bound_as
    }

    /// Resolve a raw name to an identifier
    ///
    /// QNames get their namespace registered; blank names resolve to `None`.
    pub fn resolve(&mut self, name: &Name) -> Option<Identifier> {
        match name {
            Name::Identifier(Identifier::QName(qname)) => {
                let bound_as = self.register(qname.namespace().clone());
                if &bound_as == qname.namespace() {
                    Some(Identifier::QName(qname.clone()))
                } else {
                    Some(Identifier::QName(qname.rebind(&bound_as)))
                }
            }
            Name::Identifier(id) => Some(id.clone()),
            Name::Text(text) => self.lookup(text),
        }
    }

    /// Resolve text to an identifier without changing the table
    pub fn lookup(&self, text: &str) -> Option<Identifier> {
        if text.is_empty() || names::is_blank(text) {
            return None;
        }
        if let Some((prefix, local)) = names::split_prefixed(text) {
            if !prefix.is_empty() {
                if let Some(ns) = self.bound.get(prefix) {
                    return Some(Identifier::QName(ns.qname(local)));
                }
            }
            return Some(match self.compact(text) {
                Some(qname) => Identifier::QName(qname),
                None => Identifier::Uri(text.to_string()),
            });
        }
        match &self.default {
            Some(ns) => Some(Identifier::QName(ns.qname(text))),
            None => {
                tracing::trace!(name = text, "no default namespace, using bare identifier");
                Some(Identifier::Uri(text.to_string()))
            }
        }
    }

    /// Compact an absolute URI against the bound namespaces
    ///
    /// The longest matching namespace URI wins.
    pub fn compact(&self, uri: &str) -> Option<QName> {
        self.bound
            .values()
            .filter(|ns| ns.contains(uri))
            .max_by_key(|ns| ns.uri().len())
            .and_then(|ns| ns.compact(uri))
    }

    /// Generate a fresh anonymous identifier, `_:<prefix><n>`
    pub fn anonymous(&mut self, prefix: &str) -> Identifier {
        self.anon_count += 1;
        Identifier::Uri(format!("{}{}{}", BLANK_PREFIX, prefix, self.anon_count))
    }

    /// Current value of the anonymous identifier counter
    pub fn anonymous_count(&self) -> u64 {
        self.anon_count
    }

    fn unused_prefix(&self, original: &str) -> String {
        let mut count = 1;
        loop {
            let candidate = format!("{}_{}", original, count);
            if !self.bound.contains_key(&candidate) {
                return candidate;
            }
            count += 1;
        }
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}
