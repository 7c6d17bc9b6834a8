//! # provdm
//!
//! An in-memory model of the W3C PROV data model: entities, activities,
//! agents, the relations between them and nested bundles, with PROV-JSON
//! encoding/decoding and PROV-N rendering.
//!
//! ## Features
//!
//! - All PROV-DM record kinds with per-kind attribute validation
//! - Namespaces, qualified names and anonymous identifiers
//! - Nested bundles with outward identifier lookup
//! - PROV-JSON read and write
//! - PROV-N output
//! - Structural comparison of documents
//!
//! ## Example
//!
//! ```rust
//! use provdm::ProvDocument;
//!
//! let mut doc = ProvDocument::new();
//! doc.add_namespace("ex", "http://example.org/")?;
//!
//! let mut root = doc.root_mut();
//! root.entity("ex:report", vec![])?;
//! root.activity("ex:compile", None, None, vec![])?;
//! root.generation("ex:report", Some("ex:compile".into()), None, None, vec![])?;
//!
//! let json = doc.to_json_string()?;
//! let decoded = ProvDocument::from_json_str(&json)?;
//! assert_eq!(decoded, doc);
//! assert!(doc.get_provn().contains("wasGeneratedBy("));
//! # Ok::<(), provdm::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod limits;

pub mod names;
pub mod namespaces;

pub mod documents;
pub mod records;

pub mod converters;

pub use config::{DocumentConfig, TimeOrderPolicy};
pub use converters::{create_converter, DocumentConverter, Format, ProvJsonConverter, ProvNConverter};
pub use documents::{Bundle, BundleId, BundleMut, ProvDocument, RecordId};
pub use error::{Error, Result};
pub use limits::Limits;
pub use namespaces::{Identifier, Name, Namespace, NamespaceManager, QName};
pub use records::{
    AttributeId, AttributeValue, ExtraValue, Literal, RawValue, Record, RecordKind, Timestamp,
};

/// Version of the provdm library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
