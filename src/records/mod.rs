//! PROV records
//!
//! Record kinds, their attribute declarations, value types and the
//! validation that runs when a record is constructed.

pub mod attributes;
mod base;
pub mod datatypes;
pub mod kinds;
pub mod values;

pub use attributes::{AttributeId, AttributeSpec, AttributeType, AttributeUse};
pub use base::{Extras, RawAttributes, Record};
pub use datatypes::{Literal, Timestamp};
pub use kinds::{RecordCategory, RecordKind};
pub use values::{AttributeValue, ExtraValue, RawValue};

pub(crate) use base::{raw_identifier, resolve_extras, validate_attributes};
