//! Core type definitions for the normalization engine
//!
//! This module provides the fundamental types used throughout the radnorm
//! library:
//! - [`DecodedElement`]: a decoded data element as supplied by the
//!   container-format layer
//! - [`TagClass`]: standard/private classification of an element
//! - [`DecodeOutcome`] and [`PrivateTagRecord`]: decoded views of private
//!   payloads
//! - [`CanonicalField`], [`NormalizedFields`]: canonical per-object fields
//!   and the merge target for vendor candidates

mod element;
mod fields;
mod private_tag;

pub use element::{DecodedElement, TagClass, PIXEL_DATA_GROUP};
pub use fields::{CanonicalField, CanonicalValue, FieldProvenance, NormalizedFields};
pub use private_tag::{DecodeOutcome, PrivateTagCategory, PrivateTagRecord};
