//! Configuration options for multipart encoding.
//!
//! This module provides types to customize how values become form parts:
//!
//! - [`EncoderOptions`]: Main configuration struct
//! - [`CollectionMode`]: What to do with sequences of structs or maps
//!
//! ## Examples
//!
//! ```rust
//! use serde_multipart::{to_form_with_options, CollectionMode, EncoderOptions, FieldTags};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Item { x: String }
//!
//! #[derive(Serialize)]
//! struct Order { items: Vec<Item>, total: f64 }
//!
//! let order = Order {
//!     items: vec![Item { x: "a".into() }, Item { x: "b".into() }],
//!     total: 2.5,
//! };
//!
//! // One JSON part per item instead of a single JSON array
//! let options = EncoderOptions::new().with_collection_mode(CollectionMode::Explode);
//! let form = to_form_with_options(&order, options).unwrap();
//! assert_eq!(form.values("items[]"), vec![r#"{"x":"a"}"#, r#"{"x":"b"}"#]);
//!
//! // Match Go's `%f` float formatting
//! let options = EncoderOptions::new().with_float_precision(6);
//! let form = to_form_with_options(&order, options).unwrap();
//! assert_eq!(form.value("total"), Some("2.500000"));
//! ```

use crate::FieldTags;
use std::collections::HashMap;

/// Encoding of a sequence whose elements are structs, maps or enum variants.
///
/// # Examples
///
/// ```rust
/// use serde_multipart::CollectionMode;
///
/// assert_eq!(CollectionMode::default(), CollectionMode::Collapse);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CollectionMode {
    /// The whole sequence becomes one JSON part under the field name.
    #[default]
    Collapse,
    /// Each element becomes its own JSON part under `<name>[]`.
    Explode,
}

/// Configuration options for the [`Encoder`](crate::Encoder).
///
/// # Examples
///
/// ```rust
/// use serde_multipart::{EncoderOptions, FieldTags};
///
/// let options = EncoderOptions::new()
///     .with_float_precision(2)
///     .with_field_tags("Signup", FieldTags::new().tag("email", "user[email]"));
///
/// assert_eq!(options.float_precision, Some(2));
/// assert!(options.field_tags("Signup").is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct EncoderOptions {
    pub collection_mode: CollectionMode,
    /// Decimal places for floats; `None` writes the shortest exact form.
    pub float_precision: Option<usize>,
    field_tags: HashMap<String, FieldTags>,
}

impl EncoderOptions {
    /// Creates default options (collapsed structured collections, shortest floats, no tag tables).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how sequences of structured values are encoded.
    #[must_use]
    pub fn with_collection_mode(mut self, mode: CollectionMode) -> Self {
        self.collection_mode = mode;
        self
    }

    /// Writes floats with exactly `precision` decimal places.
    #[must_use]
    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = Some(precision);
        self
    }

    /// Registers the field tag table for the struct serde names `aggregate`.
    ///
    /// `aggregate` is the name the struct serializes with: its identifier, or
    /// the value of `#[serde(rename = "...")]` on the container.
    #[must_use]
    pub fn with_field_tags(mut self, aggregate: &str, tags: FieldTags) -> Self {
        self.field_tags.insert(aggregate.to_string(), tags);
        self
    }

    /// Returns the tag table registered for `aggregate`, if any.
    #[must_use]
    pub fn field_tags(&self, aggregate: &str) -> Option<&FieldTags> {
        self.field_tags.get(aggregate)
    }
}
