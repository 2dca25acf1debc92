//! Dynamic value representation used by the encoder.
//!
//! Every value handed to the encoder is first lowered into a [`FormValue`] by
//! the serializer in [`crate::ser`]. The tree keeps exactly the information the
//! dispatcher needs to choose an encoding. Struct member names and map keys
//! are kept as serialized so they can become field names.
//!
//! ## Categories
//!
//! | variant | [`Category`] |
//! |---|---|
//! | `Null` | `Null` (absent optional, skipped) |
//! | `Bool`, `Number`, `String`, `Bytes` | `Scalar` |
//! | `Struct` | `Aggregate` |
//! | `Map` | `Mapping` |
//! | `Seq` | `Collection` |
//! | `Variant` | `Variant` |
//! | `File` | `File` |
//! | `Unit` | `Unit` (unsupported) |
//!
//! ## Examples
//!
//! ```rust
//! use serde_multipart::{to_value, Category};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let value = to_value(&vec![Point { x: 1, y: 2 }]).unwrap();
//! assert_eq!(value.category(), Category::Collection);
//! assert_eq!(value.deep_category(), Category::Aggregate);
//! ```

use crate::file::CapturedFile;
use serde::ser::{
    SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant, SerializeTupleVariant,
};
use serde::{Serialize, Serializer};
use std::fmt;

/// A dynamically-typed representation of a value about to be encoded.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum FormValue {
    #[default]
    Null,
    Unit,
    Bool(bool),
    Number(Number),
    String(String),
    Bytes(Vec<u8>),
    Seq(Vec<FormValue>),
    /// Entries keep their keys as serialized; non-string keys are rejected at encode time.
    Map(Vec<(FormValue, FormValue)>),
    Struct {
        name: &'static str,
        fields: Vec<(&'static str, FormValue)>,
    },
    Variant {
        name: &'static str,
        index: u32,
        variant: &'static str,
        kind: VariantKind,
        value: Box<FormValue>,
    },
    File(CapturedFile),
}

/// Shape of an enum variant that carries data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariantKind {
    Newtype,
    Tuple,
    Struct,
}

/// A numeric scalar, keeping the width class it was serialized with.
///
/// `f32` values are kept as `f32` so that `3.14f32` formats as `3.14`
/// rather than the widened `3.140000104904175`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
}

/// The category of a [`FormValue`] as seen by the strategy dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Null,
    Scalar,
    Aggregate,
    Mapping,
    Collection,
    Variant,
    File,
    Unit,
}

impl Number {
    /// Returns `true` for `F32` and `F64`.
    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::F32(_) | Number::F64(_))
    }

    /// Formats the number as form-field text.
    ///
    /// Integers use their decimal representation. Floats use fixed-point
    /// notation, with the shortest round-tripping digits when `precision` is
    /// `None` and exactly `precision` decimals otherwise.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_multipart::Number;
    ///
    /// assert_eq!(Number::I64(69).to_form_text(None), "69");
    /// assert_eq!(Number::F64(3.14).to_form_text(None), "3.14");
    /// assert_eq!(Number::F64(3.14).to_form_text(Some(6)), "3.140000");
    /// assert_eq!(Number::F64(1e21).to_form_text(None), "1000000000000000000000");
    /// ```
    #[must_use]
    pub fn to_form_text(&self, precision: Option<usize>) -> String {
        match (*self, precision) {
            (Number::I64(n), _) => n.to_string(),
            (Number::U64(n), _) => n.to_string(),
            (Number::F32(f), None) => f.to_string(),
            (Number::F32(f), Some(p)) => format!("{:.*}", p, f),
            (Number::F64(f), None) => f.to_string(),
            (Number::F64(f), Some(p)) => format!("{:.*}", p, f),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_form_text(None))
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<f32> for Number {
    fn from(f: f32) -> Self {
        Number::F32(f)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::F64(f)
    }
}

impl FormValue {
    /// Returns `true` if the value is `Null`.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, FormValue::Null)
    }

    /// Returns the string slice if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FormValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the category of this node.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            FormValue::Null => Category::Null,
            FormValue::Unit => Category::Unit,
            FormValue::Bool(_)
            | FormValue::Number(_)
            | FormValue::String(_)
            | FormValue::Bytes(_) => Category::Scalar,
            FormValue::Seq(_) => Category::Collection,
            FormValue::Map(_) => Category::Mapping,
            FormValue::Struct { .. } => Category::Aggregate,
            FormValue::Variant { .. } => Category::Variant,
            FormValue::File(_) => Category::File,
        }
    }

    /// Returns the category reached by descending through nested sequences.
    ///
    /// Each sequence is represented by its first element that says something
    /// about the element type: nulls are skipped, and so are inner sequences
    /// that are themselves empty or all-null. A sequence with no such element
    /// reports `Collection`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_multipart::{to_value, Category};
    /// use std::collections::HashMap;
    ///
    /// let nested = vec![vec![HashMap::from([("k", 1)])]];
    /// assert_eq!(to_value(&nested).unwrap().deep_category(), Category::Mapping);
    ///
    /// let scalars = vec![None, Some(3)];
    /// assert_eq!(to_value(&scalars).unwrap().deep_category(), Category::Scalar);
    ///
    /// let ragged = vec![vec![], vec![HashMap::from([("k", 1)])]];
    /// assert_eq!(to_value(&ragged).unwrap().deep_category(), Category::Mapping);
    /// ```
    #[must_use]
    pub fn deep_category(&self) -> Category {
        match self {
            FormValue::Seq(items) => items
                .iter()
                .filter(|item| !item.is_null())
                .map(FormValue::deep_category)
                .find(|category| *category != Category::Collection)
                .unwrap_or(Category::Collection),
            other => other.category(),
        }
    }

    /// Human-readable kind name used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            FormValue::Null => "null",
            FormValue::Unit => "unit",
            FormValue::Bool(_) => "bool",
            FormValue::Number(Number::I64(_)) => "integer",
            FormValue::Number(Number::U64(_)) => "unsigned integer",
            FormValue::Number(Number::F32(_) | Number::F64(_)) => "float",
            FormValue::String(_) => "string",
            FormValue::Bytes(_) => "bytes",
            FormValue::Seq(_) => "sequence",
            FormValue::Map(_) => "map",
            FormValue::Struct { .. } => "struct",
            FormValue::Variant { .. } => "enum variant",
            FormValue::File(_) => "file",
        }
    }
}

impl Serialize for FormValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FormValue::Null | FormValue::Unit => serializer.serialize_unit(),
            FormValue::Bool(b) => serializer.serialize_bool(*b),
            FormValue::Number(Number::I64(n)) => serializer.serialize_i64(*n),
            FormValue::Number(Number::U64(n)) => serializer.serialize_u64(*n),
            FormValue::Number(Number::F32(f)) if !f.is_finite() => Err(non_finite(*f)),
            FormValue::Number(Number::F64(f)) if !f.is_finite() => Err(non_finite(*f)),
            FormValue::Number(Number::F32(f)) => serializer.serialize_f32(*f),
            FormValue::Number(Number::F64(f)) => serializer.serialize_f64(*f),
            FormValue::String(s) => serializer.serialize_str(s),
            FormValue::Bytes(b) => serializer.serialize_bytes(b),
            FormValue::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FormValue::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            FormValue::Struct { name, fields } => {
                let mut st = serializer.serialize_struct(*name, fields.len())?;
                for (key, value) in fields {
                    st.serialize_field(*key, value)?;
                }
                st.end()
            }
            FormValue::Variant {
                name,
                index,
                variant,
                kind,
                value,
            } => match (kind, value.as_ref()) {
                (VariantKind::Tuple, FormValue::Seq(items)) => {
                    let mut tv =
                        serializer.serialize_tuple_variant(*name, *index, *variant, items.len())?;
                    for item in items {
                        tv.serialize_field(item)?;
                    }
                    tv.end()
                }
                (VariantKind::Struct, FormValue::Struct { fields, .. }) => {
                    let mut sv =
                        serializer.serialize_struct_variant(*name, *index, *variant, fields.len())?;
                    for (key, value) in fields {
                        sv.serialize_field(*key, value)?;
                    }
                    sv.end()
                }
                (_, inner) => serializer.serialize_newtype_variant(*name, *index, *variant, inner),
            },
            // Embedded in JSON, a file is represented by its name.
            FormValue::File(file) => file.name().serialize(serializer),
        }
    }
}

impl From<bool> for FormValue {
    fn from(b: bool) -> Self {
        FormValue::Bool(b)
    }
}

impl From<i64> for FormValue {
    fn from(n: i64) -> Self {
        FormValue::Number(Number::I64(n))
    }
}

impl From<f64> for FormValue {
    fn from(f: f64) -> Self {
        FormValue::Number(Number::F64(f))
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        FormValue::String(s)
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        FormValue::String(s.to_string())
    }
}

impl From<Vec<FormValue>> for FormValue {
    fn from(items: Vec<FormValue>) -> Self {
        FormValue::Seq(items)
    }
}

// JSON has no NaN or infinity; serde_json would write `null` instead.
fn non_finite<E: serde::ser::Error>(f: impl fmt::Display) -> E {
    E::custom(format_args!("{} cannot be represented in JSON", f))
}
