//! # serde_multipart
//!
//! A Serde-driven encoder that turns structs and maps into `multipart/form-data` parts.
//!
//! ## What does it do?
//!
//! HTTP endpoints that accept uploads usually expect `multipart/form-data`
//! bodies: a list of named text fields and file attachments. `serde_multipart`
//! builds that list from any `#[derive(Serialize)]` value, so there is no
//! per-type form-building code to write.
//!
//! ## Key Features
//!
//! - **Type-driven**: scalars become text fields, nested structs and maps become JSON fields,
//!   sequences become repeated `name[]` fields, files become attachments
//! - **Absent is silent**: `None` fields produce no part instead of an error
//! - **Pluggable output**: parts go to any [`FormWriter`]; an in-memory [`Form`] and a
//!   streaming [`MultipartWriter`] are included
//! - **No Unsafe Code**: Written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::Serialize;
//! use serde_multipart::{to_form, FormFile, MemoryFile};
//!
//! #[derive(Serialize)]
//! struct Item { #[serde(rename = "X")] x: String }
//!
//! #[derive(Serialize)]
//! struct Post {
//!     title: String,
//!     views: u32,
//!     draft: bool,
//!     tags: Vec<String>,
//!     items: Vec<Item>,
//!     cover: Option<FormFile<MemoryFile>>,
//! }
//!
//! let post = Post {
//!     title: "hello".to_string(),
//!     views: 69,
//!     draft: true,
//!     tags: vec!["rust".to_string(), "serde".to_string()],
//!     items: vec![Item { x: "a".into() }, Item { x: "b".into() }],
//!     cover: Some(FormFile::new(MemoryFile::new("cover.png", vec![0x89, b'P']))),
//! };
//!
//! let form = to_form(&post).unwrap();
//! assert_eq!(form.value("title"), Some("hello"));
//! assert_eq!(form.value("views"), Some("69"));
//! assert_eq!(form.value("draft"), Some("true"));
//! assert_eq!(form.values("tags[]"), vec!["rust", "serde"]);
//! assert_eq!(form.value("items"), Some(r#"[{"X":"a"},{"X":"b"}]"#));
//! assert_eq!(form.file("cover").unwrap().file_name.as_deref(), Some("cover.png"));
//! ```
//!
//! ### Writing a request body
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use serde_multipart::to_writer;
//!
//! let fields = BTreeMap::from([("q", "rust"), ("page", "2")]);
//! let body = to_writer(Vec::new(), "boundary42", &fields).unwrap();
//! assert!(String::from_utf8(body).unwrap().ends_with("--boundary42--\r\n"));
//! ```
//!
//! ## Field names
//!
//! | value at field `f` | parts |
//! |---|---|
//! | `None` | none |
//! | `true`, `69`, `3.14`, `"s"` | `f` = `true`, `69`, `3.14`, `s` |
//! | `vec![1, 2]` | `f[]` = `1`, `f[]` = `2` |
//! | `vec![vec![1], vec![2]]` | `f[][]` = `1`, `f[][]` = `2` |
//! | `vec![]` | none |
//! | struct, map, enum variant | `f` = JSON |
//! | `vec![struct, ...]` | `f` = JSON array (see [`CollectionMode`]) |
//! | [`FormFile`] | file attachment `f` (or the file's name when `f` is empty) |
//!
//! Top-level struct members are named by their serde names unless a
//! [`FieldTags`] table is registered in [`EncoderOptions`]. Map keys are used
//! verbatim and must be strings.
//!
//! ## Logging
//!
//! The encoder emits `tracing` events at `debug` (each top-level value and
//! each file part) and `trace` (each field, skip and strategy decision). No
//! subscriber is installed by the library.

pub mod encoder;
pub mod error;
pub mod file;
pub mod macros;
pub mod multipart;
pub mod options;
pub mod ser;
pub mod tags;
pub mod value;
pub mod writer;

pub use encoder::{Encoder, Strategy};
pub use error::{Error, ErrorKind, Result};
pub use file::{CapturedFile, FileLike, FileStat, FormFile, MemoryFile, NamedFile};
pub use multipart::MultipartWriter;
pub use options::{CollectionMode, EncoderOptions};
pub use ser::ValueSerializer;
pub use tags::{FieldTag, FieldTags, EXCLUDE_SENTINEL};
pub use value::{Category, FormValue, Number, VariantKind};
pub use writer::{Form, FormWriter, Part, PartWriter};

use serde::Serialize;
use std::io;

/// Convert any `T: Serialize` to a [`FormValue`].
///
/// # Examples
///
/// ```rust
/// use serde_multipart::{to_value, Category};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.category(), Category::Aggregate);
/// ```
///
/// # Errors
///
/// Returns an error if the value's `Serialize` implementation fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<FormValue>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Encode a struct or map into an in-memory [`Form`].
///
/// # Examples
///
/// ```rust
/// use serde_multipart::to_form;
/// use std::collections::HashMap;
///
/// let form = to_form(&HashMap::from([("name", "masha")])).unwrap();
/// assert_eq!(form.value("name"), Some("masha"));
/// ```
///
/// # Errors
///
/// Returns an error if the value is not a struct or map, or if any field fails to encode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_form<T>(value: &T) -> Result<Form>
where
    T: ?Sized + Serialize,
{
    to_form_with_options(value, EncoderOptions::default())
}

/// Encode a struct or map into an in-memory [`Form`] with custom options.
///
/// # Errors
///
/// Returns an error if the value is not a struct or map, or if any field fails to encode.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_form_with_options<T>(value: &T, options: EncoderOptions) -> Result<Form>
where
    T: ?Sized + Serialize,
{
    let mut form = Form::new();
    Encoder::with_options(&mut form, options).encode(value)?;
    Ok(form)
}

/// Encode a struct or map as a complete `multipart/form-data` body written to `writer`.
///
/// The closing delimiter is written after the last part and the writer is
/// handed back. Use `multipart/form-data; boundary=<boundary>` as the
/// request's content type.
///
/// # Errors
///
/// Returns an error if the boundary is invalid, the value cannot be encoded,
/// or writing to `writer` fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, boundary: &str, value: &T) -> Result<W>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let mut multipart = MultipartWriter::new(writer, boundary).map_err(Error::context)?;
    Encoder::new(&mut multipart).encode(value)?;
    multipart
        .finish()
        .map_err(|e| Error::context(Error::from(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_to_form_struct() {
        let form = to_form(&Point { x: 1, y: -2 }).unwrap();
        assert_eq!(form.len(), 2);
        assert_eq!(form.value("x"), Some("1"));
        assert_eq!(form.value("y"), Some("-2"));
    }

    #[test]
    fn test_to_form_through_reference_and_box() {
        let boxed = Box::new(Point { x: 5, y: 6 });
        let form = to_form(&&boxed).unwrap();
        assert_eq!(form.value("x"), Some("5"));
    }

    #[test]
    fn test_to_form_rejects_scalar() {
        let err = to_form(&"plain").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(
            err.to_string(),
            "multipart: only a map or struct can be encoded"
        );
    }

    #[test]
    fn test_to_writer_body() {
        let body = to_writer(Vec::new(), "b", &Point { x: 1, y: 2 }).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "--b\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\n1\r\n\
             --b\r\nContent-Disposition: form-data; name=\"y\"\r\n\r\n2\r\n--b--\r\n"
        );
    }

    #[test]
    fn test_to_writer_invalid_boundary() {
        let err = to_writer(Vec::new(), "", &Point { x: 1, y: 2 }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(
            err.to_string(),
            "multipart: boundary must be 1 to 70 characters"
        );
    }

    #[test]
    fn test_to_writer_sink_failure_is_prefixed() {
        #[derive(Debug)]
        struct Full;

        impl io::Write for Full {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::WriteZero, "sink full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let empty: std::collections::BTreeMap<String, i32> = std::collections::BTreeMap::new();
        let err = to_writer(Full, "b", &empty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
        assert_eq!(err.to_string(), "multipart: sink full");
    }
}
