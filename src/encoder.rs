//! The multipart encoder.
//!
//! An [`Encoder`] wraps one [`FormWriter`] and turns values into form parts.
//! Each value is lowered into a [`FormValue`] tree first; the dispatcher then
//! picks one [`Strategy`] per named value:
//!
//! | value | strategy | parts written |
//! |---|---|---|
//! | bool, number, string, bytes | `Scalar` | one text field |
//! | struct, map, enum variant | `Object` | one text field holding JSON |
//! | sequence of structs/maps (deep) | `Object` | one text field holding the JSON array |
//! | any other sequence | `Array` | one part per element under `<name>[]` |
//! | [`FormFile`](crate::FormFile) | `File` | one file attachment |
//!
//! Absent optional values (`None`) produce no part at all, and neither do
//! empty sequences.
//!
//! The array strategy is chosen once per sequence from its first non-null
//! element (skipping inner sequences that are empty) and reused for every
//! element. Sequences mixing scalars with
//! sequences or files are not supported: elements that do not fit the first
//! element's strategy fail with a type error.

use crate::file::{short_type_name, CapturedFile, FileLike, FileStat};
use crate::options::{CollectionMode, EncoderOptions};
use crate::value::Category;
use crate::writer::FormWriter;
use crate::{to_value, Error, FormValue, Result};
use serde::Serialize;
use std::io::{self, Write};

/// How a single named value is represented in the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Scalar,
    Object,
    Array,
    File,
}

impl Strategy {
    /// Chooses the strategy for `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_multipart::{to_value, CollectionMode, Strategy};
    /// use std::collections::HashMap;
    ///
    /// let tags = to_value(&vec!["a", "b"]).unwrap();
    /// assert_eq!(Strategy::select(&tags, CollectionMode::Collapse), Strategy::Array);
    ///
    /// let rows = to_value(&vec![HashMap::from([("id", 1)])]).unwrap();
    /// assert_eq!(Strategy::select(&rows, CollectionMode::Collapse), Strategy::Object);
    /// assert_eq!(Strategy::select(&rows, CollectionMode::Explode), Strategy::Array);
    /// ```
    #[must_use]
    pub fn select(value: &FormValue, mode: CollectionMode) -> Strategy {
        match value.category() {
            Category::Collection => match (value.deep_category(), mode) {
                (
                    Category::Aggregate | Category::Mapping | Category::Variant,
                    CollectionMode::Collapse,
                ) => Strategy::Object,
                _ => Strategy::Array,
            },
            Category::Aggregate | Category::Mapping | Category::Variant => Strategy::Object,
            Category::File => Strategy::File,
            _ => Strategy::Scalar,
        }
    }
}

/// Encodes values into the parts of a [`FormWriter`].
///
/// # Examples
///
/// ```rust
/// use serde_multipart::{Encoder, Form};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Comment {
///     author: String,
///     likes: u32,
///     reply_to: Option<u64>,
/// }
///
/// let mut form = Form::new();
/// Encoder::new(&mut form)
///     .encode(&Comment { author: "yasha".into(), likes: 3, reply_to: None })
///     .unwrap();
///
/// assert_eq!(form.value("author"), Some("yasha"));
/// assert_eq!(form.value("likes"), Some("3"));
/// assert_eq!(form.value("reply_to"), None);
/// ```
pub struct Encoder<'w, W: FormWriter> {
    writer: &'w mut W,
    options: EncoderOptions,
}

impl<'w, W: FormWriter> Encoder<'w, W> {
    pub fn new(writer: &'w mut W) -> Self {
        Self::with_options(writer, EncoderOptions::default())
    }

    pub fn with_options(writer: &'w mut W, options: EncoderOptions) -> Self {
        Encoder { writer, options }
    }

    #[must_use]
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Encodes every field of a struct or every entry of a map.
    ///
    /// Any other top-level value (including `None`) is a usage error. Encoding
    /// stops at the first failing field; parts written before it stay written.
    pub fn encode<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.encode_top_level(value).map_err(Error::context)
    }

    /// Encodes a single value of any shape under `field_name`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_multipart::{Encoder, Form};
    ///
    /// let mut form = Form::new();
    /// Encoder::new(&mut form).encode_field(&3.14, "pi").unwrap();
    /// assert_eq!(form.value("pi"), Some("3.14"));
    /// ```
    pub fn encode_field<T>(&mut self, value: &T, field_name: &str) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        to_value(value)
            .and_then(|value| self.encode_named(value, field_name))
            .map_err(Error::context)
    }

    /// Streams `file` into a file part named `field_name`.
    ///
    /// Unlike a [`FormFile`](crate::FormFile) member, the content is copied
    /// straight from the reader into the part without buffering. An empty
    /// `field_name` is replaced by the file's own name.
    pub fn encode_file<F>(&mut self, file: &mut F, field_name: &str) -> Result<()>
    where
        F: FileLike + ?Sized,
    {
        let stat = file.stat().ok();
        self.write_file(stat.as_ref(), short_type_name::<F>(), field_name, |sink| {
            io::copy(file, sink).map(drop)
        })
        .map_err(|e| Error::context(Error::field(field_name, e)))
    }

    fn encode_top_level<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(value)? {
            FormValue::Struct { name, fields } => self.encode_struct(name, fields),
            FormValue::Map(entries) => self.encode_map(entries),
            other => {
                tracing::debug!(kind = other.kind_name(), "rejected top-level value");
                Err(Error::usage("only a map or struct can be encoded"))
            }
        }
    }

    fn encode_struct(
        &mut self,
        name: &'static str,
        fields: Vec<(&'static str, FormValue)>,
    ) -> Result<()> {
        tracing::debug!(aggregate = name, fields = fields.len(), "encoding struct");

        // Cloned so the table does not borrow `self` while fields are written.
        let tags = self.options.field_tags(name).cloned();
        for (member, value) in fields {
            let field_name = match &tags {
                Some(tags) => match tags.resolve(member) {
                    Some(field_name) => field_name,
                    None => {
                        tracing::trace!(aggregate = name, member, "member not tagged, skipped");
                        continue;
                    }
                },
                None => member,
            };
            self.encode_named(value, field_name)?;
        }
        Ok(())
    }

    fn encode_map(&mut self, entries: Vec<(FormValue, FormValue)>) -> Result<()> {
        tracing::debug!(entries = entries.len(), "encoding map");

        if let Some((key, _)) = entries.iter().find(|(k, _)| k.as_str().is_none()) {
            return Err(Error::usage(&format!(
                "only a string can be a map key, found {}",
                key.kind_name()
            )));
        }
        for (key, value) in entries {
            if let FormValue::String(key) = key {
                self.encode_named(value, &key)?;
            }
        }
        Ok(())
    }

    /// Per-field entry point: skips absent values, dispatches the rest and
    /// annotates failures with the field name.
    fn encode_named(&mut self, value: FormValue, field_name: &str) -> Result<()> {
        if value.is_null() {
            tracing::trace!(field = field_name, "absent value, no part written");
            return Ok(());
        }
        let strategy = Strategy::select(&value, self.options.collection_mode);
        tracing::trace!(field = field_name, ?strategy, "encoding field");
        self.apply(strategy, value, field_name)
            .map_err(|e| Error::field(field_name, e))
    }

    fn apply(&mut self, strategy: Strategy, value: FormValue, field_name: &str) -> Result<()> {
        match strategy {
            Strategy::Scalar => self.encode_scalar(value, field_name),
            Strategy::Object => self.encode_object(&value, field_name),
            Strategy::Array => self.encode_array(value, field_name),
            Strategy::File => match value {
                FormValue::File(file) => self.encode_captured_file(file, field_name),
                other => Err(Error::unsupported_type(&format!(
                    "{} in a file position",
                    other.kind_name()
                ))),
            },
        }
    }

    fn encode_array(&mut self, value: FormValue, field_name: &str) -> Result<()> {
        let items = match value {
            FormValue::Seq(items) => items,
            other => {
                return Err(Error::unsupported_type(&format!(
                    "{} in a sequence of sequences",
                    other.kind_name()
                )))
            }
        };
        // Empty inner sequences say nothing about the element type.
        let mut present = items.iter().filter(|item| !item.is_null());
        let Some(first) = present
            .clone()
            .find(|item| item.deep_category() != Category::Collection)
            .or_else(|| present.next())
        else {
            return Ok(());
        };

        let strategy = Strategy::select(first, self.options.collection_mode);
        let element_name = format!("{}[]", field_name);
        for item in items {
            if item.is_null() {
                continue;
            }
            self.apply(strategy, item, &element_name)
                .map_err(|e| Error::field(&element_name, e))?;
        }
        Ok(())
    }

    fn encode_object(&mut self, value: &FormValue, field_name: &str) -> Result<()> {
        let json = serde_json::to_vec(value)?;
        self.write_text(field_name, &json)
    }

    fn encode_scalar(&mut self, value: FormValue, field_name: &str) -> Result<()> {
        match value {
            FormValue::Bool(b) => self.write_text(field_name, if b { b"true" } else { b"false" }),
            FormValue::Number(n) => {
                let text = n.to_form_text(self.options.float_precision);
                self.write_text(field_name, text.as_bytes())
            }
            FormValue::String(s) => self.write_text(field_name, s.as_bytes()),
            FormValue::Bytes(b) => self.write_text(field_name, &b),
            FormValue::Struct { .. } | FormValue::Map(_) | FormValue::Variant { .. } => {
                self.encode_object(&value, field_name)
            }
            other => Err(Error::unsupported_type(other.kind_name())),
        }
    }

    fn encode_captured_file(&mut self, file: CapturedFile, field_name: &str) -> Result<()> {
        let CapturedFile {
            type_name,
            stat,
            content,
            read_error,
        } = file;
        self.write_file(stat.as_ref(), &type_name, field_name, |sink| {
            io::copy(&mut content.as_slice(), sink)?;
            match read_error {
                Some(failure) => Err(failure.to_io_error()),
                None => Ok(()),
            }
        })
    }

    fn write_file<C>(
        &mut self,
        stat: Option<&FileStat>,
        type_name: &str,
        field_name: &str,
        copy: C,
    ) -> Result<()>
    where
        C: FnOnce(&mut W::Part<'_>) -> io::Result<()>,
    {
        let stat = stat.ok_or_else(|| Error::file_unavailable(type_name))?;
        if stat.is_dir {
            return Err(Error::is_directory(&stat.name));
        }
        let field_name = if field_name.is_empty() {
            stat.name.as_str()
        } else {
            field_name
        };

        let mut sink = self.writer.create_form_file(field_name, &stat.name)?;
        copy(&mut sink)?;
        sink.flush()?;
        tracing::debug!(
            field = field_name,
            file = %stat.name,
            size = stat.size,
            "file part written"
        );
        Ok(())
    }

    fn write_text(&mut self, field_name: &str, data: &[u8]) -> Result<()> {
        let mut sink = self.writer.create_form_field(field_name)?;
        sink.write_all(data)?;
        sink.flush()?;
        Ok(())
    }
}
