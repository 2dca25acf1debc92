//! The form writer the encoder produces parts into.
//!
//! [`FormWriter`] is the seam between the encoder and whatever assembles the
//! request body. Two implementations ship with the crate:
//!
//! - [`Form`], which records parts in memory (handy for tests and for
//!   transports that build their own body)
//! - [`MultipartWriter`](crate::MultipartWriter), which writes RFC 7578 bytes
//!   to any `std::io::Write` sink
//!
//! Parts are created one at a time and in order. A writer is an append-only
//! sink and must not be shared between concurrent encoders.

use std::io::{self, Write};

/// Factory for named form parts.
pub trait FormWriter {
    /// Sink receiving the bytes of one part.
    type Part<'a>: Write
    where
        Self: 'a;

    /// Starts a text field named `name`.
    fn create_form_field(&mut self, name: &str) -> io::Result<Self::Part<'_>>;

    /// Starts a file attachment in field `field_name` with the given file name.
    fn create_form_file(&mut self, field_name: &str, file_name: &str)
        -> io::Result<Self::Part<'_>>;
}

/// One recorded form part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    /// Set for file attachments.
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

impl Part {
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.file_name.is_some()
    }

    /// Returns the content as text if it is valid UTF-8.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// An in-memory form: the ordered list of parts an encoder produced.
///
/// # Examples
///
/// ```rust
/// use serde_multipart::{Encoder, Form};
///
/// let mut form = Form::new();
/// let mut encoder = Encoder::new(&mut form);
/// encoder.encode_field(&vec!["a", "b"], "tags").unwrap();
/// encoder.encode_field(&true, "public").unwrap();
///
/// assert_eq!(form.len(), 3);
/// assert_eq!(form.values("tags[]"), vec!["a", "b"]);
/// assert_eq!(form.value("public"), Some("true"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    parts: Vec<Part>,
}

impl Form {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    #[must_use]
    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the first text field named `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.parts
            .iter()
            .filter(|p| !p.is_file() && p.name == name)
            .find_map(Part::text)
    }

    /// Returns every text field named `name`, in order.
    #[must_use]
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter(|p| !p.is_file() && p.name == name)
            .filter_map(Part::text)
            .collect()
    }

    /// Returns the first file attachment in field `name`.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.is_file() && p.name == name)
    }

    /// Returns every file attachment in field `name`, in order.
    pub fn files<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Part> + 'a {
        self.parts
            .iter()
            .filter(move |p| p.is_file() && p.name == name)
    }

    fn push(&mut self, name: &str, file_name: Option<&str>) -> PartWriter<'_> {
        let index = self.parts.len();
        self.parts.push(Part {
            name: name.to_string(),
            file_name: file_name.map(str::to_string),
            data: Vec::new(),
        });
        PartWriter {
            data: &mut self.parts[index].data,
        }
    }
}

/// Sink for a part recorded in a [`Form`].
#[derive(Debug)]
pub struct PartWriter<'a> {
    data: &'a mut Vec<u8>,
}

impl Write for PartWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FormWriter for Form {
    type Part<'a> = PartWriter<'a>;

    fn create_form_field(&mut self, name: &str) -> io::Result<PartWriter<'_>> {
        Ok(self.push(name, None))
    }

    fn create_form_file(&mut self, field_name: &str, file_name: &str) -> io::Result<PartWriter<'_>> {
        Ok(self.push(field_name, Some(file_name)))
    }
}
