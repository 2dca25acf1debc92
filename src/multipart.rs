//! A [`FormWriter`] producing `multipart/form-data` bytes.
//!
//! The caller chooses the boundary, sends [`MultipartWriter::content_type`] as
//! the request's `Content-Type`, and calls [`MultipartWriter::finish`] once all
//! parts are written.
//!
//! ```rust
//! use serde_multipart::{Encoder, MultipartWriter};
//!
//! let mut writer = MultipartWriter::new(Vec::new(), "XyZ").unwrap();
//! Encoder::new(&mut writer).encode_field(&"hello", "greeting").unwrap();
//! let body = writer.finish().unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(body).unwrap(),
//!     "--XyZ\r\nContent-Disposition: form-data; name=\"greeting\"\r\n\r\nhello\r\n--XyZ--\r\n"
//! );
//! ```

use crate::writer::FormWriter;
use crate::{Error, Result};
use std::io::{self, Write};

const MAX_BOUNDARY_LEN: usize = 70;

/// Streams form parts to `W` using a fixed boundary.
#[derive(Debug)]
pub struct MultipartWriter<W: Write> {
    inner: W,
    boundary: String,
    has_parts: bool,
}

impl<W: Write> MultipartWriter<W> {
    /// Creates a writer using `boundary`.
    ///
    /// The boundary must be 1 to 70 characters from the RFC 2046 set and must
    /// not end with a space.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_multipart::MultipartWriter;
    ///
    /// assert!(MultipartWriter::new(Vec::new(), "abc-123").is_ok());
    /// assert!(MultipartWriter::new(Vec::new(), "").is_err());
    /// assert!(MultipartWriter::new(Vec::new(), "bad\"quote").is_err());
    /// ```
    pub fn new(inner: W, boundary: &str) -> Result<Self> {
        validate_boundary(boundary)?;
        Ok(MultipartWriter {
            inner,
            boundary: boundary.to_string(),
            has_parts: false,
        })
    }

    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the request's `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Writes the closing delimiter and returns the sink.
    pub fn finish(mut self) -> io::Result<W> {
        if self.has_parts {
            write!(self.inner, "\r\n--{}--\r\n", self.boundary)?;
        } else {
            write!(self.inner, "--{}--\r\n", self.boundary)?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn start_part(&mut self, disposition: &str, content_type: Option<&str>) -> io::Result<&mut W> {
        if self.has_parts {
            write!(self.inner, "\r\n--{}\r\n", self.boundary)?;
        } else {
            write!(self.inner, "--{}\r\n", self.boundary)?;
        }
        self.has_parts = true;

        write!(self.inner, "Content-Disposition: {}\r\n", disposition)?;
        if let Some(content_type) = content_type {
            write!(self.inner, "Content-Type: {}\r\n", content_type)?;
        }
        self.inner.write_all(b"\r\n")?;
        Ok(&mut self.inner)
    }
}

impl<W: Write> FormWriter for MultipartWriter<W> {
    type Part<'a> = &'a mut W where Self: 'a;

    fn create_form_field(&mut self, name: &str) -> io::Result<&mut W> {
        let disposition = format!("form-data; name=\"{}\"", escape_quotes(name));
        self.start_part(&disposition, None)
    }

    fn create_form_file(&mut self, field_name: &str, file_name: &str) -> io::Result<&mut W> {
        let disposition = format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            escape_quotes(field_name),
            escape_quotes(file_name)
        );
        self.start_part(&disposition, Some("application/octet-stream"))
    }
}

/// Quotes are backslash-escaped; line breaks are percent-encoded so a name
/// cannot end the header line.
fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn validate_boundary(boundary: &str) -> Result<()> {
    if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
        return Err(Error::usage("boundary must be 1 to 70 characters"));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || "'()+_,-./:=? ".contains(c);
    if !boundary.chars().all(allowed) || boundary.ends_with(' ') {
        return Err(Error::usage(&format!("invalid boundary {:?}", boundary)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_part_headers() {
        let mut writer = MultipartWriter::new(Vec::new(), "b").unwrap();
        writer
            .create_form_file("doc", "a \"b\".txt")
            .unwrap()
            .write_all(b"data")
            .unwrap();
        let body = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(
            body,
            "--b\r\nContent-Disposition: form-data; name=\"doc\"; filename=\"a \\\"b\\\".txt\"\r\n\
             Content-Type: application/octet-stream\r\n\r\ndata\r\n--b--\r\n"
        );
    }

    #[test]
    fn test_parts_are_separated() {
        let mut writer = MultipartWriter::new(Vec::new(), "b").unwrap();
        writer.create_form_field("x").unwrap().write_all(b"1").unwrap();
        writer.create_form_field("x").unwrap().write_all(b"2").unwrap();
        let body = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(
            body,
            "--b\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\n1\r\n\
             --b\r\nContent-Disposition: form-data; name=\"x\"\r\n\r\n2\r\n--b--\r\n"
        );
    }

    #[test]
    fn test_line_breaks_in_names_stay_in_header() {
        let mut writer = MultipartWriter::new(Vec::new(), "b").unwrap();
        writer
            .create_form_file("a\r\nX-Injected: 1", "f\n.txt")
            .unwrap()
            .write_all(b"d")
            .unwrap();
        let body = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert!(body.starts_with(
            "--b\r\nContent-Disposition: form-data; name=\"a%0D%0AX-Injected: 1\"; filename=\"f%0A.txt\"\r\n"
        ));
        assert!(!body.contains("\r\nX-Injected"));
    }

    #[test]
    fn test_empty_form() {
        let writer = MultipartWriter::new(Vec::new(), "b").unwrap();
        assert_eq!(writer.content_type(), "multipart/form-data; boundary=b");
        assert_eq!(writer.finish().unwrap(), b"--b--\r\n");
    }

    #[test]
    fn test_boundary_rules() {
        assert!(validate_boundary(&"a".repeat(70)).is_ok());
        assert!(validate_boundary(&"a".repeat(71)).is_err());
        assert!(validate_boundary("ends with space ").is_err());
        assert!(validate_boundary("has space inside").is_ok());
    }
}
