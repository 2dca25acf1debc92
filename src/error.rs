//! Error types for multipart encoding.
//!
//! Every failure the encoder can produce falls into one of five categories,
//! reported by [`Error::kind`]:
//!
//! - **Usage**: the top-level value is not a struct or map, or a map key is not a string
//! - **Type**: a value has no form representation (for example `()`)
//! - **File**: a file-like value cannot be stat'ed or points at a directory
//! - **Write**: the form writer or the underlying byte sink failed
//! - **Serialization**: JSON encoding of a structured value failed
//!
//! ## Error Context
//!
//! Errors returned from the public API carry a `multipart: ` prefix, and every
//! failure that happened while encoding a named field is annotated with
//! `field "<name>": `. The annotations nest, so a failure inside an array of
//! arrays reads `multipart: field "tags": field "tags[]": ...`.
//!
//! ## Examples
//!
//! ```rust
//! use serde_multipart::{to_form, ErrorKind};
//!
//! let err = to_form(&42).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Usage);
//! assert!(err.to_string().starts_with("multipart: "));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents all possible errors that can occur during multipart encoding.
#[derive(Debug, Error)]
pub enum Error {
    /// The value handed to the encoder cannot be encoded at that position
    #[error("{0}")]
    Usage(String),

    /// A concrete value has no form-field representation
    #[error("{0} is not a supported type")]
    UnsupportedType(String),

    /// The file-like value could not report its metadata
    #[error("file in \"{0}\" is not available")]
    FileUnavailable(String),

    /// The file-like value points at a directory
    #[error("{0} is dir")]
    IsDirectory(String),

    /// The form writer or its byte sink failed
    #[error(transparent)]
    Io(#[from] io::Error),

    /// JSON encoding of a structured value failed
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Error raised by a `Serialize` implementation
    #[error("{0}")]
    Custom(String),

    /// Failure while encoding the named field
    #[error("field \"{name}\": {inner}")]
    Field { name: String, inner: Box<Error> },

    /// Library prefix added at the public entry points
    #[error("multipart: {0}")]
    Context(Box<Error>),
}

/// Coarse classification of an [`Error`], independent of the annotations wrapped around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Type,
    File,
    Write,
    Serialization,
}

impl Error {
    /// Creates a usage error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_multipart::{Error, ErrorKind};
    ///
    /// let err = Error::usage("only a map or struct can be encoded");
    /// assert_eq!(err.kind(), ErrorKind::Usage);
    /// ```
    pub fn usage(msg: &str) -> Self {
        Error::Usage(msg.to_string())
    }

    /// Creates an unsupported type error for the given value kind.
    pub fn unsupported_type(kind: &str) -> Self {
        Error::UnsupportedType(kind.to_string())
    }

    /// Creates an error for a file-like value whose metadata is unavailable.
    pub fn file_unavailable(type_name: &str) -> Self {
        Error::FileUnavailable(type_name.to_string())
    }

    /// Creates an error for a file-like value that resolves to a directory.
    pub fn is_directory(name: &str) -> Self {
        Error::IsDirectory(name.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Annotates `inner` with the name of the field being encoded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_multipart::Error;
    ///
    /// let err = Error::field("avatar", Error::is_directory("uploads"));
    /// assert_eq!(err.to_string(), "field \"avatar\": uploads is dir");
    /// ```
    pub fn field(name: &str, inner: Error) -> Self {
        Error::Field {
            name: name.to_string(),
            inner: Box::new(inner),
        }
    }

    pub(crate) fn context(inner: Error) -> Self {
        match inner {
            Error::Context(_) => inner,
            other => Error::Context(Box::new(other)),
        }
    }

    /// Returns the underlying error with every annotation stripped.
    #[must_use]
    pub fn root(&self) -> &Error {
        match self {
            Error::Field { inner, .. } | Error::Context(inner) => inner.root(),
            other => other,
        }
    }

    /// Returns the category of the underlying error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Field { inner, .. } | Error::Context(inner) => inner.kind(),
            Error::Usage(_) => ErrorKind::Usage,
            Error::UnsupportedType(_) => ErrorKind::Type,
            Error::FileUnavailable(_) | Error::IsDirectory(_) => ErrorKind::File,
            Error::Io(_) => ErrorKind::Write,
            Error::Json(_) | Error::Custom(_) => ErrorKind::Serialization,
        }
    }

    /// Returns the name of the innermost field the failure was reported for, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_multipart::Error;
    ///
    /// let err = Error::field("tags", Error::field("tags[]", Error::unsupported_type("unit")));
    /// assert_eq!(err.field_name(), Some("tags[]"));
    /// ```
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Error::Field { name, inner } => inner.field_name().or(Some(name.as_str())),
            Error::Context(inner) => inner.field_name(),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
