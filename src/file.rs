//! File-like values and their capture into the value tree.
//!
//! A value is streamed as a file part when it implements [`FileLike`]: it can
//! be read as bytes and it can report a [`FileStat`] (name, directory flag,
//! size). Files reach the encoder in one of two ways:
//!
//! - directly, through [`Encoder::encode_file`](crate::Encoder::encode_file),
//!   which copies the reader straight into the part sink;
//! - as a member of a struct or map, wrapped in [`FormFile`], whose
//!   `Serialize` implementation hands the stat result and content to the value
//!   serializer.
//!
//! The encoder never opens or closes files. The caller owns their lifecycle.
//!
//! ## Examples
//!
//! ```rust
//! use serde_multipart::{to_form, FormFile, MemoryFile};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Upload {
//!     title: String,
//!     attachment: FormFile<MemoryFile>,
//! }
//!
//! let upload = Upload {
//!     title: "report".to_string(),
//!     attachment: FormFile::new(MemoryFile::new("report.csv", "a,b\n1,2\n")),
//! };
//!
//! let form = to_form(&upload).unwrap();
//! let part = form.file("attachment").unwrap();
//! assert_eq!(part.file_name.as_deref(), Some("report.csv"));
//! assert_eq!(part.data, b"a,b\n1,2\n");
//! ```

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use std::cell::RefCell;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

pub(crate) const FILE_TOKEN: &str = "$serde_multipart::private::FormFile";

/// Metadata reported by a [`FileLike`] value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileStat {
    /// Base name of the file, used as the part's file name.
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// A readable value that can describe itself as a file.
pub trait FileLike: Read {
    /// Returns the file's metadata.
    fn stat(&self) -> io::Result<FileStat>;
}

impl<F: FileLike + ?Sized> FileLike for &mut F {
    fn stat(&self) -> io::Result<FileStat> {
        (**self).stat()
    }
}

impl<F: FileLike + ?Sized> FileLike for Box<F> {
    fn stat(&self) -> io::Result<FileStat> {
        (**self).stat()
    }
}

/// An open [`fs::File`] together with the path it was opened from.
///
/// `std::fs::File` cannot report its own name, so the path is kept alongside.
#[derive(Debug)]
pub struct NamedFile {
    path: PathBuf,
    file: fs::File,
}

impl NamedFile {
    /// Opens the file at `path` for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = fs::File::open(&path)?;
        Ok(NamedFile { path, file })
    }

    /// Wraps an already opened file.
    pub fn new(path: impl Into<PathBuf>, file: fs::File) -> Self {
        NamedFile {
            path: path.into(),
            file,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn into_file(self) -> fs::File {
        self.file
    }
}

impl Read for NamedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl FileLike for NamedFile {
    fn stat(&self) -> io::Result<FileStat> {
        let meta = self.file.metadata()?;
        let name = self
            .path
            .file_name()
            .unwrap_or(self.path.as_os_str())
            .to_string_lossy()
            .into_owned();
        Ok(FileStat {
            name,
            is_dir: meta.is_dir(),
            size: meta.len(),
        })
    }
}

/// An in-memory file: a name and a byte buffer.
#[derive(Clone, Debug)]
pub struct MemoryFile {
    name: String,
    data: Cursor<Vec<u8>>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        MemoryFile {
            name: name.into(),
            data: Cursor::new(data.into()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}

impl FileLike for MemoryFile {
    fn stat(&self) -> io::Result<FileStat> {
        Ok(FileStat {
            name: self.name.clone(),
            is_dir: false,
            size: self.data.get_ref().len() as u64,
        })
    }
}

/// Marks a struct member or map value as a file part.
///
/// Serializing a `FormFile` reads the wrapped file to its end into memory
/// while the value tree is built, and the buffered bytes are copied into the
/// part afterwards. The same wrapper therefore produces its content once.
/// For large files, encode the other fields first and stream the file with
/// [`Encoder::encode_file`](crate::Encoder::encode_file), which copies from
/// the reader without buffering.
#[derive(Debug)]
pub struct FormFile<F> {
    file: RefCell<F>,
}

impl<F: FileLike> FormFile<F> {
    pub fn new(file: F) -> Self {
        FormFile {
            file: RefCell::new(file),
        }
    }

    pub fn into_inner(self) -> F {
        self.file.into_inner()
    }
}

impl<F: FileLike> From<F> for FormFile<F> {
    fn from(file: F) -> Self {
        FormFile::new(file)
    }
}

impl<F: FileLike> Serialize for FormFile<F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut file = self.file.try_borrow_mut().map_err(S::Error::custom)?;
        let captured = CapturedFile::capture(&mut *file, short_type_name::<F>());
        serializer.serialize_newtype_struct(FILE_TOKEN, &captured)
    }
}

/// A file-like value as recorded in the value tree.
///
/// The stat result is kept even when it failed, so the encoder can report the
/// failure for the right field.
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedFile {
    pub(crate) type_name: String,
    pub(crate) stat: Option<FileStat>,
    pub(crate) content: Vec<u8>,
    pub(crate) read_error: Option<ReadFailure>,
}

/// A read error recorded while capturing a file, rebuilt with its original kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ReadFailure {
    pub(crate) kind: io::ErrorKind,
    pub(crate) message: String,
}

impl ReadFailure {
    fn new(err: &io::Error) -> Self {
        ReadFailure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub(crate) fn to_io_error(&self) -> io::Error {
        io::Error::new(self.kind, self.message.clone())
    }
}

impl Serialize for ReadFailure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut st = serializer.serialize_struct("ReadFailure", 2)?;
        st.serialize_field("kind", &format!("{:?}", self.kind))?;
        st.serialize_field("message", &self.message)?;
        st.end()
    }
}

fn error_kind_from_name(name: &str) -> io::ErrorKind {
    use io::ErrorKind::*;

    match name {
        "NotFound" => NotFound,
        "PermissionDenied" => PermissionDenied,
        "ConnectionRefused" => ConnectionRefused,
        "ConnectionReset" => ConnectionReset,
        "ConnectionAborted" => ConnectionAborted,
        "NotConnected" => NotConnected,
        "AddrInUse" => AddrInUse,
        "AddrNotAvailable" => AddrNotAvailable,
        "BrokenPipe" => BrokenPipe,
        "AlreadyExists" => AlreadyExists,
        "WouldBlock" => WouldBlock,
        "InvalidInput" => InvalidInput,
        "InvalidData" => InvalidData,
        "TimedOut" => TimedOut,
        "WriteZero" => WriteZero,
        "Interrupted" => Interrupted,
        "Unsupported" => Unsupported,
        "UnexpectedEof" => UnexpectedEof,
        "OutOfMemory" => OutOfMemory,
        _ => Other,
    }
}

impl CapturedFile {
    pub(crate) fn capture<F: FileLike + ?Sized>(file: &mut F, type_name: &str) -> Self {
        let stat = file.stat().ok();
        let mut content = Vec::new();
        let mut read_error = None;
        if matches!(&stat, Some(s) if !s.is_dir) {
            if let Err(e) = file.read_to_end(&mut content) {
                read_error = Some(ReadFailure::new(&e));
            }
        }
        CapturedFile {
            type_name: type_name.to_string(),
            stat,
            content,
            read_error,
        }
    }

    /// Rebuilds a capture from the payload the value serializer saw.
    pub(crate) fn from_payload(payload: crate::FormValue) -> crate::Result<Self> {
        use crate::{FormValue, Number};

        let fields = match payload {
            FormValue::Struct { fields, .. } => fields,
            other => {
                return Err(crate::Error::custom(format!(
                    "malformed file payload: {}",
                    other.kind_name()
                )))
            }
        };

        let mut captured = CapturedFile {
            type_name: String::new(),
            stat: None,
            content: Vec::new(),
            read_error: None,
        };
        for (key, value) in fields {
            match (key, value) {
                ("type_name", FormValue::String(s)) => captured.type_name = s,
                ("content", FormValue::Bytes(b)) => captured.content = b,
                ("read_error", FormValue::Struct { fields, .. }) => {
                    let mut failure = ReadFailure {
                        kind: io::ErrorKind::Other,
                        message: String::new(),
                    };
                    for (key, value) in fields {
                        match (key, value) {
                            ("kind", FormValue::String(s)) => failure.kind = error_kind_from_name(&s),
                            ("message", FormValue::String(s)) => failure.message = s,
                            _ => {}
                        }
                    }
                    captured.read_error = Some(failure);
                }
                ("stat", FormValue::Struct { fields, .. }) => {
                    let mut stat = FileStat {
                        name: String::new(),
                        is_dir: false,
                        size: 0,
                    };
                    for (key, value) in fields {
                        match (key, value) {
                            ("name", FormValue::String(s)) => stat.name = s,
                            ("is_dir", FormValue::Bool(b)) => stat.is_dir = b,
                            ("size", FormValue::Number(Number::U64(n))) => stat.size = n,
                            _ => {}
                        }
                    }
                    captured.stat = Some(stat);
                }
                _ => {}
            }
        }
        Ok(captured)
    }

    /// Name reported by the file's metadata, if it was available.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.stat.as_ref().map(|s| s.name.as_str())
    }
}

impl Serialize for CapturedFile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut st = serializer.serialize_struct("CapturedFile", 4)?;
        st.serialize_field("type_name", &self.type_name)?;
        st.serialize_field("stat", &self.stat)?;
        st.serialize_field("content", &Bytes(&self.content))?;
        st.serialize_field("read_error", &self.read_error)?;
        st.end()
    }
}

struct Bytes<'a>(&'a [u8]);

impl Serialize for Bytes<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(self.0)
    }
}

/// `std::any::type_name` without the module path or generic arguments.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unstatable;

    impl Read for Unstatable {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Ok(0)
        }
    }

    impl FileLike for Unstatable {
        fn stat(&self) -> io::Result<FileStat> {
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<MemoryFile>(), "MemoryFile");
        assert_eq!(short_type_name::<&mut NamedFile>(), "NamedFile");
        assert_eq!(short_type_name::<Box<MemoryFile>>(), "Box");
    }

    #[test]
    fn test_capture_reads_content() {
        let mut file = MemoryFile::new("a.txt", "hello");
        let captured = CapturedFile::capture(&mut file, "MemoryFile");
        assert_eq!(captured.name(), Some("a.txt"));
        assert_eq!(captured.content, b"hello");
        assert_eq!(captured.stat.unwrap().size, 5);
    }

    #[test]
    fn test_capture_keeps_failed_stat() {
        let captured = CapturedFile::capture(&mut Unstatable, "Unstatable");
        assert!(captured.stat.is_none());
        assert!(captured.content.is_empty());
    }

    #[test]
    fn test_payload_round_trip_through_value_tree() {
        let file = FormFile::new(MemoryFile::new("b.bin", vec![0u8, 1, 2]));
        match crate::to_value(&file).unwrap() {
            crate::FormValue::File(captured) => {
                assert_eq!(captured.type_name, "MemoryFile");
                assert_eq!(captured.content, vec![0, 1, 2]);
                assert_eq!(
                    captured.stat,
                    Some(FileStat {
                        name: "b.bin".to_string(),
                        is_dir: false,
                        size: 3,
                    })
                );
            }
            other => panic!("Expected file, got {:?}", other),
        }
    }

    #[test]
    fn test_read_failure_kind_survives_value_tree() {
        struct Locked;

        impl Read for Locked {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
            }
        }

        impl FileLike for Locked {
            fn stat(&self) -> io::Result<FileStat> {
                Ok(FileStat {
                    name: "locked.bin".to_string(),
                    is_dir: false,
                    size: 1,
                })
            }
        }

        match crate::to_value(&FormFile::new(Locked)).unwrap() {
            crate::FormValue::File(captured) => {
                let err = captured.read_error.unwrap().to_io_error();
                assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
                assert_eq!(err.to_string(), "locked");
            }
            other => panic!("Expected file, got {:?}", other),
        }
    }

    #[test]
    fn test_form_file_is_drained_by_serialization() {
        let file = FormFile::new(MemoryFile::new("once.txt", "once"));
        let form = crate::to_form(&std::collections::BTreeMap::from([("f", &file)])).unwrap();
        assert_eq!(form.file("f").unwrap().data, b"once");

        let mut rest = Vec::new();
        file.into_inner().read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(error_kind_from_name("UnexpectedEof"), io::ErrorKind::UnexpectedEof);
        assert_eq!(error_kind_from_name("SomethingNew"), io::ErrorKind::Other);
    }

    #[test]
    fn test_named_file_stat() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"abc").unwrap();

        let file = NamedFile::open(&path).unwrap();
        let stat = file.stat().unwrap();
        assert_eq!(stat.name, "notes.txt");
        assert_eq!(stat.size, 3);
        assert!(!stat.is_dir);
    }
}
