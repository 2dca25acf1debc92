use serde::Serialize;
use serde_multipart::{
    to_form, Encoder, Error, ErrorKind, FileLike, FileStat, Form, FormFile, MemoryFile, NamedFile,
};
use std::collections::BTreeMap;
use std::io::{self, Read};

/// Reports metadata but fails halfway through reading.
struct Flaky {
    served: bool,
}

impl Read for Flaky {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "disk on fire"));
        }
        self.served = true;
        buf[..4].copy_from_slice(b"part");
        Ok(4)
    }
}

impl FileLike for Flaky {
    fn stat(&self) -> io::Result<FileStat> {
        Ok(FileStat {
            name: "flaky.bin".to_string(),
            is_dir: false,
            size: 8,
        })
    }
}

struct Vanished;

impl Read for Vanished {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl FileLike for Vanished {
    fn stat(&self) -> io::Result<FileStat> {
        Err(io::Error::new(io::ErrorKind::NotFound, "stale handle"))
    }
}

#[test]
fn test_named_file_member() {
    #[derive(Serialize)]
    struct Upload {
        title: String,
        attachment: FormFile<NamedFile>,
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cats.txt");
    std::fs::write(&path, "Yasha\nMasha\n").unwrap();

    let upload = Upload {
        title: "cats".to_string(),
        attachment: FormFile::new(NamedFile::open(&path).unwrap()),
    };
    let form = to_form(&upload).unwrap();

    assert_eq!(form.len(), 2);
    assert_eq!(form.value("title"), Some("cats"));
    let part = form.file("attachment").unwrap();
    assert_eq!(part.file_name.as_deref(), Some("cats.txt"));
    assert_eq!(part.data, b"Yasha\nMasha\n");
}

#[test]
fn test_directory_is_rejected() {
    #[derive(Serialize)]
    struct Upload {
        doc: FormFile<NamedFile>,
    }

    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("albums");
    std::fs::create_dir(&sub).unwrap();

    let upload = Upload {
        doc: FormFile::new(NamedFile::open(&sub).unwrap()),
    };
    let err = to_form(&upload).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::File);
    assert_eq!(err.field_name(), Some("doc"));
    assert_eq!(err.to_string(), "multipart: field \"doc\": albums is dir");
}

#[test]
fn test_unavailable_metadata() {
    #[derive(Serialize)]
    struct Upload {
        doc: FormFile<Vanished>,
    }

    let err = to_form(&Upload {
        doc: FormFile::new(Vanished),
    })
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::File);
    assert_eq!(
        err.to_string(),
        "multipart: field \"doc\": file in \"Vanished\" is not available"
    );
}

#[test]
fn test_read_failure_is_write_error() {
    #[derive(Serialize)]
    struct Upload {
        doc: FormFile<Flaky>,
    }

    let err = to_form(&Upload {
        doc: FormFile::new(Flaky { served: false }),
    })
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Write);
    assert_eq!(err.to_string(), "multipart: field \"doc\": disk on fire");
    match err.root() {
        Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
        other => panic!("Expected io error, got {:?}", other),
    }
}

#[test]
fn test_encode_file_streams_reader() {
    let mut form = Form::new();
    let mut file = MemoryFile::new("song.mp3", vec![0x49, 0x44, 0x33]);
    Encoder::new(&mut form).encode_file(&mut file, "track").unwrap();

    let part = form.file("track").unwrap();
    assert_eq!(part.file_name.as_deref(), Some("song.mp3"));
    assert_eq!(part.data, vec![0x49, 0x44, 0x33]);
}

#[test]
fn test_encode_file_empty_field_uses_file_name() {
    let mut form = Form::new();
    let mut file = MemoryFile::new("song.mp3", "x");
    Encoder::new(&mut form).encode_file(&mut file, "").unwrap();

    assert_eq!(form.parts()[0].name, "song.mp3");
    assert!(form.parts()[0].is_file());
}

#[test]
fn test_encode_file_errors() {
    let mut form = Form::new();
    let mut encoder = Encoder::new(&mut form);

    let err = encoder.encode_file(&mut Vanished, "gone").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::File);
    assert_eq!(err.field_name(), Some("gone"));

    let err = encoder
        .encode_file(&mut Flaky { served: false }, "flaky")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Write);
    match err.root() {
        Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
        other => panic!("Expected io error, got {:?}", other),
    }
}

#[test]
fn test_encode_file_trait_object() {
    let mut boxed: Box<dyn FileLike> = Box::new(MemoryFile::new("dyn.txt", "dyn"));
    let mut form = Form::new();
    Encoder::new(&mut form).encode_file(&mut boxed, "f").unwrap();
    assert_eq!(form.file("f").unwrap().data, b"dyn");
}

#[test]
fn test_file_sequence_fans_out() {
    #[derive(Serialize)]
    struct Gallery {
        photos: Vec<FormFile<MemoryFile>>,
    }

    let gallery = Gallery {
        photos: vec![
            FormFile::new(MemoryFile::new("1.jpg", "one")),
            FormFile::new(MemoryFile::new("2.jpg", "two")),
        ],
    };
    let form = to_form(&gallery).unwrap();

    let names: Vec<_> = form
        .files("photos[]")
        .map(|p| p.file_name.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["1.jpg", "2.jpg"]);
}

#[test]
fn test_absent_file_writes_nothing() {
    #[derive(Serialize)]
    struct Upload {
        avatar: Option<FormFile<MemoryFile>>,
    }

    assert!(to_form(&Upload { avatar: None }).unwrap().is_empty());
}

#[test]
fn test_map_file_with_empty_key_uses_file_name() {
    let map = BTreeMap::from([("", FormFile::new(MemoryFile::new("raw.dat", "raw")))]);
    let form = to_form(&map).unwrap();
    assert_eq!(form.file("raw.dat").unwrap().data, b"raw");
}

#[test]
fn test_file_inside_struct_json_is_its_name() {
    #[derive(Serialize)]
    struct Meta {
        file: FormFile<MemoryFile>,
        caption: &'static str,
    }

    #[derive(Serialize)]
    struct Post {
        meta: Meta,
    }

    let form = to_form(&Post {
        meta: Meta {
            file: FormFile::new(MemoryFile::new("pic.png", "png")),
            caption: "hi",
        },
    })
    .unwrap();
    assert_eq!(
        form.value("meta"),
        Some(r#"{"file":"pic.png","caption":"hi"}"#)
    );
}
