use serde::Serialize;
use serde_multipart::{to_writer, Encoder, ErrorKind, FormFile, MemoryFile, MultipartWriter};

#[derive(Serialize)]
struct Avatar {
    user: &'static str,
    tags: Vec<&'static str>,
    image: FormFile<MemoryFile>,
    note: Option<&'static str>,
}

#[test]
fn test_full_body() {
    let avatar = Avatar {
        user: "masha",
        tags: vec!["cat", "grey"],
        image: FormFile::new(MemoryFile::new("masha.png", "PNG")),
        note: None,
    };
    let body = to_writer(Vec::new(), "----cats", &avatar).unwrap();

    let expected = concat!(
        "------cats\r\n",
        "Content-Disposition: form-data; name=\"user\"\r\n",
        "\r\n",
        "masha\r\n",
        "------cats\r\n",
        "Content-Disposition: form-data; name=\"tags[]\"\r\n",
        "\r\n",
        "cat\r\n",
        "------cats\r\n",
        "Content-Disposition: form-data; name=\"tags[]\"\r\n",
        "\r\n",
        "grey\r\n",
        "------cats\r\n",
        "Content-Disposition: form-data; name=\"image\"; filename=\"masha.png\"\r\n",
        "Content-Type: application/octet-stream\r\n",
        "\r\n",
        "PNG\r\n",
        "------cats--\r\n",
    );
    assert_eq!(String::from_utf8(body).unwrap(), expected);
}

#[test]
fn test_streamed_file_between_fields() {
    let mut writer = MultipartWriter::new(Vec::new(), "b").unwrap();
    let mut file = MemoryFile::new("log.txt", "line\n");
    {
        let mut encoder = Encoder::new(&mut writer);
        encoder.encode_field(&1, "before").unwrap();
        encoder.encode_file(&mut file, "log").unwrap();
        encoder.encode_field(&2, "after").unwrap();
    }
    let body = String::from_utf8(writer.finish().unwrap()).unwrap();

    assert!(body.starts_with("--b\r\nContent-Disposition: form-data; name=\"before\"\r\n\r\n1\r\n"));
    assert!(body.contains("filename=\"log.txt\"\r\nContent-Type: application/octet-stream\r\n\r\nline\n\r\n--b\r\n"));
    assert!(body.ends_with("name=\"after\"\r\n\r\n2\r\n--b--\r\n"));
}

#[test]
fn test_json_field_on_the_wire() {
    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize)]
    struct Shape {
        points: Vec<Point>,
    }

    let body = to_writer(
        Vec::new(),
        "b",
        &Shape {
            points: vec![Point { x: 0, y: 1 }],
        },
    )
    .unwrap();
    assert_eq!(
        String::from_utf8(body).unwrap(),
        "--b\r\nContent-Disposition: form-data; name=\"points\"\r\n\r\n[{\"x\":0,\"y\":1}]\r\n--b--\r\n"
    );
}

#[test]
fn test_quotes_in_names_are_escaped() {
    let mut writer = MultipartWriter::new(Vec::new(), "b").unwrap();
    Encoder::new(&mut writer)
        .encode_field(&"v", "say \"hi\"")
        .unwrap();
    let body = String::from_utf8(writer.finish().unwrap()).unwrap();
    assert!(body.contains("name=\"say \\\"hi\\\"\""));
}

#[test]
fn test_bad_boundary() {
    let err = MultipartWriter::new(Vec::new(), "semi;colon").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
}

#[test]
fn test_content_type_header() {
    let writer = MultipartWriter::new(Vec::new(), "abc").unwrap();
    assert_eq!(writer.boundary(), "abc");
    assert_eq!(writer.content_type(), "multipart/form-data; boundary=abc");
}
