//! Building a multipart upload body from a derived struct.
//!
//! Run with: cargo run --example upload

use serde::Serialize;
use serde_multipart::{
    field_tags, to_form, Encoder, EncoderOptions, FormFile, MemoryFile, MultipartWriter,
};
use std::error::Error;

#[derive(Debug, Serialize)]
struct Track {
    #[serde(rename = "X")]
    position: u32,
    title: String,
}

#[derive(Serialize)]
struct Release {
    artist: String,
    year: u16,
    explicit: bool,
    genres: Vec<String>,
    tracks: Vec<Track>,
    liner_notes: Option<String>,
    cover: FormFile<MemoryFile>,
}

fn release() -> Release {
    Release {
        artist: "Yasha & Masha".to_string(),
        year: 2024,
        explicit: false,
        genres: vec!["purr".to_string(), "ambient".to_string()],
        tracks: vec![
            Track { position: 1, title: "Breakfast".to_string() },
            Track { position: 2, title: "Nap".to_string() },
        ],
        liner_notes: None,
        cover: FormFile::new(MemoryFile::new("cover.png", b"\x89PNG...".to_vec())),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // In-memory parts
    println!("Parts:");
    let form = to_form(&release())?;
    for part in form.parts() {
        match &part.file_name {
            Some(file_name) => println!("  {} <- file {} ({} bytes)", part.name, file_name, part.data.len()),
            None => println!("  {} = {}", part.name, part.text().unwrap_or("<binary>")),
        }
    }

    // Wire format with renamed fields
    let options = EncoderOptions::new().with_field_tags(
        "Release",
        field_tags! {
            "artist" => "release[artist]",
            "year" => "release[year]",
            "genres" => "release[genres]",
            "cover" => "release[cover]",
        },
    );
    let mut writer = MultipartWriter::new(Vec::new(), "----serde-multipart-demo")?;
    let content_type = writer.content_type();
    Encoder::with_options(&mut writer, options).encode(&release())?;
    let body = writer.finish()?;

    println!("\nContent-Type: {}\n", content_type);
    println!("{}", String::from_utf8_lossy(&body));

    Ok(())
}
