use crate::core::network;
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

/// One pre-timed transcript word. `timestamp` is seconds from song start.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Word {
    pub text: String,
    pub timestamp: f32,
    pub duration: f32,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
pub struct Line {
    #[serde(default)]
    pub words: Vec<Word>,
}

/// The per-song timing document. Immutable once loaded; timestamps are
/// monotonically non-decreasing in source order, which is accepted but not
/// enforced (judging only ever looks at per-note absolute deltas).
///
/// Field aliases accept the legacy document shape (`songNumber`, `audioUrl`,
/// `lyrics`) so both generations of timing files parse.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TimingData {
    #[serde(rename = "songId", alias = "songNumber")]
    pub song_id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "audioRef", alias = "audioUrl")]
    pub audio_ref: String,
    #[serde(rename = "lines", alias = "lyrics")]
    pub lines: Vec<Line>,
}

impl TimingData {
    /// Total word count across all lines; the note count a round will get.
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|line| line.words.len()).sum()
    }
}

/// Why a timing document could not be produced. A round must not proceed
/// past loading on any of these; the host decides how to surface them.
#[derive(Debug)]
pub enum TimingError {
    Io(std::io::Error),
    Http(String),
    Status(u16),
    Parse(serde_json::Error),
}

impl fmt::Display for TimingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingError::Io(e) => write!(f, "failed to read timing document: {e}"),
            TimingError::Http(e) => write!(f, "failed to fetch timing document: {e}"),
            TimingError::Status(code) => {
                write!(f, "timing document request returned status {code}")
            }
            TimingError::Parse(e) => write!(f, "malformed timing document: {e}"),
        }
    }
}

impl Error for TimingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TimingError::Io(e) => Some(e),
            TimingError::Parse(e) => Some(e),
            TimingError::Http(_) | TimingError::Status(_) => None,
        }
    }
}

fn finish_load(raw: &str, origin: &str) -> Result<TimingData, TimingError> {
    let data: TimingData = serde_json::from_str(raw).map_err(TimingError::Parse)?;
    if data.lines.is_empty() {
        warn!("Timing document from {origin} has no lyric lines.");
    }
    info!(
        "Loaded timing for song {} ({} words) from {origin}",
        data.song_id,
        data.word_count()
    );
    Ok(data)
}

/// Reads a timing document from disk.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<TimingData, TimingError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(TimingError::Io)?;
    finish_load(&raw, &path.display().to_string())
}

/// Fetches a timing document over HTTP.
pub fn fetch(url: &str) -> Result<TimingData, TimingError> {
    let agent = network::get_agent();
    let response = agent
        .get(url)
        .call()
        .map_err(|e| TimingError::Http(e.to_string()))?;

    if response.status() != 200 {
        return Err(TimingError::Status(response.status().as_u16()));
    }

    let raw = response
        .into_body()
        .read_to_string()
        .map_err(|e| TimingError::Http(e.to_string()))?;
    finish_load(&raw, url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_current_document_shape() {
        let doc = r#"{
            "songId": 7,
            "title": "Los Colores",
            "audioRef": "https://cdn.example/songs/7.mp3",
            "lines": [
                { "words": [
                    { "text": "rojo", "timestamp": 1.2, "duration": 0.4 },
                    { "text": "azul", "timestamp": 1.9, "duration": 0.5 }
                ]},
                { "words": [
                    { "text": "verde", "timestamp": 3.0, "duration": 0.6 }
                ]}
            ]
        }"#;
        let data: TimingData = serde_json::from_str(doc).expect("document should parse");
        assert_eq!(data.song_id, 7);
        assert_eq!(data.title, "Los Colores");
        assert_eq!(data.word_count(), 3);
        assert_eq!(data.lines[0].words[1].text, "azul");
    }

    #[test]
    fn accepts_the_legacy_field_names() {
        let doc = r#"{
            "songNumber": 3,
            "audioUrl": "https://cdn.example/songs/3.mp3",
            "lyrics": [ { "words": [
                { "text": "hola", "timestamp": 0.5, "duration": 0.3 }
            ]}]
        }"#;
        let data: TimingData = serde_json::from_str(doc).expect("legacy document should parse");
        assert_eq!(data.song_id, 3);
        assert_eq!(data.audio_ref, "https://cdn.example/songs/3.mp3");
        assert_eq!(data.word_count(), 1);
        assert_eq!(data.title, "");
    }

    #[test]
    fn an_empty_lyric_list_is_valid() {
        let doc = r#"{ "songId": 1, "audioRef": "x", "lines": [] }"#;
        let data: TimingData = serde_json::from_str(doc).expect("empty lyrics are not an error");
        assert_eq!(data.word_count(), 0);
    }

    #[test]
    fn missing_file_surfaces_an_io_error() {
        let err = load_file("definitely/not/here.json").expect_err("path does not exist");
        assert!(matches!(err, TimingError::Io(_)), "got {err:?}");
    }

    #[test]
    fn garbage_surfaces_a_parse_error() {
        let err = finish_load("not json at all", "test").expect_err("not a document");
        assert!(matches!(err, TimingError::Parse(_)), "got {err:?}");
    }
}
