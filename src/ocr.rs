//! Text recognition through an external OCR engine.
//!
//! Engines report a JSON array of `[quad, text, confidence]` tuples where
//! `quad` lists the four `[x, y]` corners of the text box.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use geo::{Coord, LineString, Polygon};
use serde::Deserialize;
use tracing::instrument;

use crate::{Error, OcrResult, Result};

pub const DEFAULT_LANGUAGES: &[&str] = &["es", "en"];

/// Recognizes the text on one screenshot.
pub trait TextExtractor: Send + Sync {
    fn recognize(&self, image: &Path) -> Result<Vec<OcrResult>>;
}

#[derive(Debug, Deserialize)]
struct RawDetection(Vec<[f64; 2]>, String, f32);

impl TryFrom<RawDetection> for OcrResult {
    type Error = String;

    fn try_from(RawDetection(corners, text, confidence): RawDetection) -> Result<Self, String> {
        if corners.len() != 4 {
            return Err(format!(
                "text {text:?} has {} corners, expected 4",
                corners.len()
            ));
        }
        let ring = corners
            .into_iter()
            .map(|[x, y]| Coord { x, y })
            .collect::<Vec<_>>();
        Ok(OcrResult {
            bounds: Polygon::new(LineString::new(ring), vec![]),
            text,
            confidence,
        })
    }
}

/// Decodes the tuple array. `Err` carries a description suitable for
/// [`Error::Recognition`].
pub fn parse_detections(data: &str) -> Result<Vec<OcrResult>, String> {
    let raw: Vec<RawDetection> =
        serde_json::from_str(data).map_err(|err| format!("malformed OCR output: {err}"))?;
    raw.into_iter().map(OcrResult::try_from).collect()
}

/// Serves a fixed, previously recorded OCR result for every image.
#[derive(Debug, Clone)]
pub struct JsonExtractor {
    path: PathBuf,
}

impl JsonExtractor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextExtractor for JsonExtractor {
    #[instrument(level = "debug", skip(self))]
    fn recognize(&self, _image: &Path) -> Result<Vec<OcrResult>> {
        let data = fs::read_to_string(&self.path).map_err(|source| Error::ArtifactIo {
            path: self.path.clone(),
            source,
        })?;
        parse_detections(&data)
            .map_err(|message| Error::Recognition(format!("{}: {message}", self.path.display())))
    }
}

/// Runs an OCR program as `<program> [args..] --langs <l1,l2> <image>` and
/// decodes its stdout.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: PathBuf,
    args: Vec<OsString>,
    languages: Vec<String>,
}

impl CommandExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }
}

impl TextExtractor for CommandExtractor {
    #[instrument(level = "debug", skip(self))]
    fn recognize(&self, image: &Path) -> Result<Vec<OcrResult>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("--langs")
            .arg(self.languages.join(","))
            .arg(image)
            .output()
            .map_err(|err| {
                Error::Recognition(format!("failed to run {}: {err}", self.program.display()))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Recognition(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let results = parse_detections(&stdout).map_err(Error::Recognition)?;
        log::debug!("OCR returned {} detections", results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use geo::BoundingRect;

    use super::*;

    #[test]
    fn parses_quad_tuples() {
        let results = parse_detections(
            r#"[
                [[[10, 10], [70, 10], [70, 30], [10, 30]], "Submit", 0.93],
                [[[5.5, 40.0], [90.0, 41.0], [90.0, 60.0], [5.5, 59.0]], "Email", 0.61]
            ]"#,
        )
        .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "Submit");
        assert_eq!(results[0].confidence, 0.93);
        let rect = results[1].bounds.bounding_rect().unwrap();
        assert_eq!((rect.min().x, rect.min().y), (5.5, 40.0));
        assert_eq!((rect.max().x, rect.max().y), (90.0, 60.0));
    }

    #[test]
    fn rejects_wrong_corner_count() {
        let err = parse_detections(r#"[[[[0, 0], [1, 0], [1, 1]], "x", 0.9]]"#).unwrap_err();
        assert!(err.contains("3 corners"), "{err}");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_detections(r#"{"text": "Submit"}"#).unwrap_err();
        assert!(err.starts_with("malformed OCR output"), "{err}");
    }

    #[test]
    fn empty_output_is_no_text() {
        assert!(parse_detections("[]").unwrap().is_empty());
    }

    #[test]
    fn json_extractor_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ocr.json");
        fs::write(&path, r#"[[[[0, 0], [60, 0], [60, 20], [0, 20]], "Login", 0.8]]"#).unwrap();
        let results = JsonExtractor::new(&path)
            .recognize(Path::new("ignored.png"))
            .unwrap();
        assert_eq!(results[0].text, "Login");
    }

    #[test]
    fn missing_program_is_a_recognition_error() {
        let extractor = CommandExtractor::new("/nonexistent/ocr-engine");
        assert!(matches!(
            extractor.recognize(Path::new("shot.png")),
            Err(Error::Recognition(_))
        ));
    }
}
