//! Prescription scanning: OCR plus line heuristics that pre-fill the add form.

use std::io::Write;
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::ScanResult;

/// Words that mark a line as naming a medication.
pub const MEDICATION_MARKERS: &[&str] = &[
    "mg",
    "paracetamol",
    "aspirin",
    "tablet",
    "capsule",
    "vaccine",
    "ativan",
    "dollo",
];

const NAME_MARKERS: &[&str] = &["name", "patient"];

/// Label words, colons and anything that is not a letter or whitespace.
static NAME_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(patient|name|:|[^a-zA-Z\s])").expect("valid name noise pattern")
});

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to launch OCR engine '{command}': {reason}")]
    Launch { command: String, reason: String },

    #[error("OCR processing failed: {0}")]
    Processing(String),

    #[error("Empty upload")]
    EmptyImage,
}

/// OCR engine abstraction (allows mocking for tests)
pub trait OcrEngine: Send + Sync {
    fn extract_text(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Runs the `tesseract` command line tool on a temp copy of the image.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
    args: Vec<String>,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: vec!["--oem".into(), "3".into(), "--psm".into(), "6".into()],
        }
    }

    /// Replace the engine/page-segmentation flags.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl OcrEngine for TesseractCli {
    fn extract_text(&self, image: &[u8]) -> Result<String, OcrError> {
        if image.is_empty() {
            return Err(OcrError::EmptyImage);
        }

        let mut input = tempfile::NamedTempFile::new()?;
        input.write_all(image)?;
        input.flush()?;

        let output = Command::new(&self.command)
            .arg(input.path())
            .arg("stdout")
            .args(&self.args)
            .output()
            .map_err(|e| OcrError::Launch {
                command: self.command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(command = %self.command, "OCR failed: {}", stderr.trim());
            return Err(OcrError::Processing(stderr.trim().to_string()));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(chars = text.len(), "OCR extracted text");
        Ok(text)
    }
}

/// Uppercase the first letter of every run of letters, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Guess patient and medication names from OCR output. Later lines win.
pub fn parse_prescription(text: &str) -> ScanResult {
    let mut result = ScanResult {
        raw_text: text.to_string(),
        ..ScanResult::default()
    };

    for line in text.split('\n') {
        let lowered = line.to_lowercase();
        let lowered = lowered.trim();

        if NAME_MARKERS.iter().any(|m| lowered.contains(m)) {
            let cleaned = NAME_NOISE.replace_all(lowered, "");
            let cleaned = cleaned.trim();
            if cleaned.chars().count() > 2 {
                result.pname = title_case(cleaned);
            }
        }

        if MEDICATION_MARKERS.iter().any(|m| lowered.contains(m)) {
            result.name = line.trim().to_string();
        }
    }

    result
}

/// Run `engine` over an uploaded image and parse the result.
pub fn scan_prescription(engine: &dyn OcrEngine, image: &[u8]) -> Result<ScanResult, OcrError> {
    let text = engine.extract_text(image)?;
    Ok(parse_prescription(&text))
}

/// Canned OCR output for tests.
pub struct MockOcr {
    text: Result<String, String>,
}

impl MockOcr {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Ok(text.into()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            text: Err(reason.into()),
        }
    }
}

impl OcrEngine for MockOcr {
    fn extract_text(&self, _image: &[u8]) -> Result<String, OcrError> {
        self.text.clone().map_err(OcrError::Processing)
    }
}
