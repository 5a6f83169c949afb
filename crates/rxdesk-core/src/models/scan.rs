//! Prescription scan output.

use serde::{Deserialize, Serialize};

/// Fields pre-filled from a photographed prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ScanResult {
    /// Patient name guessed from the text
    pub pname: String,
    /// Medication line guessed from the text
    pub name: String,
    /// Full OCR output
    pub raw_text: String,
}
