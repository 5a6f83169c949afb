//! RxDesk Core Library
//!
//! Hospital-pharmacy record store with a chat-style query interface.
//!
//! # Architecture
//!
//! ```text
//! chat text ──► IdentifierExtractor ──► IntentClassifier
//!                                            │
//!                  ┌─────────────────────────┴──────────────┐
//!                  │ show / supply / recommend              │ general chat
//!                  ▼                                        ▼
//!            record lookup ──(missing)──────────────► LanguageModel
//!                  │                                        │
//!                  ▼                                        │
//!     profile / supply / AdviceEngine                       │
//!                  │                                        │
//!                  └──────────────► ChatReply ◄─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite record store, one connection per request
//! - [`models`]: Domain types (PatientRecord, RecordForm, ChatTurn, etc.)
//! - [`dates`]: The four accepted date formats
//! - [`nlu`]: Identifier extraction and the ordered intent rule table
//! - [`advice`]: Health-advice rules and the decision-tree risk classifier
//! - [`dialogue`]: Chat responder and canned answers
//! - [`prescription`]: OCR of uploaded prescriptions
//! - [`roster`]: Doctor availability

pub mod advice;
pub mod dates;
pub mod db;
pub mod dialogue;
pub mod models;
pub mod nlu;
pub mod prescription;
pub mod roster;

// Re-export commonly used types
pub use advice::{AdviceEngine, AdviceList, DecisionTree, RiskClassifier};
pub use db::Database;
pub use dialogue::{MissingRecordPolicy, Responder};
pub use models::{ChatReply, ChatTurn, Intent, PatientRecord, RecordForm, ScanResult};
pub use nlu::{IdentifierExtractor, IntentClassifier};
pub use prescription::{OcrEngine, TesseractCli};
pub use roster::DoctorRoster;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =========================================================================
// Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum RxDeskError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Language model error: {0}")]
    LanguageModelError(String),

    #[error("OCR error: {0}")]
    OcrError(String),
}

pub type RxDeskResult<T> = Result<T, RxDeskError>;

impl From<db::DbError> for RxDeskError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Constraint(msg) => RxDeskError::Conflict(msg),
            other => RxDeskError::DatabaseError(other.to_string()),
        }
    }
}

impl From<dialogue::DialogueError> for RxDeskError {
    fn from(e: dialogue::DialogueError) -> Self {
        match e {
            dialogue::DialogueError::Database(e) => e.into(),
            dialogue::DialogueError::Llm(e) => RxDeskError::LanguageModelError(e.to_string()),
        }
    }
}

impl From<prescription::OcrError> for RxDeskError {
    fn from(e: prescription::OcrError) -> Self {
        RxDeskError::OcrError(e.to_string())
    }
}

// =========================================================================
// Main API Object
// =========================================================================

/// Everything the record listing page shows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    pub patients: Vec<PatientRecord>,
    pub doctors: Vec<String>,
}

/// The pharmacy desk: record operations, chat and prescription scanning.
///
/// Every call opens its own [`Database`] connection on `db_path`, so one
/// instance can be shared across request handlers.
pub struct RecordDesk {
    db_path: PathBuf,
    responder: Responder,
    ocr: Arc<dyn OcrEngine>,
    roster: DoctorRoster,
}

impl RecordDesk {
    pub fn new(db_path: impl Into<PathBuf>, responder: Responder, ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            db_path: db_path.into(),
            responder,
            ocr,
            roster: DoctorRoster::default(),
        }
    }

    pub fn with_roster(mut self, roster: DoctorRoster) -> Self {
        self.roster = roster;
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn open_database(&self) -> RxDeskResult<Database> {
        Ok(Database::open(&self.db_path)?)
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// All records plus doctor availability.
    pub fn listing(&self) -> RxDeskResult<Listing> {
        let db = self.open_database()?;
        let patients = db.list_records()?;
        let doctors = self.roster.statuses(&patients);
        Ok(Listing { patients, doctors })
    }

    pub fn add_record(&self, form: RecordForm) -> RxDeskResult<()> {
        form.validate().map_err(RxDeskError::InvalidInput)?;
        let db = self.open_database()?;
        db.insert_record(&form.into())?;
        Ok(())
    }

    /// Overwrite the record named by `form.ref`.
    pub fn update_record(&self, form: RecordForm) -> RxDeskResult<()> {
        form.validate().map_err(RxDeskError::InvalidInput)?;
        let db = self.open_database()?;
        let reference = form.reference.clone();
        if !db.update_record(&form.into())? {
            return Err(RxDeskError::NotFound(reference));
        }
        Ok(())
    }

    pub fn delete_record(&self, reference: &str) -> RxDeskResult<()> {
        let db = self.open_database()?;
        if !db.delete_record(reference)? {
            return Err(RxDeskError::NotFound(reference.to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Chat & Scanning
    // =========================================================================

    pub fn chat(&self, turn: &ChatTurn, today: NaiveDate) -> RxDeskResult<ChatReply> {
        let db = self.open_database()?;
        Ok(self.responder.respond(&db, turn, today)?)
    }

    pub fn scan_prescription(&self, image: &[u8]) -> RxDeskResult<ScanResult> {
        Ok(prescription::scan_prescription(self.ocr.as_ref(), image)?)
    }
}
