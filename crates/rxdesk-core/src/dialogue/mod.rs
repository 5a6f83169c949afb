//! Dialogue responder.
//!
//! Deterministic intents are answered from the record store; everything else
//! is forwarded to the language model with whatever patient context the
//! conversation carries.

pub mod render;
mod supply;

pub use supply::*;

use std::sync::Arc;

use chrono::NaiveDate;
use rxdesk_llm::{build_chat_prompt, reply_to_markup, LanguageModel, LlmError, PatientContext};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::advice::AdviceEngine;
use crate::dates::age_on;
use crate::db::{Database, DbError};
use crate::models::{ChatReply, ChatTurn, Intent, PatientRecord};
use crate::nlu::IntentClassifier;

/// Dialogue errors.
#[derive(Error, Debug)]
pub enum DialogueError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),
}

pub type DialogueResult<T> = Result<T, DialogueError>;

/// What to do when a lookup intent names a reference with no record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingRecordPolicy {
    /// Forward the message to the language model
    #[default]
    FallThrough,
    /// Answer with a "no record found" message
    Report,
}

/// Answers chat turns.
pub struct Responder {
    classifier: IntentClassifier,
    advice: AdviceEngine,
    llm: Arc<dyn LanguageModel>,
    missing_records: MissingRecordPolicy,
}

impl Responder {
    pub fn new(advice: AdviceEngine, llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            advice,
            llm,
            missing_records: MissingRecordPolicy::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_missing_record_policy(mut self, policy: MissingRecordPolicy) -> Self {
        self.missing_records = policy;
        self
    }

    pub fn advice_engine(&self) -> &AdviceEngine {
        &self.advice
    }

    /// Answer one chat turn as of `today`.
    pub fn respond(
        &self,
        db: &Database,
        turn: &ChatTurn,
        today: NaiveDate,
    ) -> DialogueResult<ChatReply> {
        let classification = self
            .classifier
            .classify(&turn.message, turn.context_reference());

        if let (true, Some(reference)) = (
            classification.intent.is_deterministic(),
            classification.reference.as_deref(),
        ) {
            match db.get_record(reference)? {
                Some(record) => {
                    return Ok(self.answer_from_record(classification.intent, &record, today))
                }
                None => match self.missing_records {
                    MissingRecordPolicy::Report => {
                        return Ok(ChatReply::text(render::not_found(reference)));
                    }
                    MissingRecordPolicy::FallThrough => {
                        tracing::debug!(
                            reference,
                            intent = classification.intent.as_str(),
                            "No record for reference, asking language model"
                        );
                    }
                },
            }
        }

        self.ask_model(db, turn, today)
    }

    fn answer_from_record(
        &self,
        intent: Intent,
        record: &PatientRecord,
        today: NaiveDate,
    ) -> ChatReply {
        match intent {
            Intent::Supply => {
                let status = supply_status(record, today);
                ChatReply::text(render::supply(record, status))
                    .with_reference(record.reference_no.clone())
            }
            Intent::Recommend => {
                let advice = self.advice.advise(record, today);
                ChatReply::text(render::recommendation(record, &advice))
            }
            Intent::ShowPatient | Intent::GeneralChat => {
                let advice = self.advice.advise(record, today);
                ChatReply::text(render::profile(record, &advice))
            }
        }
    }

    fn ask_model(
        &self,
        db: &Database,
        turn: &ChatTurn,
        today: NaiveDate,
    ) -> DialogueResult<ChatReply> {
        let context = match turn.context_reference() {
            Some(reference) => db
                .get_record(reference)?
                .map(|record| patient_context(&record, today)),
            None => None,
        };

        let prompt = build_chat_prompt(context.as_ref(), &turn.message);
        let reply = self.llm.generate(&prompt)?;

        Ok(ChatReply::text(render::model_reply(&reply_to_markup(&reply))))
    }
}

fn patient_context(record: &PatientRecord, today: NaiveDate) -> PatientContext {
    PatientContext {
        name: record.patient_name.clone(),
        age: age_on(&record.date_of_birth, today),
        condition: record.disease.clone(),
        medicine: record.medication.clone(),
        dose: record.dose.clone(),
        reference: record.reference_no.clone(),
    }
}
