//! Health-advice rule engine.
//!
//! Rules run in a fixed order and each contributes independently:
//! expiry → medication → age bracket → risk score → storage → condition.

mod risk;
mod rules;

pub use risk::*;
pub use rules::*;

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{age_on, days_between, parse_date};
use crate::models::PatientRecord;

/// Which rule produced an advice line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdviceKind {
    Expired,
    ExpiryWarning,
    Medication,
    SeniorCare,
    ChildCare,
    RiskAlert,
    RiskStandard,
    Storage,
    Condition,
}

/// One advisory line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdviceItem {
    pub kind: AdviceKind,
    pub text: String,
}

impl AdviceItem {
    fn new(kind: AdviceKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Advice computed for one record snapshot. Never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdviceList {
    pub items: Vec<AdviceItem>,
    /// Set when the risk classifier failed; its line is then omitted
    pub risk_error: Option<String>,
}

impl AdviceList {
    pub fn count(&self, kind: AdviceKind) -> usize {
        self.items.iter().filter(|i| i.kind == kind).count()
    }

    pub fn contains(&self, kind: AdviceKind) -> bool {
        self.count(kind) > 0
    }

    /// Lines joined for the chat widget.
    pub fn to_markup(&self) -> String {
        self.items
            .iter()
            .map(|i| i.text.as_str())
            .collect::<Vec<_>>()
            .join("<br>")
    }
}

/// Produces advice lines for a record.
#[derive(Clone, Default)]
pub struct AdviceEngine {
    risk: Option<Arc<dyn RiskClassifier>>,
}

impl AdviceEngine {
    /// Create an engine. Without a classifier the risk rule is skipped.
    pub fn new(risk: Option<Arc<dyn RiskClassifier>>) -> Self {
        Self { risk }
    }

    pub fn has_risk_model(&self) -> bool {
        self.risk.is_some()
    }

    /// Run every rule against `record` as of `today`.
    pub fn advise(&self, record: &PatientRecord, today: NaiveDate) -> AdviceList {
        let mut advice = AdviceList::default();
        let medication = record.medication.to_lowercase();

        if let Some(expiry) = parse_date(&record.expiry_date) {
            let days_left = days_between(today, expiry);
            if days_left < 0 {
                advice.items.push(AdviceItem::new(AdviceKind::Expired, EXPIRED_ADVICE));
            } else if days_left < EXPIRY_WARNING_DAYS {
                advice
                    .items
                    .push(AdviceItem::new(AdviceKind::ExpiryWarning, expiry_warning(days_left)));
            }
        }

        let drug_text = match_drug_rule(&medication)
            .map(|rule| rule.text)
            .unwrap_or(GENERAL_DRUG_ADVICE);
        advice.items.push(AdviceItem::new(AdviceKind::Medication, drug_text));

        let age = age_on(&record.date_of_birth, today).unwrap_or(DEFAULT_AGE);
        if age > SENIOR_AGE {
            advice.items.push(AdviceItem::new(AdviceKind::SeniorCare, SENIOR_CARE_ADVICE));
        }
        if age < CHILD_AGE {
            advice.items.push(AdviceItem::new(AdviceKind::ChildCare, CHILD_CARE_ADVICE));
        }

        if let Some(classifier) = &self.risk {
            let features = RiskFeatures::from_record(record, age);
            match classifier.predict(&features) {
                Ok(RiskLevel::High) => {
                    advice.items.push(AdviceItem::new(AdviceKind::RiskAlert, HIGH_RISK_ADVICE));
                }
                Ok(RiskLevel::Standard) => {
                    advice
                        .items
                        .push(AdviceItem::new(AdviceKind::RiskStandard, STANDARD_RISK_ADVICE));
                }
                Err(e) => {
                    tracing::warn!(
                        reference = %record.reference_no,
                        error = %e,
                        "Risk prediction failed, omitting risk advice"
                    );
                    advice.risk_error = Some(e.to_string());
                }
            }
        }

        if record.storage.to_lowercase().contains(FRIDGE_MARKER) {
            advice.items.push(AdviceItem::new(AdviceKind::Storage, FRIDGE_ADVICE));
        }

        if let Some(condition) = record.condition() {
            advice
                .items
                .push(AdviceItem::new(AdviceKind::Condition, condition_note(condition)));
        }

        advice
    }
}
