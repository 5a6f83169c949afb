//! Dosage-pattern risk scoring with a pre-trained decision tree.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rules::{contains_any, ANTIBIOTIC_MARKERS, PAINKILLER_MARKERS};
use crate::models::PatientRecord;

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 4;

/// Bundled model fitted to the reference training rows.
const DEFAULT_MODEL_JSON: &str = include_str!("../../models/risk_tree.json");

static FIRST_INTEGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("valid integer pattern"));

/// Risk scoring errors.
#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Cannot read risk model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Risk model JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid risk model: {0}")]
    InvalidModel(String),

    #[error("Risk inference error: {0}")]
    Inference(String),
}

pub type RiskResult<T> = Result<T, RiskError>;

/// Classifier output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Standard,
    High,
}

/// Feature vector: `[age, daily_dose, is_antibiotic, is_painkiller]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskFeatures {
    pub age: i64,
    pub daily_dose: i64,
    pub is_antibiotic: bool,
    pub is_painkiller: bool,
}

impl RiskFeatures {
    /// Build features for a record. `daily_dose` is the first integer in the
    /// field, or 1 when there is none.
    pub fn from_record(record: &PatientRecord, age: i64) -> Self {
        let medication = record.medication.to_lowercase();
        let daily_dose = FIRST_INTEGER
            .find(&record.daily_dose)
            .and_then(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(1);

        Self {
            age,
            daily_dose,
            is_antibiotic: contains_any(&medication, ANTIBIOTIC_MARKERS),
            is_painkiller: contains_any(&medication, PAINKILLER_MARKERS),
        }
    }

    pub fn as_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.age as f64,
            self.daily_dose as f64,
            if self.is_antibiotic { 1.0 } else { 0.0 },
            if self.is_painkiller { 1.0 } else { 0.0 },
        ]
    }
}

/// A pre-trained binary classifier over [`RiskFeatures`].
pub trait RiskClassifier: Send + Sync {
    fn predict(&self, features: &RiskFeatures) -> RiskResult<RiskLevel>;
}

/// Decision tree node, addressed by index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go `left` when `features[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: u8,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct TreeFile {
    nodes: Vec<TreeNode>,
}

/// Binary decision tree loaded from JSON.
///
/// Children always have a higher index than their parent, so every walk from
/// the root terminates.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Build and validate a tree from nodes; node 0 is the root.
    pub fn new(nodes: Vec<TreeNode>) -> RiskResult<Self> {
        if nodes.is_empty() {
            return Err(RiskError::InvalidModel("tree has no nodes".into()));
        }

        for (index, node) in nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(RiskError::InvalidModel(format!(
                            "node {} uses feature {} (max {})",
                            index,
                            feature,
                            FEATURE_COUNT - 1
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(RiskError::InvalidModel(format!(
                            "node {} has non-finite threshold",
                            index
                        )));
                    }
                    for child in [left, right] {
                        if child <= index || child >= nodes.len() {
                            return Err(RiskError::InvalidModel(format!(
                                "node {} has invalid child {}",
                                index, child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { class } => {
                    if class > 1 {
                        return Err(RiskError::InvalidModel(format!(
                            "node {} has non-binary class {}",
                            index, class
                        )));
                    }
                }
            }
        }

        Ok(Self { nodes })
    }

    /// Parse a `{"nodes": [...]}` document.
    pub fn from_json(json: &str) -> RiskResult<Self> {
        let file: TreeFile = serde_json::from_str(json)?;
        Self::new(file.nodes)
    }

    /// Load a model file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> RiskResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The bundled default model.
    pub fn bundled() -> RiskResult<Self> {
        Self::from_json(DEFAULT_MODEL_JSON)
    }

    pub fn to_json(&self) -> RiskResult<String> {
        let file = TreeFile {
            nodes: self.nodes.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl RiskClassifier for DecisionTree {
    fn predict(&self, features: &RiskFeatures) -> RiskResult<RiskLevel> {
        let vector = features.as_vector();
        let mut index = 0;

        loop {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| RiskError::Inference(format!("node {} out of range", index)))?;

            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if vector[feature] <= threshold { left } else { right };
                }
                TreeNode::Leaf { class: 0 } => return Ok(RiskLevel::Standard),
                TreeNode::Leaf { class: 1 } => return Ok(RiskLevel::High),
                TreeNode::Leaf { class } => {
                    return Err(RiskError::Inference(format!("unexpected class {}", class)))
                }
            }
        }
    }
}
