//! Chat turn models.

use serde::{Deserialize, Serialize};

/// Purpose of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Show the patient's profile and advice
    ShowPatient,
    /// Report remaining days of medication supply
    Supply,
    /// Show health advice only
    Recommend,
    /// Anything else; answered by the language model
    GeneralChat,
}

impl Intent {
    /// Whether this intent is answered from the record store.
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, Intent::GeneralChat)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::ShowPatient => "show_patient",
            Intent::Supply => "supply",
            Intent::Recommend => "recommend",
            Intent::GeneralChat => "general_chat",
        }
    }
}

/// One incoming chat message. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ChatTurn {
    #[serde(default)]
    pub message: String,
    /// Reference carried over from the previous turn
    #[serde(default)]
    pub context_ref: Option<String>,
}

impl ChatTurn {
    pub fn new(message: impl Into<String>, context_ref: Option<&str>) -> Self {
        Self {
            message: message.into(),
            context_ref: context_ref.map(str::to_string),
        }
    }

    /// Carried-over reference, treating blank strings as absent.
    pub fn context_reference(&self) -> Option<&str> {
        self.context_ref
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

/// Answer returned to the chat widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none", default)]
    pub reference: Option<String>,
}

impl ChatReply {
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}
