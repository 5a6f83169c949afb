//! Prompt templates for the pharmacy chat assistant.

/// Context line used when no patient is attached to the conversation.
pub const NO_PATIENT_CONTEXT: &str = "No specific patient selected from the table.";

/// Closing instruction appended to every chat prompt.
pub const ASSISTANT_INSTRUCTION: &str = "Answer briefly as a medical assistant.";

/// Patient facts forwarded to the model alongside the user's question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientContext {
    pub name: String,
    pub age: Option<i64>,
    pub condition: String,
    pub medicine: String,
    pub dose: String,
    pub reference: String,
}

impl PatientContext {
    /// Render as a single comma-separated line.
    pub fn render(&self) -> String {
        let age = self
            .age
            .map(|a| a.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let condition = if self.condition.trim().is_empty() {
            "Unknown"
        } else {
            self.condition.as_str()
        };

        format!(
            "Patient Name: {}, Age: {}, Condition: {}, Medicine: {}, Dose: {}, RefID: {}",
            self.name, age, condition, self.medicine, self.dose, self.reference
        )
    }
}

/// Build the chat prompt from an optional patient context and the user's text.
pub fn build_chat_prompt(context: Option<&PatientContext>, user_text: &str) -> String {
    let context_line = context
        .map(PatientContext::render)
        .unwrap_or_else(|| NO_PATIENT_CONTEXT.to_string());

    format!(
        "Context: {}\nUser: {}\n{}",
        context_line, user_text, ASSISTANT_INSTRUCTION
    )
}

/// Convert a model reply to the chat widget's markup (newlines become `<br>`).
pub fn reply_to_markup(reply: &str) -> String {
    reply.replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_context() -> PatientContext {
        PatientContext {
            name: "Jane Doe".into(),
            age: Some(70),
            condition: "Hypertension".into(),
            medicine: "Amlodipine".into(),
            dose: "5mg".into(),
            reference: "ref123".into(),
        }
    }

    #[test]
    fn test_prompt_without_patient() {
        let prompt = build_chat_prompt(None, "what is ibuprofen?");
        assert_eq!(
            prompt,
            "Context: No specific patient selected from the table.\nUser: what is ibuprofen?\nAnswer briefly as a medical assistant."
        );
    }

    #[test]
    fn test_prompt_with_patient() {
        let prompt = build_chat_prompt(Some(&sample_context()), "can he drink coffee?");
        assert!(prompt.starts_with("Context: Patient Name: Jane Doe, Age: 70, Condition: Hypertension"));
        assert!(prompt.contains("RefID: ref123"));
        assert!(prompt.contains("User: can he drink coffee?"));
    }

    #[test]
    fn test_context_unknown_fields() {
        let mut context = sample_context();
        context.age = None;
        context.condition = String::new();
        let line = context.render();
        assert!(line.contains("Age: Unknown"));
        assert!(line.contains("Condition: Unknown"));
    }

    #[test]
    fn test_reply_to_markup() {
        assert_eq!(reply_to_markup("a\nb\n\nc"), "a<br>b<br><br>c");
        assert_eq!(reply_to_markup("plain"), "plain");
    }

    proptest! {
        #[test]
        fn prop_markup_has_no_newlines(reply in "[a-z\\n ]{0,40}") {
            prop_assert!(!reply_to_markup(&reply).contains('\n'));
        }

        #[test]
        fn prop_prompt_carries_user_text(text in "[a-zA-Z0-9 ?]{0,40}") {
            let prompt = build_chat_prompt(None, &text);
            let expected = format!("User: {}\n", text);
            prop_assert!(prompt.contains(&expected));
        }
    }
}
