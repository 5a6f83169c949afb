//! Keyword-rule intent classification.
//!
//! Rules are evaluated top to bottom and the first match wins, so the order of
//! [`IntentClassifier::default_rules`] is the tie-break policy:
//! show > supply > recommend > bare identifier > general chat.

use crate::models::Intent;

use super::identifier::IdentifierExtractor;

pub const SHOW_KEYWORDS: &[&str] = &[
    "show", "details", "display", "info", "tell me", "about", "give me", "status", "who is",
];

pub const SUPPLY_KEYWORDS: &[&str] = &["supply", "days left", "stock", "how many", "remain"];

pub const ADVICE_KEYWORDS: &[&str] = &[
    "recommend", "advice", "health", "risk", "safe", "what to do",
];

/// Words that make an identifier-only message small talk rather than a lookup.
pub const SMALL_TALK_WORDS: &[&str] = &["hi", "hello", "help", "thanks"];

/// When a rule fires. Every rule also requires a resolved identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleCondition {
    /// Lower-cased text contains any of these phrases
    AnyKeyword(&'static [&'static str]),
    /// Text contains none of the small-talk words
    NotSmallTalk,
}

/// One row of the ordered decision list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRule {
    pub intent: Intent,
    pub condition: RuleCondition,
}

impl IntentRule {
    pub const fn new(intent: Intent, condition: RuleCondition) -> Self {
        Self { intent, condition }
    }

    fn matches(&self, lowered: &str) -> bool {
        match &self.condition {
            RuleCondition::AnyKeyword(keywords) => keywords.iter().any(|k| lowered.contains(k)),
            RuleCondition::NotSmallTalk => !is_small_talk(lowered),
        }
    }
}

/// Whole-word check so that "his" or "this" do not count as "hi".
fn is_small_talk(lowered: &str) -> bool {
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| SMALL_TALK_WORDS.contains(&word))
}

/// Classifier output: the intent plus whatever identifier was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub intent: Intent,
    pub reference: Option<String>,
}

/// Labels a chat message with an [`Intent`].
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    extractor: IdentifierExtractor,
    rules: Vec<IntentRule>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentClassifier {
    /// Create a classifier with the default rule table.
    pub fn new() -> Self {
        Self::with_rules(Self::default_rules())
    }

    /// Create a classifier with a custom rule table.
    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self {
            extractor: IdentifierExtractor::new(),
            rules,
        }
    }

    /// Default ordered decision list.
    pub fn default_rules() -> Vec<IntentRule> {
        vec![
            IntentRule::new(Intent::ShowPatient, RuleCondition::AnyKeyword(SHOW_KEYWORDS)),
            IntentRule::new(Intent::Supply, RuleCondition::AnyKeyword(SUPPLY_KEYWORDS)),
            IntentRule::new(Intent::Recommend, RuleCondition::AnyKeyword(ADVICE_KEYWORDS)),
            IntentRule::new(Intent::ShowPatient, RuleCondition::NotSmallTalk),
        ]
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Classify `text`, using `context_ref` when the text names no identifier.
    pub fn classify(&self, text: &str, context_ref: Option<&str>) -> Classification {
        let lowered = text.to_lowercase();
        let lowered = lowered.trim();
        let reference = self.extractor.resolve(lowered, context_ref);

        let intent = match reference {
            Some(_) => self
                .rules
                .iter()
                .find(|rule| rule.matches(lowered))
                .map(|rule| rule.intent)
                .unwrap_or(Intent::GeneralChat),
            None => Intent::GeneralChat,
        };

        tracing::debug!(intent = intent.as_str(), reference = ?reference, "Classified chat message");

        Classification { intent, reference }
    }
}
