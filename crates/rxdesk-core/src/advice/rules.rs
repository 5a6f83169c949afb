//! Static advice rule tables.

/// Expiry closer than this many days triggers a warning.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

/// Age used when the date of birth cannot be parsed.
pub const DEFAULT_AGE: i64 = 30;

/// Patients older than this get the senior-care note.
pub const SENIOR_AGE: i64 = 60;

/// Patients younger than this get the child-care note.
pub const CHILD_AGE: i64 = 12;

/// Storage text that triggers the refrigeration note.
pub const FRIDGE_MARKER: &str = "fridge";

/// Medication-name substrings marking an antibiotic (risk feature).
pub const ANTIBIOTIC_MARKERS: &[&str] = &["cillin", "mycin", "oxacin", "corona"];

/// Medication-name substrings marking a painkiller (risk feature).
pub const PAINKILLER_MARKERS: &[&str] = &["pain", "acetaminophen", "dol", "fenac"];

/// A medication-specific note, fired when the lower-cased name contains any marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrugRule {
    pub markers: &'static [&'static str],
    pub text: &'static str,
}

/// Ordered; the first matching rule wins.
pub const DRUG_RULES: &[DrugRule] = &[
    DrugRule {
        markers: &["corona", "vaccine"],
        text: "💉 <b>Vaccine Care:</b> Mild fever is normal. Rest for 2 days.",
    },
    DrugRule {
        markers: &["acetaminophen"],
        text: "💊 <b>Pain/Fever:</b> Take after food. Do not exceed dose.",
    },
    DrugRule {
        markers: &["adderall"],
        text: "🧠 <b>Focus:</b> Take early to avoid insomnia.",
    },
    DrugRule {
        markers: &["amlodipine"],
        text: "❤️ <b>BP Meds:</b> Avoid sudden standing.",
    },
    DrugRule {
        markers: &["ativan"],
        text: "💤 <b>Anxiety/Sleep:</b> May cause drowsiness. Do not drive.",
    },
    DrugRule {
        markers: &["paracetamol", "dollo"],
        text: "🌡️ <b>Fever:</b> Monitor temperature. Gap of 6 hours between doses.",
    },
];

/// Used when no [`DRUG_RULES`] entry matches.
pub const GENERAL_DRUG_ADVICE: &str = "ℹ️ <b>General:</b> Complete the full course.";

pub const EXPIRED_ADVICE: &str = "🔴 <b>CRITICAL:</b> Medicine EXPIRED! Do not consume.";
pub const SENIOR_CARE_ADVICE: &str =
    "👴 <b>Senior Care:</b> Drink water frequently, watch for dizziness.";
pub const CHILD_CARE_ADVICE: &str = "👶 <b>Child Care:</b> Ensure dosage is strictly by weight.";
pub const HIGH_RISK_ADVICE: &str = "🤖 <b>AI RISK ALERT:</b> High-risk dosage pattern detected for this age group. Verify with doctor.";
pub const STANDARD_RISK_ADVICE: &str =
    "🤖 <b>AI Analysis:</b> Dosage looks standard for this patient profile.";
pub const FRIDGE_ADVICE: &str = "❄️ <b>Storage:</b> Keep Refrigerated.";

pub fn expiry_warning(days_left: i64) -> String {
    format!("⚠️ <b>Expiry Warning:</b> Expires in {} days.", days_left)
}

pub fn condition_note(condition: &str) -> String {
    format!("🩺 <b>Condition Note:</b> Managing {}.", condition)
}

/// First drug rule matching a lower-cased medication name.
pub fn match_drug_rule(medication_lower: &str) -> Option<&'static DrugRule> {
    DRUG_RULES
        .iter()
        .find(|rule| rule.markers.iter().any(|m| medication_lower.contains(m)))
}

/// Whether a lower-cased name contains any of `markers`.
pub fn contains_any(name_lower: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| name_lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_rule_wins() {
        // "corona vaccine paracetamol" hits the vaccine rule before paracetamol
        let rule = match_drug_rule("corona vaccine paracetamol").unwrap();
        assert!(rule.text.contains("Vaccine Care"));
    }

    #[test]
    fn test_dollo_alias() {
        let rule = match_drug_rule("dollo 650").unwrap();
        assert!(rule.text.contains("Gap of 6 hours"));
    }

    #[test]
    fn test_no_match() {
        assert!(match_drug_rule("metformin").is_none());
    }

    #[test]
    fn test_markers() {
        assert!(contains_any("amoxicillin", ANTIBIOTIC_MARKERS));
        assert!(contains_any("diclofenac", PAINKILLER_MARKERS));
        assert!(!contains_any("amlodipine", ANTIBIOTIC_MARKERS));
    }

    #[test]
    fn test_formatted_notes() {
        assert_eq!(expiry_warning(10), "⚠️ <b>Expiry Warning:</b> Expires in 10 days.");
        assert_eq!(condition_note("Asthma"), "🩺 <b>Condition Note:</b> Managing Asthma.");
    }
}
