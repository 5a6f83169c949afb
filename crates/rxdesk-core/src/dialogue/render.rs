//! Canned chat answers.

use crate::advice::AdviceList;
use crate::models::PatientRecord;

use super::supply::SupplyStatus;

/// Returned to the user when the language model cannot be reached.
pub const APOLOGY: &str = "I'm having trouble connecting to the AI brain right now. Please check your internet connection.";

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}

/// Patient profile followed by the advice list.
pub fn profile(record: &PatientRecord, advice: &AdviceList) -> String {
    format!(
        "<b>👤 Patient Profile:</b><br>Name: {} (DOB: {})<br>\
         Ref: {} | NHS: {}<br>\
         <b>🩺 Condition:</b> {}<br>\
         Address: {}<br>\
         <b>👨‍⚕️ Assigned Doctor:</b> {}<br>----------------<br>\
         <b>💊 Prescription:</b><br>Tablet: {} (Qty: {})<br>\
         Dose: {} | Daily: {}<br>Issued: {} | Exp: {}\
         <br><br><b>💡 Health & Safety Advice:</b><br>{}",
        record.patient_name,
        record.date_of_birth,
        record.reference_no,
        record.nhs_number,
        or_placeholder(&record.disease, "Not Specified"),
        record.address,
        or_placeholder(&record.doctor, "Not Assigned"),
        record.medication,
        record.tablet_count,
        record.dose,
        record.daily_dose,
        record.issue_date,
        record.expiry_date,
        advice.to_markup(),
    )
}

/// Advice list alone.
pub fn recommendation(record: &PatientRecord, advice: &AdviceList) -> String {
    format!(
        "<b>💡 Advice for {}:</b><br>{}",
        record.patient_name,
        advice.to_markup()
    )
}

pub fn supply(record: &PatientRecord, status: SupplyStatus) -> String {
    match status {
        SupplyStatus::Remaining { days } => format!(
            "📅 {} has approx <b>{} days</b> of medicine left.",
            record.patient_name, days
        ),
        SupplyStatus::Finished => format!(
            "⚠️ Medicine supply for {} has <b>finished</b> (Issued {}).",
            record.patient_name, record.issue_date
        ),
        SupplyStatus::UnknownIssueDate { total_days } => format!(
            "Total supply: {} days (Issue date unknown).",
            total_days
        ),
        SupplyStatus::Incalculable => "Cannot calculate supply (check dose/qty).".to_string(),
    }
}

/// Prefix a language model reply (already converted to markup).
pub fn model_reply(markup: &str) -> String {
    format!("🤖 <b>AI:</b> {}", markup)
}

pub fn not_found(reference: &str) -> String {
    format!("No record found for reference <b>{}</b>.", reference)
}
