//! Patient medication records.

use serde::{Deserialize, Serialize};

/// One patient/medication row.
///
/// Fields are kept as the text staff entered; numeric and date fields are
/// parsed on demand by the supply calculator and the advice rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PatientRecord {
    /// Reference number (unique key)
    pub reference_no: String,
    /// Patient name
    pub patient_name: String,
    /// Date of birth
    pub date_of_birth: String,
    /// Home address
    pub address: String,
    /// NHS number
    pub nhs_number: String,
    /// Assigned doctor, optionally suffixed with " - <status>"
    pub doctor: String,
    /// Medication name
    pub medication: String,
    /// Dose per administration (e.g. "500mg")
    pub dose: String,
    /// Tablets taken per day
    pub daily_dose: String,
    /// Tablets dispensed
    pub tablet_count: String,
    /// Lot number
    pub lot: String,
    /// Date the medication was issued
    pub issue_date: String,
    /// Medication expiry date
    pub expiry_date: String,
    /// Storage requirement (e.g. "Fridge")
    pub storage: String,
    /// Free-text condition
    #[serde(default)]
    pub disease: String,
}

impl PatientRecord {
    /// Condition text, if any was entered.
    pub fn condition(&self) -> Option<&str> {
        let trimmed = self.disease.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Doctor name with any trailing " - status" removed.
    pub fn doctor_name(&self) -> &str {
        self.doctor
            .split(" - ")
            .next()
            .unwrap_or_default()
            .trim()
    }
}

/// Add/update form payload, using the field names of the pharmacy form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordForm {
    /// Medication name
    pub name: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub dose: String,
    pub no_of_tablets: String,
    pub lot: String,
    pub issue_date: String,
    pub exp_date: String,
    pub daily_dose: String,
    pub storage: String,
    pub nhs: String,
    /// Patient name
    pub pname: String,
    pub dob: String,
    pub address: String,
    pub doctor: String,
    #[serde(default)]
    pub disease: String,
}

impl RecordForm {
    /// Reject forms without a usable reference number.
    pub fn validate(&self) -> Result<(), String> {
        if self.reference.trim().is_empty() {
            return Err("Reference number is required".to_string());
        }
        Ok(())
    }
}

impl From<RecordForm> for PatientRecord {
    fn from(form: RecordForm) -> Self {
        Self {
            reference_no: form.reference,
            patient_name: form.pname,
            date_of_birth: form.dob,
            address: form.address,
            nhs_number: form.nhs,
            doctor: form.doctor,
            medication: form.name,
            dose: form.dose,
            daily_dose: form.daily_dose,
            tablet_count: form.no_of_tablets,
            lot: form.lot,
            issue_date: form.issue_date,
            expiry_date: form.exp_date,
            storage: form.storage,
            disease: form.disease,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> RecordForm {
        RecordForm {
            name: "Paracetamol 500mg".into(),
            reference: "ref123".into(),
            dose: "500mg".into(),
            no_of_tablets: "30".into(),
            lot: "L-77".into(),
            issue_date: "01-10-2026".into(),
            exp_date: "01-10-2027".into(),
            daily_dose: "2".into(),
            storage: "Room temperature".into(),
            nhs: "943 476 5919".into(),
            pname: "Jane Doe".into(),
            dob: "12-03-1956".into(),
            address: "1 High Street".into(),
            doctor: "Dr. A. Smith (Cardiology)".into(),
            disease: "Fever".into(),
        }
    }

    #[test]
    fn test_form_to_record() {
        let record: PatientRecord = sample_form().into();
        assert_eq!(record.reference_no, "ref123");
        assert_eq!(record.patient_name, "Jane Doe");
        assert_eq!(record.medication, "Paracetamol 500mg");
        assert_eq!(record.tablet_count, "30");
        assert_eq!(record.expiry_date, "01-10-2027");
    }

    #[test]
    fn test_form_disease_optional() {
        let json = r#"{"name":"x","ref":"r1","dose":"","no_of_tablets":"","lot":"","issue_date":"","exp_date":"","daily_dose":"","storage":"","nhs":"","pname":"","dob":"","address":"","doctor":""}"#;
        let form: RecordForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.disease, "");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_form_requires_reference() {
        let mut form = sample_form();
        form.reference = "  ".into();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_condition() {
        let mut record: PatientRecord = sample_form().into();
        assert_eq!(record.condition(), Some("Fever"));
        record.disease = "   ".into();
        assert_eq!(record.condition(), None);
    }

    #[test]
    fn test_doctor_name_strips_status() {
        let mut record = PatientRecord::default();
        record.doctor = "Dr. B. Jones (Neurology) - Busy".into();
        assert_eq!(record.doctor_name(), "Dr. B. Jones (Neurology)");
        record.doctor = "Dr. C. Williams (Orthopedics)".into();
        assert_eq!(record.doctor_name(), "Dr. C. Williams (Orthopedics)");
    }
}
