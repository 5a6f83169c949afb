//! Doctor availability shown alongside the record listing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::PatientRecord;

pub const DEFAULT_DOCTORS: &[&str] = &[
    "Dr. A. Smith (Cardiology)",
    "Dr. B. Jones (Neurology)",
    "Dr. C. Williams (Orthopedics)",
    "Dr. D. Brown (Pediatrics)",
    "Dr. E. Davis (General Surgeon)",
    "Dr. F. Miller (ENT)",
    "Dr. G. Wilson (Dermatology)",
    "Dr. H. Moore (Gynecology)",
    "Dr. I. Taylor (Oncology)",
    "Dr. J. Anderson (Psychiatry)",
];

/// Configured list of doctors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorRoster {
    doctors: Vec<String>,
}

impl Default for DoctorRoster {
    fn default() -> Self {
        Self::new(DEFAULT_DOCTORS.iter().map(|d| d.to_string()).collect())
    }
}

impl DoctorRoster {
    pub fn new(doctors: Vec<String>) -> Self {
        Self { doctors }
    }

    pub fn doctors(&self) -> &[String] {
        &self.doctors
    }

    /// `"<name> - Busy"` for every doctor assigned to a record, else `"<name> - Available"`.
    pub fn statuses(&self, records: &[PatientRecord]) -> Vec<String> {
        let assigned: HashSet<&str> = records
            .iter()
            .filter(|r| !r.doctor.is_empty())
            .map(|r| r.doctor_name())
            .collect();

        self.doctors
            .iter()
            .map(|name| {
                let status = if assigned.contains(name.as_str()) {
                    "Busy"
                } else {
                    "Available"
                };
                format!("{} - {}", name, status)
            })
            .collect()
    }
}
