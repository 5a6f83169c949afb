//! SQLite schema definition.

/// Complete database schema for the pharmacy record store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patient / medication records
-- ============================================================================

CREATE TABLE IF NOT EXISTS hospital (
    reference_no TEXT PRIMARY KEY COLLATE NOCASE,  -- chat lookups are lower-cased
    patient_name TEXT NOT NULL DEFAULT '',
    date_of_birth TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    nhs_number TEXT NOT NULL DEFAULT '',
    doctor TEXT NOT NULL DEFAULT '',
    medication TEXT NOT NULL DEFAULT '',
    dose TEXT NOT NULL DEFAULT '',
    daily_dose TEXT NOT NULL DEFAULT '',
    tablet_count TEXT NOT NULL DEFAULT '',
    lot TEXT NOT NULL DEFAULT '',
    issue_date TEXT NOT NULL DEFAULT '',
    expiry_date TEXT NOT NULL DEFAULT '',
    storage TEXT NOT NULL DEFAULT '',
    disease TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_hospital_patient_name ON hospital(patient_name);
CREATE INDEX IF NOT EXISTS idx_hospital_doctor ON hospital(doctor);
"#;
