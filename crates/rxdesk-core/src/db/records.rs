//! Patient record database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::PatientRecord;

const RECORD_COLUMNS: &str = r#"
    reference_no, patient_name, date_of_birth, address, nhs_number, doctor,
    medication, dose, daily_dose, tablet_count, lot, issue_date, expiry_date,
    storage, disease
"#;

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<PatientRecord> {
    Ok(PatientRecord {
        reference_no: row.get(0)?,
        patient_name: row.get(1)?,
        date_of_birth: row.get(2)?,
        address: row.get(3)?,
        nhs_number: row.get(4)?,
        doctor: row.get(5)?,
        medication: row.get(6)?,
        dose: row.get(7)?,
        daily_dose: row.get(8)?,
        tablet_count: row.get(9)?,
        lot: row.get(10)?,
        issue_date: row.get(11)?,
        expiry_date: row.get(12)?,
        storage: row.get(13)?,
        disease: row.get(14)?,
    })
}

impl Database {
    /// Insert a new record. A reference that already exists is a constraint error.
    pub fn insert_record(&self, record: &PatientRecord) -> DbResult<()> {
        let result = self.conn.execute(
            r#"
            INSERT INTO hospital (
                reference_no, patient_name, date_of_birth, address, nhs_number, doctor,
                medication, dose, daily_dose, tablet_count, lot, issue_date, expiry_date,
                storage, disease
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                record.reference_no,
                record.patient_name,
                record.date_of_birth,
                record.address,
                record.nhs_number,
                record.doctor,
                record.medication,
                record.dose,
                record.daily_dose,
                record.tablet_count,
                record.lot,
                record.issue_date,
                record.expiry_date,
                record.storage,
                record.disease,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(DbError::Constraint(format!(
                    "Reference {} already exists",
                    record.reference_no
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite every field of the record with the same reference.
    ///
    /// Returns `false` when no record matched.
    pub fn update_record(&self, record: &PatientRecord) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE hospital SET
                patient_name = ?2,
                date_of_birth = ?3,
                address = ?4,
                nhs_number = ?5,
                doctor = ?6,
                medication = ?7,
                dose = ?8,
                daily_dose = ?9,
                tablet_count = ?10,
                lot = ?11,
                issue_date = ?12,
                expiry_date = ?13,
                storage = ?14,
                disease = ?15,
                updated_at = datetime('now')
            WHERE reference_no = ?1
            "#,
            params![
                record.reference_no,
                record.patient_name,
                record.date_of_birth,
                record.address,
                record.nhs_number,
                record.doctor,
                record.medication,
                record.dose,
                record.daily_dose,
                record.tablet_count,
                record.lot,
                record.issue_date,
                record.expiry_date,
                record.storage,
                record.disease,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a record by reference number (case-insensitive).
    pub fn get_record(&self, reference: &str) -> DbResult<Option<PatientRecord>> {
        let sql = format!(
            "SELECT {} FROM hospital WHERE reference_no = ?",
            RECORD_COLUMNS
        );
        self.conn
            .query_row(&sql, [reference], record_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// List all records in insertion order.
    pub fn list_records(&self) -> DbResult<Vec<PatientRecord>> {
        let sql = format!("SELECT {} FROM hospital ORDER BY rowid", RECORD_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], record_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a record. Returns `false` when no record matched.
    pub fn delete_record(&self, reference: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM hospital WHERE reference_no = ?", [reference])?;
        Ok(rows_affected > 0)
    }
}
