//! Remaining medication supply.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{days_between, parse_date};
use crate::models::PatientRecord;

/// Result of the supply calculation for one record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum SupplyStatus {
    /// Days of medication left
    Remaining { days: i64 },
    /// Supply ran out on or before today
    Finished,
    /// Issue date unparseable; only the total supply is known
    UnknownIssueDate { total_days: i64 },
    /// Tablet count or daily dose missing, non-numeric or zero, or the
    /// total does not fit in a day count
    Incalculable,
}

fn parse_quantity(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Total days of supply: `floor(tablet_count / daily_dose)`.
pub fn total_supply_days(record: &PatientRecord) -> Option<i64> {
    let tablets = parse_quantity(&record.tablet_count)?;
    let daily = parse_quantity(&record.daily_dose).filter(|d| *d > 0.0)?;
    let total = (tablets / daily).floor();
    (total.abs() < i64::MAX as f64).then_some(total as i64)
}

/// Days of supply remaining as of `today`.
pub fn supply_status(record: &PatientRecord, today: NaiveDate) -> SupplyStatus {
    let Some(total_days) = total_supply_days(record) else {
        return SupplyStatus::Incalculable;
    };

    match parse_date(&record.issue_date) {
        Some(issued) => {
            match total_days.checked_sub(days_between(issued, today)) {
                Some(remaining) if remaining > 0 => SupplyStatus::Remaining { days: remaining },
                Some(_) => SupplyStatus::Finished,
                None => SupplyStatus::Incalculable,
            }
        }
        None => SupplyStatus::UnknownIssueDate { total_days },
    }
}
