//! Feature derivation - average marks per student

use super::dataset::StudentRecord;

/// Round to a fixed number of decimal places, half away from zero
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Average of the three subject scores, rounded to one decimal
pub fn average_marks(record: &StudentRecord) -> f64 {
    round_to(record.subject_total() as f64 / 3.0, 1)
}

/// Return new records with `average` populated for every student.
///
/// Any previously stored average is overwritten, so the field is always
/// consistent with the subject scores.
pub fn derive_averages(records: &[StudentRecord]) -> Vec<StudentRecord> {
    let derived: Vec<StudentRecord> = records
        .iter()
        .map(|record| StudentRecord {
            average: Some(average_marks(record)),
            ..record.clone()
        })
        .collect();

    tracing::debug!(records = derived.len(), "derived average marks");
    derived
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::dataset::{student_records, Grade};

    #[test]
    fn test_round_to_one_decimal() {
        assert_eq!(round_to(89.333_333, 1), 89.3);
        assert_eq!(round_to(81.666_666, 1), 81.7);
        assert_eq!(round_to(85.0, 1), 85.0);
    }

    #[test]
    fn test_derive_averages_overwrites_stale_value() {
        let mut record = StudentRecord::new(1, "Test", 90, 90, 90, 90, 5, Grade::A);
        record.average = Some(12.0);
        let derived = derive_averages(&[record]);
        assert_eq!(derived[0].average, Some(90.0));
    }

    #[test]
    fn test_derive_averages_is_pure() {
        let records = student_records();
        let derived = derive_averages(&records);
        assert!(records.iter().all(|r| r.average.is_none()));
        assert!(derived.iter().all(|r| r.average.is_some()));
    }
}
