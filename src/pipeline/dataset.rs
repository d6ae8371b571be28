//! Fixed student marks dataset

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::AnalysisError;

/// Letter grade assigned to a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// All grades in display order
    pub const ALL: [Grade; 4] = [Grade::A, Grade::B, Grade::C, Grade::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        }
    }

    /// Position of this grade in `Grade::ALL`
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            _ => Err(format!("Unknown grade: '{}'. Use A, B, C or D.", s)),
        }
    }
}

/// One row of the marks dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub id: u32,
    pub name: String,
    pub math: u8,
    pub science: u8,
    pub english: u8,
    /// Attendance percentage
    pub attendance: u8,
    /// Study hours per day
    pub study_hours: u8,
    pub grade: Grade,
    /// Mean of the three subject scores, filled in by feature derivation
    pub average: Option<f64>,
}

impl StudentRecord {
    /// Build a record without a derived average
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        name: &str,
        math: u8,
        science: u8,
        english: u8,
        attendance: u8,
        study_hours: u8,
        grade: Grade,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            math,
            science,
            english,
            attendance,
            study_hours,
            grade,
            average: None,
        }
    }

    /// Sum of the three subject scores
    pub fn subject_total(&self) -> u32 {
        self.math as u32 + self.science as u32 + self.english as u32
    }

    /// Derived average, or an error if derivation has not run yet
    pub fn require_average(&self) -> Result<f64, AnalysisError> {
        self.average.ok_or(AnalysisError::MissingAverage(self.id))
    }
}

// (id, name, math, science, english, attendance, study_hours, grade)
const STUDENTS: [(u32, &str, u8, u8, u8, u8, u8, Grade); 15] = [
    (1, "Alice Johnson", 85, 78, 92, 95, 6, Grade::A),
    (2, "Bob Smith", 67, 71, 69, 88, 4, Grade::B),
    (3, "Carol Davis", 92, 89, 87, 98, 7, Grade::A),
    (4, "David Wilson", 45, 52, 48, 72, 2, Grade::C),
    (5, "Eva Brown", 78, 82, 85, 91, 5, Grade::B),
    (6, "Frank Miller", 56, 58, 61, 79, 3, Grade::C),
    (7, "Grace Lee", 88, 94, 90, 96, 6, Grade::A),
    (8, "Henry Taylor", 73, 69, 76, 85, 4, Grade::B),
    (9, "Ivy Chen", 95, 97, 93, 99, 8, Grade::A),
    (10, "Jack Anderson", 42, 38, 45, 68, 2, Grade::D),
    (11, "Kate Rodriguez", 81, 85, 79, 92, 5, Grade::B),
    (12, "Liam Thompson", 64, 67, 70, 83, 4, Grade::B),
    (13, "Maya Patel", 89, 91, 88, 97, 7, Grade::A),
    (14, "Noah Garcia", 37, 42, 39, 65, 1, Grade::D),
    (15, "Olivia Martinez", 76, 74, 82, 89, 5, Grade::B),
];

/// Return the fixed 15-student dataset in definition order
pub fn student_records() -> Vec<StudentRecord> {
    STUDENTS
        .iter()
        .map(|&(id, name, math, science, english, attendance, study_hours, grade)| {
            StudentRecord::new(id, name, math, science, english, attendance, study_hours, grade)
        })
        .collect()
}

/// Validate records before analysis.
///
/// The literal table always passes; this guards any externally supplied rows.
pub fn validate_records(records: &[StudentRecord]) -> Result<(), AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if record.id == 0 {
            return Err(AnalysisError::FieldOutOfRange {
                id: record.id,
                field: "id",
                value: 0,
                min: 1,
                max: u32::MAX,
            });
        }
        if !seen.insert(record.id) {
            return Err(AnalysisError::DuplicateId(record.id));
        }

        let percent_fields = [
            ("math", record.math),
            ("science", record.science),
            ("english", record.english),
            ("attendance", record.attendance),
        ];
        for (field, value) in percent_fields {
            if value > 100 {
                return Err(AnalysisError::FieldOutOfRange {
                    id: record.id,
                    field,
                    value: value as u32,
                    min: 0,
                    max: 100,
                });
            }
        }

        if record.study_hours > 24 {
            return Err(AnalysisError::FieldOutOfRange {
                id: record.id,
                field: "study_hours",
                value: record.study_hours as u32,
                min: 0,
                max: 24,
            });
        }
    }

    Ok(())
}
