use serde::Serialize;
use thiserror::Error;

pub const MARK_MIN: i64 = 0;
pub const MARK_MAX: i64 = 100;

/// Averages strictly above this value are highlighted in the view.
pub const HIGHLIGHT_THRESHOLD: f64 = 85.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("Please fill in all fields.")]
    MissingField,
    #[error("Invalid input. Please enter valid numbers for marks.")]
    InvalidNumber,
    #[error("Marks should be between 0 and 100.")]
    OutOfRange,
}

impl RejectionReason {
    pub fn code(self) -> &'static str {
        match self {
            RejectionReason::MissingField => "missing_field",
            RejectionReason::InvalidNumber => "invalid_number",
            RejectionReason::OutOfRange => "out_of_range",
        }
    }
}

/// A validated student row. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRecord {
    name: String,
    reg_number: String,
    math_marks: i64,
    java_marks: i64,
    php_marks: i64,
}

impl StudentRecord {
    /// Rehydrates a row that was already persisted. Stored values are taken
    /// as-is; only fresh input goes through `validate`.
    pub(crate) fn from_stored(
        name: String,
        reg_number: String,
        math_marks: i64,
        java_marks: i64,
        php_marks: i64,
    ) -> Self {
        Self {
            name,
            reg_number,
            math_marks,
            java_marks,
            php_marks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reg_number(&self) -> &str {
        &self.reg_number
    }

    pub fn math_marks(&self) -> i64 {
        self.math_marks
    }

    pub fn java_marks(&self) -> i64 {
        self.java_marks
    }

    pub fn php_marks(&self) -> i64 {
        self.php_marks
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub name: String,
    pub reg_number: String,
    pub average_marks: f64,
    /// Applies to the average column only.
    pub highlighted: bool,
}

/// Checks run in order; the first failure is the reported reason.
pub fn validate(
    raw_name: &str,
    raw_reg_number: &str,
    raw_math: &str,
    raw_java: &str,
    raw_php: &str,
) -> Result<StudentRecord, RejectionReason> {
    let name = trim_controls(raw_name);
    let reg_number = trim_controls(raw_reg_number);
    let math = trim_controls(raw_math);
    let java = trim_controls(raw_java);
    let php = trim_controls(raw_php);

    if [name, reg_number, math, java, php]
        .iter()
        .any(|v| v.is_empty())
    {
        return Err(RejectionReason::MissingField);
    }

    let math_marks = parse_mark(math)?;
    let java_marks = parse_mark(java)?;
    let php_marks = parse_mark(php)?;

    if [math_marks, java_marks, php_marks]
        .iter()
        .any(|m| !(MARK_MIN..=MARK_MAX).contains(m))
    {
        return Err(RejectionReason::OutOfRange);
    }

    Ok(StudentRecord {
        name: name.to_string(),
        reg_number: reg_number.to_string(),
        math_marks,
        java_marks,
        php_marks,
    })
}

// Strips ASCII control characters and space only (U+0000..=U+0020);
// non-breaking and other Unicode spaces are kept as content.
fn trim_controls(s: &str) -> &str {
    s.trim_matches(|c: char| c <= ' ')
}

// Strict base-10 into 32 bits: sign plus ASCII digits, nothing else.
fn parse_mark(s: &str) -> Result<i64, RejectionReason> {
    s.parse::<i32>()
        .map(i64::from)
        .map_err(|_| RejectionReason::InvalidNumber)
}

pub fn average_marks(record: &StudentRecord) -> f64 {
    // Stored rows may hold any 64-bit value; sum in f64 so nothing wraps.
    (record.math_marks as f64 + record.java_marks as f64 + record.php_marks as f64) / 3.0
}

pub fn is_highlighted(average_marks: f64) -> bool {
    average_marks > HIGHLIGHT_THRESHOLD
}

pub fn to_display_row(record: &StudentRecord) -> DisplayRow {
    let average_marks = average_marks(record);
    DisplayRow {
        name: record.name.clone(),
        reg_number: record.reg_number.clone(),
        average_marks,
        highlighted: is_highlighted(average_marks),
    }
}
