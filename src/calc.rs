use crate::store::ExamResult;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct CalcError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CalcError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn check_marks(marks: f64, max_marks: f64) -> Result<(), CalcError> {
    if !max_marks.is_finite() || max_marks < 1.0 {
        return Err(CalcError::new("invalid_input", "maxMarks must be at least 1"));
    }
    if !marks.is_finite() || marks < 0.0 || marks > max_marks {
        return Err(CalcError::new(
            "invalid_input",
            "marks must be between 0 and maxMarks",
        ));
    }
    Ok(())
}

/// Fixed thresholds, evaluated highest first; an exact boundary lands in the
/// higher bucket.
pub fn calculate_grade(marks: f64, max_marks: f64) -> Result<Grade, CalcError> {
    check_marks(marks, max_marks)?;
    let percentage = marks / max_marks * 100.0;
    let grade = if percentage >= 90.0 {
        Grade::APlus
    } else if percentage >= 80.0 {
        Grade::A
    } else if percentage >= 70.0 {
        Grade::BPlus
    } else if percentage >= 60.0 {
        Grade::B
    } else if percentage >= 50.0 {
        Grade::CPlus
    } else if percentage >= 40.0 {
        Grade::C
    } else if percentage >= 30.0 {
        Grade::D
    } else {
        Grade::F
    };
    Ok(grade)
}

/// Presentation tag for a stored grade string. Takes a string rather than
/// `Grade` because persisted grades are historical text that must keep
/// rendering even if the scale ever changes; anything unrecognized gets the
/// neutral tag.
pub fn grade_color(grade: &str) -> &'static str {
    match grade {
        "A+" | "A" => "text-green-600 bg-green-100",
        "B+" | "B" => "text-blue-600 bg-blue-100",
        "C+" | "C" => "text-yellow-600 bg-yellow-100",
        "D" => "text-orange-600 bg-orange-100",
        "F" => "text-red-600 bg-red-100",
        _ => "text-gray-600 bg-gray-100",
    }
}

pub fn calculate_percentage(marks: f64, max_marks: f64) -> Result<i64, CalcError> {
    check_marks(marks, max_marks)?;
    Ok((marks / max_marks * 100.0).round() as i64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentExamTotal {
    pub total: f64,
    pub max_total: f64,
    pub percentage: i64,
}

/// Sums one student's results for one exam. The percentage is weighted by
/// maxMarks (sum over sum), and defined as 0 when there is nothing to sum.
pub fn student_exam_total<'a, I>(results: I) -> StudentExamTotal
where
    I: IntoIterator<Item = &'a ExamResult>,
{
    let mut total = 0.0;
    let mut max_total = 0.0;
    for r in results {
        total += r.marks;
        max_total += r.max_marks;
    }
    let percentage = if max_total > 0.0 {
        (total / max_total * 100.0).round() as i64
    } else {
        0
    };
    StudentExamTotal {
        total,
        max_total,
        percentage,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassExamStats {
    pub result_count: usize,
    pub average_percent: i64,
    pub highest_percent: i64,
    pub lowest_percent: i64,
}

/// Class-wide statistics over every result of one exam. Each record
/// contributes its own marks/maxMarks percentage with equal weight; this is
/// deliberately not weighted by maxMarks, unlike the per-student total.
/// Returns `None` for an empty set instead of propagating NaN.
pub fn class_exam_stats<'a, I>(results: I) -> Option<ClassExamStats>
where
    I: IntoIterator<Item = &'a ExamResult>,
{
    let mut count = 0usize;
    let mut sum = 0.0f64;
    let mut highest = f64::MIN;
    let mut lowest = f64::MAX;
    for r in results {
        // Records are validated at save time, but seeded or imported data is
        // not; skip rows that would poison the aggregate.
        if r.max_marks <= 0.0 {
            continue;
        }
        let percent = r.marks / r.max_marks * 100.0;
        count += 1;
        sum += percent;
        highest = highest.max(percent);
        lowest = lowest.min(percent);
    }
    if count == 0 {
        return None;
    }
    Some(ClassExamStats {
        result_count: count,
        average_percent: (sum / count as f64).round() as i64,
        highest_percent: highest.round() as i64,
        lowest_percent: lowest.round() as i64,
    })
}
