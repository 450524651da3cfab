use crate::calc::{self, CalcError, StudentExamTotal};
use crate::pdf::{Document, Page};
use crate::store::{Exam, ExamResult, Student};
use chrono::Local;
use serde::Serialize;

// Layout offsets in millimetres.
const TITLE_Y: f64 = 20.0;
const TABLE_ROW_STEP: f64 = 15.0;
const BODY_LIMIT_Y: f64 = 260.0;
const FOOTER_Y: f64 = 280.0;

const COL_SUBJECT_X: f64 = 20.0;
const COL_MARKS_X: f64 = 80.0;
const COL_MAX_MARKS_X: f64 = 120.0;
const COL_GRADE_X: f64 = 160.0;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub subject: String,
    pub marks: f64,
    pub max_marks: f64,
    pub grade: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportCard {
    pub title: String,
    pub student_name: String,
    pub roll_no: String,
    pub class_line: String,
    pub exam_name: String,
    pub exam_type: String,
    pub exam_date: String,
    pub duration: String,
    pub rows: Vec<ReportRow>,
    pub overall: StudentExamTotal,
    pub generated_on: String,
}

/// Builds the report model for one student and one exam. An empty result set
/// is rejected; a report card with no rows is never produced.
pub fn build_report_card(
    student: &Student,
    exam: &Exam,
    results: &[&ExamResult],
) -> Result<ReportCard, CalcError> {
    if results.is_empty() {
        return Err(CalcError::new(
            "no_data",
            "no results recorded for this student and exam",
        ));
    }

    let rows = results
        .iter()
        .map(|r| ReportRow {
            subject: r.subject.clone(),
            marks: r.marks,
            max_marks: r.max_marks,
            grade: r.grade.clone(),
        })
        .collect();
    let overall = calc::student_exam_total(results.iter().copied());

    Ok(ReportCard {
        title: "SCHOOL REPORT CARD".to_string(),
        student_name: student.name.clone(),
        roll_no: student.roll_no.clone(),
        class_line: format!("{} - Section {}", student.class_id, student.section),
        exam_name: exam.exam_name.clone(),
        exam_type: format!("{:?}", exam.exam_type),
        exam_date: exam.date.clone(),
        duration: exam.duration.clone(),
        rows,
        overall,
        generated_on: Local::now().format("%Y-%m-%d").to_string(),
    })
}

/// `{studentName}_{examName}_ReportCard.pdf`, with path separators replaced
/// so the name stays a plain file name.
pub fn file_name(student_name: &str, exam_name: &str) -> String {
    let sanitize = |s: &str| {
        s.chars()
            .map(|c| match c {
                '/' | '\\' | ':' => '-',
                c => c,
            })
            .collect::<String>()
    };
    format!(
        "{}_{}_ReportCard.pdf",
        sanitize(student_name),
        sanitize(exam_name)
    )
}

fn table_header(page: &mut Page, y: f64) {
    page.text(COL_SUBJECT_X, y, 12.0, true, "Subject");
    page.text(COL_MARKS_X, y, 12.0, true, "Marks");
    page.text(COL_MAX_MARKS_X, y, 12.0, true, "Max Marks");
    page.text(COL_GRADE_X, y, 12.0, true, "Grade");
}

fn format_marks(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// Lays the model out onto fixed offsets. Rows that would run past the body
/// limit continue on a fresh page rather than drawing off the sheet.
pub fn render(card: &ReportCard) -> Document {
    let mut doc = Document::new();
    let mut page = Page::new();

    page.text_centered(TITLE_Y, 20.0, true, card.title.as_str());

    page.text(20.0, 40.0, 12.0, false, "Student Information:");
    page.text(20.0, 50.0, 12.0, false, format!("Name: {}", card.student_name));
    page.text(20.0, 60.0, 12.0, false, format!("Roll Number: {}", card.roll_no));
    page.text(20.0, 70.0, 12.0, false, format!("Class: {}", card.class_line));

    page.text(20.0, 90.0, 12.0, false, "Exam Information:");
    page.text(20.0, 100.0, 12.0, false, format!("Exam: {}", card.exam_name));
    page.text(20.0, 110.0, 12.0, false, format!("Type: {}", card.exam_type));
    page.text(20.0, 120.0, 12.0, false, format!("Date: {}", card.exam_date));
    page.text(20.0, 130.0, 12.0, false, format!("Duration: {}", card.duration));

    page.text(20.0, 145.0, 12.0, false, "Results:");
    let mut y = 155.0;
    table_header(&mut page, y);

    for row in &card.rows {
        y += TABLE_ROW_STEP;
        if y > BODY_LIMIT_Y {
            doc.push_page(page);
            page = Page::new();
            y = 30.0;
            table_header(&mut page, y);
            y += TABLE_ROW_STEP;
        }
        page.text(COL_SUBJECT_X, y, 12.0, false, row.subject.as_str());
        page.text(COL_MARKS_X, y, 12.0, false, format_marks(row.marks));
        page.text(COL_MAX_MARKS_X, y, 12.0, false, format_marks(row.max_marks));
        page.text(COL_GRADE_X, y, 12.0, false, row.grade.as_str());
    }

    y += 30.0;
    if y + 25.0 > FOOTER_Y {
        doc.push_page(page);
        page = Page::new();
        y = 30.0;
    }
    page.text(20.0, y, 12.0, true, "Overall Performance:");
    page.text(
        20.0,
        y + 15.0,
        12.0,
        false,
        format!(
            "Total Marks: {}/{}",
            format_marks(card.overall.total),
            format_marks(card.overall.max_total)
        ),
    );
    page.text(
        20.0,
        y + 25.0,
        12.0,
        false,
        format!("Percentage: {}%", card.overall.percentage),
    );

    page.text(
        20.0,
        FOOTER_Y,
        12.0,
        false,
        format!("Generated on: {}", card.generated_on),
    );
    doc.push_page(page);
    doc
}
