use super::{calc_err, required_str};
use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::report;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// Class-wide statistics for one exam. An empty result set is a defined
/// empty state: `stats` comes back null, never NaN or an infinity.
fn handle_class_statistics(state: &mut AppState, req: &Request) -> serde_json::Value {
    let exam_id = match required_str(req, "examId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if state.store.find_exam(&exam_id).is_none() {
        return err(&req.id, "not_found", "exam not found", None);
    }

    let results = state.store.results_for_exam(&exam_id);
    let count = results.len();
    let stats = calc::class_exam_stats(results.into_iter());
    ok(
        &req.id,
        json!({
            "examId": exam_id,
            "resultCount": count,
            "stats": stats,
        }),
    )
}

/// View-results page model: per-student rows with graded results and
/// weighted totals, plus the class statistics block.
fn handle_exam_results_model(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let exam_id = match required_str(req, "examId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(class) = state.store.find_class(&class_id) else {
        return err(&req.id, "not_found", "class not found", None);
    };
    let Some(exam) = state.store.find_exam(&exam_id) else {
        return err(&req.id, "not_found", "exam not found", None);
    };

    let mut rows: Vec<serde_json::Value> = Vec::new();
    for student in state
        .store
        .students()
        .iter()
        .filter(|s| s.class_id == class_id)
    {
        let results = state
            .store
            .results_for_student_exam(&student.id, &exam_id);
        let total = calc::student_exam_total(results.iter().copied());
        let result_rows: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                json!({
                    "subject": r.subject,
                    "marks": r.marks,
                    "maxMarks": r.max_marks,
                    "grade": r.grade,
                    "gradeColor": calc::grade_color(&r.grade),
                    "remarks": r.remarks,
                })
            })
            .collect();
        rows.push(json!({
            "student": { "id": student.id, "name": student.name, "rollNo": student.roll_no },
            "results": result_rows,
            "total": total,
        }));
    }

    let exam_results = state.store.results_for_exam(&exam_id);
    let count = exam_results.len();
    let stats = calc::class_exam_stats(exam_results.into_iter());

    ok(
        &req.id,
        json!({
            "class": class,
            "exam": exam,
            "students": rows,
            "resultCount": count,
            "stats": stats,
        }),
    )
}

fn build_card(
    state: &AppState,
    req: &Request,
) -> Result<report::ReportCard, serde_json::Value> {
    let student_id = required_str(req, "studentId")?;
    let exam_id = required_str(req, "examId")?;
    let Some(student) = state.store.find_student(&student_id) else {
        return Err(err(&req.id, "not_found", "student not found", None));
    };
    let Some(exam) = state.store.find_exam(&exam_id) else {
        return Err(err(&req.id, "not_found", "exam not found", None));
    };
    let results = state.store.results_for_student_exam(&student_id, &exam_id);
    report::build_report_card(student, exam, &results).map_err(|e| calc_err(req, e))
}

fn handle_report_card_model(state: &mut AppState, req: &Request) -> serde_json::Value {
    match build_card(state, req) {
        Ok(card) => ok(&req.id, json!(card)),
        Err(e) => e,
    }
}

/// Renders the card and writes `{studentName}_{examName}_ReportCard.pdf`
/// into the caller-supplied directory. A student with no results for the
/// exam gets an error, not a blank document.
fn handle_report_card_download(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_dir = match required_str(req, "outDir") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };
    let card = match build_card(state, req) {
        Ok(card) => card,
        Err(e) => return e,
    };

    let file_name = report::file_name(&card.student_name, &card.exam_name);
    let out_path = out_dir.join(&file_name);
    let doc = report::render(&card);
    if let Err(e) = doc.save(&out_path) {
        return err(&req.id, "io_failed", format!("{e:?}"), None);
    }
    info!(path = %out_path.to_string_lossy(), "report card written");

    ok(
        &req.id,
        json!({
            "path": out_path.to_string_lossy(),
            "fileName": file_name,
            "pages": doc.page_count(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.classStatistics" => Some(handle_class_statistics(state, req)),
        "reports.examResultsModel" => Some(handle_exam_results_model(state, req)),
        "reports.reportCardModel" => Some(handle_report_card_model(state, req)),
        "reports.reportCardDownload" => Some(handle_report_card_download(state, req)),
        _ => None,
    }
}
