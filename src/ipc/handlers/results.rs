use super::{calc_err, required_str};
use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::ResultDraft;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkEntry {
    student_id: String,
    marks: f64,
    max_marks: f64,
    #[serde(default)]
    remarks: String,
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let exam_filter = req.params.get("examId").and_then(|v| v.as_str());
    let student_filter = req.params.get("studentId").and_then(|v| v.as_str());
    let results: Vec<_> = state
        .store
        .results()
        .iter()
        .filter(|r| exam_filter.map(|e| r.exam_id == e).unwrap_or(true))
        .filter(|r| student_filter.map(|s| r.student_id == s).unwrap_or(true))
        .collect();
    ok(&req.id, json!({ "results": results }))
}

/// Bulk marks save for one exam and subject. Every entry is validated before
/// anything is written, the grade is derived once here (the single source of
/// truth at write time), and each (exam, student, subject) tuple is upserted.
fn handle_save_marks(state: &mut AppState, req: &Request) -> serde_json::Value {
    let exam_id = match required_str(req, "examId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let subject = match required_str(req, "subject") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(entries) = req.params.get("entries").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing entries", None);
    };

    let Some(exam) = state.store.find_exam(&exam_id) else {
        return err(&req.id, "not_found", "exam not found", None);
    };
    // The class referenced by the exam is not guaranteed to exist (no
    // referential enforcement); the subject check only applies when it does.
    if let Some(class) = state.store.find_class(&exam.class_id) {
        if !class.subjects.iter().any(|s| s == &subject) {
            return err(
                &req.id,
                "invalid_input",
                "subject is not offered by the exam's class",
                Some(json!({ "subject": subject, "classId": class.class_id })),
            );
        }
    }

    let mut drafts: Vec<ResultDraft> = Vec::with_capacity(entries.len());
    for raw in entries {
        let entry: MarkEntry = match serde_json::from_value(raw.clone()) {
            Ok(v) => v,
            Err(e) => return err(&req.id, "bad_params", e.to_string(), None),
        };
        if state.store.find_student(&entry.student_id).is_none() {
            return err(
                &req.id,
                "not_found",
                "student not found",
                Some(json!({ "studentId": entry.student_id })),
            );
        }
        let grade = match calc::calculate_grade(entry.marks, entry.max_marks) {
            Ok(g) => g,
            Err(e) => {
                return calc_err(
                    req,
                    e.with_details(json!({ "studentId": entry.student_id })),
                )
            }
        };
        drafts.push(ResultDraft {
            exam_id: exam_id.clone(),
            student_id: entry.student_id,
            subject: subject.clone(),
            marks: entry.marks,
            max_marks: entry.max_marks,
            grade: grade.as_str().to_string(),
            remarks: entry.remarks,
        });
    }

    let mut created = 0usize;
    let mut updated = 0usize;
    for draft in drafts {
        let (_, was_created) = state.store.upsert_result(draft);
        if was_created {
            created += 1;
        } else {
            updated += 1;
        }
    }
    debug!(exam = %exam_id, subject = %subject, created, updated, "marks saved");

    ok(
        &req.id,
        json!({ "saved": created + updated, "created": created, "updated": updated }),
    )
}

fn handle_student_total(state: &mut AppState, req: &Request) -> serde_json::Value {
    let exam_id = match required_str(req, "examId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if state.store.find_exam(&exam_id).is_none() {
        return err(&req.id, "not_found", "exam not found", None);
    }
    if state.store.find_student(&student_id).is_none() {
        return err(&req.id, "not_found", "student not found", None);
    }

    let results = state.store.results_for_student_exam(&student_id, &exam_id);
    let total = calc::student_exam_total(results.into_iter());
    ok(&req.id, json!(total))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result_id = match required_str(req, "resultId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if state.store.delete_result(&result_id) {
        ok(&req.id, json!({ "ok": true }))
    } else {
        err(&req.id, "not_found", "result not found", None)
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "results.list" => Some(handle_list(state, req)),
        "results.saveMarks" => Some(handle_save_marks(state, req)),
        "results.studentTotal" => Some(handle_student_total(state, req)),
        "results.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
