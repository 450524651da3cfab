use super::required_str;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

/// Teacher dashboard counts. Classes are resolved through the teacher's
/// `classAssigned` relation, never by pattern-matching on class ids.
fn handle_teacher_model(state: &mut AppState, req: &Request) -> serde_json::Value {
    let teacher_id = match required_str(req, "teacherId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let Some(teacher) = state.store.find_teacher(&teacher_id) else {
        return err(&req.id, "not_found", "teacher not found", None);
    };

    let classes: Vec<_> = state
        .store
        .classes()
        .iter()
        .filter(|c| teacher.class_assigned.contains(&c.class_id))
        .collect();
    let class_ids: Vec<&str> = classes.iter().map(|c| c.class_id.as_str()).collect();

    let my_students = state
        .store
        .students()
        .iter()
        .filter(|s| class_ids.contains(&s.class_id.as_str()))
        .count();
    let scheduled_exams = state
        .store
        .exams()
        .iter()
        .filter(|e| class_ids.contains(&e.class_id.as_str()))
        .count();

    ok(
        &req.id,
        json!({
            "teacher": { "id": teacher.id, "name": teacher.name },
            "classes": classes,
            "myClasses": classes.len(),
            "myStudents": my_students,
            "scheduledExams": scheduled_exams,
            "resultsEntered": state.store.results().len(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.teacherModel" => Some(handle_teacher_model(state, req)),
        _ => None,
    }
}
