use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schooldeskd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schooldeskd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

#[test]
fn router_dispatch_covers_every_handler_family() {
    let workspace = temp_dir("schooldesk-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "classes.create",
        json!({
            "classId": "10A",
            "className": "Grade 10",
            "section": "A",
            "subjects": ["Mathematics", "Science"]
        }),
    );
    assert_eq!(
        created.pointer("/class/classId").and_then(|v| v.as_str()),
        Some("10A")
    );

    let dup = request(
        &mut stdin,
        &mut reader,
        "4",
        "classes.create",
        json!({ "classId": "10A", "className": "Copy", "section": "B", "subjects": [] }),
    );
    assert_eq!(error_code(&dup), "conflict");

    let teacher = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "teachers.create",
        json!({
            "name": "Priya Nair",
            "email": "priya@school.edu",
            "subject": "Mathematics",
            "classAssigned": ["10A"]
        }),
    );
    let teacher_id = teacher
        .pointer("/teacher/id")
        .and_then(|v| v.as_str())
        .expect("teacher id")
        .to_string();

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "teachers.update",
        json!({
            "id": teacher_id,
            "name": "Priya Nair",
            "email": "priya.nair@school.edu",
            "subject": "Mathematics",
            "classAssigned": ["10A"]
        }),
    );
    assert_eq!(
        updated.pointer("/teacher/email").and_then(|v| v.as_str()),
        Some("priya.nair@school.edu")
    );

    let student = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "students.create",
        json!({
            "name": "Asha Rao",
            "rollNo": "1",
            "classId": "10A",
            "section": "A",
            "subjectsEnrolled": ["Mathematics", "Science"]
        }),
    );
    assert!(student.pointer("/student/id").is_some());

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "students.list",
        json!({ "classId": "10A" }),
    );
    assert_eq!(
        listed.get("students").and_then(|v| v.as_array()).map(|v| v.len()),
        Some(1)
    );
    let empty = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "students.list",
        json!({ "classId": "10B" }),
    );
    assert_eq!(
        empty.get("students").and_then(|v| v.as_array()).map(|v| v.len()),
        Some(0)
    );

    let exam = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "exams.create",
        json!({
            "examName": "Midterm",
            "examType": "Written",
            "classId": "10A",
            "date": "2026-03-02",
            "duration": "2 hours"
        }),
    );
    assert!(exam.pointer("/exam/examId").is_some());

    let bad_type = request(
        &mut stdin,
        &mut reader,
        "11",
        "exams.create",
        json!({
            "examName": "Midterm",
            "examType": "Surprise",
            "classId": "10A",
            "date": "2026-03-02",
            "duration": "2 hours"
        }),
    );
    assert_eq!(error_code(&bad_type), "bad_params");

    let deleted = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "teachers.delete",
        json!({ "id": teacher_id }),
    );
    assert_eq!(deleted.get("ok").and_then(|v| v.as_bool()), Some(true));
    let missing = request(
        &mut stdin,
        &mut reader,
        "13",
        "teachers.delete",
        json!({ "id": "nope" }),
    );
    assert_eq!(error_code(&missing), "not_found");

    let unknown = request(&mut stdin, &mut reader, "14", "seating.get", json!({}));
    assert_eq!(error_code(&unknown), "not_implemented");

    let _ = child.kill();
    let _ = child.wait();
}
