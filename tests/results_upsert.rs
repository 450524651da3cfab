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
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
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

struct Fixture {
    exam_id: String,
    student_a: String,
    student_b: String,
}

fn seed_class_with_exam(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
) -> Fixture {
    request_ok(
        stdin,
        reader,
        "f1",
        "classes.create",
        json!({
            "classId": "10A",
            "className": "Grade 10",
            "section": "A",
            "subjects": ["Mathematics", "Science"]
        }),
    );
    let a = request_ok(
        stdin,
        reader,
        "f2",
        "students.create",
        json!({
            "name": "Asha Rao",
            "rollNo": "1",
            "classId": "10A",
            "section": "A",
            "subjectsEnrolled": ["Mathematics", "Science"]
        }),
    );
    let b = request_ok(
        stdin,
        reader,
        "f3",
        "students.create",
        json!({
            "name": "Vikram Shetty",
            "rollNo": "2",
            "classId": "10A",
            "section": "A",
            "subjectsEnrolled": ["Mathematics", "Science"]
        }),
    );
    let exam = request_ok(
        stdin,
        reader,
        "f4",
        "exams.create",
        json!({
            "examName": "Midterm",
            "examType": "Written",
            "classId": "10A",
            "date": "2026-03-02",
            "duration": "2 hours"
        }),
    );
    Fixture {
        exam_id: exam
            .pointer("/exam/examId")
            .and_then(|v| v.as_str())
            .expect("exam id")
            .to_string(),
        student_a: a
            .pointer("/student/id")
            .and_then(|v| v.as_str())
            .expect("student a id")
            .to_string(),
        student_b: b
            .pointer("/student/id")
            .and_then(|v| v.as_str())
            .expect("student b id")
            .to_string(),
    }
}

fn result_count(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    exam_id: &str,
) -> usize {
    let listed = request_ok(stdin, reader, id, "results.list", json!({ "examId": exam_id }));
    listed
        .get("results")
        .and_then(|v| v.as_array())
        .map(|v| v.len())
        .unwrap_or(0)
}

#[test]
fn resaving_marks_updates_in_place() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let fx = seed_class_with_exam(&mut stdin, &mut reader);

    let first = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "results.saveMarks",
        json!({
            "examId": fx.exam_id,
            "subject": "Mathematics",
            "entries": [
                { "studentId": fx.student_a, "marks": 80, "maxMarks": 100 },
                { "studentId": fx.student_b, "marks": 45, "maxMarks": 50 }
            ]
        }),
    );
    assert_eq!(first.get("created").and_then(|v| v.as_u64()), Some(2));
    assert_eq!(first.get("updated").and_then(|v| v.as_u64()), Some(0));

    let science = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "results.saveMarks",
        json!({
            "examId": fx.exam_id,
            "subject": "Science",
            "entries": [
                { "studentId": fx.student_a, "marks": 45, "maxMarks": 50 }
            ]
        }),
    );
    assert_eq!(science.get("created").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(result_count(&mut stdin, &mut reader, "3", &fx.exam_id), 3);

    let total = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "results.studentTotal",
        json!({ "examId": fx.exam_id, "studentId": fx.student_a }),
    );
    assert_eq!(total.get("total").and_then(|v| v.as_f64()), Some(125.0));
    assert_eq!(total.get("maxTotal").and_then(|v| v.as_f64()), Some(150.0));
    assert_eq!(total.get("percentage").and_then(|v| v.as_i64()), Some(83));

    // Same (exam, student, subject) again: no new row, grade recomputed.
    let resave = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "results.saveMarks",
        json!({
            "examId": fx.exam_id,
            "subject": "Mathematics",
            "entries": [
                { "studentId": fx.student_a, "marks": 90, "maxMarks": 100 }
            ]
        }),
    );
    assert_eq!(resave.get("created").and_then(|v| v.as_u64()), Some(0));
    assert_eq!(resave.get("updated").and_then(|v| v.as_u64()), Some(1));
    assert_eq!(result_count(&mut stdin, &mut reader, "6", &fx.exam_id), 3);

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "results.list",
        json!({ "examId": fx.exam_id, "studentId": fx.student_a }),
    );
    let math = listed
        .get("results")
        .and_then(|v| v.as_array())
        .expect("results array")
        .iter()
        .find(|r| r.get("subject").and_then(|v| v.as_str()) == Some("Mathematics"))
        .expect("mathematics row");
    assert_eq!(math.get("grade").and_then(|v| v.as_str()), Some("A+"));

    let total = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "results.studentTotal",
        json!({ "examId": fx.exam_id, "studentId": fx.student_a }),
    );
    assert_eq!(total.get("percentage").and_then(|v| v.as_i64()), Some(90));

    let _ = child.kill();
    let _ = child.wait();
}

#[test]
fn invalid_entries_are_rejected_before_any_write() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let fx = seed_class_with_exam(&mut stdin, &mut reader);

    let over = request(
        &mut stdin,
        &mut reader,
        "1",
        "results.saveMarks",
        json!({
            "examId": fx.exam_id,
            "subject": "Mathematics",
            "entries": [
                { "studentId": fx.student_a, "marks": 120, "maxMarks": 100 }
            ]
        }),
    );
    assert_eq!(error_code(&over), "invalid_input");
    assert_eq!(result_count(&mut stdin, &mut reader, "2", &fx.exam_id), 0);

    let zero_max = request(
        &mut stdin,
        &mut reader,
        "3",
        "results.saveMarks",
        json!({
            "examId": fx.exam_id,
            "subject": "Mathematics",
            "entries": [
                { "studentId": fx.student_a, "marks": 0, "maxMarks": 0 }
            ]
        }),
    );
    assert_eq!(error_code(&zero_max), "invalid_input");

    // One bad entry poisons the whole batch: the good one must not land.
    let mixed = request(
        &mut stdin,
        &mut reader,
        "4",
        "results.saveMarks",
        json!({
            "examId": fx.exam_id,
            "subject": "Mathematics",
            "entries": [
                { "studentId": fx.student_a, "marks": 80, "maxMarks": 100 },
                { "studentId": fx.student_b, "marks": -1, "maxMarks": 100 }
            ]
        }),
    );
    assert_eq!(error_code(&mixed), "invalid_input");
    assert_eq!(result_count(&mut stdin, &mut reader, "5", &fx.exam_id), 0);

    let bad_subject = request(
        &mut stdin,
        &mut reader,
        "6",
        "results.saveMarks",
        json!({
            "examId": fx.exam_id,
            "subject": "Art",
            "entries": [
                { "studentId": fx.student_a, "marks": 80, "maxMarks": 100 }
            ]
        }),
    );
    assert_eq!(error_code(&bad_subject), "invalid_input");

    let no_student = request(
        &mut stdin,
        &mut reader,
        "7",
        "results.saveMarks",
        json!({
            "examId": fx.exam_id,
            "subject": "Mathematics",
            "entries": [
                { "studentId": "ghost", "marks": 80, "maxMarks": 100 }
            ]
        }),
    );
    assert_eq!(error_code(&no_student), "not_found");

    let no_exam = request(
        &mut stdin,
        &mut reader,
        "8",
        "results.saveMarks",
        json!({
            "examId": "ghost",
            "subject": "Mathematics",
            "entries": []
        }),
    );
    assert_eq!(error_code(&no_exam), "not_found");

    let _ = child.kill();
    let _ = child.wait();
}
