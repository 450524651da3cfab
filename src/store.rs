use anyhow::Context;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    #[serde(default)]
    pub class_assigned: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub roll_no: String,
    pub class_id: String,
    pub section: String,
    #[serde(default)]
    pub subjects_enrolled: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub class_id: String,
    pub class_name: String,
    pub section: String,
    #[serde(default)]
    pub subjects: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExamType {
    Written,
    Oral,
    Practical,
    Assignment,
    Project,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    pub exam_id: String,
    pub exam_name: String,
    pub exam_type: ExamType,
    pub class_id: String,
    pub date: String,
    pub duration: String,
}

/// One graded entry for one student, one exam, one subject. The grade is
/// derived at save time and stored redundantly so historical report cards
/// survive a later grade-scale change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub result_id: String,
    pub exam_id: String,
    pub student_id: String,
    pub subject: String,
    pub marks: f64,
    pub max_marks: f64,
    pub grade: String,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherDraft {
    pub name: String,
    pub email: String,
    pub subject: String,
    #[serde(default)]
    pub class_assigned: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub name: String,
    pub roll_no: String,
    pub class_id: String,
    pub section: String,
    #[serde(default)]
    pub subjects_enrolled: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDraft {
    pub exam_name: String,
    pub exam_type: ExamType,
    pub class_id: String,
    pub date: String,
    pub duration: String,
}

#[derive(Debug, Clone)]
pub struct ResultDraft {
    pub exam_id: String,
    pub student_id: String,
    pub subject: String,
    pub marks: f64,
    pub max_marks: f64,
    pub grade: String,
    pub remarks: String,
}

/// Timestamp-derived identifiers (epoch milliseconds). Two creations within
/// the same millisecond get consecutive values instead of colliding.
#[derive(Debug, Default)]
struct IdClock {
    last: i64,
}

impl IdClock {
    fn next(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last = if now > self.last { now } else { self.last + 1 };
        self.last.to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub teachers: usize,
    pub students: usize,
    pub classes: usize,
    pub exams: usize,
    pub results: usize,
    pub users: usize,
}

/// In-memory collections. Nothing here survives a restart; the only
/// cross-restart state is the session key-value database.
#[derive(Debug, Default)]
pub struct Store {
    teachers: Vec<Teacher>,
    students: Vec<Student>,
    classes: Vec<Class>,
    exams: Vec<Exam>,
    results: Vec<ExamResult>,
    users: Vec<User>,
    id_clock: IdClock,
}

fn read_seed_file<T: DeserializeOwned>(dir: &Path, name: &str) -> anyhow::Result<Option<Vec<T>>> {
    let path = dir.join(name);
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read seed file {}", path.to_string_lossy()))?;
    let items: Vec<T> = serde_json::from_str(&text)
        .with_context(|| format!("invalid seed json in {}", path.to_string_lossy()))?;
    Ok(Some(items))
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collections with the fixture files found in `dir`.
    /// Missing files leave the corresponding collection empty.
    pub fn load_seed(&mut self, dir: &Path) -> anyhow::Result<SeedSummary> {
        self.teachers = read_seed_file(dir, "teachers.json")?.unwrap_or_default();
        self.students = read_seed_file(dir, "students.json")?.unwrap_or_default();
        self.classes = read_seed_file(dir, "classes.json")?.unwrap_or_default();
        self.exams = read_seed_file(dir, "exams.json")?.unwrap_or_default();
        self.results = read_seed_file(dir, "results.json")?.unwrap_or_default();
        self.users = read_seed_file(dir, "users.json")?.unwrap_or_default();
        Ok(self.seed_summary())
    }

    pub fn seed_summary(&self) -> SeedSummary {
        SeedSummary {
            teachers: self.teachers.len(),
            students: self.students.len(),
            classes: self.classes.len(),
            exams: self.exams.len(),
            results: self.results.len(),
            users: self.users.len(),
        }
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    pub fn results(&self) -> &[ExamResult] {
        &self.results
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_teacher(&self, id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.id == id)
    }

    pub fn find_student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn find_class(&self, class_id: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.class_id == class_id)
    }

    pub fn find_exam(&self, exam_id: &str) -> Option<&Exam> {
        self.exams.iter().find(|e| e.exam_id == exam_id)
    }

    pub fn find_user_by_credentials(&self, email: &str, password: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.email == email && u.password == password)
    }

    pub fn add_teacher(&mut self, draft: TeacherDraft) -> Teacher {
        let teacher = Teacher {
            id: self.id_clock.next(),
            name: draft.name,
            email: draft.email,
            subject: draft.subject,
            class_assigned: draft.class_assigned,
        };
        self.teachers.push(teacher.clone());
        teacher
    }

    pub fn update_teacher(&mut self, id: &str, draft: TeacherDraft) -> Option<&Teacher> {
        let teacher = self.teachers.iter_mut().find(|t| t.id == id)?;
        teacher.name = draft.name;
        teacher.email = draft.email;
        teacher.subject = draft.subject;
        teacher.class_assigned = draft.class_assigned;
        Some(teacher)
    }

    pub fn delete_teacher(&mut self, id: &str) -> bool {
        let before = self.teachers.len();
        self.teachers.retain(|t| t.id != id);
        self.teachers.len() != before
    }

    pub fn add_student(&mut self, draft: StudentDraft) -> Student {
        let student = Student {
            id: self.id_clock.next(),
            name: draft.name,
            roll_no: draft.roll_no,
            class_id: draft.class_id,
            section: draft.section,
            subjects_enrolled: draft.subjects_enrolled,
        };
        self.students.push(student.clone());
        student
    }

    pub fn update_student(&mut self, id: &str, draft: StudentDraft) -> Option<&Student> {
        let student = self.students.iter_mut().find(|s| s.id == id)?;
        student.name = draft.name;
        student.roll_no = draft.roll_no;
        student.class_id = draft.class_id;
        student.section = draft.section;
        student.subjects_enrolled = draft.subjects_enrolled;
        Some(student)
    }

    pub fn delete_student(&mut self, id: &str) -> bool {
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        self.students.len() != before
    }

    /// Caller checks `find_class` first; the class id is an author-supplied
    /// natural key and duplicates are rejected at the handler boundary.
    pub fn add_class(&mut self, class: Class) -> Class {
        self.classes.push(class.clone());
        class
    }

    pub fn update_class(&mut self, class_id: &str, class: Class) -> Option<&Class> {
        let existing = self.classes.iter_mut().find(|c| c.class_id == class_id)?;
        existing.class_name = class.class_name;
        existing.section = class.section;
        existing.subjects = class.subjects;
        Some(existing)
    }

    /// Filter-out delete. Students and exams referencing the class are left
    /// in place; there is no cascade.
    pub fn delete_class(&mut self, class_id: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c.class_id != class_id);
        self.classes.len() != before
    }

    pub fn add_exam(&mut self, draft: ExamDraft) -> Exam {
        let exam = Exam {
            exam_id: self.id_clock.next(),
            exam_name: draft.exam_name,
            exam_type: draft.exam_type,
            class_id: draft.class_id,
            date: draft.date,
            duration: draft.duration,
        };
        self.exams.push(exam.clone());
        exam
    }

    pub fn update_exam(&mut self, exam_id: &str, draft: ExamDraft) -> Option<&Exam> {
        let exam = self.exams.iter_mut().find(|e| e.exam_id == exam_id)?;
        exam.exam_name = draft.exam_name;
        exam.exam_type = draft.exam_type;
        exam.class_id = draft.class_id;
        exam.date = draft.date;
        exam.duration = draft.duration;
        Some(exam)
    }

    pub fn delete_exam(&mut self, exam_id: &str) -> bool {
        let before = self.exams.len();
        self.exams.retain(|e| e.exam_id != exam_id);
        self.exams.len() != before
    }

    /// At most one result per (examId, studentId, subject). A save against an
    /// existing tuple updates it in place and keeps its resultId.
    pub fn upsert_result(&mut self, draft: ResultDraft) -> (String, bool) {
        if let Some(existing) = self.results.iter_mut().find(|r| {
            r.exam_id == draft.exam_id
                && r.student_id == draft.student_id
                && r.subject == draft.subject
        }) {
            existing.marks = draft.marks;
            existing.max_marks = draft.max_marks;
            existing.grade = draft.grade;
            existing.remarks = draft.remarks;
            return (existing.result_id.clone(), false);
        }

        let result = ExamResult {
            result_id: self.id_clock.next(),
            exam_id: draft.exam_id,
            student_id: draft.student_id,
            subject: draft.subject,
            marks: draft.marks,
            max_marks: draft.max_marks,
            grade: draft.grade,
            remarks: draft.remarks,
        };
        let id = result.result_id.clone();
        self.results.push(result);
        (id, true)
    }

    pub fn delete_result(&mut self, result_id: &str) -> bool {
        let before = self.results.len();
        self.results.retain(|r| r.result_id != result_id);
        self.results.len() != before
    }

    pub fn results_for_student_exam(&self, student_id: &str, exam_id: &str) -> Vec<&ExamResult> {
        self.results
            .iter()
            .filter(|r| r.student_id == student_id && r.exam_id == exam_id)
            .collect()
    }

    pub fn results_for_exam(&self, exam_id: &str) -> Vec<&ExamResult> {
        self.results.iter().filter(|r| r.exam_id == exam_id).collect()
    }

    pub fn replace_collections(
        &mut self,
        teachers: Vec<Teacher>,
        students: Vec<Student>,
        classes: Vec<Class>,
        exams: Vec<Exam>,
        results: Vec<ExamResult>,
    ) {
        self.teachers = teachers;
        self.students = students;
        self.classes = classes;
        self.exams = exams;
        self.results = results;
    }
}
