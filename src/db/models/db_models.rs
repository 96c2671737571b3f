use crate::schema::{
    attempt_answers, exam_categories, exams, progress, questions, test_attempts, users,
};
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{AnswerParams, CategoryParams, ExamParams, QuestionParams, RegisterParams};

#[derive(
    Clone, Debug, Serialize, Deserialize, Insertable, Identifiable, Queryable, AsChangeset,
)]
#[diesel(table_name = users, primary_key(id))]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl User {
    pub fn from_params(params: &RegisterParams, password_hash: String) -> Self {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            username: params.username.trim().to_string(),
            email: params.email.trim().to_lowercase(),
            password_hash,
            role: UserRole::Student.into(),
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Access levels, stored as a varchar column on users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "student")]
    Student,
    #[serde(rename = "exam_manager")]
    ExamManager,
    #[serde(rename = "admin")]
    Admin,
}

impl UserRole {
    /// Exam managers and admins may curate exams and questions
    pub fn can_manage_exams(&self) -> bool {
        matches!(self, UserRole::ExamManager | UserRole::Admin)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn parse(role: &str) -> Option<UserRole> {
        match role {
            "student" => Some(UserRole::Student),
            "exam_manager" => Some(UserRole::ExamManager),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Student => "student".to_string(),
            UserRole::ExamManager => "exam_manager".to_string(),
            UserRole::Admin => "admin".to_string(),
        }
    }
}

impl From<String> for UserRole {
    fn from(role: String) -> Self {
        UserRole::parse(&role).unwrap_or(UserRole::Student)
    }
}

#[derive(
    Clone, Debug, Serialize, Deserialize, Insertable, Identifiable, Queryable, AsChangeset,
)]
#[diesel(table_name = exam_categories, primary_key(id))]
pub struct ExamCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

impl<'a> From<&'a CategoryParams> for ExamCategory {
    fn from(params: &'a CategoryParams) -> Self {
        ExamCategory {
            id: uuid::Uuid::new_v4().to_string(),
            name: params.name.trim().to_string(),
            description: params.description.trim().to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(
    Clone, Debug, Serialize, Deserialize, Insertable, Identifiable, Queryable, AsChangeset,
)]
#[diesel(table_name = exams, primary_key(id))]
pub struct Exam {
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub description: String,
    pub duration_minutes: i32,
    pub pass_percentage: i32,
    pub is_published: bool,
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

impl Exam {
    pub fn from_params(params: &ExamParams, created_by: &str) -> Self {
        Exam {
            id: uuid::Uuid::new_v4().to_string(),
            title: params.title.trim().to_string(),
            category_id: params.category_id.clone(),
            description: params.description.trim().to_string(),
            duration_minutes: params.duration_minutes,
            pass_percentage: params.pass_percentage,
            is_published: params.is_published.unwrap_or(false),
            created_by: created_by.to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(
    Clone, Debug, Serialize, Deserialize, Insertable, Identifiable, Queryable, AsChangeset,
)]
#[diesel(table_name = questions, primary_key(id))]
pub struct Question {
    pub id: String,
    pub exam_id: String,
    pub subject: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: i32,
    pub marks: i32,
    pub created_at: NaiveDateTime,
}

impl Question {
    pub fn from_params(params: &QuestionParams, exam_id: &str) -> Self {
        Question {
            id: uuid::Uuid::new_v4().to_string(),
            exam_id: exam_id.to_string(),
            subject: params.subject.trim().to_string(),
            prompt: params.prompt.trim().to_string(),
            options: params.options.clone(),
            correct_option: params.correct_option,
            marks: params.marks,
            created_at: Utc::now().naive_utc(),
        }
    }
}

/// Lifecycle of a test attempt, stored as a varchar column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptStatus {
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "submitted")]
    Submitted,
    #[serde(rename = "expired")]
    Expired,
}

impl From<AttemptStatus> for String {
    fn from(status: AttemptStatus) -> Self {
        match status {
            AttemptStatus::InProgress => "in_progress".to_string(),
            AttemptStatus::Submitted => "submitted".to_string(),
            AttemptStatus::Expired => "expired".to_string(),
        }
    }
}

impl From<String> for AttemptStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "in_progress" => AttemptStatus::InProgress,
            "submitted" => AttemptStatus::Submitted,
            "expired" => AttemptStatus::Expired,
            _ => panic!("Invalid attempt status"),
        }
    }
}

#[derive(
    Clone, Debug, Serialize, Deserialize, Insertable, Identifiable, Queryable, AsChangeset,
)]
#[diesel(table_name = test_attempts, primary_key(id))]
pub struct TestAttempt {
    pub id: String,
    pub user_id: String,
    pub exam_id: String,
    pub status: String,
    pub started_at: NaiveDateTime,
    pub deadline_at: NaiveDateTime,
    pub submitted_at: Option<NaiveDateTime>,
    pub score: Option<i32>,
    pub total_marks: i32,
    pub correct_count: i32,
    pub answered_count: i32,
}

impl TestAttempt {
    /// Starts a new attempt; the deadline is fixed here and never moves
    pub fn start(user_id: &str, exam: &Exam, total_marks: i32) -> Self {
        let started_at = Utc::now().naive_utc();
        TestAttempt {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            exam_id: exam.id.clone(),
            status: AttemptStatus::InProgress.into(),
            started_at,
            deadline_at: started_at + Duration::minutes(exam.duration_minutes as i64),
            submitted_at: None,
            score: None,
            total_marks,
            correct_count: 0,
            answered_count: 0,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        AttemptStatus::from(self.status.clone()) == AttemptStatus::InProgress
    }

    pub fn is_past_deadline(&self, now: NaiveDateTime) -> bool {
        now > self.deadline_at
    }
}

#[derive(
    Clone, Debug, Serialize, Deserialize, Insertable, Identifiable, Queryable, AsChangeset,
)]
#[diesel(table_name = attempt_answers, primary_key(id))]
pub struct AttemptAnswer {
    pub id: String,
    pub attempt_id: String,
    pub question_id: String,
    pub selected_option: i32,
    pub is_correct: bool,
    pub answered_at: NaiveDateTime,
}

impl AttemptAnswer {
    pub fn record(attempt_id: &str, params: &AnswerParams, is_correct: bool) -> Self {
        AttemptAnswer {
            id: uuid::Uuid::new_v4().to_string(),
            attempt_id: attempt_id.to_string(),
            question_id: params.question_id.clone(),
            selected_option: params.selected_option,
            is_correct,
            answered_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(
    Clone, Debug, Serialize, Deserialize, Insertable, Identifiable, Queryable, AsChangeset,
)]
#[diesel(table_name = progress, primary_key(id))]
pub struct ProgressRecord {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub attempts_count: i32,
    pub questions_answered: i32,
    pub correct_answered: i32,
    pub time_spent_seconds: i64,
    pub last_updated: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Student, UserRole::ExamManager, UserRole::Admin] {
            let as_string: String = role.into();
            assert_eq!(UserRole::from(as_string), role);
        }
        // Unknown strings degrade to the least-privileged role
        assert_eq!(UserRole::from("superuser".to_string()), UserRole::Student);
    }

    #[test]
    fn test_role_permissions() {
        assert!(!UserRole::Student.can_manage_exams());
        assert!(UserRole::ExamManager.can_manage_exams());
        assert!(UserRole::Admin.can_manage_exams());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::ExamManager.is_admin());
    }

    #[test]
    fn test_attempt_deadline_from_exam_duration() {
        let exam = Exam {
            id: "exam-1".to_string(),
            title: "Mock".to_string(),
            category_id: "cat-1".to_string(),
            description: String::new(),
            duration_minutes: 45,
            pass_percentage: 40,
            is_published: true,
            created_by: "user-1".to_string(),
            created_at: Utc::now().naive_utc(),
        };
        let attempt = TestAttempt::start("user-2", &exam, 100);

        assert_eq!(attempt.deadline_at - attempt.started_at, Duration::minutes(45));
        assert!(attempt.is_in_progress());
        assert!(!attempt.is_past_deadline(attempt.deadline_at));
        assert!(attempt.is_past_deadline(attempt.deadline_at + Duration::seconds(1)));
    }

    #[test]
    fn test_register_normalizes_email() {
        let params = RegisterParams {
            username: " new_student ".to_string(),
            email: "Student@Example.COM".to_string(),
            password: "irrelevant".to_string(),
        };
        let user = User::from_params(&params, "hash".to_string());
        assert_eq!(user.email, "student@example.com");
        assert_eq!(user.username, "new_student");
        assert_eq!(user.role, "student");
    }
}
