use serde::{Deserialize, Serialize};

/// Parameters for creating a new account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterParams {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Parameters for logging in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}

/// Parameters for creating or updating an exam category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryParams {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Parameters for creating or updating an exam
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExamParams {
    pub title: String,
    pub category_id: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: i32,
    pub pass_percentage: i32,
    /// Publish state; omitted means "leave unpublished" on create
    pub is_published: Option<bool>,
}

/// Parameters for creating or updating a question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionParams {
    pub subject: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: i32,
    pub marks: i32,
}

/// A single answer recorded against an in-progress attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerParams {
    pub question_id: String,
    pub selected_option: i32,
}

/// Parameters for changing a user's role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleParams {
    pub role: String,
}

/// Query string for the exam listing
#[derive(Debug, Deserialize)]
pub struct ExamListQuery {
    pub category: Option<String>,
}

/// Query string for paginated listings
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}
