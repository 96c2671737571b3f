use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Exam, ExamCategory, ProgressRecord, Question, TestAttempt, User};

/// General API response status
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status will always be Error for this type
    pub status: Status,
    /// Detailed error message explaining what went wrong
    pub error: String,
}

/// Plain acknowledgement for mutations with nothing else to return
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub status: Status,
    pub message: String,
}

/// A user as returned by the API; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Response for successful registration or login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub status: Status,
    /// Signed access token; clients send it back as a Bearer header or cookie
    pub token: String,
    pub user: UserProfile,
}

/// One exam in the public listing
#[derive(Debug, Serialize, Deserialize)]
pub struct ExamSummary {
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub description: String,
    pub duration_minutes: i32,
    pub pass_percentage: i32,
    pub question_count: i64,
}

impl ExamSummary {
    pub fn from_exam(exam: Exam, question_count: i64) -> Self {
        ExamSummary {
            id: exam.id,
            title: exam.title,
            category_id: exam.category_id,
            description: exam.description,
            duration_minutes: exam.duration_minutes,
            pass_percentage: exam.pass_percentage,
            question_count,
        }
    }
}

/// A question as served to test takers. The correct option and its
/// mark value stay server-side until the attempt is finalized.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionPublic {
    pub id: String,
    pub subject: String,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<Question> for QuestionPublic {
    fn from(question: Question) -> Self {
        QuestionPublic {
            id: question.id,
            subject: question.subject,
            prompt: question.prompt,
            options: question.options,
        }
    }
}

/// Exam detail plus its sanitized question set
#[derive(Debug, Serialize, Deserialize)]
pub struct ExamDetailResponse {
    #[serde(flatten)]
    pub exam: Exam,
    pub questions: Vec<QuestionPublic>,
}

/// Response for a freshly started or in-progress attempt
#[derive(Debug, Serialize, Deserialize)]
pub struct AttemptResponse {
    pub attempt_id: String,
    pub exam_id: String,
    pub status: String,
    pub started_at: NaiveDateTime,
    pub deadline_at: NaiveDateTime,
    /// Seconds left on the server clock; clients may render any countdown
    /// they like, enforcement happens here
    pub remaining_seconds: i64,
}

impl AttemptResponse {
    pub fn from_attempt(attempt: &TestAttempt) -> Self {
        let now = Utc::now().naive_utc();
        let remaining = (attempt.deadline_at - now).num_seconds().max(0);
        AttemptResponse {
            attempt_id: attempt.id.clone(),
            exam_id: attempt.exam_id.clone(),
            status: attempt.status.clone(),
            started_at: attempt.started_at,
            deadline_at: attempt.deadline_at,
            remaining_seconds: remaining,
        }
    }
}

/// Per-question outcome, revealed once an attempt is finalized
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResult {
    pub question_id: String,
    pub prompt: String,
    pub selected_option: Option<i32>,
    pub correct_option: i32,
    pub is_correct: bool,
    pub marks: i32,
}

/// Full result payload for a finalized attempt
#[derive(Debug, Serialize, Deserialize)]
pub struct AttemptResultResponse {
    pub attempt_id: String,
    pub exam_id: String,
    pub status: String,
    pub score: Option<i32>,
    pub total_marks: i32,
    pub correct_count: i32,
    pub answered_count: i32,
    pub passed: Option<bool>,
    pub started_at: NaiveDateTime,
    pub deadline_at: NaiveDateTime,
    pub submitted_at: Option<NaiveDateTime>,
    pub answers: Vec<AnswerResult>,
}

/// One row of a user's attempt history
#[derive(Debug, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub attempt_id: String,
    pub exam_id: String,
    pub exam_title: String,
    pub status: String,
    pub score: Option<i32>,
    pub total_marks: i32,
    pub started_at: NaiveDateTime,
    pub submitted_at: Option<NaiveDateTime>,
}

/// Accuracy as a ratio in [0, 1]; zero when nothing was answered
pub fn accuracy(correct: i64, answered: i64) -> f64 {
    if answered == 0 {
        0.0
    } else {
        correct as f64 / answered as f64
    }
}

/// Per-subject slice of a user's progress
#[derive(Debug, Serialize, Deserialize)]
pub struct SubjectProgress {
    pub subject: String,
    pub attempts_count: i32,
    pub questions_answered: i32,
    pub correct_answered: i32,
    pub accuracy: f64,
    pub time_spent_seconds: i64,
    pub last_updated: NaiveDateTime,
}

impl From<ProgressRecord> for SubjectProgress {
    fn from(record: ProgressRecord) -> Self {
        SubjectProgress {
            accuracy: accuracy(
                record.correct_answered as i64,
                record.questions_answered as i64,
            ),
            subject: record.subject,
            attempts_count: record.attempts_count,
            questions_answered: record.questions_answered,
            correct_answered: record.correct_answered,
            time_spent_seconds: record.time_spent_seconds,
            last_updated: record.last_updated,
        }
    }
}

/// Roll-up across all subjects
#[derive(Debug, Serialize, Deserialize)]
pub struct OverallProgress {
    pub attempts_count: i32,
    pub questions_answered: i32,
    pub correct_answered: i32,
    pub accuracy: f64,
    pub time_spent_seconds: i64,
}

/// Response for GET /api/progress
#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub subjects: Vec<SubjectProgress>,
    pub overall: OverallProgress,
}

impl ProgressResponse {
    pub fn from_records(records: Vec<ProgressRecord>) -> Self {
        let mut attempts_count = 0;
        let mut questions_answered = 0;
        let mut correct_answered = 0;
        let mut time_spent_seconds = 0;

        for record in &records {
            attempts_count += record.attempts_count;
            questions_answered += record.questions_answered;
            correct_answered += record.correct_answered;
            time_spent_seconds += record.time_spent_seconds;
        }

        ProgressResponse {
            subjects: records.into_iter().map(SubjectProgress::from).collect(),
            overall: OverallProgress {
                attempts_count,
                questions_answered,
                correct_answered,
                accuracy: accuracy(correct_answered as i64, questions_answered as i64),
                time_spent_seconds,
            },
        }
    }
}

/// Pagination metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
    pub items_per_page: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, items_per_page: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + items_per_page - 1) / items_per_page
        };
        PaginationMeta {
            total,
            page,
            total_pages,
            items_per_page,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
        }
    }
}

/// Response for the admin user listing
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub meta: PaginationMeta,
    pub users: Vec<UserProfile>,
}

/// Wrapper for successful responses
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuccessResponse {
    /// Registration and login results
    Auth(AuthResponse),
    /// The caller's own profile
    Profile(UserProfile),
    /// Category listing
    Categories(Vec<ExamCategory>),
    /// A single category
    Category(ExamCategory),
    /// Published exam listing
    Exams(Vec<ExamSummary>),
    /// Exam detail with sanitized questions
    ExamDetail(ExamDetailResponse),
    /// An exam as seen by its managers
    Exam(Exam),
    /// A question as seen by its managers
    Question(Question),
    /// A started or running attempt
    Attempt(AttemptResponse),
    /// A finalized attempt with per-question results
    AttemptResult(AttemptResultResponse),
    /// The caller's attempt history
    AttemptHistory(Vec<AttemptSummary>),
    /// Per-subject progress with overall roll-up
    Progress(ProgressResponse),
    /// Paginated user listing
    Users(UserListResponse),
    /// Bare acknowledgement
    Message(MessageResponse),
}

/// Main API response enum
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Success(SuccessResponse),
    Error(ErrorResponse),
}

impl From<SuccessResponse> for ApiResponse {
    fn from(value: SuccessResponse) -> Self {
        Self::Success(value)
    }
}

impl From<ErrorResponse> for ApiResponse {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}

impl From<AuthResponse> for ApiResponse {
    fn from(value: AuthResponse) -> Self {
        Self::Success(SuccessResponse::Auth(value))
    }
}

impl From<MessageResponse> for ApiResponse {
    fn from(value: MessageResponse) -> Self {
        Self::Success(SuccessResponse::Message(value))
    }
}

impl ApiResponse {
    /// Shorthand for the uniform error envelope
    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse::Error(ErrorResponse {
            status: Status::Error,
            error: message.into(),
        })
    }

    /// Shorthand for a bare success acknowledgement
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse::Success(SuccessResponse::Message(MessageResponse {
            status: Status::Success,
            message: message.into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(45, 2, 20);
        assert_eq!(meta.total_pages, 3);
        assert!(meta.has_next_page);
        assert!(meta.has_prev_page);

        let first = PaginationMeta::new(45, 1, 20);
        assert!(first.has_next_page);
        assert!(!first.has_prev_page);

        let empty = PaginationMeta::new(0, 1, 20);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next_page);
        assert!(!empty.has_prev_page);
    }

    #[test]
    fn test_accuracy_handles_zero_answers() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert_eq!(accuracy(3, 4), 0.75);
    }

    #[test]
    fn test_public_question_hides_correct_option() {
        let question = Question {
            id: "q-1".to_string(),
            exam_id: "exam-1".to_string(),
            subject: "Geography".to_string(),
            prompt: "Capital of France?".to_string(),
            options: vec!["Paris".to_string(), "Rome".to_string()],
            correct_option: 0,
            marks: 2,
            created_at: Utc::now().naive_utc(),
        };

        let public = QuestionPublic::from(question);
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("correct_option").is_none());
        assert!(json.get("marks").is_none());
        assert_eq!(json["options"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_progress_rollup() {
        let now = Utc::now().naive_utc();
        let records = vec![
            ProgressRecord {
                id: "p-1".to_string(),
                user_id: "u-1".to_string(),
                subject: "Maths".to_string(),
                attempts_count: 2,
                questions_answered: 10,
                correct_answered: 7,
                time_spent_seconds: 600,
                last_updated: now,
            },
            ProgressRecord {
                id: "p-2".to_string(),
                user_id: "u-1".to_string(),
                subject: "Reasoning".to_string(),
                attempts_count: 1,
                questions_answered: 10,
                correct_answered: 3,
                time_spent_seconds: 300,
                last_updated: now,
            },
        ];

        let response = ProgressResponse::from_records(records);
        assert_eq!(response.subjects.len(), 2);
        assert_eq!(response.overall.attempts_count, 3);
        assert_eq!(response.overall.questions_answered, 20);
        assert_eq!(response.overall.correct_answered, 10);
        assert_eq!(response.overall.accuracy, 0.5);
        assert_eq!(response.overall.time_spent_seconds, 900);
        assert_eq!(response.subjects[0].accuracy, 0.7);
    }
}
