use crate::db::models::{
    ApiResponse, Exam, ExamParams, Question, QuestionParams, SuccessResponse,
};
use crate::db::redis::EXAM_LIST_CACHE_KEY;
use crate::db::DbClient;
use crate::errors::ErrorMessages;
use crate::validation;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use super::AuthUser;

fn db_error() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(ErrorMessages::DB.to_string())),
    )
}

fn unprocessable(message: impl Into<String>) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::error(message.into())),
    )
}

async fn invalidate_exam_cache(db: &DbClient) {
    let _ = db.del_cache(EXAM_LIST_CACHE_KEY).await;
}

/// Validates the referenced category exists before accepting exam params
async fn check_category(
    db: &DbClient,
    category_id: &str,
) -> Result<(), (StatusCode, Json<ApiResponse>)> {
    match db.get_category(category_id).await {
        Ok(_) => Ok(()),
        Err(err) if err.is_not_found() => Err(unprocessable("Unknown exam category.")),
        Err(err) => {
            error!("Failed to check category {}: {}", category_id, err);
            Err(db_error())
        }
    }
}

/// Handler for creating an exam
///
/// # Endpoint: POST /api/exam-manager/exams
///
/// New exams start unpublished; publishing requires at least one question,
/// so `is_published: true` on create is rejected.
pub(crate) async fn create_exam(
    State(db): State<DbClient>,
    caller: AuthUser,
    Json(payload): Json<ExamParams>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_exam_manager() {
        return rejection;
    }

    if let Err(message) =
        validation::validate_exam(&payload.title, payload.duration_minutes, payload.pass_percentage)
    {
        return unprocessable(message);
    }
    if payload.is_published == Some(true) {
        return unprocessable("An exam cannot be published before it has questions.");
    }
    if let Err(rejection) = check_category(&db, &payload.category_id).await {
        return rejection;
    }

    let exam = Exam::from_params(&payload, &caller.user_id);
    if let Err(err) = db.insert_exam(&exam).await {
        error!("Failed to insert exam: {}", err);
        return db_error();
    }

    invalidate_exam_cache(&db).await;
    info!("User {} created exam {}", caller.user_id, exam.id);
    (
        StatusCode::CREATED,
        Json(ApiResponse::Success(SuccessResponse::Exam(exam))),
    )
}

/// Handler for updating an exam, including publish/unpublish
///
/// # Endpoint: PUT /api/exam-manager/exams/:id
pub(crate) async fn update_exam(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(exam_id): Path<String>,
    Json(payload): Json<ExamParams>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_exam_manager() {
        return rejection;
    }

    let mut exam = match db.get_exam(&exam_id).await {
        Ok(exam) => exam,
        Err(err) if err.is_not_found() => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Exam not found.")),
            )
        }
        Err(err) => {
            error!("Failed to fetch exam {}: {}", exam_id, err);
            return db_error();
        }
    };

    if let Err(message) =
        validation::validate_exam(&payload.title, payload.duration_minutes, payload.pass_percentage)
    {
        return unprocessable(message);
    }
    if let Err(rejection) = check_category(&db, &payload.category_id).await {
        return rejection;
    }

    let publishing = payload.is_published.unwrap_or(exam.is_published);
    if publishing && !exam.is_published {
        match db.count_questions_for_exam(&exam.id).await {
            Ok(0) => {
                return unprocessable("An exam cannot be published before it has questions.")
            }
            Ok(_) => {}
            Err(err) => {
                error!("Failed to count questions for exam {}: {}", exam.id, err);
                return db_error();
            }
        }
    }

    exam.title = payload.title.trim().to_string();
    exam.category_id = payload.category_id.clone();
    exam.description = payload.description.trim().to_string();
    exam.duration_minutes = payload.duration_minutes;
    exam.pass_percentage = payload.pass_percentage;
    exam.is_published = publishing;

    if let Err(err) = db.update_exam(&exam).await {
        error!("Failed to update exam {}: {}", exam.id, err);
        return db_error();
    }

    invalidate_exam_cache(&db).await;
    (
        StatusCode::OK,
        Json(ApiResponse::Success(SuccessResponse::Exam(exam))),
    )
}

/// Handler for deleting an exam
///
/// # Endpoint: DELETE /api/exam-manager/exams/:id
///
/// Refused while any attempt references the exam; attempt history outlives
/// curation mistakes.
pub(crate) async fn delete_exam(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(exam_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_exam_manager() {
        return rejection;
    }

    match db.count_attempts_for_exam(&exam_id).await {
        Ok(0) => {}
        Ok(count) => {
            info!("Refusing to delete exam {} with {} attempts", exam_id, count);
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::error(
                    "This exam has recorded attempts and cannot be deleted.",
                )),
            );
        }
        Err(err) => {
            error!("Failed to count attempts for exam {}: {}", exam_id, err);
            return db_error();
        }
    }

    match db.delete_exam(&exam_id).await {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Exam not found.")),
        ),
        Ok(_) => {
            invalidate_exam_cache(&db).await;
            (StatusCode::OK, Json(ApiResponse::message("Exam deleted.")))
        }
        Err(err) => {
            error!("Failed to delete exam {}: {}", exam_id, err);
            db_error()
        }
    }
}

/// Rejects question mutations while anyone is mid-attempt on the exam
async fn check_no_running_attempts(
    db: &DbClient,
    exam_id: &str,
) -> Result<(), (StatusCode, Json<ApiResponse>)> {
    match db.count_in_progress_attempts_for_exam(exam_id).await {
        Ok(0) => Ok(()),
        Ok(_) => Err((
            StatusCode::CONFLICT,
            Json(ApiResponse::error(
                "This exam has attempts in progress; try again once they finish.",
            )),
        )),
        Err(err) => {
            error!("Failed to count running attempts for {}: {}", exam_id, err);
            Err(db_error())
        }
    }
}

/// Handler for adding a question to an exam
///
/// # Endpoint: POST /api/exam-manager/exams/:id/questions
pub(crate) async fn add_question(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(exam_id): Path<String>,
    Json(payload): Json<QuestionParams>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_exam_manager() {
        return rejection;
    }

    let exam = match db.get_exam(&exam_id).await {
        Ok(exam) => exam,
        Err(err) if err.is_not_found() => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Exam not found.")),
            )
        }
        Err(err) => {
            error!("Failed to fetch exam {}: {}", exam_id, err);
            return db_error();
        }
    };

    if let Err(message) = validation::validate_question(
        &payload.prompt,
        &payload.options,
        payload.correct_option,
        payload.marks,
    ) {
        return unprocessable(message);
    }
    if payload.subject.trim().is_empty() {
        return unprocessable("Question subject cannot be empty.");
    }
    if let Err(rejection) = check_no_running_attempts(&db, &exam.id).await {
        return rejection;
    }

    let question = Question::from_params(&payload, &exam.id);
    if let Err(err) = db.insert_question(&question).await {
        error!("Failed to insert question: {}", err);
        return db_error();
    }

    invalidate_exam_cache(&db).await;
    (
        StatusCode::CREATED,
        Json(ApiResponse::Success(SuccessResponse::Question(question))),
    )
}

/// Handler for updating a question
///
/// # Endpoint: PUT /api/exam-manager/questions/:id
pub(crate) async fn update_question(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(question_id): Path<String>,
    Json(payload): Json<QuestionParams>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_exam_manager() {
        return rejection;
    }

    let mut question = match db.get_question(&question_id).await {
        Ok(question) => question,
        Err(err) if err.is_not_found() => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Question not found.")),
            )
        }
        Err(err) => {
            error!("Failed to fetch question {}: {}", question_id, err);
            return db_error();
        }
    };

    if let Err(message) = validation::validate_question(
        &payload.prompt,
        &payload.options,
        payload.correct_option,
        payload.marks,
    ) {
        return unprocessable(message);
    }
    if payload.subject.trim().is_empty() {
        return unprocessable("Question subject cannot be empty.");
    }
    if let Err(rejection) = check_no_running_attempts(&db, &question.exam_id).await {
        return rejection;
    }

    question.subject = payload.subject.trim().to_string();
    question.prompt = payload.prompt.trim().to_string();
    question.options = payload.options.clone();
    question.correct_option = payload.correct_option;
    question.marks = payload.marks;

    if let Err(err) = db.update_question(&question).await {
        error!("Failed to update question {}: {}", question.id, err);
        return db_error();
    }

    invalidate_exam_cache(&db).await;
    (
        StatusCode::OK,
        Json(ApiResponse::Success(SuccessResponse::Question(question))),
    )
}

/// Handler for deleting a question
///
/// # Endpoint: DELETE /api/exam-manager/questions/:id
///
/// Refused once any attempt has answered the question, so finalized scores
/// stay explainable.
pub(crate) async fn delete_question(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(question_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_exam_manager() {
        return rejection;
    }

    let question = match db.get_question(&question_id).await {
        Ok(question) => question,
        Err(err) if err.is_not_found() => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Question not found.")),
            )
        }
        Err(err) => {
            error!("Failed to fetch question {}: {}", question_id, err);
            return db_error();
        }
    };

    if let Err(rejection) = check_no_running_attempts(&db, &question.exam_id).await {
        return rejection;
    }

    match db.count_answers_for_question(&question.id).await {
        Ok(0) => {}
        Ok(_) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::error(
                    "This question has recorded answers and cannot be deleted.",
                )),
            )
        }
        Err(err) => {
            error!("Failed to count answers for question {}: {}", question.id, err);
            return db_error();
        }
    }

    match db.delete_question(&question.id).await {
        Ok(_) => {
            invalidate_exam_cache(&db).await;
            (
                StatusCode::OK,
                Json(ApiResponse::message("Question deleted.")),
            )
        }
        Err(err) => {
            error!("Failed to delete question {}: {}", question.id, err);
            db_error()
        }
    }
}
