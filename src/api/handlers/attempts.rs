use std::collections::HashMap;

use crate::db::models::{
    AnswerParams, AnswerResult, ApiResponse, AttemptResponse, AttemptResultResponse, AttemptStatus,
    SuccessResponse, TestAttempt,
};
use crate::db::DbClient;
use crate::errors::ErrorMessages;
use crate::services::scoring;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::{error, info, warn};

use super::AuthUser;

fn db_error() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(ErrorMessages::DB.to_string())),
    )
}

fn attempt_not_found() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Attempt not found.")),
    )
}

/// Handler for starting a timed attempt against a published exam
///
/// # Endpoint: POST /api/exams/:id/attempts
///
/// The deadline is computed here from the exam duration and never moves.
pub(crate) async fn start_attempt(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(exam_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
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

    if !exam.is_published {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Exam not found.")),
        );
    }

    let questions = match db.get_questions_for_exam(&exam.id).await {
        Ok(questions) => questions,
        Err(err) => {
            error!("Failed to fetch questions for exam {}: {}", exam_id, err);
            return db_error();
        }
    };
    if questions.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error("This exam has no questions yet.")),
        );
    }

    match db.find_active_attempt(&caller.user_id, &exam.id).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::error(
                    "You already have an attempt in progress for this exam.",
                )),
            )
        }
        Ok(None) => {}
        Err(err) => {
            error!("Failed to check for active attempts: {}", err);
            return db_error();
        }
    }

    let total_marks = questions.iter().map(|q| q.marks).sum();
    let attempt = TestAttempt::start(&caller.user_id, &exam, total_marks);
    if let Err(err) = db.insert_attempt(&attempt).await {
        // Two concurrent starts race past the check above; the partial
        // unique index settles it
        if err.is_unique_violation() {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::error(
                    "You already have an attempt in progress for this exam.",
                )),
            );
        }
        error!("Failed to insert attempt: {}", err);
        return db_error();
    }

    info!(
        "User {} started attempt {} on exam {}",
        caller.user_id, attempt.id, exam.id
    );
    (
        StatusCode::CREATED,
        Json(ApiResponse::Success(SuccessResponse::Attempt(
            AttemptResponse::from_attempt(&attempt),
        ))),
    )
}

/// Handler for recording one answer on a running attempt
///
/// # Endpoint: PUT /api/attempts/:id/answers
///
/// Re-answering a question replaces the earlier answer. A write that
/// arrives after the deadline finalizes the attempt instead of recording.
pub(crate) async fn record_answer(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(attempt_id): Path<String>,
    Json(payload): Json<AnswerParams>,
) -> (StatusCode, Json<ApiResponse>) {
    let attempt = match db.get_attempt(&attempt_id).await {
        Ok(attempt) => attempt,
        Err(err) if err.is_not_found() => return attempt_not_found(),
        Err(err) => {
            error!("Failed to fetch attempt {}: {}", attempt_id, err);
            return db_error();
        }
    };

    if attempt.user_id != caller.user_id {
        return super::forbidden();
    }

    if !attempt.is_in_progress() {
        return (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("This attempt has already been finalized.")),
        );
    }

    if attempt.is_past_deadline(Utc::now().naive_utc()) {
        // Time ran out between the client's last tick and this write
        warn!("Late answer on attempt {}, expiring it", attempt.id);
        if let Err(err) = scoring::finalize_attempt(&db, &attempt, AttemptStatus::Expired).await {
            error!("Failed to expire attempt {}: {}", attempt.id, err);
        }
        return (
            StatusCode::CONFLICT,
            Json(ApiResponse::error(
                "Time is up. The attempt has been submitted with the answers recorded so far.",
            )),
        );
    }

    let question = match db.get_question(&payload.question_id).await {
        Ok(question) => question,
        Err(err) if err.is_not_found() => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Question not found.")),
            )
        }
        Err(err) => {
            error!("Failed to fetch question {}: {}", payload.question_id, err);
            return db_error();
        }
    };

    if question.exam_id != attempt.exam_id {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(
                "Question does not belong to this attempt's exam.",
            )),
        );
    }

    if payload.selected_option < 0 || payload.selected_option as usize >= question.options.len() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error("Selected option is out of range.")),
        );
    }

    // Graded at write time; questions cannot change under a running attempt
    let is_correct = payload.selected_option == question.correct_option;
    let answer = crate::db::models::AttemptAnswer::record(&attempt.id, &payload, is_correct);

    if let Err(err) = db.upsert_answer(&answer).await {
        error!("Failed to record answer: {}", err);
        return db_error();
    }

    (StatusCode::OK, Json(ApiResponse::message("Answer recorded.")))
}

/// Handler for submitting a running attempt
///
/// # Endpoint: POST /api/attempts/:id/submit
///
/// A submit that arrives past the deadline still scores the answers that
/// were recorded in time, but the attempt is marked expired.
pub(crate) async fn submit_attempt(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(attempt_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    let attempt = match db.get_attempt(&attempt_id).await {
        Ok(attempt) => attempt,
        Err(err) if err.is_not_found() => return attempt_not_found(),
        Err(err) => {
            error!("Failed to fetch attempt {}: {}", attempt_id, err);
            return db_error();
        }
    };

    if attempt.user_id != caller.user_id {
        return super::forbidden();
    }

    if !attempt.is_in_progress() {
        return (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("This attempt has already been submitted.")),
        );
    }

    let final_status = if attempt.is_past_deadline(Utc::now().naive_utc()) {
        AttemptStatus::Expired
    } else {
        AttemptStatus::Submitted
    };

    if let Err(err) = scoring::finalize_attempt(&db, &attempt, final_status).await {
        error!("Failed to finalize attempt {}: {}", attempt.id, err);
        return db_error();
    }

    match build_attempt_result(&db, &attempt.id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::Success(SuccessResponse::AttemptResult(result))),
        ),
        Err(err) => {
            error!("Failed to build attempt result: {}", err);
            db_error()
        }
    }
}

/// Handler for fetching one attempt
///
/// # Endpoint: GET /api/attempts/:id
///
/// While the attempt runs this returns only the clock; per-question results
/// appear once the attempt is finalized.
pub(crate) async fn get_attempt(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(attempt_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    let attempt = match db.get_attempt(&attempt_id).await {
        Ok(attempt) => attempt,
        Err(err) if err.is_not_found() => return attempt_not_found(),
        Err(err) => {
            error!("Failed to fetch attempt {}: {}", attempt_id, err);
            return db_error();
        }
    };

    if attempt.user_id != caller.user_id {
        return super::forbidden();
    }

    if attempt.is_in_progress() {
        return (
            StatusCode::OK,
            Json(ApiResponse::Success(SuccessResponse::Attempt(
                AttemptResponse::from_attempt(&attempt),
            ))),
        );
    }

    match build_attempt_result(&db, &attempt.id).await {
        Ok(result) => (
            StatusCode::OK,
            Json(ApiResponse::Success(SuccessResponse::AttemptResult(result))),
        ),
        Err(err) => {
            error!("Failed to build attempt result: {}", err);
            db_error()
        }
    }
}

/// Assembles the per-question breakdown for a finalized attempt
async fn build_attempt_result(
    db: &DbClient,
    attempt_id: &str,
) -> crate::Result<AttemptResultResponse> {
    let attempt = db.get_attempt(attempt_id).await?;
    let exam = db.get_exam(&attempt.exam_id).await?;
    let questions = db.get_questions_for_exam(&attempt.exam_id).await?;
    let answers = db.get_answers_for_attempt(&attempt.id).await?;

    // Answers written past the deadline were never counted; drop them here too
    let answered: HashMap<&str, _> = answers
        .iter()
        .filter(|answer| answer.answered_at <= attempt.deadline_at)
        .map(|answer| (answer.question_id.as_str(), answer))
        .collect();

    let results = questions
        .iter()
        .map(|question| {
            let answer = answered.get(question.id.as_str());
            AnswerResult {
                question_id: question.id.clone(),
                prompt: question.prompt.clone(),
                selected_option: answer.map(|a| a.selected_option),
                correct_option: question.correct_option,
                is_correct: answer.map(|a| a.is_correct).unwrap_or(false),
                marks: question.marks,
            }
        })
        .collect();

    let passed = attempt
        .score
        .map(|score| score * 100 >= exam.pass_percentage * attempt.total_marks);

    Ok(AttemptResultResponse {
        attempt_id: attempt.id,
        exam_id: attempt.exam_id,
        status: attempt.status,
        score: attempt.score,
        total_marks: attempt.total_marks,
        correct_count: attempt.correct_count,
        answered_count: attempt.answered_count,
        passed,
        started_at: attempt.started_at,
        deadline_at: attempt.deadline_at,
        submitted_at: attempt.submitted_at,
        answers: results,
    })
}
