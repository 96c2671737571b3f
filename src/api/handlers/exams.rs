use crate::db::models::{
    ApiResponse, ExamDetailResponse, ExamListQuery, ExamSummary, QuestionPublic, SuccessResponse,
};
use crate::db::redis::EXAM_LIST_CACHE_KEY;
use crate::db::DbClient;
use crate::errors::ErrorMessages;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use super::AuthUser;

/// Handler for listing published exams
///
/// # Endpoint: GET /api/exams?category=:id
///
/// The unfiltered listing is Redis-cached; category-filtered queries always
/// hit the database.
pub(crate) async fn list_exams(
    State(db): State<DbClient>,
    Query(query): Query<ExamListQuery>,
) -> (StatusCode, Json<ApiResponse>) {
    if query.category.is_none() {
        if let Ok(cached) = db.get_cache(EXAM_LIST_CACHE_KEY).await {
            if let Ok(exams) = serde_json::from_str::<Vec<ExamSummary>>(&cached) {
                info!("Serving exam list from cache");
                return (
                    StatusCode::OK,
                    Json(ApiResponse::Success(SuccessResponse::Exams(exams))),
                );
            }
        }
    }

    match db
        .get_published_exam_summaries(query.category.as_deref())
        .await
    {
        Ok(exams) => {
            if query.category.is_none() {
                if let Ok(serialized) = serde_json::to_string(&exams) {
                    let _ = db.set_cache(EXAM_LIST_CACHE_KEY, &serialized).await;
                }
            }
            (
                StatusCode::OK,
                Json(ApiResponse::Success(SuccessResponse::Exams(exams))),
            )
        }
        Err(err) => {
            error!("Failed to fetch exams: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::DB.to_string())),
            )
        }
    }
}

/// Handler for fetching one exam with its question set
///
/// # Endpoint: GET /api/exams/:id
///
/// Questions are sanitized before leaving the server; unpublished exams are
/// only visible to their curators and indistinguishable from missing ones
/// for everyone else.
pub(crate) async fn get_exam(
    State(db): State<DbClient>,
    caller: Option<AuthUser>,
    Path(exam_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Exam not found.")),
        )
    };

    let exam = match db.get_exam(&exam_id).await {
        Ok(exam) => exam,
        Err(err) if err.is_not_found() => return not_found(),
        Err(err) => {
            error!("Failed to fetch exam {}: {}", exam_id, err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::DB.to_string())),
            );
        }
    };

    let can_curate = caller
        .map(|caller| caller.role.can_manage_exams())
        .unwrap_or(false);
    if !exam.is_published && !can_curate {
        return not_found();
    }

    match db.get_questions_for_exam(&exam.id).await {
        Ok(questions) => (
            StatusCode::OK,
            Json(ApiResponse::Success(SuccessResponse::ExamDetail(
                ExamDetailResponse {
                    exam,
                    questions: questions.into_iter().map(QuestionPublic::from).collect(),
                },
            ))),
        ),
        Err(err) => {
            error!("Failed to fetch questions for exam {}: {}", exam_id, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::DB.to_string())),
            )
        }
    }
}
