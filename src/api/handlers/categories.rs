use crate::db::models::{ApiResponse, ExamCategory, SuccessResponse};
use crate::db::redis::CATEGORY_LIST_CACHE_KEY;
use crate::db::DbClient;
use crate::errors::ErrorMessages;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

/// Handler for listing all exam categories
///
/// # Endpoint: GET /api/categories
///
/// Served from Redis when warm; a cold or unreachable cache falls through
/// to the database.
pub(crate) async fn list_categories(State(db): State<DbClient>) -> (StatusCode, Json<ApiResponse>) {
    if let Ok(cached) = db.get_cache(CATEGORY_LIST_CACHE_KEY).await {
        if let Ok(categories) = serde_json::from_str::<Vec<ExamCategory>>(&cached) {
            info!("Serving category list from cache");
            return (
                StatusCode::OK,
                Json(ApiResponse::Success(SuccessResponse::Categories(categories))),
            );
        }
    }

    match db.list_categories().await {
        Ok(categories) => {
            if let Ok(serialized) = serde_json::to_string(&categories) {
                let _ = db.set_cache(CATEGORY_LIST_CACHE_KEY, &serialized).await;
            }
            (
                StatusCode::OK,
                Json(ApiResponse::Success(SuccessResponse::Categories(categories))),
            )
        }
        Err(err) => {
            error!("Failed to fetch categories: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::DB.to_string())),
            )
        }
    }
}

/// Handler for fetching a single exam category
///
/// # Endpoint: GET /api/categories/:id
pub(crate) async fn get_category(
    State(db): State<DbClient>,
    Path(category_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    match db.get_category(&category_id).await {
        Ok(category) => (
            StatusCode::OK,
            Json(ApiResponse::Success(SuccessResponse::Category(category))),
        ),
        Err(err) if err.is_not_found() => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Category not found.")),
        ),
        Err(err) => {
            error!("Failed to fetch category {}: {}", category_id, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::DB.to_string())),
            )
        }
    }
}
