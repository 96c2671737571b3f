use crate::db::models::{ApiResponse, ProgressResponse, SuccessResponse};
use crate::db::DbClient;
use crate::errors::ErrorMessages;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use super::AuthUser;

/// Handler for the caller's aggregated progress
///
/// # Endpoint: GET /api/progress
///
/// Returns one row per subject plus an overall roll-up. Accuracy is derived
/// here from the stored counters.
pub(crate) async fn get_progress(
    State(db): State<DbClient>,
    caller: AuthUser,
) -> (StatusCode, Json<ApiResponse>) {
    info!("Fetching progress for user {}", caller.user_id);

    match db.get_progress_for_user(&caller.user_id).await {
        Ok(records) => (
            StatusCode::OK,
            Json(ApiResponse::Success(SuccessResponse::Progress(
                ProgressResponse::from_records(records),
            ))),
        ),
        Err(err) => {
            error!("Failed to fetch progress: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::DB.to_string())),
            )
        }
    }
}
