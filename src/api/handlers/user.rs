use crate::db::models::{ApiResponse, SuccessResponse};
use crate::db::DbClient;
use crate::errors::ErrorMessages;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;

use super::AuthUser;

/// Handler for the caller's attempt history
///
/// # Endpoint: GET /api/user/attempts
pub(crate) async fn get_user_attempts(
    State(db): State<DbClient>,
    caller: AuthUser,
) -> (StatusCode, Json<ApiResponse>) {
    match db.list_attempts_for_user(&caller.user_id).await {
        Ok(attempts) => (
            StatusCode::OK,
            Json(ApiResponse::Success(SuccessResponse::AttemptHistory(
                attempts,
            ))),
        ),
        Err(err) => {
            error!("Failed to fetch attempt history: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::DB.to_string())),
            )
        }
    }
}
