use crate::db::models::{ApiResponse, AuthResponse, LoginParams, RegisterParams, Status, SuccessResponse, User, UserProfile};
use crate::db::DbClient;
use crate::errors::ErrorMessages;
use crate::services::auth as auth_service;
use crate::validation;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use super::AuthUser;

/// Handler for creating a new student account
///
/// # Endpoint: POST /api/auth/register
pub(crate) async fn register(
    State(db): State<DbClient>,
    Json(payload): Json<RegisterParams>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(message) = validation::validate_username(&payload.username)
        .and_then(|_| validation::validate_email(&payload.email))
        .and_then(|_| validation::validate_password(&payload.password))
    {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error(message)),
        );
    }

    let password_hash = match auth_service::hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::Unexpected.to_string())),
            );
        }
    };

    let user = User::from_params(&payload, password_hash);

    if let Err(err) = db.insert_user(&user).await {
        if err.is_unique_violation() {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::error(
                    "An account with this email or username already exists.",
                )),
            );
        }
        error!("Failed to insert user: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(ErrorMessages::DB.to_string())),
        );
    }

    info!("Registered new user {}", user.id);
    match auth_service::issue_token(&user) {
        Ok(token) => (
            StatusCode::CREATED,
            Json(
                AuthResponse {
                    status: Status::Success,
                    token,
                    user: user.into(),
                }
                .into(),
            ),
        ),
        Err(err) => {
            error!("Failed to issue token: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::Unexpected.to_string())),
            )
        }
    }
}

/// Handler for logging into an existing account
///
/// # Endpoint: POST /api/auth/login
///
/// Bad email and bad password are indistinguishable in the response.
pub(crate) async fn login(
    State(db): State<DbClient>,
    Json(payload): Json<LoginParams>,
) -> (StatusCode, Json<ApiResponse>) {
    let invalid_credentials = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error(
                ErrorMessages::InvalidCredentials.to_string(),
            )),
        )
    };

    let user = match db
        .get_user_by_email(payload.email.trim().to_lowercase().as_str())
        .await
    {
        Ok(user) => user,
        Err(err) => {
            if !err.is_not_found() {
                error!("Failed to look up user: {}", err);
            }
            return invalid_credentials();
        }
    };

    match auth_service::verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(err) => {
            error!("Password verification failed: {}", err);
            return invalid_credentials();
        }
    }

    info!("User {} logged in", user.id);
    match auth_service::issue_token(&user) {
        Ok(token) => (
            StatusCode::OK,
            Json(
                AuthResponse {
                    status: Status::Success,
                    token,
                    user: user.into(),
                }
                .into(),
            ),
        ),
        Err(err) => {
            error!("Failed to issue token: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::Unexpected.to_string())),
            )
        }
    }
}

/// Handler for fetching the caller's own profile
///
/// # Endpoint: GET /api/auth/me
pub(crate) async fn me(
    State(db): State<DbClient>,
    caller: AuthUser,
) -> (StatusCode, Json<ApiResponse>) {
    match db.get_user(&caller.user_id).await {
        Ok(user) => (
            StatusCode::OK,
            Json(ApiResponse::Success(SuccessResponse::Profile(
                UserProfile::from(user),
            ))),
        ),
        // A valid token for a since-deleted account is no longer valid
        Err(err) if err.is_not_found() => super::unauthorized(),
        Err(err) => {
            error!("Failed to load profile: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(ErrorMessages::DB.to_string())),
            )
        }
    }
}
