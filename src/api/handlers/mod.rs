//! API request handlers for the exam preparation service.
//! Each module corresponds to a specific API endpoint or related group of endpoints.

// Account and session handlers
pub mod auth;

// Public catalogue handlers
pub mod categories;
pub mod exams;

// Test-taking handlers
pub mod attempts;
pub mod progress;
pub mod user;

// Curation handlers
pub mod admin; // User and category administration
pub mod exam_manager; // Exam and question curation

// Service handlers
pub mod health;

// Re-export handlers for easier access
pub(crate) use admin::{
    create_category, delete_category, delete_user, list_users, update_category, update_user_role,
};
pub(crate) use attempts::{get_attempt, record_answer, start_attempt, submit_attempt};
pub(crate) use auth::{login, me, register};
pub(crate) use categories::{get_category, list_categories};
pub(crate) use exam_manager::{
    add_question, create_exam, delete_exam, delete_question, update_exam, update_question,
};
pub(crate) use exams::{get_exam, list_exams};
pub(crate) use health::{background_job_status, health_check};
pub(crate) use progress::get_progress;
pub(crate) use user::get_user_attempts;

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;

use crate::db::models::{ApiResponse, UserRole};
use crate::errors::ErrorMessages;
use crate::services::auth as auth_service;

pub(crate) fn unauthorized() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::error(ErrorMessages::Unauthorized.to_string())),
    )
}

pub(crate) fn forbidden() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::error(ErrorMessages::Forbidden.to_string())),
    )
}

/// Authenticated caller, extracted from a Bearer header or token cookie
pub struct AuthUser {
    pub user_id: String,
    pub role: UserRole,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ApiResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = auth_service::extract_token(&parts.headers).ok_or_else(unauthorized)?;
        let claims = auth_service::decode_request_token(&token).map_err(|_| unauthorized())?;
        let role = UserRole::parse(&claims.role).ok_or_else(unauthorized)?;
        Ok(AuthUser {
            user_id: claims.sub,
            role,
        })
    }
}

impl AuthUser {
    /// Guards routes reserved for exam managers and admins
    pub fn require_exam_manager(&self) -> Result<(), (StatusCode, Json<ApiResponse>)> {
        if self.role.can_manage_exams() {
            Ok(())
        } else {
            Err(forbidden())
        }
    }

    /// Guards routes reserved for admins
    pub fn require_admin(&self) -> Result<(), (StatusCode, Json<ApiResponse>)> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(forbidden())
        }
    }
}
