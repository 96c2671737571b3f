use crate::db::models::{
    ApiResponse, CategoryParams, ExamCategory, PageQuery, PaginationMeta, RoleParams,
    SuccessResponse, UserListResponse, UserProfile, UserRole,
};
use crate::db::redis::CATEGORY_LIST_CACHE_KEY;
use crate::db::users::PER_PAGE;
use crate::db::DbClient;
use crate::errors::ErrorMessages;
use axum::extract::{Path, Query, State};
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

/// Handler for listing user accounts
///
/// # Endpoint: GET /api/admin/users?page=:n
pub(crate) async fn list_users(
    State(db): State<DbClient>,
    caller: AuthUser,
    Query(query): Query<PageQuery>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_admin() {
        return rejection;
    }

    let page = query.page.unwrap_or(1).max(1);
    match db.get_users_page(page).await {
        Ok((users, total)) => (
            StatusCode::OK,
            Json(ApiResponse::Success(SuccessResponse::Users(
                UserListResponse {
                    meta: PaginationMeta::new(total, page, PER_PAGE),
                    users: users.into_iter().map(UserProfile::from).collect(),
                },
            ))),
        ),
        Err(err) => {
            error!("Failed to list users: {}", err);
            db_error()
        }
    }
}

/// Handler for changing a user's role
///
/// # Endpoint: PUT /api/admin/users/:id/role
///
/// Admins cannot demote themselves; someone else has to.
pub(crate) async fn update_user_role(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(user_id): Path<String>,
    Json(payload): Json<RoleParams>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_admin() {
        return rejection;
    }

    let Some(new_role) = UserRole::parse(&payload.role) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error("Unknown role.")),
        );
    };

    if user_id == caller.user_id && !new_role.is_admin() {
        return (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Admins cannot demote themselves.")),
        );
    }

    match db.update_user_role(&user_id, new_role.into()).await {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("User not found.")),
        ),
        Ok(_) => {
            info!("User {} role changed to {}", user_id, payload.role);
            (StatusCode::OK, Json(ApiResponse::message("Role updated.")))
        }
        Err(err) => {
            error!("Failed to update role for user {}: {}", user_id, err);
            db_error()
        }
    }
}

/// Handler for deleting a user account
///
/// # Endpoint: DELETE /api/admin/users/:id
pub(crate) async fn delete_user(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(user_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_admin() {
        return rejection;
    }

    if user_id == caller.user_id {
        return (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Admins cannot delete their own account.")),
        );
    }

    match db.delete_user(&user_id).await {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("User not found.")),
        ),
        Ok(_) => {
            info!("Deleted user {}", user_id);
            (StatusCode::OK, Json(ApiResponse::message("User deleted.")))
        }
        Err(err) => {
            error!("Failed to delete user {}: {}", user_id, err);
            db_error()
        }
    }
}

/// Handler for creating an exam category
///
/// # Endpoint: POST /api/admin/categories
pub(crate) async fn create_category(
    State(db): State<DbClient>,
    caller: AuthUser,
    Json(payload): Json<CategoryParams>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_admin() {
        return rejection;
    }

    if payload.name.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error("Category name cannot be empty.")),
        );
    }

    let category = ExamCategory::from(&payload);
    if let Err(err) = db.insert_category(&category).await {
        if err.is_unique_violation() {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::error("A category with this name already exists.")),
            );
        }
        error!("Failed to insert category: {}", err);
        return db_error();
    }

    let _ = db.del_cache(CATEGORY_LIST_CACHE_KEY).await;
    (
        StatusCode::CREATED,
        Json(ApiResponse::Success(SuccessResponse::Category(category))),
    )
}

/// Handler for updating an exam category
///
/// # Endpoint: PUT /api/admin/categories/:id
pub(crate) async fn update_category(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(category_id): Path<String>,
    Json(payload): Json<CategoryParams>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_admin() {
        return rejection;
    }

    if payload.name.trim().is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::error("Category name cannot be empty.")),
        );
    }

    match db.update_category(&category_id, &payload).await {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Category not found.")),
        ),
        Ok(_) => {
            let _ = db.del_cache(CATEGORY_LIST_CACHE_KEY).await;
            match db.get_category(&category_id).await {
                Ok(category) => (
                    StatusCode::OK,
                    Json(ApiResponse::Success(SuccessResponse::Category(category))),
                ),
                Err(err) => {
                    error!("Failed to reload category {}: {}", category_id, err);
                    db_error()
                }
            }
        }
        Err(err) if err.is_unique_violation() => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("A category with this name already exists.")),
        ),
        Err(err) => {
            error!("Failed to update category {}: {}", category_id, err);
            db_error()
        }
    }
}

/// Handler for deleting an exam category
///
/// # Endpoint: DELETE /api/admin/categories/:id
///
/// Refused while any exam still references the category.
pub(crate) async fn delete_category(
    State(db): State<DbClient>,
    caller: AuthUser,
    Path(category_id): Path<String>,
) -> (StatusCode, Json<ApiResponse>) {
    if let Err(rejection) = caller.require_admin() {
        return rejection;
    }

    match db.count_exams_in_category(&category_id).await {
        Ok(0) => {}
        Ok(count) => {
            info!(
                "Refusing to delete category {} with {} exams",
                category_id, count
            );
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::error(
                    "This category still contains exams and cannot be deleted.",
                )),
            );
        }
        Err(err) => {
            error!("Failed to count exams in category {}: {}", category_id, err);
            return db_error();
        }
    }

    match db.delete_category(&category_id).await {
        Ok(0) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Category not found.")),
        ),
        Ok(_) => {
            let _ = db.del_cache(CATEGORY_LIST_CACHE_KEY).await;
            (
                StatusCode::OK,
                Json(ApiResponse::message("Category deleted.")),
            )
        }
        Err(err) => {
            error!("Failed to delete category {}: {}", category_id, err);
            db_error()
        }
    }
}
