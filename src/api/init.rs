use crate::db::DbClient;
use axum::{
    error_handling::HandleErrorLayer,
    http::{Method, StatusCode},
    routing::{delete, get, post, put},
    BoxError, Router,
};
use std::time::Duration;
use tower::{buffer::BufferLayer, limit::RateLimitLayer, ServiceBuilder};
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use super::{handlers::*, index::index};

pub fn initialize_router(db: DbClient) -> Router {
    let error_handler = || {
        ServiceBuilder::new().layer(HandleErrorLayer::new(|err: BoxError| async move {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Unhandled error: {}", err),
            )
        }))
    };

    let global_rate_limit = |req_per_sec: u64| {
        ServiceBuilder::new()
            .layer(error_handler())
            .layer(BufferLayer::new(1024))
            .layer(RateLimitLayer::new(req_per_sec, Duration::from_secs(1)))
    };

    let rate_limit_per_ip = |timeout: u64, limit: u32| {
        let config = Box::new(
            GovernorConfigBuilder::default()
                .per_second(timeout)
                .burst_size(limit)
                .use_headers()
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .unwrap(),
        );

        ServiceBuilder::new()
            .layer(error_handler())
            .layer(GovernorLayer {
                config: Box::leak(config),
            })
    };

    let cors = |methods: Vec<Method>| {
        ServiceBuilder::new().layer(CorsLayer::new().allow_methods(methods).allow_origin(Any))
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Define routes with their rate limits
    Router::new()
        // Credential routes (stricter rate limits)
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .layer(
            global_rate_limit(5)
                .layer(rate_limit_per_ip(30, 1))
                .layer(cors(vec![Method::POST]))
                .layer(CompressionLayer::new().zstd(true)),
        )
        // Mutation routes
        .route("/api/exams/:id/attempts", post(start_attempt))
        .route("/api/attempts/:id/answers", put(record_answer))
        .route("/api/attempts/:id/submit", post(submit_attempt))
        .route("/api/exam-manager/exams", post(create_exam))
        .route(
            "/api/exam-manager/exams/:id",
            put(update_exam).delete(delete_exam),
        )
        .route("/api/exam-manager/exams/:id/questions", post(add_question))
        .route(
            "/api/exam-manager/questions/:id",
            put(update_question).delete(delete_question),
        )
        .route("/api/admin/users/:id/role", put(update_user_role))
        .route("/api/admin/users/:id", delete(delete_user))
        .route("/api/admin/categories", post(create_category))
        .route(
            "/api/admin/categories/:id",
            put(update_category).delete(delete_category),
        )
        .layer(
            global_rate_limit(100)
                .layer(rate_limit_per_ip(1, 100))
                .layer(cors(vec![Method::POST, Method::PUT, Method::DELETE]))
                .layer(CompressionLayer::new().zstd(true)),
        )
        // Read routes
        .route("/api/auth/me", get(me))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/:id", get(get_category))
        .route("/api/exams", get(list_exams))
        .route("/api/exams/:id", get(get_exam))
        .route("/api/attempts/:id", get(get_attempt))
        .route("/api/progress", get(get_progress))
        .route("/api/user/attempts", get(get_user_attempts))
        .route("/api/admin/users", get(list_users))
        .layer(
            global_rate_limit(10000)
                .layer(rate_limit_per_ip(1, 100))
                .layer(cors(vec![Method::GET]))
                .layer(CompressionLayer::new().zstd(true)),
        )
        // Base route
        .route("/", get(|| async { index() }))
        .route("/health", get(health_check))
        .route("/health/background-jobs", get(background_job_status))
        // Apply common middleware
        .layer(trace_layer)
        .with_state(db)
}
