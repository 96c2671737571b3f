//! Domain services shared between request handlers and background jobs.

/// Password hashing, access tokens, startup admin bootstrap
pub mod auth;

/// Periodic attempt expiry and health monitoring
pub mod background_jobs;

/// Attempt scoring and finalization
pub mod scoring;
