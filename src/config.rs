use serde::Deserialize;

fn default_jwt_ttl_seconds() -> i64 {
    86400
}

fn default_sweep_interval_seconds() -> u64 {
    30
}

/// Configuration for the API server
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// PostgreSQL database URL
    pub database_url: String,
    /// Redis URL
    pub redis_url: String,
    /// Secret used to sign access tokens
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    #[serde(default = "default_jwt_ttl_seconds")]
    pub jwt_ttl_seconds: i64,
    /// Port to run the server on
    pub port: u16,
    /// How often the attempt expiry sweeper runs
    #[serde(default = "default_sweep_interval_seconds")]
    pub attempt_sweep_interval_seconds: u64,
    /// Optional first-run admin account
    #[serde(default)]
    pub bootstrap_admin_email: Option<String>,
    #[serde(default)]
    pub bootstrap_admin_password: Option<String>,
}
