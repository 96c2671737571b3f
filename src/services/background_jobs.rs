use crate::db::models::AttemptStatus;
use crate::db::DbClient;
use crate::services::scoring;
use crate::{Result, CONFIG};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time;
use tracing::{error, info, warn};

const LAST_SWEEP_CACHE_KEY: &str = "attempt_sweeper:last_run";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Background job manager for periodic tasks
pub struct BackgroundJobManager {
    db_client: DbClient,
}

/// Reported by the health endpoint
#[derive(Debug, Serialize)]
pub struct BackgroundJobHealth {
    pub status: String,
    pub last_sweep: Option<NaiveDateTime>,
    pub message: String,
}

impl BackgroundJobManager {
    /// Create a new background job manager
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Get background job health status
    pub async fn get_health_status(&self) -> BackgroundJobHealth {
        match self.get_last_sweep_time().await {
            Ok(last_sweep) => {
                let now = Utc::now().naive_utc();
                let time_since_sweep = now - last_sweep;
                let expected_interval =
                    chrono::Duration::seconds(CONFIG.attempt_sweep_interval_seconds as i64);

                if time_since_sweep > expected_interval * 2 {
                    BackgroundJobHealth {
                        status: "Inactive".to_string(),
                        last_sweep: Some(last_sweep),
                        message: format!(
                            "Last attempt sweep was {} seconds ago, expected interval is {} seconds",
                            time_since_sweep.num_seconds(),
                            CONFIG.attempt_sweep_interval_seconds
                        ),
                    }
                } else {
                    BackgroundJobHealth {
                        status: "Active".to_string(),
                        last_sweep: Some(last_sweep),
                        message: "Background jobs are running normally".to_string(),
                    }
                }
            }
            Err(_) => BackgroundJobHealth {
                status: "unknown".to_string(),
                last_sweep: None,
                message: "Unable to determine when attempts were last swept".to_string(),
            },
        }
    }

    async fn get_last_sweep_time(&self) -> Result<NaiveDateTime> {
        let timestamp_str = self.db_client.get_cache(LAST_SWEEP_CACHE_KEY).await?;
        NaiveDateTime::parse_from_str(&timestamp_str, TIMESTAMP_FORMAT).map_err(|e| {
            crate::errors::ApiError::Custom(format!("Failed to parse sweep timestamp: {e}"))
        })
    }

    /// Start all background jobs
    pub async fn start_all_jobs(&self) {
        info!("Starting background job manager");

        // Start the attempt expiry sweeper
        let db_client = self.db_client.clone();
        tokio::spawn(async move {
            attempt_expiry_job(db_client).await;
        });

        // Start health monitoring job
        let db_client_health = self.db_client.clone();
        tokio::spawn(async move {
            health_monitoring_job(db_client_health).await;
        });

        info!("All background jobs started successfully");
    }
}

/// Finalizes in-progress attempts whose deadline has passed. The client-side
/// countdown is advisory; this job is what actually ends an abandoned
/// attempt.
async fn attempt_expiry_job(db_client: DbClient) {
    let mut interval = time::interval(Duration::from_secs(
        CONFIG.attempt_sweep_interval_seconds,
    ));

    loop {
        interval.tick().await;

        let now = Utc::now().naive_utc();
        match db_client.get_overdue_attempts(now).await {
            Ok(overdue) => {
                if !overdue.is_empty() {
                    info!("Expiring {} overdue attempts", overdue.len());
                }
                for attempt in overdue {
                    // One stuck attempt must not stall the sweep
                    if let Err(err) =
                        scoring::finalize_attempt(&db_client, &attempt, AttemptStatus::Expired)
                            .await
                    {
                        error!("Failed to expire attempt {}: {}", attempt.id, err);
                    }
                }

                let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
                if let Err(err) = db_client.set_cache(LAST_SWEEP_CACHE_KEY, &timestamp).await {
                    warn!("Failed to record sweep timestamp: {}", err);
                }
            }
            Err(err) => {
                error!("Attempt sweep failed: {}", err);
            }
        }
    }
}

/// Periodically logs when the sweeper looks stalled
async fn health_monitoring_job(db_client: DbClient) {
    let manager = BackgroundJobManager::new(db_client);
    let mut interval = time::interval(Duration::from_secs(
        CONFIG.attempt_sweep_interval_seconds * 5,
    ));

    loop {
        interval.tick().await;

        let health = manager.get_health_status().await;
        if health.status != "Active" {
            warn!("Background job health: {:?}", health);
        }
    }
}
