//! Weekly report worker for `Margem`.
//!
//! Intended to run from a scheduler (cron, Monday mornings): it connects to
//! the database, generates the weekly performance summary for every active
//! user, and hands non-empty reports to the notifier.

use dotenvy::dotenv;
use margem::config;
use margem::core::report;
use margem::errors::Result;
use margem::notify::LogNotifier;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load application settings
    let settings = config::settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;
    info!(
        alert_threshold_percent = settings.alerts.threshold_percent,
        alert_cooldown_minutes = settings.alerts.cooldown_minutes,
        "Settings loaded."
    );

    // 4. Initialize database
    let db = config::database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Run the weekly report pass
    let notifier = LogNotifier;
    let sent = report::run_weekly_reports(&db, &notifier)
        .await
        .inspect_err(|e| error!("Weekly report run failed: {e}"))?;
    info!(reports_sent = sent, "Weekly report run complete.");

    Ok(())
}
