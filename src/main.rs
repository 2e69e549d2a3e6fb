//! Maintenance entry point: initializes the store, seeds the communal shop,
//! and runs the balance repair pass, printing a per-user before/after diff.
//! The chat frontend runs as a separate service and talks to the same store.

use dotenvy::dotenv;
use habit_rewards::config;
use habit_rewards::core::{reconcile, reward};
use habit_rewards::errors::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Initialize database
    let db = config::database::create_connection().await?;
    config::database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))?;

    // 4. Seed communal shop items from config.toml (if present)
    match config::shop::load_default_config() {
        Ok(shop_config) => {
            let created = reward::seed_communal_rewards(&db, &shop_config).await?;
            info!(created, "Communal shop seeded.");
        }
        Err(e) => warn!("No communal shop config loaded: {e}"),
    }

    // 5. Repair pass: recalculate all typed balances from source facts
    info!("Recalculating all user points...");
    let report = reconcile::recalculate_all_points(&db).await?;

    for reconciliation in &report.users {
        for diff in reconciliation.diffs.iter().filter(|diff| diff.drifted()) {
            info!(
                user_id = reconciliation.user_id,
                point_type = diff.point_type.as_str(),
                "{} -> {}",
                diff.stored,
                diff.recomputed
            );
        }
    }
    info!(
        users = report.users.len(),
        corrected = report.corrected_users,
        skipped = report.skipped_users,
        "Points recalculation complete."
    );

    Ok(())
}
