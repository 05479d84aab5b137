//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! stockroom migrate
//! ```
//!
//! # Environment Variables
//!
//! - `STOCKROOM_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/api/migrations/` and are embedded into the
//! binary at build time:
//! ```text
//! migrations/
//! ├── 20250101000001_create_stores.sql
//! └── 20250101000002_create_products.sql
//! ```

use stockroom_api::db::MIGRATOR;

use super::{CommandError, connect};

/// Run the inventory database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!(
        migrations = MIGRATOR.iter().count(),
        "Running inventory migrations..."
    );
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
