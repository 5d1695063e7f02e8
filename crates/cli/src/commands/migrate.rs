//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! mh-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `MARKETHUB_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migration files live in `crates/storefront/migrations/`.

use markethub_storefront::db::create_pool;

use super::{CommandError, database_url};

/// Run the storefront database migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
