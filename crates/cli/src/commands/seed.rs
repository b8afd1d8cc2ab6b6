//! Seed the store with a test order.
//!
//! Writes directly to the `orders` table with the same idempotent upsert
//! the server uses, so re-seeding the same UID replaces the document.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use super::{CliError, database_url, test_order};

/// Insert a test order under the given UID.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the write fails.
pub async fn run(order_uid: String) -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let order = test_order(order_uid);
    let data = serde_json::to_value(&order)?;

    sqlx::query(
        "INSERT INTO orders (order_uid, data) VALUES ($1, $2) \
         ON CONFLICT (order_uid) DO UPDATE SET data = EXCLUDED.data",
    )
    .bind(&order.order_uid)
    .bind(&data)
    .execute(&pool)
    .await?;

    info!(order_uid = %order.order_uid, "Seeded test order");
    Ok(())
}
