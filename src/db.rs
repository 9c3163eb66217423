//! Store bootstrap.
//!
//! Returned pools have `foreign_keys=ON` and every migration in `migrations/` applied.
//! The pool is opened once at process start and closed after the server stops.

use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens the store at `db_url`, creating the file if needed, and applies migrations.
///
/// In-memory URLs are routed to [`open_in_memory`]; a pool of several in-memory
/// connections would be several unrelated databases.
pub async fn connect(db_url: &str, max_connections: u32) -> sqlx::Result<SqlitePool> {
    if db_url.contains(":memory:") {
        return open_in_memory().await;
    }

    let started_at = Instant::now();
    info!(url = %db_url, "opening store");

    let options = SqliteConnectOptions::from_str(db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;

    info!(duration_ms = started_at.elapsed().as_millis() as u64, "store ready");
    Ok(pool)
}

/// Opens a private in-memory store with migrations applied.
///
/// Single connection, never recycled: dropping it would discard the database.
pub async fn open_in_memory() -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
