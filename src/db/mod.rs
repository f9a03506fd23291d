//! Database module for persistent storage.
//!
//! Provides async SQLite access using SQLx for:
//! - Users and room memberships
//! - Shopping lists and their items
//! - Categories
//! - Receipts, line-item splits, and netted debts

mod categories;
mod debts;
mod lists;
mod receipts;
mod rooms;
mod users;

pub use categories::CategoryRepository;
pub use debts::{DebtRepository, PaymentOutcome};
pub use lists::{ListRepository, ListRow};
pub use receipts::{HistoryRow, ReceiptRepository};
pub use rooms::RoomRepository;
pub use users::UserRepository;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
    #[error("migration error: {0}")]
    Migration(sqlx::migrate::MigrateError),
    #[error("Username already taken: {0}")]
    UsernameTaken(String),
    #[error("Already a member")]
    AlreadyMember,
    #[error("Category already exists in this room: {0}")]
    CategoryExists(String),
    #[error("Member not found: {0}")]
    MemberNotFound(String),
    #[error("Payment amount cannot exceed the debt amount.")]
    PaymentTooLarge,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Database handle with connection pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connection acquire timeout. Prevents connection storms from blocking
    /// indefinitely.
    const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Maximum time a connection can remain idle before being closed.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a new database connection, running migrations if needed.
    pub async fn new(path: &str) -> Result<Self, DbError> {
        let pool = if path == ":memory:" {
            // Use a uniquely named shared-cache memory database per call.
            // `file::memory:` is global-ish and will collide across parallel
            // tests.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:grocery-share-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true)
                .foreign_keys(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        } else {
            // File-based database. Create the parent directory if missing.
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = std::fs::create_dir_all(parent) {
                        tracing::warn!(path = %parent.display(), error = %e, "Failed to create database directory");
                    }
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .foreign_keys(true);

            SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Self::ACQUIRE_TIMEOUT)
                .idle_timeout(Some(Self::IDLE_TIMEOUT))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        };

        info!(path = %path, "Database connected");

        // Run embedded migrations
        Self::run_migrations(&pool).await?;

        // WAL mode allows reads to happen while writes are in progress.
        // It only applies to file databases; memory databases ignore it.
        if path != ":memory:" {
            sqlx::query("PRAGMA journal_mode=WAL")
                .execute(&pool)
                .await?;

            sqlx::query("PRAGMA synchronous=NORMAL")
                .execute(&pool)
                .await?;
        }

        Ok(Self { pool })
    }

    /// Get reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run embedded migrations.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(DbError::Migration)?;

        info!("Database migrations checked/applied");
        Ok(())
    }

    /// Get user repository.
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    /// Get room repository.
    pub fn rooms(&self) -> RoomRepository<'_> {
        RoomRepository::new(&self.pool)
    }

    /// Get shopping list repository.
    pub fn lists(&self) -> ListRepository<'_> {
        ListRepository::new(&self.pool)
    }

    /// Get category repository.
    pub fn categories(&self) -> CategoryRepository<'_> {
        CategoryRepository::new(&self.pool)
    }

    /// Get receipt repository.
    pub fn receipts(&self) -> ReceiptRepository<'_> {
        ReceiptRepository::new(&self.pool)
    }

    /// Get debt repository.
    pub fn debts(&self) -> DebtRepository<'_> {
        DebtRepository::new(&self.pool)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::Sqlx(err)
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err)
    }
}
