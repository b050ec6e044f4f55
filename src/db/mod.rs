//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all member data and the final arbiter of uniqueness.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
///
/// `unique_bos` selects whether BOS numbers get a unique index.
pub async fn init_database(db_path: &Path, unique_bos: bool) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool, unique_bos).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool, unique_bos: bool) -> Result<(), sqlx::Error> {
    // AUTOINCREMENT keeps ids of deleted members from being handed out again
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            bos TEXT,
            paid INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    // The BOS index is rebuilt on every start so switching variants takes effect.
    // Drop and create must share one connection or the create can miss the drop.
    let bos_index = if unique_bos {
        "CREATE UNIQUE INDEX idx_members_bos ON members(bos)"
    } else {
        "CREATE INDEX idx_members_bos ON members(bos)"
    };

    let mut tx = pool.begin().await?;
    sqlx::query("DROP INDEX IF EXISTS idx_members_bos")
        .execute(&mut *tx)
        .await?;
    sqlx::query(bos_index).execute(&mut *tx).await?;
    tx.commit().await?;

    tracing::debug!(unique_bos, "Database migrations applied");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::models::NewMember;
    use tempfile::TempDir;

    fn alice() -> NewMember {
        NewMember {
            name: "Alice".to_string(),
            email: "alice@aber.ac.uk".to_string(),
            bos: Some("C1".to_string()),
            paid: false,
        }
    }

    #[tokio::test]
    async fn test_reopen_existing_database() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path, true).await.unwrap();
        Repository::new(pool.clone())
            .insert_member(&alice())
            .await
            .unwrap();
        pool.close().await;

        // Restarting twice in a row with the same variant
        for _ in 0..2 {
            let pool = init_database(&db_path, true).await.unwrap();
            let repo = Repository::new(pool.clone());
            assert_eq!(repo.list_members().await.unwrap().len(), 1);
            pool.close().await;
        }
    }

    #[tokio::test]
    async fn test_switching_bos_variant_on_restart() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        let pool = init_database(&db_path, false).await.unwrap();
        Repository::new(pool.clone())
            .insert_member(&alice())
            .await
            .unwrap();
        pool.close().await;

        // lenient -> strict: shared BOS numbers are rejected again
        let pool = init_database(&db_path, true).await.unwrap();
        let err = Repository::new(pool.clone())
            .insert_member(&NewMember {
                name: "Bob".to_string(),
                email: "bob@aber.ac.uk".to_string(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
        pool.close().await;

        // strict -> lenient: shared BOS numbers are accepted
        let pool = init_database(&db_path, false).await.unwrap();
        Repository::new(pool.clone())
            .insert_member(&NewMember {
                name: "Bob".to_string(),
                email: "bob@aber.ac.uk".to_string(),
                ..alice()
            })
            .await
            .unwrap();
        pool.close().await;
    }
}
