use std::ops::{Deref, DerefMut};

use sqlx::migrate::MigrateError;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqliteConnection, SqlitePool};

use crate::config::Settings;

pub mod bookings;
pub mod properties;
pub mod rooms;

pub async fn get_db_pool(settings: &Settings) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// A write transaction opened with `BEGIN IMMEDIATE`.
///
/// The write lock is taken up front, so two flows that read a booking or room
/// and then update it run one after the other. The second one waits on the
/// busy timeout and sees the first one's commit. Dropping it without `commit`
/// rolls back before the connection goes back to the pool.
pub struct ImmediateTx {
    conn: Option<PoolConnection<Sqlite>>,
}

pub async fn begin_immediate(pool: &SqlitePool) -> Result<ImmediateTx, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
    Ok(ImmediateTx { conn: Some(conn) })
}

impl ImmediateTx {
    pub async fn commit(mut self) -> Result<(), sqlx::Error> {
        if let Some(conn) = self.conn.as_mut() {
            // on failure the guard still holds the connection and rolls back
            sqlx::query("COMMIT").execute(&mut **conn).await?;
        }
        self.conn = None;
        Ok(())
    }
}

impl Deref for ImmediateTx {
    type Target = SqliteConnection;

    fn deref(&self) -> &SqliteConnection {
        self.conn
            .as_deref()
            .expect("connection is held until commit")
    }
}

impl DerefMut for ImmediateTx {
    fn deref_mut(&mut self) -> &mut SqliteConnection {
        self.conn
            .as_deref_mut()
            .expect("connection is held until commit")
    }
}

impl Drop for ImmediateTx {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            actix_web::rt::spawn(async move {
                if let Err(err) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                    log::warn!("rollback failed: {err}");
                }
            });
        }
    }
}
