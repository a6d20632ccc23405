//! `PostgreSQL` session catalog.

use crate::storage_error;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use seatbook_core::{
    BookingError, NewSession, Result, Session, SessionCatalog, SessionId,
};
use sqlx::PgPool;

/// Row shape shared by the catalog queries.
type SessionRow = (
    i64,
    String,
    Option<String>,
    NaiveDate,
    NaiveTime,
    i32,
    i32,
    DateTime<Utc>,
);

#[allow(clippy::cast_sign_loss)] // duration and capacity are CHECK-constrained positive
fn session_from_row(row: SessionRow) -> Session {
    let (id, title, description, session_date, start_time, duration_minutes, capacity, created_at) =
        row;
    Session {
        id: SessionId::new(id),
        title,
        description,
        session_date,
        start_time,
        duration_minutes: duration_minutes as u32,
        capacity: capacity as u32,
        created_at,
    }
}

/// Session catalog backed by the `sessions` table.
///
/// Read-mostly: sessions are inserted once (seeding, tests) and never
/// updated or deleted by this service.
#[derive(Clone)]
pub struct PostgresSessionCatalog {
    pool: PgPool,
}

impl PostgresSessionCatalog {
    /// Create a catalog over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionCatalog for PostgresSessionCatalog {
    async fn get_session(&self, id: SessionId) -> Result<Session> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, title, description, session_date, start_time,
                    duration_minutes, capacity, created_at
             FROM sessions
             WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to load session", &e))?;

        row.map(session_from_row).ok_or(BookingError::NotFound(id))
    }

    async fn list_sessions(&self) -> Result<Vec<Session>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, title, description, session_date, start_time,
                    duration_minutes, capacity, created_at
             FROM sessions
             ORDER BY session_date, start_time, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to list sessions", &e))?;

        Ok(rows.into_iter().map(session_from_row).collect())
    }

    async fn insert_session(&self, session: NewSession) -> Result<Session> {
        let duration = i32::try_from(session.duration_minutes)
            .map_err(|_| BookingError::Storage("duration_minutes out of range".to_string()))?;
        let capacity = i32::try_from(session.capacity)
            .map_err(|_| BookingError::Storage("capacity out of range".to_string()))?;

        let row: SessionRow = sqlx::query_as(
            "INSERT INTO sessions
                 (title, description, session_date, start_time, duration_minutes, capacity)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, title, description, session_date, start_time,
                       duration_minutes, capacity, created_at",
        )
        .bind(&session.title)
        .bind(&session.description)
        .bind(session.session_date)
        .bind(session.start_time)
        .bind(duration)
        .bind(capacity)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to insert session", &e))?;

        let created = session_from_row(row);
        tracing::info!(session_id = %created.id, title = %created.title, "Session created");
        Ok(created)
    }
}
