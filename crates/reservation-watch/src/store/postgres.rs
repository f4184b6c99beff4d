use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::info;

use super::{validate_lengths, MonitoringStore, StoreError};
use crate::domain::{MonitoringRequest, MonitoringRequestId, NewMonitoringRequest};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS monitoring_request (
    id BIGSERIAL PRIMARY KEY,
    email VARCHAR(120) NOT NULL,
    month VARCHAR(20) NOT NULL,
    active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

#[derive(Debug, FromRow)]
struct MonitoringRow {
    id: i64,
    email: String,
    month: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<MonitoringRow> for MonitoringRequest {
    fn from(row: MonitoringRow) -> Self {
        Self {
            id: MonitoringRequestId(row.id),
            email: row.email,
            month: row.month,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

/// Postgres-backed store. Every write is a single autocommitted statement.
#[derive(Debug, Clone)]
pub struct PgMonitoringStore {
    pool: PgPool,
}

impl PgMonitoringStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(url)
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `monitoring_request` table when it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        info!("monitoring_request table ready");
        Ok(())
    }
}

#[async_trait]
impl MonitoringStore for PgMonitoringStore {
    async fn create(
        &self,
        request: NewMonitoringRequest,
    ) -> Result<MonitoringRequest, StoreError> {
        validate_lengths(&request)?;

        let row = sqlx::query_as::<_, MonitoringRow>(
            "INSERT INTO monitoring_request (email, month) VALUES ($1, $2) \
             RETURNING id, email, month, active, created_at",
        )
        .bind(request.email())
        .bind(request.month())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_all(&self) -> Result<Vec<MonitoringRequest>, StoreError> {
        let rows = sqlx::query_as::<_, MonitoringRow>(
            "SELECT id, email, month, active, created_at FROM monitoring_request \
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_active(&self) -> Result<Vec<MonitoringRequest>, StoreError> {
        let rows = sqlx::query_as::<_, MonitoringRow>(
            "SELECT id, email, month, active, created_at FROM monitoring_request \
             WHERE active ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn deactivate(&self, id: MonitoringRequestId) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE monitoring_request SET active = FALSE WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
