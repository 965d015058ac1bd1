//! PostgreSQL sample store
//!
//! Uses `sqlx` with a connection pool. Values are stored as `NUMERIC` so no
//! precision is lost between the upstream quote and the query result.

use super::{Sample, SampleStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

const CREATE_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS price_samples (
        id UUID PRIMARY KEY,
        subject TEXT NOT NULL,
        value NUMERIC NOT NULL,
        captured_at TIMESTAMPTZ NOT NULL
    )
";

const CREATE_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS price_samples_subject_captured_at_idx
        ON price_samples (subject, captured_at)
";

const INSERT_SAMPLE: &str = r"
    INSERT INTO price_samples (id, subject, value, captured_at)
    VALUES ($1, $2, $3, $4)
";

// Equal distance resolves to the later sample, then the lowest id.
const NEAREST_SAMPLE: &str = r"
    SELECT id, subject, value, captured_at
    FROM price_samples
    WHERE subject = $1
    ORDER BY ABS(EXTRACT(EPOCH FROM (captured_at - $2::timestamptz))) ASC,
             captured_at DESC,
             id ASC
    LIMIT 1
";

/// Sample store backed by PostgreSQL
#[derive(Clone)]
pub struct PgSampleStore {
    pool: PgPool,
}

impl PgSampleStore {
    /// Connect a pool to the given database URL
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Check connectivity with a trivial query
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create the samples table and index if missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        tracing::debug!("Sample schema ready");
        Ok(())
    }

    fn row_to_sample(row: &PgRow) -> Result<Sample, sqlx::Error> {
        Ok(Sample {
            id: row.try_get::<Uuid, _>("id")?,
            subject: row.try_get::<String, _>("subject")?,
            value: row.try_get::<Decimal, _>("value")?,
            timestamp: row.try_get::<DateTime<Utc>, _>("captured_at")?,
        })
    }
}

#[async_trait]
impl SampleStore for PgSampleStore {
    async fn append_sample(
        &self,
        subject: &str,
        value: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let sample = Sample::new(subject, value, timestamp);

        sqlx::query(INSERT_SAMPLE)
            .bind(sample.id)
            .bind(&sample.subject)
            .bind(sample.value)
            .bind(sample.timestamp)
            .execute(&self.pool)
            .await?;

        tracing::debug!(id = %sample.id, coin = subject, "Sample inserted");
        Ok(())
    }

    async fn nearest_sample(
        &self,
        subject: &str,
        target: DateTime<Utc>,
    ) -> Result<Sample, StoreError> {
        let row = sqlx::query(NEAREST_SAMPLE)
            .bind(subject)
            .bind(target)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Self::row_to_sample(&row)?),
            None => Err(StoreError::NotFound(subject.to_string())),
        }
    }
}
