//! PostgreSQL connectivity.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::health::{DependencyProbe, ProbeError};

/// Pings Postgres with `SELECT 1` through a shared pool.
#[derive(Debug, Clone)]
pub struct PostgresProbe {
    pool: PgPool,
}

impl PostgresProbe {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a lazy pool: no connection is attempted until first use.
    pub fn connect_lazy(uri: &str, max_connections: u32, acquire_timeout: Duration) -> Result<Self, ProbeError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(uri)
            .map_err(|e| ProbeError::Unreachable(e.to_string()))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DependencyProbe for PostgresProbe {
    fn name(&self) -> &str {
        "postgresql"
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn ping(&self) -> Result<(), ProbeError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| ProbeError::Unreachable(e.to_string()))
    }
}
