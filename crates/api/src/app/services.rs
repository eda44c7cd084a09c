//! Service wiring: the collaborators handlers need, built once at startup.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::Serialize;

use basekit_auth::TokenVerifier;
use basekit_core::{AppEnvironment, Clock, SystemClock};
use basekit_infra::{DependencyProbe, DependencyState, DependencyStatus, MongoProbe, PostgresProbe, check_all};
use basekit_responses::ErrorNormalizer;

use crate::config::{Config, CorsOrigin};

/// Upper bound for a single dependency ping.
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Everything the router needs.
#[derive(Clone)]
pub struct AppServices {
    pub environment: AppEnvironment,
    /// `/api` by default.
    pub base_path: String,
    pub cors: CorsOrigin,
    pub verifier: Arc<dyn TokenVerifier>,
    pub health: Arc<HealthService>,
}

impl AppServices {
    /// Production wiring. Database handles are lazy, so this succeeds with
    /// the databases down.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let postgres = PostgresProbe::connect_lazy(&config.postgres.uri, config.postgres.max_connections, PROBE_TIMEOUT)
            .context("configuring postgres pool")?;
        let mongo = MongoProbe::connect(&config.mongo.uri, &config.mongo.database, PROBE_TIMEOUT)
            .await
            .context("configuring mongodb client")?;

        let probes: Vec<Arc<dyn DependencyProbe>> = vec![Arc::new(postgres), Arc::new(mongo)];

        Ok(Self {
            environment: config.environment,
            base_path: config.base_path(),
            cors: config.cors.clone(),
            verifier: Arc::new(config.token_codec()),
            health: Arc::new(HealthService::new(probes, Arc::new(SystemClock))),
        })
    }

    pub fn normalizer(&self) -> ErrorNormalizer {
        ErrorNormalizer::new(self.environment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: DependencyState,
    pub timestamp: String,
    /// Whole seconds since the service started.
    pub uptime: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedHealthReport {
    #[serde(flatten)]
    pub base: HealthReport,
    pub services: BTreeMap<String, DependencyStatus>,
}

pub struct HealthService {
    started_at: Instant,
    probes: Vec<Arc<dyn DependencyProbe>>,
    clock: Arc<dyn Clock>,
    probe_timeout: Duration,
}

impl HealthService {
    pub fn new(probes: Vec<Arc<dyn DependencyProbe>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            started_at: Instant::now(),
            probes,
            clock,
            probe_timeout: PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: DependencyState::Ok,
            timestamp: self.clock.now_iso(),
            uptime: self.uptime_secs(),
        }
    }

    /// Pings every dependency. Failures are reported in `services` and flip
    /// the overall status to `error`; they are never returned as errors.
    pub async fn detailed(&self) -> DetailedHealthReport {
        let services = check_all(&self.probes, self.probe_timeout).await;
        let mut base = self.health();
        if !services.values().all(DependencyStatus::is_ok) {
            base.status = DependencyState::Error;
        }
        DetailedHealthReport { base, services }
    }
}
