//! Dependency health probes.
//!
//! A probe failure is data, not an error: [`check`] always produces a
//! [`DependencyStatus`].

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinSet;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{0}")]
    Unreachable(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// A backing service the gateway can ping.
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Key under `services` in the detailed health payload.
    fn name(&self) -> &str;

    async fn ping(&self) -> Result<(), ProbeError>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyState {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    pub status: DependencyState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DependencyStatus {
    pub fn ok() -> Self {
        Self {
            status: DependencyState::Ok,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: DependencyState::Error,
            message: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == DependencyState::Ok
    }
}

/// Ping one dependency, bounded by `timeout`.
pub async fn check(probe: &dyn DependencyProbe, timeout: Duration) -> DependencyStatus {
    let outcome = match tokio::time::timeout(timeout, probe.ping()).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::TimedOut(timeout)),
    };

    match outcome {
        Ok(()) => DependencyStatus::ok(),
        Err(e) => {
            tracing::error!(dependency = probe.name(), error = %e, "health check failed");
            DependencyStatus::error(e.to_string())
        }
    }
}

/// Ping every dependency concurrently. Keys are probe names.
pub async fn check_all(
    probes: &[Arc<dyn DependencyProbe>],
    timeout: Duration,
) -> BTreeMap<String, DependencyStatus> {
    let mut set = JoinSet::new();
    for probe in probes {
        let probe = Arc::clone(probe);
        set.spawn(async move {
            let status = check(probe.as_ref(), timeout).await;
            (probe.name().to_string(), status)
        });
    }

    let mut statuses = BTreeMap::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((name, status)) => {
                statuses.insert(name, status);
            }
            Err(e) => tracing::error!(error = %e, "health probe task failed"),
        }
    }

    // A probe whose task panicked still gets reported.
    for probe in probes {
        statuses
            .entry(probe.name().to_string())
            .or_insert_with(|| DependencyStatus::error("Connection failed"));
    }
    statuses
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Fixed {
        name: &'static str,
        result: Result<(), ProbeError>,
    }

    #[async_trait]
    impl DependencyProbe for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn ping(&self) -> Result<(), ProbeError> {
            self.result.clone()
        }
    }

    struct Hanging;

    #[async_trait]
    impl DependencyProbe for Hanging {
        fn name(&self) -> &str {
            "slow"
        }

        async fn ping(&self) -> Result<(), ProbeError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn failure_becomes_status_data() {
        let probe = Fixed {
            name: "postgresql",
            result: Err(ProbeError::Unreachable("connection refused".into())),
        };
        let status = check(&probe, Duration::from_secs(1)).await;
        assert!(!status.is_ok());
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({ "status": "error", "message": "connection refused" })
        );
    }

    #[tokio::test]
    async fn ok_status_has_no_message() {
        let probe = Fixed {
            name: "mongodb",
            result: Ok(()),
        };
        let status = check(&probe, Duration::from_secs(1)).await;
        assert_eq!(serde_json::to_value(&status).unwrap(), json!({ "status": "ok" }));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_times_out() {
        let status = check(&Hanging, Duration::from_millis(50)).await;
        assert_eq!(status.status, DependencyState::Error);
        assert!(status.message.unwrap().starts_with("timed out"));
    }

    #[tokio::test]
    async fn check_all_reports_every_probe_by_name() {
        let probes: Vec<Arc<dyn DependencyProbe>> = vec![
            Arc::new(Fixed {
                name: "postgresql",
                result: Ok(()),
            }),
            Arc::new(Fixed {
                name: "mongodb",
                result: Err(ProbeError::Unreachable("no primary".into())),
            }),
        ];
        let statuses = check_all(&probes, Duration::from_secs(1)).await;
        assert_eq!(statuses.keys().collect::<Vec<_>>(), vec!["mongodb", "postgresql"]);
        assert!(statuses["postgresql"].is_ok());
        assert!(!statuses["mongodb"].is_ok());
    }
}
