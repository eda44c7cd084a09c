use std::sync::Arc;

use axum::Extension;

use basekit_responses::Envelope;
use basekit_responses::literals::{keys, messages};

use crate::app::extract::RequestPath;
use crate::app::services::{DetailedHealthReport, HealthReport, HealthService};

pub async fn health(
    Extension(health): Extension<Arc<HealthService>>,
    RequestPath(path): RequestPath,
) -> Envelope<HealthReport> {
    Envelope::success(health.health(), messages::HEALTH_CHECK_SUCCESS)
        .with_message_key(keys::HEALTH_CHECK_SUCCESS)
        .with_path(path)
}

/// Always 200: dependency failures are data inside the envelope.
pub async fn detailed(
    Extension(health): Extension<Arc<HealthService>>,
    RequestPath(path): RequestPath,
) -> Envelope<DetailedHealthReport> {
    Envelope::success(health.detailed().await, messages::HEALTH_CHECK_DETAILED_SUCCESS)
        .with_message_key(keys::HEALTH_CHECK_DETAILED_SUCCESS)
        .with_path(path)
}
