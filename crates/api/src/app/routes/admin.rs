use std::sync::Arc;

use axum::Extension;
use serde_json::{Map, Value};

use basekit_auth::AuthUser;
use basekit_core::AppEnvironment;
use basekit_responses::{Envelope, InfoBody};

use crate::app::extract::RequestPath;

pub async fn status(
    Extension(environment): Extension<AppEnvironment>,
    Extension(health): Extension<Arc<crate::app::services::HealthService>>,
    Extension(admin): Extension<AuthUser>,
    RequestPath(path): RequestPath,
) -> Envelope {
    let mut info = Map::new();
    info.insert("environment".into(), Value::String(environment.as_str().to_string()));
    info.insert("uptime".into(), Value::from(health.uptime_secs()));

    let mut metadata = Map::new();
    metadata.insert("requestedBy".into(), Value::String(admin.id.to_string()));

    Envelope::info(
        "System status",
        InfoBody {
            info: Some(info),
            metadata: Some(metadata),
        },
    )
    .with_message_key("admin.status.success")
    .with_path(path)
}
