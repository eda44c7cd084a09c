//! MongoDB connectivity.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use crate::health::{DependencyProbe, ProbeError};

/// Pings MongoDB with the `ping` admin command against the configured
/// database.
#[derive(Debug, Clone)]
pub struct MongoProbe {
    database: Database,
}

impl MongoProbe {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Parse the URI and build a client. The driver connects in the
    /// background, so this succeeds with the server down.
    pub async fn connect(uri: &str, database: &str, selection_timeout: Duration) -> Result<Self, ProbeError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| ProbeError::Unreachable(e.to_string()))?;
        options.server_selection_timeout = Some(selection_timeout);
        options.app_name = Some("basekit-gateway".to_string());

        let client = Client::with_options(options).map_err(|e| ProbeError::Unreachable(e.to_string()))?;
        tracing::info!(database, "mongodb client configured");
        Ok(Self::new(client.database(database)))
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

#[async_trait]
impl DependencyProbe for MongoProbe {
    fn name(&self) -> &str {
        "mongodb"
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn ping(&self) -> Result<(), ProbeError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| ProbeError::Unreachable(e.to_string()))
    }
}
