use std::time::Instant;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernatorConfig {
    /// Endpoint that accepts cancellation notices.
    pub uri: String,
}

/// Cancellation notice for a named application/service pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCancellation {
    pub application_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub service_name: String,
}

/// Cancellation notice for a docker image scheduled through etcd.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerCancellation {
    pub docker_url: String,
    pub exit_code: i32,
    pub etcd_dir: String,
}

/// Form body POSTed to the governator. The variant decides which fields go on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CancellationRequest {
    Service(ServiceCancellation),
    Docker(DockerCancellation),
}

impl From<ServiceCancellation> for CancellationRequest {
    fn from(request: ServiceCancellation) -> Self {
        Self::Service(request)
    }
}

impl From<DockerCancellation> for CancellationRequest {
    fn from(request: DockerCancellation) -> Self {
        Self::Docker(request)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("unable to reach governator: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("cancellation failed with code '{status}'")]
    Rejected { status: u16 },
}

#[derive(Debug, Clone)]
pub struct GovernatorNotifier {
    client: reqwest::Client,
    config: GovernatorConfig,
}

impl GovernatorNotifier {
    pub fn new(config: GovernatorConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: GovernatorConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &GovernatorConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl Notifier for GovernatorNotifier {
    type Message = CancellationRequest;
    type Error = NotifyError;

    async fn notify(&self, message: Self::Message) -> Result<(), Self::Error> {
        let start = Instant::now();

        let response = self
            .client
            .post(&self.config.uri)
            .form(&message)
            .send()
            .await?;

        let status = response.status();

        info!(
            "[Governator] POST {} answered {} in {:?}",
            self.config.uri,
            status,
            start.elapsed()
        );

        // Only a created cancellation counts, a plain 200 does not.
        if status != StatusCode::CREATED {
            warn!("[Governator] Cancellation was not accepted: {status}");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
