//! The create / wait / publish protocol of the container API as three
//! explicit states. Each transition consumes the previous state, so a
//! container can only be published once it has been seen ready.
use std::time::Duration;

use engine_logging::{engine_debug, engine_info};

use crate::PublishError;

/// The three HTTP calls of the container protocol.
#[async_trait::async_trait]
pub trait ContainerApi: Send + Sync {
    /// Returns the new container id.
    async fn create_container(
        &self,
        image_url: &str,
        caption: &str,
    ) -> Result<String, PublishError>;

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus, PublishError>;

    /// Returns the published media id.
    async fn publish_container(&self, container_id: &str) -> Result<String, PublishError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerStatus {
    Finished,
    InProgress,
    Failed { message: String },
}

impl ContainerStatus {
    /// Map the upstream `status_code` (and optional human `status`).
    pub fn from_code(code: &str, status: Option<&str>) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "FINISHED" => ContainerStatus::Finished,
            "ERROR" | "EXPIRED" => ContainerStatus::Failed {
                message: status
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(code)
                    .to_string(),
            },
            _ => ContainerStatus::InProgress,
        }
    }
}

/// How long to wait for a container to become ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedContainer {
    id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyContainer {
    id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMedia {
    pub container_id: String,
    pub media_id: String,
}

impl CreatedContainer {
    pub async fn create(
        api: &dyn ContainerApi,
        image_url: &str,
        caption: &str,
    ) -> Result<Self, PublishError> {
        let id = api.create_container(image_url, caption).await?;
        engine_info!("Created media container {}", id);
        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Check the status up to `policy.max_attempts` times, sleeping
    /// `policy.interval` between checks.
    pub async fn wait_until_ready(
        self,
        api: &dyn ContainerApi,
        policy: PollPolicy,
    ) -> Result<ReadyContainer, PublishError> {
        for attempt in 1..=policy.max_attempts {
            match api.container_status(&self.id).await? {
                ContainerStatus::Finished => {
                    engine_debug!("Container {} ready after {} check(s)", self.id, attempt);
                    return Ok(ReadyContainer { id: self.id });
                }
                ContainerStatus::Failed { message } => {
                    return Err(PublishError::ContainerFailed {
                        container_id: self.id,
                        message,
                    });
                }
                ContainerStatus::InProgress => {
                    engine_debug!(
                        "Container {} still processing ({}/{})",
                        self.id,
                        attempt,
                        policy.max_attempts
                    );
                    if attempt < policy.max_attempts {
                        tokio::time::sleep(policy.interval).await;
                    }
                }
            }
        }
        Err(PublishError::PollTimeout {
            container_id: self.id,
            attempts: policy.max_attempts,
        })
    }
}

impl ReadyContainer {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn publish(self, api: &dyn ContainerApi) -> Result<PublishedMedia, PublishError> {
        let media_id = api.publish_container(&self.id).await?;
        Ok(PublishedMedia {
            container_id: self.id,
            media_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ContainerStatus;

    #[test]
    fn status_codes_map_to_states() {
        assert_eq!(ContainerStatus::from_code("FINISHED", None), ContainerStatus::Finished);
        assert_eq!(ContainerStatus::from_code("IN_PROGRESS", None), ContainerStatus::InProgress);
        assert_eq!(
            ContainerStatus::from_code("ERROR", Some("Error: unsupported aspect ratio")),
            ContainerStatus::Failed {
                message: "Error: unsupported aspect ratio".to_string()
            }
        );
        assert_eq!(
            ContainerStatus::from_code("EXPIRED", Some(" ")),
            ContainerStatus::Failed {
                message: "EXPIRED".to_string()
            }
        );
    }
}
