use engine_logging::engine_info;
use serde_json::Value;
use url::Url;

use crate::container::{ContainerApi, ContainerStatus, CreatedContainer, PollPolicy};
use crate::http::{endpoint, map_reqwest_error, read_json, require_id, HttpSettings};
use crate::{ImageSource, PublishError, Publisher, Step};

pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com/v19.0";

#[derive(Debug, Clone)]
pub struct GraphSettings {
    pub base_url: String,
    pub account_id: String,
    pub access_token: String,
    pub poll: PollPolicy,
    pub http: HttpSettings,
    /// Base URL under which files from the images directory are served.
    pub public_base_url: Option<Url>,
}

impl GraphSettings {
    pub fn new(account_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            account_id: account_id.into(),
            access_token: access_token.into(),
            poll: PollPolicy::default(),
            http: HttpSettings::default(),
            public_base_url: None,
        }
    }
}

/// [`ContainerApi`] over the Graph HTTP endpoints.
#[derive(Debug, Clone)]
pub struct ReqwestGraphApi {
    client: reqwest::Client,
    base_url: String,
    account_id: String,
    access_token: String,
}

impl ReqwestGraphApi {
    pub fn new(settings: &GraphSettings) -> Result<Self, PublishError> {
        Ok(Self {
            client: settings.http.build_client()?,
            base_url: settings.base_url.clone(),
            account_id: settings.account_id.clone(),
            access_token: settings.access_token.clone(),
        })
    }

    async fn post(
        &self,
        step: Step,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, PublishError> {
        let mut params = params.to_vec();
        params.push(("access_token", self.access_token.as_str()));
        let url = endpoint(&self.base_url, path, &params)?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|err| map_reqwest_error(step, err))?;
        read_json(step, response).await
    }
}

#[async_trait::async_trait]
impl ContainerApi for ReqwestGraphApi {
    async fn create_container(
        &self,
        image_url: &str,
        caption: &str,
    ) -> Result<String, PublishError> {
        let path = format!("{}/media", self.account_id);
        let body = self
            .post(
                Step::CreateContainer,
                &path,
                &[("image_url", image_url), ("caption", caption)],
            )
            .await?;
        require_id(Step::CreateContainer, &body, &["id"])
    }

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus, PublishError> {
        let step = Step::ContainerStatus;
        let url = endpoint(
            &self.base_url,
            container_id,
            &[
                ("fields", "status_code,status"),
                ("access_token", self.access_token.as_str()),
            ],
        )?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| map_reqwest_error(step, err))?;
        let body = read_json(step, response).await?;

        let code = body
            .get("status_code")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let status = body.get("status").and_then(Value::as_str);
        Ok(ContainerStatus::from_code(code, status))
    }

    async fn publish_container(&self, container_id: &str) -> Result<String, PublishError> {
        let path = format!("{}/media_publish", self.account_id);
        let body = self
            .post(Step::PublishContainer, &path, &[("creation_id", container_id)])
            .await?;
        require_id(Step::PublishContainer, &body, &["id"])
    }
}

/// Publishes through a media container: create, wait until ready, publish.
pub struct GraphPublisher<A = ReqwestGraphApi> {
    api: A,
    poll: PollPolicy,
    public_base_url: Option<Url>,
}

impl GraphPublisher<ReqwestGraphApi> {
    pub fn new(settings: &GraphSettings) -> Result<Self, PublishError> {
        Ok(Self::with_api(
            ReqwestGraphApi::new(settings)?,
            settings.poll,
            settings.public_base_url.clone(),
        ))
    }
}

impl<A: ContainerApi> GraphPublisher<A> {
    pub fn with_api(api: A, poll: PollPolicy, public_base_url: Option<Url>) -> Self {
        Self {
            api,
            poll,
            public_base_url,
        }
    }

    /// The container API fetches the image itself, so it needs a public URL.
    fn image_url(&self, image: &ImageSource) -> Result<String, PublishError> {
        match image {
            ImageSource::Remote(url) => Ok(url.to_string()),
            ImageSource::Local { name, path } => {
                let base = self
                    .public_base_url
                    .as_ref()
                    .ok_or_else(|| PublishError::LocalSourceUnsupported(name.clone()))?;
                // Absolute paths are published under their file name only.
                let relative = if std::path::Path::new(name).is_absolute() {
                    path.file_name()
                        .map(|f| f.to_string_lossy().into_owned())
                        .unwrap_or_else(|| name.clone())
                } else {
                    name.replace('\\', "/")
                };
                base.join(&relative)
                    .map(|url| url.to_string())
                    .map_err(|err| PublishError::Endpoint(format!("{base}{relative}: {err}")))
            }
        }
    }
}

#[async_trait::async_trait]
impl<A: ContainerApi> Publisher for GraphPublisher<A> {
    async fn publish(&self, image: &ImageSource, caption: &str) -> Result<String, PublishError> {
        let image_url = self.image_url(image)?;
        let created = CreatedContainer::create(&self.api, &image_url, caption).await?;
        let ready = created.wait_until_ready(&self.api, self.poll).await?;
        let published = ready.publish(&self.api).await?;
        engine_info!(
            "Published container {} as media {}",
            published.container_id,
            published.media_id
        );
        Ok(published.media_id)
    }
}
