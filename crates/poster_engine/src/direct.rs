use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use image::ImageFormat;
use reqwest::multipart::{Form, Part};
use serde_json::json;
use tempfile::TempPath;
use tokio::sync::Mutex;

use crate::download::{DownloadSettings, ImageDownloader};
use crate::http::{endpoint, map_reqwest_error, read_json, require_id, HttpSettings};
use crate::resize::{prepare_image, MAX_SIDE};
use crate::{ImageSource, PublishError, Publisher, Session, SessionStore, Step};

/// Header carrying the session id on authenticated requests.
const SESSION_HEADER: &str = "X-Session-Id";

#[derive(Debug, Clone)]
pub struct DirectSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Longest side allowed before an image is downscaled.
    pub max_side: u32,
    pub http: HttpSettings,
    pub download: DownloadSettings,
}

impl DirectSettings {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            max_side: MAX_SIDE,
            http: HttpSettings::default(),
            download: DownloadSettings::default(),
        }
    }
}

/// Session-based backend: logs in once, then uploads image files directly.
pub struct DirectUploadPublisher {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    max_side: u32,
    downloader: ImageDownloader,
    sessions: Box<dyn SessionStore>,
    session: Mutex<Option<Session>>,
}

impl DirectUploadPublisher {
    pub fn new(
        settings: &DirectSettings,
        sessions: Box<dyn SessionStore>,
    ) -> Result<Self, PublishError> {
        Ok(Self {
            client: settings.http.build_client()?,
            base_url: settings.base_url.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            max_side: settings.max_side,
            downloader: ImageDownloader::new(&settings.download)?,
            sessions,
            session: Mutex::new(None),
        })
    }

    /// The run's session, established on first use.
    async fn session(&self) -> Result<Session, PublishError> {
        let mut cached = self.session.lock().await;
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }
        let session = self.restore_or_login().await?;
        *cached = Some(session.clone());
        Ok(session)
    }

    async fn restore_or_login(&self) -> Result<Session, PublishError> {
        match self.sessions.load() {
            Ok(Some(saved)) if saved.username == self.username => match self.verify(&saved).await {
                Ok(()) => {
                    engine_info!("Restored saved session for {}", saved.username);
                    return Ok(saved);
                }
                Err(err) => engine_warn!("Saved session rejected ({}); logging in again", err),
            },
            Ok(Some(saved)) => {
                engine_info!("Saved session belongs to {}; logging in again", saved.username)
            }
            Ok(None) => {}
            Err(err) => engine_warn!("Could not read saved session ({}); logging in again", err),
        }

        let session = self.login().await?;
        // A session that cannot be cached only costs a login next run.
        if let Err(err) = self.sessions.save(&session) {
            engine_warn!("Could not save session: {}", err);
        }
        Ok(session)
    }

    async fn login(&self) -> Result<Session, PublishError> {
        let step = Step::Login;
        let url = endpoint(&self.base_url, "accounts/login", &[])?;
        let response = self
            .client
            .post(url)
            .json(&json!({ "username": self.username, "password": self.password }))
            .send()
            .await
            .map_err(|err| map_reqwest_error(step, err))?;
        let body = read_json(step, response).await?;
        let session_id = require_id(step, &body, &["session_id"])?;
        engine_info!("Logged in as {}", self.username);
        Ok(Session {
            username: self.username.clone(),
            session_id,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    async fn verify(&self, session: &Session) -> Result<(), PublishError> {
        let step = Step::VerifySession;
        let url = endpoint(&self.base_url, "accounts/current_user", &[])?;
        let response = self
            .client
            .get(url)
            .header(SESSION_HEADER, &session.session_id)
            .send()
            .await
            .map_err(|err| map_reqwest_error(step, err))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(PublishError::Http {
            step,
            status: status.as_u16(),
            body,
        })
    }

    async fn upload(
        &self,
        session: &Session,
        path: &Path,
        caption: &str,
    ) -> Result<String, PublishError> {
        let step = Step::Upload;
        let bytes = std::fs::read(path)?;
        let mime = ImageFormat::from_path(path)
            .map(|format| format.to_mime_type())
            .unwrap_or("image/jpeg");
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|err| map_reqwest_error(step, err))?;
        let form = Form::new()
            .text("caption", caption.to_string())
            .part("photo", part);

        let url = endpoint(&self.base_url, "media/upload_photo", &[])?;
        let response = self
            .client
            .post(url)
            .header(SESSION_HEADER, &session.session_id)
            .multipart(form)
            .send()
            .await
            .map_err(|err| map_reqwest_error(step, err))?;
        let body = read_json(step, response).await?;
        require_id(step, &body, &["pk", "id"])
    }
}

#[async_trait::async_trait]
impl Publisher for DirectUploadPublisher {
    async fn prepare(&self) -> Result<(), PublishError> {
        self.session().await.map(|_| ())
    }

    async fn publish(&self, image: &ImageSource, caption: &str) -> Result<String, PublishError> {
        let session = self.session().await?;

        // Temp files below are deleted when they go out of scope, on every path.
        let (source, _download): (PathBuf, Option<TempPath>) = match image {
            ImageSource::Remote(url) => {
                let tmp = self.downloader.download(url).await?;
                (tmp.to_path_buf(), Some(tmp))
            }
            ImageSource::Local { path, .. } => (path.clone(), None),
        };

        let prepared = prepare_image(&source, self.max_side)?;
        self.upload(&session, prepared.path(), caption).await
    }
}
