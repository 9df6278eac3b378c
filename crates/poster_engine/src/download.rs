use std::io::Write;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use tempfile::TempPath;
use url::Url;

use crate::http::{map_reqwest_error, HttpSettings};
use crate::{PublishError, Step};

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub http: HttpSettings,
    pub max_bytes: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            http: HttpSettings::default(),
            max_bytes: 30 * 1024 * 1024,
        }
    }
}

/// Streams remote images into temp files that delete themselves on drop.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ImageDownloader {
    pub fn new(settings: &DownloadSettings) -> Result<Self, PublishError> {
        Ok(Self {
            client: settings.http.build_client()?,
            max_bytes: settings.max_bytes,
        })
    }

    pub async fn download(&self, url: &Url) -> Result<TempPath, PublishError> {
        let step = Step::Download;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| map_reqwest_error(step, err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Http {
                step,
                status: status.as_u16(),
                body,
            });
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(PublishError::Download(format!(
                    "{url} is {content_len} bytes (max {})",
                    self.max_bytes
                )));
            }
        }

        if let Some(ct) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            let mime = ct.split(';').next().unwrap_or(ct).trim();
            // Some CDNs label everything octet-stream; let the decoder decide.
            if !mime.starts_with("image/") && mime != "application/octet-stream" {
                return Err(PublishError::Download(format!(
                    "{url} has content type {mime}"
                )));
            }
        }

        let mut file = tempfile::Builder::new()
            .prefix("poster-download-")
            .suffix(&suffix_for(url))
            .tempfile()?;
        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| map_reqwest_error(step, err))?;
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(PublishError::Download(format!(
                    "{url} exceeds {} bytes",
                    self.max_bytes
                )));
            }
            file.write_all(&chunk)?;
        }
        file.flush()?;

        Ok(file.into_temp_path())
    }
}

/// Keep the URL's extension so format detection and the upload name match.
fn suffix_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| ".jpg".to_string())
}
