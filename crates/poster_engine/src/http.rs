use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::{PublishError, Step};

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            redirect_limit: 5,
        }
    }
}

impl HttpSettings {
    pub(crate) fn build_client(&self) -> Result<reqwest::Client, PublishError> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.redirect_limit))
            .build()
            .map_err(|err| PublishError::Endpoint(err.to_string()))
    }
}

pub(crate) fn map_reqwest_error(step: Step, err: reqwest::Error) -> PublishError {
    if err.is_timeout() {
        return PublishError::Timeout {
            step,
            message: err.to_string(),
        };
    }
    PublishError::Network {
        step,
        message: err.to_string(),
    }
}

/// `{base}/{path}?{params}`, tolerating a trailing slash on `base`.
pub(crate) fn endpoint(
    base: &str,
    path: &str,
    params: &[(&str, &str)],
) -> Result<Url, PublishError> {
    let joined = format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'));
    if params.is_empty() {
        Url::parse(&joined)
    } else {
        Url::parse_with_params(&joined, params)
    }
    .map_err(|err| PublishError::Endpoint(format!("{joined}: {err}")))
}

/// Read a response as JSON, turning non-2xx statuses into [`PublishError::Http`].
pub(crate) async fn read_json(
    step: Step,
    response: reqwest::Response,
) -> Result<Value, PublishError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| map_reqwest_error(step, err))?;

    if !status.is_success() {
        return Err(PublishError::Http {
            step,
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|err| PublishError::Decode {
        step,
        message: format!("{err} - body: {body}"),
    })
}

/// First of `keys` holding a non-empty string or a number.
pub(crate) fn id_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Like [`id_field`] but fails with [`PublishError::MissingId`].
pub(crate) fn require_id(step: Step, value: &Value, keys: &[&str]) -> Result<String, PublishError> {
    id_field(value, keys).ok_or_else(|| PublishError::MissingId {
        step,
        body: value.to_string(),
    })
}
