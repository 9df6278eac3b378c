use std::fmt;

use thiserror::Error;

/// One HTTP exchange of a publishing workflow, named in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateContainer,
    ContainerStatus,
    PublishContainer,
    Login,
    VerifySession,
    Upload,
    Download,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::CreateContainer => "create container",
            Step::ContainerStatus => "container status",
            Step::PublishContainer => "publish container",
            Step::Login => "login",
            Step::VerifySession => "session check",
            Step::Upload => "upload",
            Step::Download => "image download",
        };
        f.write_str(name)
    }
}

/// Failure of a single publish attempt. Recorded on the row; the run goes on.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{step} failed with status {status}: {body}")]
    Http { step: Step, status: u16, body: String },
    #[error("{step} response has no id: {body}")]
    MissingId { step: Step, body: String },
    #[error("{step} returned an unreadable body: {message}")]
    Decode { step: Step, message: String },
    #[error("container {container_id} failed: {message}")]
    ContainerFailed { container_id: String, message: String },
    #[error("container {container_id} not ready after {attempts} status checks")]
    PollTimeout { container_id: String, attempts: u32 },
    #[error("{step} timed out: {message}")]
    Timeout { step: Step, message: String },
    #[error("{step} network error: {message}")]
    Network { step: Step, message: String },
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
    #[error("local image {0:?} needs a public base URL for the graph backend")]
    LocalSourceUnsupported(String),
    #[error("image download rejected: {0}")]
    Download(String),
    #[error("session error: {0}")]
    Session(String),
    #[error("image processing failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A queue row that cannot be published as written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowDataError {
    #[error("row is missing both image_url and filename")]
    MissingImageSource,
    #[error("invalid image url {raw:?}: {message}")]
    InvalidUrl { raw: String, message: String },
}
