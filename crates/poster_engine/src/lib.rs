//! Poster engine: queue persistence, image handling, publishing backends and
//! the effect executor that drives a run.
mod container;
mod direct;
mod download;
mod engine;
mod graph;
mod http;
mod persist;
mod publisher;
mod resize;
mod session;
mod source;
mod store;
mod types;

pub use container::{
    ContainerApi, ContainerStatus, CreatedContainer, PollPolicy, PublishedMedia, ReadyContainer,
};
pub use direct::{DirectSettings, DirectUploadPublisher};
pub use download::{DownloadSettings, ImageDownloader};
pub use engine::{format_timestamp, Clock, EngineConfig, EngineError, RunEngine};
pub use graph::{GraphPublisher, GraphSettings, ReqwestGraphApi, DEFAULT_GRAPH_BASE_URL};
pub use http::HttpSettings;
pub use persist::{backup_once, ensure_dir, AtomicFileWriter, PersistError, StagedFile};
pub use publisher::{DryRunPublisher, Publisher, DRY_RUN_MEDIA_ID};
pub use resize::{prepare_image, PreparedImage, MAX_SIDE};
pub use session::{FileSessionStore, Session, SessionStore, SessionStoreError};
pub use source::ImageSource;
pub use store::{QueueStore, StoreError};
pub use types::{PublishError, RowDataError, Step};
