use std::path::{Path, PathBuf};

use poster_core::QueueRow;
use url::Url;

use crate::RowDataError;

/// Where a row's image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(Url),
    /// `name` is the cell as written; `path` is resolved against the images directory.
    Local { name: String, path: PathBuf },
}

impl ImageSource {
    pub fn from_row(row: &QueueRow, images_dir: &Path) -> Result<Self, RowDataError> {
        let raw = row
            .image_source
            .as_deref()
            .ok_or(RowDataError::MissingImageSource)?;
        Self::resolve(raw, images_dir)
    }

    /// `http(s)://` values are remote; absolute paths are kept; anything else
    /// is joined onto `images_dir`.
    pub fn resolve(raw: &str, images_dir: &Path) -> Result<Self, RowDataError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RowDataError::MissingImageSource);
        }
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Url::parse(raw)
                .map(ImageSource::Remote)
                .map_err(|err| RowDataError::InvalidUrl {
                    raw: raw.to_string(),
                    message: err.to_string(),
                });
        }
        let candidate = Path::new(raw);
        let path = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            images_dir.join(candidate)
        };
        Ok(ImageSource::Local {
            name: raw.to_string(),
            path,
        })
    }
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Remote(url) => write!(f, "{url}"),
            ImageSource::Local { path, .. } => write!(f, "{}", path.display()),
        }
    }
}
