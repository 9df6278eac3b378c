//! Turns command-line flags and environment variables into a run
//! configuration. Everything is validated here, before the queue is opened.
use std::path::PathBuf;

use chrono::NaiveDate;
use engine_logging::engine_warn;
use poster_core::{Selection, SelectionMode};
use poster_engine::{DirectSettings, GraphSettings};
use thiserror::Error;
use url::Url;

use crate::cli::{Args, Backend};

pub const ENV_USER_ID: &str = "IG_USER_ID";
pub const ENV_ACCESS_TOKEN: &str = "IG_ACCESS_TOKEN";
pub const ENV_GRAPH_BASE_URL: &str = "IG_GRAPH_BASE_URL";
pub const ENV_USERNAME: &str = "IG_USERNAME";
pub const ENV_PASSWORD: &str = "IG_PASSWORD";
pub const ENV_API_BASE_URL: &str = "IG_API_BASE_URL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
    #[error("--limit must be at least 1")]
    ZeroLimit,
    #[error("invalid {name} {value:?}: {message}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub enum BackendConfig {
    DryRun,
    Graph(GraphSettings),
    Direct {
        settings: DirectSettings,
        session_file: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv: PathBuf,
    pub images_dir: PathBuf,
    pub selection: Selection,
    pub backend: BackendConfig,
}

impl RunConfig {
    pub fn is_dry_run(&self) -> bool {
        matches!(self.backend, BackendConfig::DryRun)
    }
}

/// Build the run configuration. `env` looks up an environment variable;
/// blank values count as unset.
pub fn resolve<F>(args: &Args, env: F) -> Result<RunConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if args.limit == 0 {
        return Err(ConfigError::ZeroLimit);
    }
    let lookup = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let require = |name: &'static str| lookup(name).ok_or(ConfigError::MissingEnv(name));

    let backend = if args.dry_run {
        BackendConfig::DryRun
    } else {
        match args.backend {
            Backend::Graph => {
                let mut settings =
                    GraphSettings::new(require(ENV_USER_ID)?, require(ENV_ACCESS_TOKEN)?);
                if let Some(base) = lookup(ENV_GRAPH_BASE_URL) {
                    settings.base_url = base;
                }
                settings.public_base_url = args
                    .public_base_url
                    .as_deref()
                    .map(public_base_url)
                    .transpose()?;
                BackendConfig::Graph(settings)
            }
            Backend::Direct => {
                if args.public_base_url.is_some() {
                    engine_warn!(
                        "--public-base-url only applies to the graph backend; ignoring it"
                    );
                }
                let settings = DirectSettings::new(
                    require(ENV_API_BASE_URL)?,
                    require(ENV_USERNAME)?,
                    require(ENV_PASSWORD)?,
                );
                BackendConfig::Direct {
                    settings,
                    session_file: args.session_file.clone(),
                }
            }
        }
    };

    let start_date = parse_date_flag("--start-date", args.start_date.as_deref());
    let end_date = parse_date_flag("--end-date", args.end_date.as_deref());
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            engine_warn!("--start-date {} is after --end-date {}; nothing can match", start, end);
        }
    }

    let selection = Selection {
        mode: if args.all {
            SelectionMode::All
        } else {
            SelectionMode::NextScheduled
        },
        limit: args.limit,
        category: args
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        start_date,
        end_date,
    };

    Ok(RunConfig {
        csv: args.csv.clone(),
        images_dir: args.images_dir.clone(),
        selection,
        backend,
    })
}

/// A malformed date bound is reported and dropped rather than failing the run.
fn parse_date_flag(flag: &str, value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            engine_warn!("Ignoring {} {:?}: {} (expected YYYY-MM-DD)", flag, value, err);
            None
        }
    }
}

/// Parse the public base URL, forcing a trailing slash so that joining a
/// file name appends to the path instead of replacing its last segment.
fn public_base_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let invalid = |message: String| ConfigError::InvalidUrl {
        name: "--public-base-url",
        value: raw.to_string(),
        message,
    };
    let url = Url::parse(&with_slash).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http(s) URL".to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(flags: &[&str]) -> Args {
        Args::parse_from(std::iter::once("poster").chain(flags.iter().copied()))
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_select_next_scheduled_on_graph() {
        let config = resolve(
            &args(&[]),
            env(&[(ENV_USER_ID, "1784"), (ENV_ACCESS_TOKEN, "tok")]),
        )
        .unwrap();

        assert_eq!(config.csv, PathBuf::from("captions.csv"));
        assert_eq!(config.images_dir, PathBuf::from("images"));
        assert_eq!(config.selection, Selection::default());
        match config.backend {
            BackendConfig::Graph(settings) => {
                assert_eq!(settings.account_id, "1784");
                assert_eq!(settings.access_token, "tok");
                assert_eq!(settings.base_url, poster_engine::DEFAULT_GRAPH_BASE_URL);
                assert_eq!(settings.public_base_url, None);
            }
            other => panic!("expected graph backend, got {other:?}"),
        }
    }

    #[test]
    fn dry_run_needs_no_credentials() {
        let config = resolve(&args(&["--dry-run", "--backend", "direct"]), env(&[])).unwrap();
        assert!(config.is_dry_run());
    }

    #[test]
    fn missing_credentials_are_reported_by_name() {
        let err = resolve(&args(&[]), env(&[(ENV_USER_ID, "1784")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnv(ENV_ACCESS_TOKEN));

        let err = resolve(
            &args(&["--backend", "direct"]),
            env(&[(ENV_API_BASE_URL, "https://api.example.com"), (ENV_USERNAME, "  ")]),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingEnv(ENV_USERNAME));
    }

    #[test]
    fn direct_backend_reads_its_environment() {
        let config = resolve(
            &args(&["--backend", "direct", "--session-file", "state/session.json"]),
            env(&[
                (ENV_API_BASE_URL, "https://api.example.com/v1"),
                (ENV_USERNAME, "alice"),
                (ENV_PASSWORD, "hunter2"),
            ]),
        )
        .unwrap();
        match config.backend {
            BackendConfig::Direct {
                settings,
                session_file,
            } => {
                assert_eq!(settings.base_url, "https://api.example.com/v1");
                assert_eq!(settings.username, "alice");
                assert_eq!(session_file, PathBuf::from("state/session.json"));
            }
            other => panic!("expected direct backend, got {other:?}"),
        }
    }

    #[test]
    fn filters_and_modes_map_onto_the_selection() {
        let config = resolve(
            &args(&[
                "--dry-run",
                "--all",
                "--limit",
                "3",
                "--category",
                " Nature ",
                "--start-date",
                "2026-10-01",
                "--end-date",
                "not-a-date",
            ]),
            env(&[]),
        )
        .unwrap();

        assert_eq!(
            config.selection,
            Selection {
                mode: SelectionMode::All,
                limit: 3,
                category: Some("Nature".to_string()),
                start_date: NaiveDate::from_ymd_opt(2026, 10, 1),
                end_date: None,
            }
        );
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = resolve(&args(&["--dry-run", "--limit", "0"]), env(&[])).unwrap_err();
        assert_eq!(err, ConfigError::ZeroLimit);
    }

    #[test]
    fn public_base_url_gets_a_trailing_slash() {
        let config = resolve(
            &args(&["--public-base-url", "https://static.example.com/queue"]),
            env(&[
                (ENV_USER_ID, "1784"),
                (ENV_ACCESS_TOKEN, "tok"),
                (ENV_GRAPH_BASE_URL, "http://localhost:9000/v19.0"),
            ]),
        )
        .unwrap();
        let BackendConfig::Graph(settings) = config.backend else {
            panic!("expected graph backend");
        };
        assert_eq!(settings.base_url, "http://localhost:9000/v19.0");
        assert_eq!(
            settings.public_base_url.map(String::from),
            Some("https://static.example.com/queue/".to_string())
        );
    }

    #[test]
    fn non_http_public_base_url_is_rejected() {
        let err = resolve(
            &args(&["--public-base-url", "ftp://files.example.com"]),
            env(&[(ENV_USER_ID, "1784"), (ENV_ACCESS_TOKEN, "tok")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { name: "--public-base-url", .. }));
    }
}
