//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults (`md5`, `10`, `list.txt`)
//! 2. A TOML file: `--config <FILE>`, or `config.toml` in the platform
//!    config directory (e.g. `~/.config/duplicate-cleaner/`) when present
//! 3. `DUPCLEAN_HASH`, `DUPCLEAN_COUNT`, `DUPCLEAN_OUTPUT`
//! 4. Command-line flags
//!
//! [`Plan::resolve`] then validates everything before any file is touched.
//!
//! ```toml
//! hash = "sha256"
//! count = 4
//! output = "/tmp/duplicates.txt"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;
use crate::scanner::HashAlgorithm;

/// Prefix of the environment variables read as settings.
pub const ENV_PREFIX: &str = "DUPCLEAN_";

/// Settings that can come from any configuration layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Digest name, matched case-insensitively.
    pub hash: String,
    /// Concurrency bound for hashing. Signed so that bad values reach validation.
    pub count: i64,
    /// Where list mode writes its result.
    pub output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hash: HashAlgorithm::default().name().to_string(),
            count: 10,
            output: PathBuf::from("list.txt"),
        }
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            hash: cli.hash.clone(),
            count: cli.count,
            output: cli.output.clone(),
        }
    }
}

impl Settings {
    /// Default config file location, if the platform has one.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "duplicate-cleaner")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Defaults merged with a TOML file, without environment or CLI layers.
    ///
    /// A missing file contributes nothing.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match config_file {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment,
        }
    }

    /// Resolve all layers for `cli`.
    ///
    /// # Errors
    ///
    /// - `MissingFile` if `--config` names a file that does not exist
    /// - `Load` if a layer holds a malformed or mistyped value
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let config_file = match cli.config {
            Some(ref path) => {
                if !path.is_file() {
                    return Err(ConfigError::MissingFile(path.clone()));
                }
                Some(path.clone())
            }
            None => Self::default_config_path(),
        };

        if let Some(ref path) = config_file {
            log::debug!("Config file: {}", path.display());
        }

        Self::figment(config_file.as_deref())
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(CliOverrides::from(cli)))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Render as TOML, in the same shape a config file takes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

/// Which pass to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Detect duplicates and write the list.
    List,
    /// Delete the paths in one or more lists.
    Clean,
}

/// Configuration errors. All of them are raised before any work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither or both of `--list` and `--clean` were given.
    #[error("{0}")]
    ModeSelection(&'static str),

    /// The concurrency bound was below 1.
    #[error("count must be at least 1, got {0}")]
    InvalidConcurrency(i64),

    /// List mode without any directory.
    #[error("no roots specified")]
    NoRoots,

    /// Clean mode without any list file.
    #[error("no list files specified")]
    NoLists,

    /// `--config` pointed at a file that does not exist.
    #[error("config file not found: {0}")]
    MissingFile(PathBuf),

    /// A configuration layer could not be read or had a bad value.
    #[error("failed to load configuration: {0}")]
    Load(#[source] Box<figment::Error>),
}

/// A validated, ready-to-run invocation.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Pass to run.
    pub mode: Mode,
    /// Roots (list mode) or list files (clean mode), never empty.
    pub paths: Vec<PathBuf>,
    /// Digest to compare with.
    pub algorithm: HashAlgorithm,
    /// Concurrency bound, at least 1.
    pub io_threads: usize,
    /// List destination.
    pub output: PathBuf,
    /// Fail on any hashing error.
    pub strict: bool,
    /// No progress bars and no console copy of the list.
    pub quiet: bool,
}

impl Plan {
    /// Validate `cli` against all configuration layers.
    ///
    /// Checks run in order: mode selection, settings layers, concurrency,
    /// positional paths.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mode = match (cli.list, cli.clean) {
            (true, false) => Mode::List,
            (false, true) => Mode::Clean,
            (true, true) => {
                return Err(ConfigError::ModeSelection(
                    "--list and --clean cannot be used together",
                ))
            }
            (false, false) => {
                return Err(ConfigError::ModeSelection(
                    "one of --list or --clean is required",
                ))
            }
        };

        let settings = Settings::load(cli)?;

        let io_threads = usize::try_from(settings.count)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or(ConfigError::InvalidConcurrency(settings.count))?;

        if cli.paths.is_empty() {
            return Err(match mode {
                Mode::List => ConfigError::NoRoots,
                Mode::Clean => ConfigError::NoLists,
            });
        }

        Ok(Self {
            mode,
            paths: cli.paths.clone(),
            algorithm: HashAlgorithm::from_name(&settings.hash),
            io_threads,
            output: settings.output,
            strict: cli.strict,
            quiet: cli.quiet,
        })
    }
}
