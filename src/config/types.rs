use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Lorebox
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub wiki: WikiConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub extraction: ExtractionConfig,
    pub datasets: DatasetConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub images: ImageConfig,
}

/// Wiki endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct WikiConfig {
    /// MediaWiki API endpoint used for `action=parse` requests
    #[serde(rename = "api-url")]
    pub api_url: String,

    /// Site root used to absolutize relative image paths
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the tool
    pub name: String,

    /// Version of the tool
    pub version: String,

    /// URL with information about the tool
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for contact about the traffic
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// HTTP client timeouts
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(
        rename = "connect-timeout-secs",
        default = "default_connect_timeout_secs"
    )]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Backend used to persist extracted pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// One randomly named JSON file per page
    #[default]
    Directory,

    /// Indexed SQLite manifest
    Sqlite,
}

/// Extraction pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Text file with one page title per line
    #[serde(rename = "titles-path")]
    pub titles_path: PathBuf,

    /// Directory receiving one JSON record per extracted page
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub store: StoreKind,

    /// SQLite database, required when `store = "sqlite"`
    #[serde(rename = "database-path", default)]
    pub database_path: Option<PathBuf>,

    /// Retry list for the directory store
    #[serde(rename = "retry-path", default)]
    pub retry_path: Option<PathBuf>,
}

impl ExtractionConfig {
    /// Location of the directory store's retry list.
    ///
    /// Defaults to a sibling of the output directory, `<output-dir>.retry.json`,
    /// so the ledger scan never reads it as a record. Trailing separators on
    /// `output-dir` are ignored.
    pub fn retry_path(&self) -> PathBuf {
        match &self.retry_path {
            Some(path) => path.clone(),
            None => {
                let mut name = self
                    .output_dir
                    .file_name()
                    .map(|name| name.to_os_string())
                    .unwrap_or_else(|| "records".into());
                name.push(".retry.json");

                match self.output_dir.parent() {
                    Some(parent) => parent.join(name),
                    None => PathBuf::from(name),
                }
            }
        }
    }
}

/// Upstream dataset locations
///
/// Each path is either a directory of per-record JSON files or a single
/// JSON file mapping id to record.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub items: PathBuf,
    pub monsters: PathBuf,
    pub prayers: PathBuf,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the aggregated JSON files
    #[serde(rename = "docs-dir")]
    pub docs_dir: PathBuf,
}

/// Image resolution behavior
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageConfig {
    /// Extra fetch attempts per monster identity after transient failures
    #[serde(rename = "retry-limit", default)]
    pub retry_limit: u32,
}
