use crate::text_processor::BudgetMeasure;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub splitter: SplitterConfig,
    pub provider: ProviderConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    pub max_chars: usize,
    pub measure: BudgetMeasure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Papago,
    Anthropic,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Papago => write!(f, "papago"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "papago" => Ok(ProviderKind::Papago),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => Err(format!(
                "unknown provider '{}' (expected papago or anthropic)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub endpoint: Option<String>,
    pub model: String,
    /// Environment variable holding the client id (Papago only).
    pub client_id_env: String,
    /// Environment variable holding the API key or client secret.
    pub api_key_env: Option<String>,
    pub request_timeout_seconds: u64,
    pub ready_timeout_seconds: u64,
    pub clear_timeout_seconds: u64,
    pub output_timeout_seconds: u64,
    pub poll_interval_ms: u64,
    pub min_output_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub work_dir: PathBuf,
    pub pause_on_completion: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            max_chars: 2999,
            measure: BudgetMeasure::Chars,
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Papago,
            endpoint: None,
            model: "claude-3-5-sonnet-20241022".to_string(),
            client_id_env: "PAPAGO_CLIENT_ID".to_string(),
            api_key_env: None,
            request_timeout_seconds: 30,
            ready_timeout_seconds: 15,
            clear_timeout_seconds: 10,
            output_timeout_seconds: 10,
            poll_interval_ms: 200,
            min_output_chars: 5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            pause_on_completion: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn endpoint(&self) -> &str {
        match (&self.endpoint, self.kind) {
            (Some(endpoint), _) => endpoint,
            (None, ProviderKind::Papago) => {
                "https://naveropenapi.apigw.ntruss.com/nmt/v1/translation"
            }
            (None, ProviderKind::Anthropic) => "https://api.anthropic.com/v1/messages",
        }
    }

    pub fn api_key_env(&self) -> &str {
        match (&self.api_key_env, self.kind) {
            (Some(name), _) => name,
            (None, ProviderKind::Papago) => "PAPAGO_CLIENT_SECRET",
            (None, ProviderKind::Anthropic) => "ANTHROPIC_API_KEY",
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn surface_timeouts(&self) -> SurfaceTimeouts {
        SurfaceTimeouts {
            ready: Duration::from_secs(self.ready_timeout_seconds),
            clear: Duration::from_secs(self.clear_timeout_seconds),
            output: Duration::from_secs(self.output_timeout_seconds),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            min_output_chars: self.min_output_chars,
        }
    }
}

/// Bounded waits used when driving an interactive translation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceTimeouts {
    pub ready: Duration,
    pub clear: Duration,
    pub output: Duration,
    pub poll_interval: Duration,
    /// Output must be strictly longer than this many characters.
    pub min_output_chars: usize,
}

impl Default for SurfaceTimeouts {
    fn default() -> Self {
        ProviderConfig::default().surface_timeouts()
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> crate::utils::errors::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::utils::errors::TranslatorError::ConfigError(e.to_string()))?;
        toml::from_str(&content)
            .map_err(|e| crate::utils::errors::TranslatorError::ConfigError(e.to_string()))
    }

    /// Loads `path` when it exists, otherwise falls back to defaults. A file
    /// that exists but does not parse is an error.
    pub fn load_or_default(path: Option<&Path>) -> crate::utils::errors::Result<Self> {
        match path {
            Some(p) if p.exists() => Self::load_from_file(p),
            _ => Ok(Self::default()),
        }
    }
}
