pub mod config;
pub mod errors;

pub use config::{
    AppConfig, LoggingConfig, OutputConfig, ProviderConfig, ProviderKind, SplitterConfig,
    SurfaceTimeouts,
};
pub use errors::{FatalPipelineError, Result, TranslatorError};

/// Strips a leading UTF-8 byte order mark so it never counts against a budget
/// or leaks into a provider request.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}
