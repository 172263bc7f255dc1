use crate::utils::{ProviderConfig, Result, TranslatorError};
use reqwest::{Client, Response};
use std::time::Duration;

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Reads a credential from the environment variable named in the config.
pub(crate) fn credential(var: &str) -> Result<String> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            TranslatorError::ConfigError(format!("environment variable {} is not set", var))
        })
}

/// Client timeouts surface as `ProviderTimeout`, everything else as a session
/// error, so the pipeline sees the same taxonomy for every provider.
pub(crate) fn map_send_error(err: reqwest::Error, config: &ProviderConfig) -> TranslatorError {
    if err.is_timeout() {
        TranslatorError::timeout("waiting for the HTTP response", config.request_timeout())
    } else {
        TranslatorError::ProviderSession(format!("request failed: {}", err))
    }
}

pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(TranslatorError::ProviderSession(format!(
        "API returned {}: {}",
        status, body
    )))
}
