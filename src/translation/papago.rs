use crate::translation::http::{build_client, credential, ensure_success, map_send_error};
use crate::translation::languages::LanguagePair;
use crate::translation::provider::TranslationProvider;
use crate::utils::{ProviderConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

/// Papago NMT over its HTTP API.
///
/// The service reports the pair it actually translated with; that report is
/// what `active_pair` returns, so a response in an unexpected pair shows up as
/// drift before the next chunk.
pub struct PapagoProvider {
    client: Client,
    config: ProviderConfig,
    client_id: String,
    client_secret: String,
    active: LanguagePair,
}

#[derive(Debug, Deserialize)]
struct PapagoResponse {
    message: PapagoMessage,
}

#[derive(Debug, Deserialize)]
struct PapagoMessage {
    result: PapagoResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PapagoResult {
    src_lang_type: Option<String>,
    tar_lang_type: Option<String>,
    translated_text: String,
}

impl PapagoProvider {
    pub fn new(config: ProviderConfig, pair: LanguagePair) -> Result<Self> {
        let client_id = credential(&config.client_id_env)?;
        let client_secret = credential(config.api_key_env())?;

        Ok(Self {
            client: build_client(config.request_timeout())?,
            config,
            client_id,
            client_secret,
            active: pair,
        })
    }

    fn record_reported_pair(&mut self, result: &PapagoResult) {
        let reported = match (&result.src_lang_type, &result.tar_lang_type) {
            (Some(source), Some(target)) => LanguagePair::from_codes(source, target),
            _ => return,
        };

        match reported {
            Ok(pair) => self.active = pair,
            Err(e) => warn!(error = %e, "Papago reported a pair outside the catalog"),
        }
    }
}

#[async_trait]
impl TranslationProvider for PapagoProvider {
    fn name(&self) -> &str {
        "papago"
    }

    async fn active_pair(&mut self) -> Result<LanguagePair> {
        Ok(self.active)
    }

    async fn reconfigure(&mut self, pair: &LanguagePair) -> Result<()> {
        self.active = *pair;
        Ok(())
    }

    async fn translate(&mut self, text: &str, pair: &LanguagePair) -> Result<String> {
        let form = [
            ("source", pair.source.code),
            ("target", pair.target.code),
            ("text", text),
        ];

        let response = self
            .client
            .post(self.config.endpoint())
            .header("X-NCP-APIGW-API-KEY-ID", &self.client_id)
            .header("X-NCP-APIGW-API-KEY", &self.client_secret)
            .form(&form)
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.config))?;

        let response = ensure_success(response).await?;
        let body: PapagoResponse = serde_json::from_str(&response.text().await?)?;

        self.record_reported_pair(&body.message.result);
        Ok(body.message.result.translated_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::TranslatorError;

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "message": {
                "@type": "response",
                "@service": "naverservice.nmt.proxy",
                "@version": "1.0.0",
                "result": {
                    "srcLangType": "ko",
                    "tarLangType": "en",
                    "translatedText": "Hello, world."
                }
            }
        }"#;

        let parsed: PapagoResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.result.translated_text, "Hello, world.");
        assert_eq!(parsed.message.result.src_lang_type.as_deref(), Some("ko"));
    }

    fn provider_for(pair: LanguagePair) -> PapagoProvider {
        PapagoProvider {
            client: Client::new(),
            config: ProviderConfig::default(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            active: pair,
        }
    }

    #[tokio::test]
    async fn test_reported_pair_becomes_active_until_reconfigured() {
        let expected = LanguagePair::from_codes("ko", "en").unwrap();
        let mut provider = provider_for(expected);

        let body: PapagoResponse = serde_json::from_str(
            r#"{"message":{"result":{"srcLangType":"ja","tarLangType":"en","translatedText":"Hi"}}}"#,
        )
        .unwrap();
        provider.record_reported_pair(&body.message.result);

        let drifted = provider.active_pair().await.unwrap();
        assert_eq!(drifted, LanguagePair::from_codes("ja", "en").unwrap());

        provider.reconfigure(&expected).await.unwrap();
        assert_eq!(provider.active_pair().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_unreported_or_unknown_pair_keeps_active() {
        let expected = LanguagePair::from_codes("ko", "en").unwrap();
        let mut provider = provider_for(expected);

        let partial: PapagoResponse = serde_json::from_str(
            r#"{"message":{"result":{"translatedText":"Hi"}}}"#,
        )
        .unwrap();
        provider.record_reported_pair(&partial.message.result);
        assert_eq!(provider.active_pair().await.unwrap(), expected);

        let unknown: PapagoResponse = serde_json::from_str(
            r#"{"message":{"result":{"srcLangType":"xx","tarLangType":"en","translatedText":"Hi"}}}"#,
        )
        .unwrap();
        provider.record_reported_pair(&unknown.message.result);
        assert_eq!(provider.active_pair().await.unwrap(), expected);
    }

    #[test]
    fn test_error_body_is_json_error() {
        let parsed = serde_json::from_str::<PapagoResponse>(r#"{"errorCode":"N2MT05"}"#);
        let err: TranslatorError = parsed.unwrap_err().into();
        assert!(matches!(err, TranslatorError::JsonError(_)));
    }

    #[test]
    fn test_missing_credentials_is_config_error() {
        let config = ProviderConfig {
            client_id_env: "CHUNK_TRANSLATOR_TEST_UNSET_ID".to_string(),
            api_key_env: Some("CHUNK_TRANSLATOR_TEST_UNSET_SECRET".to_string()),
            ..ProviderConfig::default()
        };
        let pair = LanguagePair::from_codes("ko", "en").unwrap();

        assert!(matches!(
            PapagoProvider::new(config, pair),
            Err(TranslatorError::ConfigError(_))
        ));
    }
}
