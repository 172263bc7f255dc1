use crate::translation::http::{build_client, credential, ensure_success, map_send_error};
use crate::translation::languages::LanguagePair;
use crate::translation::provider::TranslationProvider;
use crate::utils::{ProviderConfig, Result, TranslatorError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Translation through the Anthropic messages API. The language pair lives in
/// the prompt, so the session pair is whatever was last configured.
pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
    api_key: String,
    active: LanguagePair,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: usize,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

impl AnthropicProvider {
    pub fn new(config: ProviderConfig, pair: LanguagePair) -> Result<Self> {
        let api_key = credential(config.api_key_env())?;

        Ok(Self {
            client: build_client(config.request_timeout())?,
            config,
            api_key,
            active: pair,
        })
    }
}

pub(crate) fn build_translation_prompt(text: &str, pair: &LanguagePair) -> String {
    let mut prompt = format!(
        "You are a professional translator. Translate the following text from {} to {}.\n",
        pair.source.name, pair.target.name
    );
    prompt.push_str("Preserve paragraph and line breaks exactly.\n");
    prompt.push_str("Output ONLY the translation, no explanations or markdown formatting.\n\n");
    prompt.push_str(text);
    prompt
}

#[async_trait]
impl TranslationProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn active_pair(&mut self) -> Result<LanguagePair> {
        Ok(self.active)
    }

    async fn reconfigure(&mut self, pair: &LanguagePair) -> Result<()> {
        self.active = *pair;
        Ok(())
    }

    async fn translate(&mut self, text: &str, pair: &LanguagePair) -> Result<String> {
        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: 8192,
            messages: vec![Message {
                role: "user".to_string(),
                content: build_translation_prompt(text, pair),
            }],
            temperature: Some(0.2),
        };

        let response = self
            .client
            .post(self.config.endpoint())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.config))?;

        let response = ensure_success(response).await?;
        let api_response: AnthropicResponse = serde_json::from_str(&response.text().await?)?;

        api_response
            .content
            .into_iter()
            .find_map(|block| {
                if block.content_type == "text" {
                    block.text
                } else {
                    None
                }
            })
            .ok_or_else(|| {
                TranslatorError::ProviderSession("No text content in response".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_languages() {
        let pair = LanguagePair::from_codes("ja", "ko").unwrap();
        let prompt = build_translation_prompt("こんにちは\n", &pair);

        assert!(prompt.contains("from Japanese to Korean"));
        assert!(prompt.ends_with("こんにちは\n"));
    }

    #[test]
    fn test_response_takes_first_text_block() {
        let body = r#"{"content":[{"type":"text","text":"안녕하세요"}]}"#;
        let parsed: AnthropicResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.content[0].text.as_deref(), Some("안녕하세요"));
    }
}
