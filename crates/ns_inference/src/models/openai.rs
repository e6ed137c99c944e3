use std::fmt;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use ns_core::{CompletionModel, Error, Result};
use crate::Config;

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Client for any `/chat/completions` endpoint speaking the OpenAI wire
/// format (Groq, OpenAI, DeepSeek).
pub struct OpenAiCompatibleModel {
    client: Client,
    name: &'static str,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiCompatibleModel {
    pub fn new(config: &Config) -> Result<Self> {
        let provider = config.provider;
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            Error::Config(format!(
                "{} API key is required (set {})",
                provider.display_name(),
                provider.api_key_var().unwrap_or("--api-key")
            ))
        })?;
        let base_url = config
            .base_url()
            .ok_or_else(|| Error::Config(format!("{} has no API endpoint", provider.display_name())))?
            .trim_end_matches('/')
            .to_string();
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            name: provider.display_name(),
            api_key,
            base_url,
            model: config.model_name().to_string(),
        })
    }

    fn request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
        }
    }
}

impl fmt::Debug for OpenAiCompatibleModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCompatibleModel")
            .field("client", &"<reqwest::Client>")
            .field("name", &self.name)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

fn first_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| Error::Completion("empty response from completion service".to_string()))
}

#[async_trait]
impl CompletionModel for OpenAiCompatibleModel {
    fn name(&self) -> &str {
        self.name
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        tracing::debug!("Sending {} chars to {} ({})", prompt.len(), self.name, self.model);

        let response = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| Error::Completion(format!("request to {} failed: {}", self.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Completion(format!("{} returned {}: {}", self.name, status, body)));
        }

        let response = response
            .json::<ChatResponse>()
            .await
            .map_err(|e| Error::Completion(format!("invalid response from {}: {}", self.name, e)))?;

        first_content(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Provider;

    fn model() -> OpenAiCompatibleModel {
        let config = Config {
            api_key: Some("test-key".to_string()),
            base_url: Some("http://localhost:9/v1/".to_string()),
            ..Config::default()
        };
        OpenAiCompatibleModel::new(&config).unwrap()
    }

    #[test]
    fn test_model_requires_api_key() {
        let config = Config {
            provider: Provider::OpenAi,
            api_key: Some("   ".to_string()),
            ..Config::default()
        };
        let result = OpenAiCompatibleModel::new(&config);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Configuration error: OpenAI API key is required (set OPENAI_API_KEY)"
        );
    }

    #[test]
    fn test_request_shape() {
        let request = serde_json::to_value(model().request("Summarize this")).unwrap();
        assert_eq!(
            request,
            serde_json::json!({
                "model": "llama3-8b-8192",
                "messages": [{ "role": "user", "content": "Summarize this" }],
                "stream": false
            })
        );
    }

    #[test]
    fn test_base_url_is_normalised() {
        assert_eq!(model().base_url, "http://localhost:9/v1");
    }

    #[test]
    fn test_first_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"A summary."}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(response).unwrap(), "A summary.");
    }

    #[test]
    fn test_empty_response_is_an_error() {
        for body in [r#"{"choices":[]}"#, r#"{"choices":[{"message":{"content":"  "}}]}"#, r#"{"choices":[{"message":{"content":null}}]}"#] {
            let response: ChatResponse = serde_json::from_str(body).unwrap();
            assert!(matches!(first_content(response), Err(Error::Completion(_))));
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        assert!(!format!("{:?}", model()).contains("test-key"));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_completion_error() {
        let result = model().complete("hello").await;
        assert!(matches!(result, Err(Error::Completion(_))));
    }
}
