use crate::error::BackendError;
use crate::gateway::{non_blank_reply, CompletionRequest, LanguageModelGateway};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

// Model constants
pub const CLAUDE_HAIKU: &str = "claude-3-5-haiku-20241022";
pub const CLAUDE_SONNET: &str = "claude-sonnet-4-20250514";

#[derive(Debug, Serialize, Clone)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<AnthropicMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    message: String,
    #[serde(rename = "type")]
    error_type: String,
}

/// Map a non-success status and its body to a typed failure.
pub fn classify_failure(status: u16, body: &str) -> BackendError {
    let Ok(parsed) = serde_json::from_str::<AnthropicError>(body) else {
        return match status {
            401 | 403 => BackendError::Auth(format!("Anthropic API error ({}): {}", status, body)),
            429 => BackendError::RateLimit(format!("Anthropic API error ({}): {}", status, body)),
            _ => BackendError::Generic(format!("Anthropic API error ({}): {}", status, body)),
        };
    };

    let detail = format!("{} - {}", parsed.error.error_type, parsed.error.message);
    let message = parsed.error.message.to_lowercase();

    match parsed.error.error_type.as_str() {
        "authentication_error" | "permission_error" => BackendError::Auth(detail),
        "rate_limit_error" => BackendError::RateLimit(detail),
        "invalid_request_error" if message.contains("too long") => {
            BackendError::ContextLengthExceeded(detail)
        }
        _ if status == 401 || status == 403 => BackendError::Auth(detail),
        _ if status == 429 => BackendError::RateLimit(detail),
        _ => BackendError::Generic(format!("Anthropic API error ({}): {}", status, detail)),
    }
}

/// Take the last text block of a successful response.
pub fn parse_messages(body: &str) -> Result<String, BackendError> {
    let completion: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::Malformed(format!("Anthropic response: {}", e)))?;

    let block = completion
        .content
        .into_iter()
        .filter(|c| c.content_type == "text")
        .last()
        .ok_or_else(|| BackendError::Malformed("No text response from Claude".to_string()))?;

    Ok(non_blank_reply(block.text))
}

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send a single-system-prompt chat to Claude
    pub async fn chat_completion(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        messages: Vec<AnthropicMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, BackendError> {
        let request = MessagesRequest {
            model,
            max_tokens,
            system: system_prompt,
            messages,
            temperature,
        };

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        parse_messages(&body)
    }

    /// Validate the Anthropic API key
    pub async fn validate_api_key(&self) -> Result<bool, BackendError> {
        let messages = vec![AnthropicMessage {
            role: "user".to_string(),
            content: "Say 'ok'".to_string(),
        }];

        self.chat_completion(CLAUDE_HAIKU, None, messages, 0.0, 10)
            .await
            .map(|_| true)
    }
}

#[async_trait]
impl LanguageModelGateway for AnthropicClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let messages = vec![AnthropicMessage {
            role: "user".to_string(),
            content: request.user_message.clone(),
        }];

        self.chat_completion(
            &request.model,
            Some(&request.system_prompt),
            messages,
            request.temperature,
            request.max_tokens,
        )
        .await
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::EMPTY_REPLY;

    fn error_body(error_type: &str, message: &str) -> String {
        format!(
            r#"{{"type": "error", "error": {{"type": "{}", "message": "{}"}}}}"#,
            error_type, message
        )
    }

    #[test]
    fn test_structured_error_mapping() {
        let auth = error_body("authentication_error", "invalid x-api-key");
        assert!(matches!(classify_failure(401, &auth), BackendError::Auth(_)));

        let limited = error_body("rate_limit_error", "slow down");
        assert!(matches!(classify_failure(429, &limited), BackendError::RateLimit(_)));

        let too_long = error_body("invalid_request_error", "prompt is too long: 210000 tokens");
        assert!(matches!(
            classify_failure(400, &too_long),
            BackendError::ContextLengthExceeded(_)
        ));

        let overloaded = error_body("overloaded_error", "Overloaded");
        assert!(matches!(classify_failure(529, &overloaded), BackendError::Generic(_)));
    }

    #[test]
    fn test_unstructured_error_mapping() {
        assert!(matches!(classify_failure(403, "forbidden"), BackendError::Auth(_)));
        assert!(matches!(classify_failure(502, "bad gateway"), BackendError::Generic(_)));
    }

    #[test]
    fn test_parse_messages_takes_last_text_block() {
        let body = r#"{"content": [
            {"type": "thinking", "thinking": "hmm"},
            {"type": "text", "text": "first"},
            {"type": "text", "text": "final"}
        ]}"#;
        assert_eq!(parse_messages(body).unwrap(), "final");
    }

    #[test]
    fn test_parse_messages_blank_text_block() {
        let blank = r#"{"content": [{"type": "text", "text": "   "}]}"#;
        assert_eq!(parse_messages(blank).unwrap(), EMPTY_REPLY);

        let empty_last = r#"{"content": [
            {"type": "text", "text": "earlier"},
            {"type": "text", "text": ""}
        ]}"#;
        assert_eq!(parse_messages(empty_last).unwrap(), EMPTY_REPLY);

        let missing = r#"{"content": [{"type": "text"}]}"#;
        assert_eq!(parse_messages(missing).unwrap(), EMPTY_REPLY);
    }

    #[test]
    fn test_parse_messages_without_text_is_malformed() {
        let no_blocks = parse_messages(r#"{"content": []}"#);
        assert!(matches!(no_blocks, Err(BackendError::Malformed(_))));
        assert!(matches!(parse_messages("not json"), Err(BackendError::Malformed(_))));
    }
}
