use crate::error::BackendError;
use crate::gateway::{non_blank_reply, CompletionRequest, LanguageModelGateway};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: ErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ErrorDetails {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Map a non-success status and its body to a typed failure.
pub fn classify_failure(status: u16, body: &str) -> BackendError {
    let parsed = serde_json::from_str::<OpenAIError>(body).ok();
    let detail = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .unwrap_or_else(|| body.to_string());
    let code = parsed.and_then(|e| e.error.code);

    match status {
        401 | 403 => BackendError::Auth(format!("OpenAI API error ({}): {}", status, detail)),
        429 => BackendError::RateLimit(format!("OpenAI API error ({}): {}", status, detail)),
        _ if code.as_deref() == Some("context_length_exceeded") => {
            BackendError::ContextLengthExceeded(detail)
        }
        _ => BackendError::Generic(format!("OpenAI API error ({}): {}", status, detail)),
    }
}

/// Extract the reply text from a successful response body.
pub fn parse_completion(body: &str) -> Result<String, BackendError> {
    let completion: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::Malformed(format!("OpenAI response: {}", e)))?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::Malformed("No response from OpenAI".to_string()))?;

    Ok(non_blank_reply(choice.message.content))
}

pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
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

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<String, BackendError> {
        let request = ChatCompletionRequest {
            model,
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        parse_completion(&body)
    }

    pub async fn validate_api_key(&self) -> Result<bool, BackendError> {
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: "Say 'ok'".to_string(),
        }];

        self.chat_completion(DEFAULT_OPENAI_MODEL, messages, 0.0, Some(5))
            .await
            .map(|_| true)
    }
}

#[async_trait]
impl LanguageModelGateway for OpenAIClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: request.system_prompt.clone(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: request.user_message.clone(),
            },
        ];

        self.chat_completion(
            &request.model,
            messages,
            request.temperature,
            Some(request.max_tokens),
        )
        .await
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
