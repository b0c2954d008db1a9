use serde::{Deserialize, Serialize};
use async_trait::async_trait;
use log::{debug, trace, error};

use crate::error::ProviderError;
use crate::request::GenerationRequest;

const GROQ_API_BASE: &str
  = "https://api.groq.com/openai/v1";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , #[serde(default)]
    pub content: Option<String>
}

#[derive(Debug, Clone, Serialize)]
pub struct GroqChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub max_tokens: u32
  , pub temperature: f32
  , pub stream: bool
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroqChatResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
  , pub finish_reason: Option<String>
}

// ===== Driver =====

/// Groq OpenAI-compatible chat completions driver
pub struct GroqDriver
{   api_base: String
  , http_client: reqwest::Client
}

impl GroqDriver
{   pub fn new(
      api_base: Option<String>
    , timeout_secs: u64
    ) -> Result<Self, ProviderError>
    {   debug!("Creating GroqDriver");
        Ok(Self::with_client(
          api_base
        , super::http_client(timeout_secs)?
        ))
    }

    /// Build a driver around an existing HTTP client
    pub fn with_client(
      api_base: Option<String>
    , http_client: reqwest::Client
    ) -> Self
    {   GroqDriver
        {   api_base: api_base
              .unwrap_or_else(|| GROQ_API_BASE.to_string())
          , http_client
        }
    }
}

#[async_trait]
impl super::ProviderDriver for GroqDriver
{   fn provider(&self) -> crate::Provider
    {   crate::Provider::Groq
    }

    async fn invoke(
      &self
    , credential: &str
    , model: &str
    , request: &GenerationRequest
    ) -> Result<String, ProviderError>
    {   debug!("Groq chat completion on: {}", model);

        let body = GroqChatRequest
        {   model: model.to_string()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: Some(request.prompt())
              }
            ]
          , max_tokens: super::MAX_OUTPUT_TOKENS
          , temperature: super::TEMPERATURE
          , stream: false
        };

        trace!("Groq request: {:?}", body);

        let response = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .bearer_auth(credential)
          .json(&body)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            ProviderError::from(e)
          })?;

        let status = response.status();
        trace!("Groq response status: {}", status);

        if !status.is_success()
        {   return Err(
              super::api_error(crate::Provider::Groq, response)
                .await
            );
        }

        let chat_response: GroqChatResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            ProviderError::Parse(e.to_string())
          })?;

        let choice = chat_response.choices.first();
        choice
          .and_then(|c| c.message.content.clone())
          .filter(|text| !text.trim().is_empty())
          .ok_or_else(|| {
            let finish_reason = choice
              .and_then(|c| c.finish_reason.clone());
            error!(
              "No text in Groq response (finish reason: {:?})",
              finish_reason
            );
            ProviderError::EmptyResponse { finish_reason }
          })
    }
}
