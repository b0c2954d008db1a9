use serde::{Deserialize, Serialize};
use async_trait::async_trait;
use log::{debug, trace, error};

use crate::error::ProviderError;
use crate::request::GenerationRequest;

const GEMINI_API_BASE: &str
  = "https://generativelanguage.googleapis.com/v1beta";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part
{   #[serde(default)]
    pub text: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content
{   #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>
  , #[serde(default)]
    pub parts: Vec<Part>
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig
{   pub temperature: f32
  , pub max_output_tokens: u32
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest
{   pub contents: Vec<Content>
  , pub generation_config: GenerationConfig
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse
{   #[serde(default)]
    pub candidates: Vec<Candidate>
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate
{   pub content: Option<Content>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

// ===== Driver =====

/// Google AI Studio `generateContent` driver
pub struct GeminiDriver
{   api_base: String
  , http_client: reqwest::Client
}

impl GeminiDriver
{   pub fn new(
      api_base: Option<String>
    , timeout_secs: u64
    ) -> Result<Self, ProviderError>
    {   debug!("Creating GeminiDriver");
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
    {   GeminiDriver
        {   api_base: api_base
              .unwrap_or_else(|| GEMINI_API_BASE.to_string())
          , http_client
        }
    }

    fn build_request(
      request: &GenerationRequest
    ) -> GenerateContentRequest
    {   GenerateContentRequest
        {   contents: vec![
              Content
              {   role: Some("user".to_string())
                , parts: vec![Part { text: request.prompt() }]
              }
            ]
          , generation_config: GenerationConfig
            {   temperature: super::TEMPERATURE
              , max_output_tokens: super::MAX_OUTPUT_TOKENS
            }
        }
    }
}

#[async_trait]
impl super::ProviderDriver for GeminiDriver
{   fn provider(&self) -> crate::Provider
    {   crate::Provider::Gemini
    }

    async fn invoke(
      &self
    , credential: &str
    , model: &str
    , request: &GenerationRequest
    ) -> Result<String, ProviderError>
    {   debug!("Gemini generateContent on: {}", model);
        let body = Self::build_request(request);
        trace!("Gemini request: {:?}", body);

        let response = self.http_client
          .post(format!(
            "{}/models/{}:generateContent",
            self.api_base, model
          ))
          .header("x-goog-api-key", credential)
          .json(&body)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            ProviderError::from(e)
          })?;

        let status = response.status();
        trace!("Gemini response status: {}", status);

        if !status.is_success()
        {   return Err(
              super::api_error(crate::Provider::Gemini, response)
                .await
            );
        }

        let parsed: GenerateContentResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            ProviderError::Parse(e.to_string())
          })?;

        let candidate = parsed.candidates.first();
        let text: String = candidate
          .and_then(|c| c.content.as_ref())
          .map(|c| {
            c.parts.iter()
              .map(|p| p.text.as_str())
              .collect()
          })
          .unwrap_or_default();

        if text.trim().is_empty()
        {   let finish_reason = candidate
              .and_then(|c| c.finish_reason.clone());
            error!(
              "No text in Gemini response (finish reason: {:?})",
              finish_reason
            );
            return Err(ProviderError::EmptyResponse { finish_reason });
        }
        Ok(text)
    }
}
