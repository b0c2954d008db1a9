//! LLM provider implementations

pub mod gemini;
pub mod groq;

use std::time::Duration;
use async_trait::async_trait;
use log::error;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::request::GenerationRequest;

// Re-export for convenience
pub use gemini::GeminiDriver;
pub use groq::GroqDriver;

/// Sampling temperature used for quiz generation
pub const TEMPERATURE: f32 = 0.3;
/// Output length cap for quiz generation
pub const MAX_OUTPUT_TOKENS: u32 = 2200;

/// One backend family. A driver builds and sends a single
/// request; it never retries or classifies failures.
#[async_trait]
pub trait ProviderDriver: Send + Sync
{   fn provider(&self) -> crate::Provider;

    /// Raw generated text for (credential, model, request)
    async fn invoke(
      &self
    , credential: &str
    , model: &str
    , request: &GenerationRequest
    ) -> Result<String, ProviderError>;
}

/// Pick the driver for a configured provider
pub fn driver_for(
  config: &ProviderConfig
) -> Result<Box<dyn ProviderDriver>, ProviderError>
{   let driver: Box<dyn ProviderDriver> = match config.provider()
    {   crate::Provider::Gemini => Box::new(
          GeminiDriver::new(
            config.api_base.clone()
          , config.timeout_secs
          )?
        )
      , crate::Provider::Groq => Box::new(
          GroqDriver::new(
            config.api_base.clone()
          , config.timeout_secs
          )?
        )
    };
    Ok(driver)
}

pub(crate) fn http_client(
  timeout_secs: u64
) -> Result<reqwest::Client, ProviderError>
{   reqwest::Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .build()
      .map_err(ProviderError::from)
}

/// Turn a non-success response into a ProviderError, keeping
/// the status, body and any Retry-After header.
pub(crate) async fn api_error(
  provider: crate::Provider
, response: reqwest::Response
) -> ProviderError
{   let status = response.status().as_u16();
    let retry_after_secs = response.headers()
      .get(reqwest::header::RETRY_AFTER)
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.trim().parse::<f64>().ok());
    let body = response.text().await
      .unwrap_or_else(|_| "Unknown error".to_string());
    error!("{} API error {}: {}", provider, status, body);
    ProviderError::Api
    {   status
      , body
      , retry_after_secs
    }
}
