use std::fmt;

/// Terminal error returned to callers of the quiz generator.
/// Implements Clone so results can be compared and re-reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// No usable credentials or models were configured
    InvalidConfiguration(String)
  , /// The only key of a single-key provider was rejected
    KeyRejected
    {   provider: crate::Provider
      , variable: String
      , cause: String
    }
  , /// Every credential/model/attempt combination failed
    ExhaustedFallback
    {   provider: crate::Provider
      , last_cause: String
      , guidance: String
    }
  , /// Model output could not be decoded or failed validation
    StructuralError(String)
  , /// Provider failed in a way retries cannot fix
    Upstream
    {   provider: crate::Provider
      , model: String
      , cause: String
    }
}

impl Error
{   /// User-facing HTTP status a routing layer should answer with
    pub fn status_code(&self) -> u16
    {   match self
        {   Error::InvalidConfiguration(_) => 500
          , Error::KeyRejected { .. } => 500
          , Error::ExhaustedFallback { .. } => 503
          , Error::StructuralError(_) => 502
          , Error::Upstream { .. } => 503
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::KeyRejected { provider, variable, cause } => {
              write!(f,
                "{} API key was rejected. Check {}. ({})",
                provider, variable, cause
              )
            }
          , Error::ExhaustedFallback
            { provider, last_cause, guidance } => {
              write!(f,
                "{} request failed after trying all configured \
                 keys/models. {} Last error: {}",
                provider, guidance, last_cause
              )
            }
          , Error::StructuralError(msg) => {
              write!(f, "Invalid model response: {}", msg)
            }
          , Error::Upstream { provider, model, cause } => {
              write!(f,
                "{} error on model {}: {}",
                provider, model, cause
              )
            }
        }
    }
}

impl std::error::Error for Error {}

/// Failure of a single provider call.
/// Display output is what the error classifier inspects,
/// so status codes and provider text are kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError
{   /// Transport-level failure (DNS, connect, TLS)
    Http(String)
  , /// Call exceeded the configured request timeout
    Timeout
  , /// Provider answered with a non-success status
    Api
    {   status: u16
      , body: String
      , retry_after_secs: Option<f64>
    }
  , /// Provider answer could not be parsed
    Parse(String)
  , /// Provider answered without any generated text
    EmptyResponse
    {   /// Why the provider stopped (e.g. SAFETY, length)
        finish_reason: Option<String>
    }
}

impl fmt::Display for ProviderError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   ProviderError::Http(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , ProviderError::Timeout => {
              write!(f, "Request timed out")
            }
          , ProviderError::Api
            { status, body, retry_after_secs } => {
              write!(f, "API error {}: {}", status, body)?;
              if let Some(secs) = retry_after_secs
              {   write!(f, " (retry in {}s)", secs)?;
              }
              Ok(())
            }
          , ProviderError::Parse(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , ProviderError::EmptyResponse { finish_reason } => {
              write!(f, "API response contained no text")?;
              if let Some(reason) = finish_reason
              {   write!(f, " (finish reason: {})", reason)?;
              }
              Ok(())
            }
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   ProviderError::Timeout
        } else
        {   ProviderError::Http(e.to_string())
        }
    }
}
