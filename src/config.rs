//! Configuration for quiz providers and failover behavior

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::payload::ValidationMode;
use crate::Provider;

/// Retries per key/model pair are clamped to this range
pub const MIN_RETRIES: usize = 1;
pub const MAX_RETRIES: usize = 8;
pub const DEFAULT_RETRIES: usize = 3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const DEFAULT_GEMINI_MODELS: [&str; 2] =
  [ "gemini-1.5-flash"
  , "gemini-2.0-flash"
  ];

const DEFAULT_GROQ_MODELS: [&str; 2] =
  [ "llama-3.3-70b-versatile"
  , "llama-3.1-8b-instant"
  ];

/// Credentials, models and retry budget for one provider.
/// Built once at startup and only read afterwards.
#[derive(Clone)]
pub struct ProviderConfig
{   provider: Provider
  , credentials: Vec<String>
  , models: Vec<String>
  , max_retries: usize
  , /// API base URL (if custom)
    pub api_base: Option<String>
  , /// Request timeout in seconds
    pub timeout_secs: u64
}

impl ProviderConfig
{   /// Blank entries are dropped; at least one credential and
    /// one model must remain. `max_retries` is clamped.
    pub fn new(
      provider: Provider
    , credentials: Vec<String>
    , models: Vec<String>
    , max_retries: usize
    ) -> Result<Self, Error>
    {   let credentials = non_blank(credentials);
        let models = non_blank(models);

        if credentials.is_empty()
        {   return Err(Error::InvalidConfiguration(format!(
              "Missing {} API key. Set {}.",
              provider, provider.key_variable()
            )));
        }
        if models.is_empty()
        {   return Err(Error::InvalidConfiguration(format!(
              "No {} models configured.", provider
            )));
        }
        if provider.key_policy() == crate::KeyPolicy::SingleKey
          && credentials.len() > 1
        {   return Err(Error::InvalidConfiguration(format!(
              "{} takes exactly one API key, got {}.",
              provider, credentials.len()
            )));
        }

        let clamped = max_retries.clamp(MIN_RETRIES, MAX_RETRIES);
        if clamped != max_retries
        {   warn!(
              "max_retries {} out of range, using {}",
              max_retries, clamped
            );
        }

        Ok(ProviderConfig
        {   provider
          , credentials
          , models
          , max_retries: clamped
          , api_base: None
          , timeout_secs: DEFAULT_TIMEOUT_SECS
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self
    {   self.api_base = Some(api_base.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self
    {   self.timeout_secs = secs.max(1);
        self
    }

    pub fn provider(&self) -> Provider
    {   self.provider
    }

    pub fn credentials(&self) -> &[String]
    {   &self.credentials
    }

    pub fn models(&self) -> &[String]
    {   &self.models
    }

    pub fn max_retries(&self) -> usize
    {   self.max_retries
    }
}

impl std::fmt::Debug for ProviderConfig
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("ProviderConfig")
          .field("provider", &self.provider)
          .field("credentials", &format!(
            "<{} redacted>", self.credentials.len()
          ))
          .field("models", &self.models)
          .field("max_retries", &self.max_retries)
          .field("api_base", &self.api_base)
          .field("timeout_secs", &self.timeout_secs)
          .finish()
    }
}

/// Backoff timing, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverConfig
{   /// Added to a provider-suggested wait
    pub hint_margin_secs: f64
  , /// Upper bound on a hinted wait
    pub hint_cap_secs: f64
  , /// Base of the exponential fallback
    pub base_backoff_secs: f64
  , /// Upper bound on the exponential fallback
    pub backoff_cap_secs: f64
}

impl Default for FailoverConfig
{   fn default() -> Self
    {   FailoverConfig
        {   hint_margin_secs: 2.0
          , hint_cap_secs: 90.0
          , base_backoff_secs: 5.0
          , backoff_cap_secs: 60.0
        }
    }
}

/// Everything the generator needs, read once at startup
#[derive(Debug, Clone)]
pub struct QuizgenConfig
{   pub provider: ProviderConfig
  , pub failover: FailoverConfig
  , pub validation: ValidationMode
}

impl QuizgenConfig
{   /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where F: Fn(&str) -> Option<String>
    {   let get = |name: &str| {
          lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };

        let provider = match get("LLM_PROVIDER")
          .map(|v| v.to_lowercase())
          .as_deref()
        {   None | Some("gemini") => Provider::Gemini
          , Some("groq") => Provider::Groq
          , Some(other) => {
              warn!(
                "Unknown LLM_PROVIDER '{}', defaulting to gemini",
                other
              );
              Provider::Gemini
            }
        };
        debug!("Selected provider: {}", provider);

        let (credentials, models, base_var) = match provider
        {   Provider::Gemini => {
              let keys = get("GEMINI_API_KEYS")
                .map(|v| split_csv(&v))
                .filter(|v| !v.is_empty())
                .or_else(|| get("GEMINI_API_KEY").map(|k| vec![k]))
                .unwrap_or_default();
              let models = list_or_default(
                get("GEMINI_MODELS"), &DEFAULT_GEMINI_MODELS
              );
              (keys, models, "GEMINI_API_BASE")
            }
          , Provider::Groq => {
              let keys = get("GROQ_API_KEY")
                .map(|k| vec![k])
                .unwrap_or_default();
              let models = list_or_default(
                get("GROQ_MODELS"), &DEFAULT_GROQ_MODELS
              );
              (keys, models, "GROQ_API_BASE")
            }
        };

        let max_retries = parse_retries(get("GEMINI_MAX_RETRIES"));

        let mut config = ProviderConfig::new(
          provider, credentials, models, max_retries
        )?;
        if let Some(base) = get(base_var)
        {   config = config.with_api_base(base);
        }
        if let Some(secs) = get("LLM_REQUEST_TIMEOUT_SECS")
          .and_then(|v| v.parse::<u64>().ok())
        {   config = config.with_timeout_secs(secs);
        }

        let validation = match get("QUIZ_STRICT_VALIDATION")
          .map(|v| v.to_lowercase())
          .as_deref()
        {   Some("1") | Some("true") | Some("yes") => {
              ValidationMode::Strict
            }
          , _ => ValidationMode::Shallow
        };

        Ok(QuizgenConfig
        {   provider: config
          , failover: FailoverConfig::default()
          , validation
        })
    }
}

/// Comma-separated list with blanks dropped
pub fn split_csv(raw: &str) -> Vec<String>
{   raw.split(',')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_string)
      .collect()
}

fn list_or_default(
  raw: Option<String>
, defaults: &[&str]
) -> Vec<String>
{   let listed = raw.map(|v| split_csv(&v)).unwrap_or_default();
    if listed.is_empty()
    {   defaults.iter().map(|m| m.to_string()).collect()
    } else
    {   listed
    }
}

/// Unparseable values fall back to the default
fn parse_retries(raw: Option<String>) -> usize
{   match raw
    {   None => DEFAULT_RETRIES
      , Some(v) => match v.parse::<i64>()
        {   Ok(n) => n.clamp(MIN_RETRIES as i64, MAX_RETRIES as i64)
              as usize
          , Err(_) => {
              warn!(
                "GEMINI_MAX_RETRIES '{}' is not a number, using {}",
                v, DEFAULT_RETRIES
              );
              DEFAULT_RETRIES
            }
        }
    }
}

fn non_blank(values: Vec<String>) -> Vec<String>
{   values.into_iter()
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty())
      .collect()
}
