//! Error classification and retry backoff for provider fallbacks

use std::sync::OnceLock;
use std::time::Duration;
use log::debug;
use regex::Regex;

use crate::config::FailoverConfig;

const MODEL_NOT_FOUND_MARKERS: [&str; 5] =
  [ "not_found"
  , "is not found for api version"
  , "not supported for generatecontent"
  , "model not found"
  , "does not exist"
  ];

const AUTH_MARKERS: [&str; 6] =
  [ "401"
  , "403"
  , "api key not valid"
  , "permission_denied"
  , "invalid api key"
  , "unauthorized"
  ];

const QUOTA_MARKERS: [&str; 5] =
  [ "429"
  , "resource_exhausted"
  , "quota"
  , "rate limit"
  , "too many requests"
  ];

/// What a failed provider call means for the fallback loop
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedError
{   /// Retry the same key/model after a wait
    RateLimited
    {   wait_hint_secs: Option<f64>
    }
  , /// Key is bad; move to the next key
    Unauthorized
  , /// Model unusable for this key; move to the next model
    ModelUnavailable
  , /// Anything else; stop everything
    Other(String)
}

fn contains_any(lowered: &str, markers: &[&str]) -> bool
{   markers.iter().any(|m| lowered.contains(m))
}

/// Classify raw provider error text. Case-insensitive; markers
/// are checked model-not-found first, then auth, then quota.
pub fn classify_error(message: &str) -> ClassifiedError
{   let lowered = message.to_lowercase();
    let classified =
      if contains_any(&lowered, &MODEL_NOT_FOUND_MARKERS)
      {   ClassifiedError::ModelUnavailable
      } else if contains_any(&lowered, &AUTH_MARKERS)
      {   ClassifiedError::Unauthorized
      } else if contains_any(&lowered, &QUOTA_MARKERS)
      {   ClassifiedError::RateLimited
          {   wait_hint_secs: extract_wait_hint(message)
          }
      } else
      {   ClassifiedError::Other(message.to_string())
      };
    debug!("Classified provider error as {:?}", classified);
    classified
}

fn wait_hint_regex() -> &'static Regex
{   static HINT: OnceLock<Regex> = OnceLock::new();
    HINT.get_or_init(|| {
      Regex::new(
        r#"(?i)(?:retry in|try again in|"retrydelay"\s*:\s*")\s*(\d+(?:\.\d+)?)s"#
      ).expect("wait hint pattern is valid")
    })
}

/// Provider-suggested wait in seconds, if the message has one
pub fn extract_wait_hint(message: &str) -> Option<f64>
{   wait_hint_regex()
      .captures(message)
      .and_then(|c| c.get(1))
      .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Retry budget and backoff timing for one provider
#[derive(Debug, Clone)]
pub struct RetryPolicy
{   pub max_retries: usize
  , pub hint_margin: Duration
  , pub hint_cap: Duration
  , pub base_backoff: Duration
  , pub backoff_cap: Duration
}

/// Seconds to a Duration without panicking: negative or NaN
/// becomes zero, anything too large saturates
fn duration_from_secs(secs: f64) -> Duration
{   if secs.is_nan() || secs <= 0.0
    {   return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

impl RetryPolicy
{   /// Negative or NaN timings in `failover` are treated as zero
    pub fn new(
      max_retries: usize
    , failover: &FailoverConfig
    ) -> Self
    {   RetryPolicy
        {   max_retries
          , hint_margin: duration_from_secs(failover.hint_margin_secs)
          , hint_cap: duration_from_secs(failover.hint_cap_secs)
          , base_backoff: duration_from_secs(failover.base_backoff_secs)
          , backoff_cap: duration_from_secs(failover.backoff_cap_secs)
        }
    }

    /// Exponential fallback: base * 2^attempt, capped
    pub fn backoff_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   let exp = attempt.min(31) as i32;
        let secs = self.base_backoff.as_secs_f64()
          * 2f64.powi(exp);
        duration_from_secs(secs.min(self.backoff_cap.as_secs_f64()))
          .min(self.backoff_cap)
    }

    /// Wait before retrying after a rate limit. A provider hint
    /// wins over the exponential fallback.
    pub fn wait_duration(
      &self
    , wait_hint_secs: Option<f64>
    , attempt: usize
    ) -> Duration
    {   match wait_hint_secs
        {   Some(hint) if hint.is_finite() && hint >= 0.0 => {
              // cap in seconds first: hints can be arbitrarily large
              let secs = (hint + self.hint_margin.as_secs_f64())
                .min(self.hint_cap.as_secs_f64());
              duration_from_secs(secs).min(self.hint_cap)
            }
          , _ => self.backoff_for_attempt(attempt)
        }
    }

    /// Wait derived straight from the raw rate-limit text
    pub fn wait_for_message(
      &self
    , message: &str
    , attempt: usize
    ) -> Duration
    {   self.wait_duration(extract_wait_hint(message), attempt)
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::new(3, &FailoverConfig::default())
    }
}
