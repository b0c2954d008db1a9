pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod payload;
pub mod failover;
pub mod client;
use serde::{Deserialize, Serialize};

/*

quizgen turns an article (title + body) into a structured quiz
by asking a hosted LLM for JSON, with automatic fallback across
api keys, models and retry attempts when the free tiers push back.

quizgen/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and provider families
│   ├── main.rs         # quizgen CLI
│   ├── error.rs        # Terminal errors and provider call errors
│   ├── config.rs       # Provider + failover config, read from env
│   ├── client.rs       # QuizClient: the fallback loop
│   ├── failover.rs     # Error classification and backoff policy
│   ├── payload.rs      # Output normalizing and payload validation
│   ├── request.rs      # GenerationRequest, QuizPayload, prompt
│   └── providers/
│       ├── mod.rs      # ProviderDriver trait
│       ├── gemini.rs
│       └── groq.rs
└── tests/

*/

pub use client::QuizClient;
pub use config::{FailoverConfig, ProviderConfig, QuizgenConfig};
pub use error::{Error, ProviderError};
pub use payload::ValidationMode;
pub use request::{GenerationRequest, QuizPayload, QuizQuestion};

/// Supported LLM provider families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider
{   /// Google AI Studio (Gemini models), any number of keys
    Gemini
  , /// Groq (hosted Llama models), exactly one key
    Groq
}

/// How a provider family treats its credentials when one is
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy
{   /// Rejected key: move on to the next configured key
    MultiKey
  , /// Rejected key: nothing else to try, fail immediately
    SingleKey
}

impl Provider
{   pub fn key_policy(&self) -> KeyPolicy
    {   match self
        {   Provider::Gemini => KeyPolicy::MultiKey
          , Provider::Groq => KeyPolicy::SingleKey
        }
    }

    /// Environment variable(s) holding this provider's keys
    pub fn key_variable(&self) -> &'static str
    {   match self
        {   Provider::Gemini => "GEMINI_API_KEY (or GEMINI_API_KEYS)"
          , Provider::Groq => "GROQ_API_KEY"
        }
    }

    /// Remediation text used when every combination failed
    pub fn exhaustion_guidance(&self) -> &'static str
    {   match self
        {   Provider::Gemini => {
              "Likely model availability mismatch, quota exhaustion, \
               or invalid key. Set GEMINI_API_KEY (or GEMINI_API_KEYS) \
               from Google AI Studio, and if needed use a \
               lower-traffic model via GEMINI_MODELS."
            }
          , Provider::Groq => {
              "Set GROQ_MODELS with models available to your account."
            }
        }
    }
}

impl std::fmt::Display for Provider
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   match self
        {   Provider::Gemini => write!(f, "Gemini")
          , Provider::Groq => write!(f, "Groq")
        }
    }
}
