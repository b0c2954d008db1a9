//! The fallback loop: key -> model -> attempt

use std::fmt;
use log::{debug, error, info, warn};

use crate::config::{ProviderConfig, QuizgenConfig};
use crate::error::Error;
use crate::failover::{classify_error, ClassifiedError, RetryPolicy};
use crate::payload::{normalize_model_output, parse_payload, ValidationMode};
use crate::providers::ProviderDriver;
use crate::request::{GenerationRequest, QuizPayload};
use crate::KeyPolicy;

/// Position of one provider call within a generation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptContext<'a>
{   /// 1-based
    pub credential_index: usize
  , pub model: &'a str
  , /// 1-based
    pub attempt: usize
}

impl fmt::Display for AttemptContext<'_>
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   write!(f,
          "key {}, model {}, attempt {}",
          self.credential_index, self.model, self.attempt
        )
    }
}

/// Generates quizzes through one provider, falling back across
/// its keys and models.
pub struct QuizClient
{   config: ProviderConfig
  , policy: RetryPolicy
  , validation: ValidationMode
  , driver: Box<dyn ProviderDriver>
}

impl QuizClient
{   /// Build a client with the HTTP driver for the configured
    /// provider
    pub fn new(config: QuizgenConfig) -> Result<Self, Error>
    {   let driver = crate::providers::driver_for(&config.provider)
          .map_err(|e| {
            Error::InvalidConfiguration(format!(
              "could not create HTTP client: {}", e
            ))
          })?;
        Self::with_driver(config, driver)
    }

    /// Read configuration from the environment and build a client
    pub fn from_env() -> Result<Self, Error>
    {   Self::new(QuizgenConfig::from_env()?)
    }

    /// Build a client around any driver for the configured
    /// provider family
    pub fn with_driver(
      config: QuizgenConfig
    , driver: Box<dyn ProviderDriver>
    ) -> Result<Self, Error>
    {   if driver.provider() != config.provider.provider()
        {   return Err(Error::InvalidConfiguration(format!(
              "driver for {} cannot serve {} configuration",
              driver.provider(), config.provider.provider()
            )));
        }
        let policy = RetryPolicy::new(
          config.provider.max_retries()
        , &config.failover
        );
        debug!("Creating QuizClient: {:?}", config.provider);
        Ok(QuizClient
        {   config: config.provider
          , policy
          , validation: config.validation
          , driver
        })
    }

    pub fn config(&self) -> &ProviderConfig
    {   &self.config
    }

    /// Run one generation pass. Returns the first payload that
    /// validates, or the terminal error that stopped the pass.
    pub async fn generate(
      &self
    , request: &GenerationRequest
    ) -> Result<QuizPayload, Error>
    {   let provider = self.config.provider();
        let key_policy = provider.key_policy();
        let max_retries = self.policy.max_retries;
        let mut last_cause: Option<String> = None;

        info!("Generating quiz for '{}' via {}", request.title(), provider);

        'keys: for (index, credential)
          in self.config.credentials().iter().enumerate()
        {   'models: for model in self.config.models()
            {   for attempt in 1..=max_retries
                {   let ctx = AttemptContext
                    {   credential_index: index + 1
                      , model: model.as_str()
                      , attempt
                    };
                    debug!("{}: calling {}", ctx, provider);

                    let failure = match self.driver
                      .invoke(credential, model, request)
                      .await
                    {   Ok(raw) => {
                          let text = normalize_model_output(&raw);
                          return parse_payload(&text, self.validation)
                            .map(|payload| {
                              info!("{}: quiz generated", ctx);
                              payload
                            })
                            .map_err(|e| {
                              error!("{}: {}", ctx, e);
                              e
                            });
                        }
                      , Err(e) => e.to_string()
                    };

                    match classify_error(&failure)
                    {   ClassifiedError::ModelUnavailable => {
                          warn!(
                            "{}: model not available for this key, \
                             trying next model",
                            ctx
                          );
                          last_cause = Some(failure);
                          continue 'models;
                        }
                      , ClassifiedError::Unauthorized => {
                          match key_policy
                          {   KeyPolicy::MultiKey => {
                                warn!(
                                  "{}: key rejected, trying next key",
                                  ctx
                                );
                                last_cause = Some(failure);
                                continue 'keys;
                              }
                            , KeyPolicy::SingleKey => {
                                error!("{}: key rejected", ctx);
                                return Err(Error::KeyRejected
                                {   provider
                                  , variable: provider
                                      .key_variable()
                                      .to_string()
                                  , cause: failure
                                });
                              }
                          }
                        }
                      , ClassifiedError::RateLimited { wait_hint_secs } => {
                          last_cause = Some(failure);
                          if attempt < max_retries
                          {   let wait = self.policy
                                .wait_duration(wait_hint_secs, attempt);
                              warn!(
                                "{}/{}: quota/rate limit, waiting {:.1}s",
                                ctx, max_retries, wait.as_secs_f64()
                              );
                              tokio::time::sleep(wait).await;
                          } else
                          {   warn!(
                                "{}/{}: quota/rate limit, retries \
                                 exhausted for this model",
                                ctx, max_retries
                              );
                          }
                        }
                      , ClassifiedError::Other(cause) => {
                          error!("{}: unrecoverable error: {}", ctx, cause);
                          return Err(Error::Upstream
                          {   provider
                            , model: model.clone()
                            , cause
                          });
                        }
                    }
                }
            }
        }

        match last_cause
        {   Some(last_cause) => {
              error!("{}: all keys/models exhausted", provider);
              Err(Error::ExhaustedFallback
              {   provider
                , last_cause
                , guidance: provider
                    .exhaustion_guidance()
                    .to_string()
              })
            }
          , None => Err(Error::InvalidConfiguration(format!(
              "{} request failed: no valid key/model combination \
               available",
              provider
            )))
        }
    }
}
