//! Cleaning and validating raw model output

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::request::QuizPayload;

/// Top-level keys every payload must carry
pub const REQUIRED_KEYS: [&str; 5] =
  [ "summary"
  , "key_entities"
  , "sections"
  , "quiz"
  , "related_topics"
  ];

const FENCE: &str = "```";

/// How deeply a decoded payload is checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode
{   /// Required keys present and a non-empty quiz list
    #[default]
    Shallow
  , /// Shallow, plus per-question option/answer/difficulty checks
    Strict
}

/// Strip whitespace and surrounding code fences (with or
/// without a language tag) from model output, until none are
/// left. Does not try to repair the JSON inside.
pub fn normalize_model_output(raw: &str) -> String
{   let mut cleaned = raw.trim();
    while let Some(inner) = strip_fence(cleaned)
    {   trace!("Stripped code fence from model output");
        cleaned = inner;
    }
    cleaned.to_string()
}

/// One layer of fence, `None` when the text is not fenced
fn strip_fence(text: &str) -> Option<&str>
{   let body = text.strip_prefix(FENCE)?;
    let body = body.trim_start_matches(|c: char| {
      c.is_ascii_alphanumeric() || c == '-' || c == '_'
    });
    let body = body.strip_suffix(FENCE).unwrap_or(body);
    Some(body.trim())
}

/// Decode normalized model text and validate it into a payload
pub fn parse_payload(
  text: &str
, mode: ValidationMode
) -> Result<QuizPayload, Error>
{   let value: Value = serde_json::from_str(text)
      .map_err(|e| {
        Error::StructuralError(format!(
          "model response is not valid JSON: {}", e
        ))
      })?;
    validate_payload(value, mode)
}

/// Check the shape of a decoded payload and convert it
pub fn validate_payload(
  value: Value
, mode: ValidationMode
) -> Result<QuizPayload, Error>
{   let object = value.as_object()
      .ok_or_else(|| {
        Error::StructuralError(
          "model response is not a JSON object".to_string()
        )
      })?;

    for key in REQUIRED_KEYS
    {   if !object.contains_key(key)
        {   return Err(Error::StructuralError(format!(
              "model response missing required key: {}", key
            )));
        }
    }

    match object.get("quiz").and_then(Value::as_array)
    {   Some(quiz) if !quiz.is_empty() => {}
      , _ => {
          return Err(Error::StructuralError(
            "model response has empty or invalid quiz list"
              .to_string()
          ));
        }
    }

    let payload: QuizPayload = serde_json::from_value(value)
      .map_err(|e| {
        Error::StructuralError(format!(
          "model response has mistyped fields: {}", e
        ))
      })?;

    if mode == ValidationMode::Strict
    {   check_questions(&payload)?;
    }

    debug!(
      "Validated payload with {} questions",
      payload.quiz.len()
    );
    Ok(payload)
}

fn check_questions(payload: &QuizPayload) -> Result<(), Error>
{   for (index, q) in payload.quiz.iter().enumerate()
    {   if q.options.len() != 4
        {   return Err(Error::StructuralError(format!(
              "quiz[{}].options has {} entries, expected 4",
              index, q.options.len()
            )));
        }
        if !q.options.iter().any(|o| *o == q.answer)
        {   return Err(Error::StructuralError(format!(
              "quiz[{}].answer does not match any option",
              index
            )));
        }
        if q.difficulty_level().is_none()
        {   return Err(Error::StructuralError(format!(
              "quiz[{}].difficulty '{}' is not easy, medium or hard",
              index, q.difficulty
            )));
        }
    }
    Ok(())
}
