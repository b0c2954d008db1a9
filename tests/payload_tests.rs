use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use quizgen::payload::{normalize_model_output, parse_payload, validate_payload, REQUIRED_KEYS};
use quizgen::request::{Difficulty, GenerationRequest, MAX_CONTENT_CHARS};
use quizgen::{Error, ValidationMode};

fn minimal() -> serde_json::Value
{   json!({
      "summary": "A short summary.",
      "key_entities": { "people": [], "organizations": [], "locations": [] },
      "sections": [],
      "quiz": [{
        "question": "Q?",
        "options": ["a", "b", "c", "d"],
        "answer": "a",
        "difficulty": "medium",
        "explanation": "because"
      }],
      "related_topics": []
    })
}

fn structural_message(err: Error) -> String
{   match err
    {   Error::StructuralError(msg) => msg
      , other => panic!("expected StructuralError, got {:?}", other)
    }
}

#[test]
fn test_normalize_strips_fences()
{   let inner = r#"{"a": 1}"#;
    for raw in [
      format!("```json\n{}\n```", inner),
      format!("```\n{}\n```", inner),
      format!("  ```JSON\n{}\n```  \n", inner),
      format!("```{}```", inner),
    ]
    {   assert_eq!(normalize_model_output(&raw), inner, "{:?}", raw);
    }
}

#[test]
fn test_normalize_is_idempotent()
{   for raw in [
      "```json\n{\"a\": [1, 2]}\n```",
      "  {\"a\": 1}\n",
      "plain text",
      "",
      "```\n```json\n{}\n```\n```",
    ]
    {   let once = normalize_model_output(raw);
        assert_eq!(normalize_model_output(&once), once);
    }
}

#[test]
fn test_normalize_strips_nested_fences()
{   assert_eq!(normalize_model_output("```\n```json\n{}\n```\n```"), "{}");
}

#[test]
fn test_normalize_leaves_broken_json_alone()
{   assert_eq!(
      normalize_model_output("```json\n{\"a\": \n```"),
      "{\"a\":"
    );
}

#[test]
fn test_minimal_payload_is_accepted()
{   let payload = assert_ok!(
      validate_payload(minimal(), ValidationMode::Shallow)
    );
    assert_eq!(payload.quiz[0].difficulty_level(), Some(Difficulty::Medium));

    assert_ok!(validate_payload(minimal(), ValidationMode::Strict));
}

#[test]
fn test_each_missing_key_is_rejected()
{   for key in REQUIRED_KEYS
    {   let mut value = minimal();
        value.as_object_mut().unwrap().remove(key);
        let err = assert_err!(
          validate_payload(value, ValidationMode::Shallow)
        );
        let msg = structural_message(err);
        assert!(msg.contains(key), "{}", msg);
    }
}

#[test]
fn test_empty_or_non_list_quiz_is_rejected()
{   for quiz in [json!([]), json!("five questions"), json!({"q": 1})]
    {   let mut value = minimal();
        value["quiz"] = quiz;
        let msg = structural_message(assert_err!(
          validate_payload(value, ValidationMode::Shallow)
        ));
        assert!(msg.contains("quiz"), "{}", msg);
    }
}

#[test]
fn test_non_object_is_rejected()
{   let msg = structural_message(assert_err!(
      validate_payload(json!([1, 2, 3]), ValidationMode::Shallow)
    ));
    assert!(msg.contains("not a JSON object"));
}

#[test]
fn test_invalid_json_is_structural_error()
{   let msg = structural_message(assert_err!(
      parse_payload("{\"summary\": ", ValidationMode::Shallow)
    ));
    assert!(msg.contains("not valid JSON"));
}

#[test]
fn test_shallow_mode_keeps_loose_questions()
{   let mut value = minimal();
    value["quiz"][0]["options"] = json!(["a", "b"]);
    value["quiz"][0]["answer"] = json!("z");
    value["quiz"][0]["difficulty"] = json!("Tricky");

    let payload = assert_ok!(
      validate_payload(value.clone(), ValidationMode::Shallow)
    );
    assert_eq!(payload.quiz[0].difficulty_level(), None);

    let msg = structural_message(assert_err!(
      validate_payload(value, ValidationMode::Strict)
    ));
    assert!(msg.contains("quiz[0].options"), "{}", msg);
}

#[test]
fn test_strict_mode_rejects_unknown_difficulty()
{   let mut value = minimal();
    value["quiz"][0]["difficulty"] = json!("extreme");
    let msg = structural_message(assert_err!(
      validate_payload(value, ValidationMode::Strict)
    ));
    assert!(msg.contains("quiz[0].difficulty"), "{}", msg);
}

#[test]
fn test_missing_difficulty_defaults_to_medium()
{   let mut value = minimal();
    value["quiz"][0].as_object_mut().unwrap().remove("difficulty");
    let payload = assert_ok!(
      validate_payload(value, ValidationMode::Strict)
    );
    assert_eq!(payload.quiz[0].difficulty, "medium");
}

#[test]
fn test_request_content_is_bounded()
{   let long = "é".repeat(MAX_CONTENT_CHARS + 50);
    let request = GenerationRequest::new("Title", long);
    assert_eq!(request.content().chars().count(), MAX_CONTENT_CHARS);

    let prompt = request.prompt();
    assert!(prompt.contains("Article Title: Title"));
    assert!(prompt.contains("\"related_topics\""));
}
