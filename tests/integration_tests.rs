//! Live provider tests. Ignored by default; run with
//! `cargo test -- --ignored` and real keys in the environment.

use quizgen::providers::{GeminiDriver, GroqDriver, ProviderDriver};
use quizgen::{GenerationRequest, Provider, QuizClient};

const ARTICLE: &str = "Alan Turing was an English mathematician, computer \
scientist and cryptanalyst. During the Second World War he worked at \
Bletchley Park, where he devised techniques for breaking German ciphers, \
including improvements to the bombe. He is widely considered the father \
of theoretical computer science.";

/// Get API key from environment
fn get_api_key(env_var: &str) -> Option<String>
{   std::env::var(env_var)
      .ok()
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty())
}

fn request() -> GenerationRequest
{   GenerationRequest::new("Alan Turing", ARTICLE)
}

#[test]
fn test_driver_creation()
{   let gemini = GeminiDriver::new(None, 30).unwrap();
    assert_eq!(gemini.provider(), Provider::Gemini);

    let groq = GroqDriver::new(
      Some("http://localhost:9/v1".to_string()), 30
    ).unwrap();
    assert_eq!(groq.provider(), Provider::Groq);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_error()
{   let driver = GroqDriver::new(
      Some("http://127.0.0.1:9/v1".to_string()), 5
    ).unwrap();
    let result = driver.invoke("gsk_test", "llama-3.1-8b-instant", &request())
      .await;
    // a proxy in the environment may answer instead of refusing,
    // so any provider error is acceptable here
    assert!(result.is_err(), "{:?}", result);
}

#[tokio::test]
#[ignore]
async fn test_gemini_invoke()
{   let api_key = match get_api_key("GEMINI_API_KEY")
    {   Some(k) => k
      , None => {
          println!("Skipping test: GEMINI_API_KEY not set");
          return;
        }
    };

    let driver = GeminiDriver::new(None, 60).unwrap();
    match driver.invoke(&api_key, "gemini-2.0-flash", &request()).await
    {   Ok(text) => {
          println!("Gemini responded: {}", text.chars().take(80).collect::<String>());
          assert!(!text.is_empty());
        }
      , Err(e) => println!("Gemini call failed: {}", e)
    }
}

#[tokio::test]
#[ignore]
async fn test_groq_invoke()
{   let api_key = match get_api_key("GROQ_API_KEY")
    {   Some(k) => k
      , None => {
          println!("Skipping test: GROQ_API_KEY not set");
          return;
        }
    };

    let driver = GroqDriver::new(None, 60).unwrap();
    match driver.invoke(&api_key, "llama-3.1-8b-instant", &request()).await
    {   Ok(text) => {
          println!("Groq responded: {}", text.chars().take(80).collect::<String>());
          assert!(!text.is_empty());
        }
      , Err(e) => println!("Groq call failed: {}", e)
    }
}

#[tokio::test]
#[ignore]
async fn test_client_from_env_generates_quiz()
{   let client = match QuizClient::from_env()
    {   Ok(c) => c
      , Err(e) => {
          println!("Skipping test: {}", e);
          return;
        }
    };

    match client.generate(&request()).await
    {   Ok(payload) => {
          println!(
            "Generated {} questions via {}",
            payload.quiz.len(), client.config().provider()
          );
          assert!(!payload.quiz.is_empty());
        }
      , Err(e) => println!("Generation failed [{}]: {}", e.status_code(), e)
    }
}
