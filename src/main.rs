use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use quizgen::{GenerationRequest, QuizClient};

/// Generate a quiz from an article using the provider set in
/// the environment (LLM_PROVIDER, GEMINI_* / GROQ_*).
#[derive(Debug, Parser)]
#[command(name = "quizgen", version)]
struct Args
{   /// Article title
    #[arg(short, long)]
    title: String
  , /// File holding the article body; stdin when omitted
    #[arg(short, long)]
    content: Option<PathBuf>
  , /// Check every question has 4 options, a matching answer
    /// and a known difficulty
    #[arg(long)]
    strict: bool
}

fn read_content(path: Option<&PathBuf>) -> std::io::Result<String>
{   match path
    {   Some(path) => std::fs::read_to_string(path)
      , None => {
          let mut buf = String::new();
          std::io::stdin().read_to_string(&mut buf)?;
          Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::init();
    let args = Args::parse();

    let content = match read_content(args.content.as_ref())
    {   Ok(c) => c
      , Err(e) => {
          error!("Failed to read article body: {}", e);
          return ExitCode::FAILURE;
        }
    };

    let mut config = match quizgen::QuizgenConfig::from_env()
    {   Ok(c) => c
      , Err(e) => {
          eprintln!("{}", e);
          return ExitCode::FAILURE;
        }
    };
    if args.strict
    {   config.validation = quizgen::ValidationMode::Strict;
    }

    let client = match QuizClient::new(config)
    {   Ok(c) => c
      , Err(e) => {
          eprintln!("{}", e);
          return ExitCode::FAILURE;
        }
    };

    let request = GenerationRequest::new(args.title, content);
    match client.generate(&request).await
    {   Ok(payload) => match serde_json::to_string_pretty(&payload)
        {   Ok(json) => {
              println!("{}", json);
              ExitCode::SUCCESS
            }
          , Err(e) => {
              eprintln!("Failed to encode payload: {}", e);
              ExitCode::FAILURE
            }
        }
      , Err(e) => {
          eprintln!("[{}] {}", e.status_code(), e);
          ExitCode::FAILURE
        }
    }
}
