//! Generation request and quiz payload types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Largest article body (in characters) sent to a provider
pub const MAX_CONTENT_CHARS: usize = 3000;

/// Article handed to the generator. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest
{   title: String
  , content: String
}

impl GenerationRequest
{   /// Build a request, truncating content to
    /// `MAX_CONTENT_CHARS` characters
    pub fn new(
      title: impl Into<String>
    , content: impl Into<String>
    ) -> Self
    {   let mut content = content.into();
        if let Some((cut, _)) = content
          .char_indices()
          .nth(MAX_CONTENT_CHARS)
        {   content.truncate(cut);
        }
        GenerationRequest
        {   title: title.into()
          , content
        }
    }

    pub fn title(&self) -> &str
    {   &self.title
    }

    pub fn content(&self) -> &str
    {   &self.content
    }

    /// Render the quiz prompt sent to every provider
    pub fn prompt(&self) -> String
    {   format!(
r#"You are a quiz generator. Based on the Wikipedia article below, generate a quiz.

Article Title: {title}

Article Content:
{content}

Generate between 5 and 10 questions. Return ONLY valid JSON - no markdown, no code fences, no explanation before or after.

Use this exact JSON structure:
{{
  "summary": "2-3 sentences summarizing what this article is about",
  "key_entities": {{
    "people": ["Person 1", "Person 2"],
    "organizations": ["Org 1"],
    "locations": ["Place 1"]
  }},
  "sections": ["Section heading 1", "Section heading 2"],
  "quiz": [
    {{
      "question": "The full question text",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "answer": "Option A",
      "difficulty": "easy",
      "explanation": "Short explanation of why this answer is correct, referencing the article"
    }}
  ],
  "related_topics": ["Topic 1", "Topic 2", "Topic 3", "Topic 4"]
}}

Rules you must follow:
- "answer" must be copied word-for-word from one of the "options", not paraphrased
- "difficulty" must be exactly "easy", "medium", or "hard", nothing else
- Each question needs exactly 4 options
- related_topics should be real Wikipedia article names the reader could look up
- Questions should test actual understanding of the article, not just surface-level recall
- Do not include labels like "(A)" or "(B)" in the option text
"#
        , title = self.title
        , content = self.content
        )
    }
}

/// Structurally validated quiz returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizPayload
{   pub summary: String
  , pub key_entities: KeyEntities
  , pub sections: Vec<String>
  , pub quiz: Vec<QuizQuestion>
  , pub related_topics: Vec<String>
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyEntities
{   #[serde(default)]
    pub people: Vec<String>
  , #[serde(default)]
    pub organizations: Vec<String>
  , #[serde(default)]
    pub locations: Vec<String>
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion
{   pub question: String
  , pub options: Vec<String>
  , pub answer: String
  , /// Raw difficulty label; see `QuizQuestion::difficulty_level`
    #[serde(default = "default_difficulty")]
    pub difficulty: String
  , #[serde(default)]
    pub explanation: String
}

fn default_difficulty() -> String
{   Difficulty::Medium.as_str().to_string()
}

impl QuizQuestion
{   /// Parsed difficulty, `None` if the model used an unknown label
    pub fn difficulty_level(&self) -> Option<Difficulty>
    {   self.difficulty.parse().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty
{   Easy
  , Medium
  , Hard
}

impl Difficulty
{   pub fn as_str(&self) -> &'static str
    {   match self
        {   Difficulty::Easy => "easy"
          , Difficulty::Medium => "medium"
          , Difficulty::Hard => "hard"
        }
    }
}

impl FromStr for Difficulty
{   type Err = String;

    /// Exact match only: the prompt asks for lowercase labels
    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   match s
        {   "easy" => Ok(Difficulty::Easy)
          , "medium" => Ok(Difficulty::Medium)
          , "hard" => Ok(Difficulty::Hard)
          , other => Err(format!("unknown difficulty: {}", other))
        }
    }
}
