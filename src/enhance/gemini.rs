//! Gemini `generateContent` client.
//!
//! The request constrains the model to a JSON object with `polished` and
//! `tags` via `responseSchema`; the reply text of the first candidate is
//! parsed into an [`Enhancement`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{EnhanceError, Enhancement, Enhancer};

const SYSTEM_INSTRUCTION: &str =
    "You are a helpful journaling assistant. Keep improvements subtle.";

pub struct GeminiEnhancer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiEnhancer {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl Enhancer for GeminiEnhancer {
    async fn enhance(&self, text: &str) -> Result<Enhancement, EnhanceError> {
        tracing::debug!(model = %self.model, text_len = text.len(), "requesting enhancement");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnhanceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateContentResponse = response.json().await?;
        parse_reply(reply)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn text_content(role: Option<&str>, text: String) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: vec![Part { text: Some(text) }],
    }
}

fn build_request(text: &str) -> GenerateContentRequest {
    let prompt = format!(
        "Analyze this thought, polish the grammar/flow slightly without changing the vibe, and generate tags: \"{text}\""
    );

    GenerateContentRequest {
        system_instruction: text_content(None, SYSTEM_INSTRUCTION.to_string()),
        contents: vec![text_content(Some("user"), prompt)],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: response_schema(),
        },
    }
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "polished": {
                "type": "STRING",
                "description": "A corrected, slightly more articulate version of the thought, preserving the original meaning and tone."
            },
            "tags": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Up to 3 short, relevant topic tags (lowercase)."
            }
        },
        "required": ["polished", "tags"]
    })
}

fn parse_reply(reply: GenerateContentResponse) -> Result<Enhancement, EnhanceError> {
    let text: String = reply
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(EnhanceError::EmptyResponse);
    }

    Ok(serde_json::from_str(&text)?)
}
