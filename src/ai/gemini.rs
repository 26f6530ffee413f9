use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

use super::{DescriptionGenerator, AI_FAILED, AI_UNAVAILABLE};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const TEMPERATURE: f32 = 0.8;
const TOP_P: f32 = 0.9;

#[derive(Error, Debug)]
enum GeminiError {
    #[error("network error: {0}")]
    Network(reqwest::Error),

    #[error("API error: {0}")]
    Api(reqwest::Error),

    #[error("unexpected response: {0}")]
    Parsing(reqwest::Error),

    #[error("response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

/// Gemini-backed description generator. Without an API key every call
/// answers with the unavailable message and no request is made.
#[derive(Debug, Clone)]
pub struct GeminiDescriptionGenerator {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiDescriptionGenerator {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            warn!("API_KEY environment variable not set. AI features will be disabled.");
        }

        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            model: model.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn request_description(&self, api_key: &str, title: &str) -> Result<String, GeminiError> {
        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_prompt(title)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(GeminiError::Network)?
            .error_for_status()
            .map_err(GeminiError::Api)?;

        let parsed = response
            .json::<GenerateResponse>()
            .await
            .map_err(GeminiError::Parsing)?;

        extract_text(&parsed).ok_or(GeminiError::EmptyResponse)
    }
}

#[async_trait]
impl DescriptionGenerator for GeminiDescriptionGenerator {
    #[instrument(skip(self), fields(model = %self.model))]
    async fn generate_description(&self, title: &str) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return AI_UNAVAILABLE.to_string();
        };

        match self.request_description(api_key, title).await {
            Ok(text) => {
                debug!(chars = text.len(), "Received generated description");
                text
            }
            Err(e) => {
                error!(error = %e, "Error generating event description");
                AI_FAILED.to_string()
            }
        }
    }
}

fn build_prompt(title: &str) -> String {
    format!(
        "Generate a short, exciting, and engaging event description for a video game event titled \"{}\". \
         The description should be suitable for an in-game announcement. \
         Focus on rallying players to participate. Maximum 3 sentences.",
        title
    )
}

/// Text parts of the first candidate, joined
fn extract_text(response: &GenerateResponse) -> Option<String> {
    let candidate = response.candidates.first()?;
    let text: String = candidate
        .content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
