use async_trait::async_trait;

mod gemini;

pub use gemini::{GeminiDescriptionGenerator, DEFAULT_GEMINI_MODEL};

pub const AI_UNAVAILABLE: &str =
    "AI service is unavailable. Please set the API_KEY environment variable.";
pub const AI_FAILED: &str = "Failed to generate AI description. Please try again later.";

/// Writes announcement text for a scheduled event.
///
/// Never fails: problems are reported through the returned text.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn generate_description(&self, title: &str) -> String;
}
