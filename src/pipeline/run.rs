use super::generator::TextGenerator;
use super::sections::{split_sections, StructuredSections};
use std::sync::Arc;
use tracing::{error, info};

/// Placeholder returned when the generation service fails; callers always
/// receive some text, never a hard error.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to summarize sentiment";

const SUMMARY_PROMPT: &str = "Summarize this conversation in 100 words: ";

const ANALYSIS_PROMPT: &str = "Perform sentiment analysis on this conversation \
(heading- Sentiment Analysis); Give insights on how the agent can better \
help/converse with the customer (heading- Insights); Draft a simple email \
response that could be sent to the customer (heading- Email Response); \
Around 200 words, everything in points: ";

/// Result of one pipeline invocation. Immutable; handed to the caller and
/// discarded.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineResult {
    pub summary: String,
    pub insights: StructuredSections,
}

/// Two-stage transcript analysis: summary, then structured sections.
pub struct TextPipeline {
    generator: Arc<dyn TextGenerator>,
}

impl TextPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Ask for a ~100-word summary; the response text is returned verbatim.
    pub async fn summarize(&self, transcript: &str) -> String {
        match self
            .generator
            .generate(&format!("{}{}", SUMMARY_PROMPT, transcript))
            .await
        {
            Ok(text) => text,
            Err(e) => {
                error!("Error summarizing transcript: {}", e);
                GENERATION_FAILED_MESSAGE.to_string()
            }
        }
    }

    /// Ask for the three headed sections and re-segment the response.
    pub async fn analyze(&self, transcript: &str) -> StructuredSections {
        match self
            .generator
            .generate(&format!("{}{}", ANALYSIS_PROMPT, transcript))
            .await
        {
            Ok(raw) => split_sections(&raw),
            Err(e) => {
                error!("Error analyzing transcript: {}", e);
                StructuredSections::unsegmented(GENERATION_FAILED_MESSAGE)
            }
        }
    }

    /// Run both stages for one transcript.
    pub async fn run(&self, transcript: &str) -> PipelineResult {
        info!("Running analysis pipeline ({} chars)", transcript.len());

        let summary = self.summarize(transcript).await;
        let insights = self.analyze(transcript).await;

        PipelineResult { summary, insights }
    }
}
