//! Transcript analysis pipeline
//!
//! Two generation requests per transcript: a ~100-word summary, and a
//! structured analysis (sentiment, coaching insights, draft email reply)
//! that is re-segmented into three labeled sections with normalized
//! formatting. Generation failures degrade to placeholder text; a response
//! missing the expected headings degrades to a single unsegmented section.
//! Callers always get text back.

mod gemini;
mod generator;
mod run;
mod sections;

pub use gemini::GeminiGenerator;
pub use generator::{GenerationError, TextGenerator};
pub use run::{PipelineResult, TextPipeline, GENERATION_FAILED_MESSAGE};
pub use sections::{split_sections, StructuredSections};
