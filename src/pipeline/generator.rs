use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// Network or quota failure reaching the generation service.
    #[error("Generation request failed: {0}")]
    Transport(String),

    /// The service answered but the response carried no usable text.
    #[error("Malformed generation response: {0}")]
    Malformed(String),
}

/// Single-turn prompt-to-text generation service.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
