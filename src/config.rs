use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub speech: SpeechConfig,
    pub generation: GenerationConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct SpeechConfig {
    /// NATS URL of the speech daemon
    pub nats_url: String,
    /// Timeout for one-shot recognition and session start requests
    pub request_timeout_secs: u64,
    /// Timeout for the stop acknowledgement; expiry forces resource release
    pub stop_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the generative-text REST API
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    /// Sender address, also the SMTP login
    pub address: String,
    pub password: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            // CALLSCRIBE_GENERATION__API_KEY etc. override the file
            .add_source(config::Environment::with_prefix("CALLSCRIBE").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
