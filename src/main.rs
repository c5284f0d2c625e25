use anyhow::Result;
use callscribe::pipeline::{GeminiGenerator, TextGenerator, TextPipeline};
use callscribe::speech::{NatsSpeechBackend, SpeechBackend};
use callscribe::{create_router, AppState, Config, Mailer, SessionController};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "callscribe", about = "Call transcription and analysis service")]
struct Cli {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/callscribe")]
    config: String,

    /// Override the configured bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = cli.port {
        cfg.service.http.port = port;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let speech: Arc<dyn SpeechBackend> = Arc::new(NatsSpeechBackend::connect(&cfg.speech).await?);
    info!("Speech backend ready: {}", speech.name());

    let generator: Arc<dyn TextGenerator> = Arc::new(GeminiGenerator::new(&cfg.generation));
    let pipeline = Arc::new(TextPipeline::new(generator));

    let session = Arc::new(SessionController::new(
        Arc::clone(&speech),
        Arc::clone(&pipeline),
    ));

    let mailer = Arc::new(Mailer::new(&cfg.email)?);

    let app = create_router(AppState {
        speech,
        session,
        pipeline,
        mailer,
    });

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
