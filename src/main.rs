//! Startup self-check for an Ollama host.
//!
//! Loads `.env` if present, reads `HOST_ADDRESS`, lists the available models
//! and, when given a model and a prompt, streams a generation to stdout.
//! Ctrl-C cancels the stream.
//!
//! ```text
//! ollama-ndjson [MODEL PROMPT...]
//! ```

use std::io::Write;
use std::process::ExitCode;

use ollama_ndjson::config::Config;
use ollama_ndjson::types::generate::{GenerateChunk, GenerateRequest};
use ollama_ndjson::{Error, OllamaClient};
use tokio_util::sync::CancellationToken;

const USAGE: &str = "usage: ollama-ndjson [MODEL PROMPT...]";

#[tokio::main]
async fn main() -> ExitCode {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let generation = match args.next() {
        None => None,
        Some(model) => {
            let prompt = args.collect::<Vec<_>>().join(" ");
            if prompt.is_empty() {
                eprintln!("no prompt given for model {model:?}\n{USAGE}");
                return ExitCode::from(2);
            }
            Some(GenerateRequest::new(model, prompt))
        }
    };

    match run(generation).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_cancelled() => {
            eprintln!("\ngeneration cancelled");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(generation: Option<GenerateRequest>) -> Result<(), Error> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    eprintln!("Using Ollama host: {}", config.base_url());

    let client = OllamaClient::builder().config(config).build()?;

    let models = client.list_models().await?;
    let mut stdout = std::io::stdout();
    writeln!(
        stdout,
        "Available models: {}",
        serde_json::to_string_pretty(&models)?
    )?;

    let Some(request) = generation else {
        return Ok(());
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    // first failed write to stdout, which also stops the generation
    let mut write_error = None;
    let result = client
        .generate_with(request, cancel.clone(), |chunk: GenerateChunk| {
            if write_error.is_some() {
                return;
            }
            let written = write!(stdout, "{}", chunk.response).and_then(|()| stdout.flush());
            if let Err(e) = written {
                write_error = Some(e);
                cancel.cancel();
            }
        })
        .await;

    if let Some(e) = write_error {
        return Err(Error::Io(e));
    }
    result?;
    writeln!(stdout)?;

    Ok(())
}
