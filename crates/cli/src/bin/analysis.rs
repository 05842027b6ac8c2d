use anyhow::Result;
use clap::Parser;
use config::Settings;
use extract::{ChatClient, RecordStore};
use query::{DeepSeekAnswerer, QueryEngine};
use std::path::PathBuf;

/// Responde preguntas en español natural sobre los comunicados extraídos.
#[derive(Parser)]
#[command(name = "analysis")]
struct Args {
    /// La pregunta, entre comillas: "De qué trata el proyecto Olinia?"
    question: String,

    /// Carpeta de resultados del extractor (por defecto, CONSULTOR_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    // Fails fast on a missing key, before any network traffic
    let mut settings = Settings::load()?;
    if let Some(dir) = args.output_dir {
        settings.output_dir = dir;
    }

    let answerer = DeepSeekAnswerer::new(ChatClient::new(&settings)?);
    let engine = QueryEngine::new(RecordStore::new(&settings.output_dir), answerer);

    let response = engine.run(&args.question).await?;

    println!("{}", response.answer.trim_end());
    if !response.cited.is_empty() {
        println!("\nRegistros consultados: {}", response.cited.join(", "));
    }

    Ok(())
}
