use anyhow::Result;
use clap::Parser;
use config::Settings;
use extract::{Category, ChatClient};
use std::path::PathBuf;

/// Extrae proyectos, personas o instituciones de los comunicados PDF.
#[derive(Parser)]
#[command(name = "extractor")]
struct Args {
    /// Categoría a extraer: proyectos, personas o instituciones
    category: Category,

    /// Procesa solo los primeros N documentos (modo prueba)
    #[arg(long)]
    limit: Option<usize>,

    /// Carpeta con los PDF de entrada (por defecto, CONSULTOR_SOURCE_DIR)
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Carpeta de resultados (por defecto, CONSULTOR_OUTPUT_DIR)
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

    let mut settings = Settings::load()?;
    if let Some(dir) = args.source_dir {
        settings.source_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        settings.output_dir = dir;
    }
    let settings = settings.validated()?;

    let client = ChatClient::new(&settings)?;
    let file = extract::run_extraction(&settings, &client, args.category, args.limit).await?;

    println!(
        "{} extraídos: {} registros",
        file.category, file.records.len()
    );
    for (i, record) in file.records.iter().take(10).enumerate() {
        println!("{:3}. {} ({} documentos)", i + 1, record.name, record.mentions);
        if !record.description.is_empty() {
            println!("     {}", record.description);
        }
    }
    if file.records.len() > 10 {
        println!("... y {} más", file.records.len() - 10);
    }

    Ok(())
}
