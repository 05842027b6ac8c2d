pub mod consolidate;
pub mod llm;
pub mod prompt;
pub mod schema;
pub mod store;

pub use consolidate::{NameNormalizer, consolidate};
pub use llm::{ChatClient, JsonChat, LlmError};
pub use schema::{Category, CategoryFile, ExtractedRecord, parse_records};
pub use store::RecordStore;

use anyhow::{Context, Result};
use chrono::Utc;
use config::Settings;
use ingest::{Document, DocumentBatcher};
use tracing::{info, warn};

/// Maximum JSON-repair reprompts per batch. This is semantic repair of the
/// model's own output, not a network retry.
const MAX_JSON_REPAIRS: usize = 2;

/// The batch extraction: scan the source directory, batch documents under
/// the token budget, run one category prompt per batch, consolidate the
/// parsed records and overwrite the category's file in the store.
///
/// A batch whose reply cannot be parsed is logged and dropped; the run
/// continues with the remaining batches.
pub async fn run_extraction<C: JsonChat>(
    settings: &Settings,
    client: &C,
    category: Category,
    limit: Option<usize>,
) -> Result<CategoryFile> {
    let report = ingest::scan_directory(&settings.source_dir, settings.max_pdf_chars)
        .context("failed to scan source directory")?;

    if !report.skipped.is_empty() {
        info!(skipped = report.skipped.len(), "some PDFs were skipped");
    }

    let mut documents = report.documents;
    if let Some(limit) = limit {
        documents.truncate(limit);
    }

    if documents.is_empty() {
        anyhow::bail!(
            "no readable PDFs found in {}",
            settings.source_dir.display()
        );
    }

    info!(
        category = %category,
        documents = documents.len(),
        "starting extraction"
    );

    let batches = DocumentBatcher::new(settings.max_batch_tokens).batch(documents);
    info!(batches = batches.len(), "documents grouped into batches");

    let records = extract_batches(client, category, &batches).await?;

    let file = CategoryFile {
        category,
        generated_at: Utc::now(),
        records: consolidate(records),
    };

    let store = RecordStore::new(&settings.output_dir);
    let path = store.write(&file)?;
    info!(
        records = file.records.len(),
        path = %path.display(),
        "extraction results written"
    );

    Ok(file)
}

/// One category prompt per batch. A batch whose reply never becomes valid
/// JSON, or parses but defies the category schema, is logged and dropped;
/// credential, network and API failures abort the run.
async fn extract_batches<C: JsonChat>(
    client: &C,
    category: Category,
    batches: &[Vec<Document>],
) -> Result<Vec<ExtractedRecord>> {
    let system = prompt::system_prompt(category);
    let mut records = Vec::new();

    for (i, batch) in batches.iter().enumerate() {
        let block = prompt::format_documents(batch);
        let user = prompt::extraction_prompt(category, &block);

        let json = match client.chat_json(system, &user, MAX_JSON_REPAIRS).await {
            Ok(json) => json,
            Err(LlmError::InvalidJson { attempts }) => {
                warn!(batch = i + 1, attempts, "discarding batch; reply never became valid JSON");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match parse_records(category, &json) {
            Ok(batch_records) => {
                info!(
                    batch = i + 1,
                    documents = batch.len(),
                    records = batch_records.len(),
                    "batch processed"
                );
                records.extend(batch_records);
            }
            Err(e) => {
                warn!(batch = i + 1, error = %format!("{e:#}"), "discarding unparsable batch reply");
            }
        }
    }

    Ok(records)
}
