use anyhow::Result;
use extract::{Category, RecordStore};
use tracing::info;

use crate::answer::PromptAnswerer;
use crate::context;
use crate::intent::{self, QueryIntent};
use crate::prompt;

/// The model's answer plus the names of the records whose context was
/// embedded in the prompt (or listed directly).
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub answer: String,
    pub cited: Vec<String>,
}

/// Stateless end to end: each `run` loads persisted records, builds one
/// prompt and performs at most one API round-trip.
pub struct QueryEngine<A> {
    store: RecordStore,
    answerer: A,
}

impl<A: PromptAnswerer> QueryEngine<A> {
    pub fn new(store: RecordStore, answerer: A) -> Self {
        Self { store, answerer }
    }

    pub async fn run(&self, question: &str) -> Result<QueryResponse> {
        let intent = intent::analyze(question);
        info!(?intent, "classified query");

        // A direct category keyword is served from disk, no API call
        if let QueryIntent::CategoryListing(category) = intent {
            return self.list_category(category);
        }

        let records = context::load_records(&self.store, context::categories_for(&intent))?;
        if records.is_empty() {
            anyhow::bail!(
                "no extracted data found in {} (run `extractor <categoria>` first)",
                self.store.root().display()
            );
        }

        let keyword = match &intent {
            QueryIntent::ProjectInfo { name } => name.as_str(),
            QueryIntent::Verify { claim } => claim.as_str(),
            QueryIntent::FindDocuments { needle } => needle.as_str(),
            QueryIntent::General => question,
            QueryIntent::CategoryListing(_) => unreachable!("handled above"),
        };
        let records = context::filter_records(records, keyword);

        let context_block = context::build_context(&records);
        let system = prompt::system_prompt(&intent);
        let user = prompt::user_prompt(&intent, question, &context_block);

        let answer = self.answerer.answer(system, &user).await?;

        Ok(QueryResponse {
            answer,
            cited: records.into_iter().map(|r| r.name).collect(),
        })
    }

    fn list_category(&self, category: Category) -> Result<QueryResponse> {
        let file = self.store.load(category)?;

        let mut answer = format!("{} ({}):\n", category, file.records.len());
        for (i, record) in file.records.iter().enumerate() {
            answer.push_str(&format!("{:3}. {}", i + 1, record.name));
            if !record.description.is_empty() {
                answer.push_str(&format!(" — {}", record.description));
            }
            answer.push_str(&format!(" [{} documentos]\n", record.mentions));
        }

        Ok(QueryResponse {
            answer,
            cited: file.records.into_iter().map(|r| r.name).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use extract::{CategoryFile, ExtractedRecord, LlmError};
    use std::sync::Mutex;

    /// Records every prompt it sees; never goes near a network.
    struct MockAnswerer {
        prompts: Mutex<Vec<(String, String)>>,
        reply: String,
    }

    impl MockAnswerer {
        fn new(reply: &str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn last_user_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().unwrap().1.clone()
        }
    }

    impl PromptAnswerer for MockAnswerer {
        async fn answer(&self, system: &str, user: &str) -> Result<String, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string()));
            Ok(self.reply.clone())
        }
    }

    fn record(category: Category, name: &str, description: &str, docs: &[&str]) -> ExtractedRecord {
        ExtractedRecord {
            category,
            name: name.to_string(),
            description: description.to_string(),
            source_docs: docs.iter().map(|d| d.to_string()).collect(),
            mentions: docs.len(),
        }
    }

    fn seeded_store(dir: &std::path::Path) -> RecordStore {
        let store = RecordStore::new(dir);

        store
            .write(&CategoryFile {
                category: Category::Proyectos,
                generated_at: Utc::now(),
                records: vec![
                    record(
                        Category::Proyectos,
                        "Kutsari",
                        "Diseño y empaquetado de semiconductores",
                        &["comunicado_03.pdf"],
                    ),
                    record(
                        Category::Proyectos,
                        "Olinia",
                        "Mini vehículos eléctricos",
                        &["comunicado_07.pdf"],
                    ),
                ],
            })
            .unwrap();

        store
            .write(&CategoryFile {
                category: Category::Personas,
                generated_at: Utc::now(),
                records: vec![record(
                    Category::Personas,
                    "Rosaura Ruiz Gutiérrez",
                    "Titular de la Secihti",
                    &["comunicado_01.pdf"],
                )],
            })
            .unwrap();

        store
    }

    #[tokio::test]
    async fn literal_category_never_calls_the_api() {
        let dir = tempfile::tempdir().unwrap();
        let answerer = MockAnswerer::new("no debería usarse");
        let engine = QueryEngine::new(seeded_store(dir.path()), answerer);

        let response = engine.run("proyectos").await.unwrap();

        assert_eq!(engine.answerer.calls(), 0);
        assert!(response.answer.contains("Kutsari"));
        assert!(response.answer.contains("Olinia"));
        assert_eq!(response.cited, vec!["Kutsari", "Olinia"]);
    }

    #[tokio::test]
    async fn project_question_embeds_that_projects_description() {
        let dir = tempfile::tempdir().unwrap();
        let answerer = MockAnswerer::new("Kutsari es el proyecto nacional de semiconductores.");
        let engine = QueryEngine::new(seeded_store(dir.path()), answerer);

        let response = engine.run("De qué trata el proyecto Kutsari?").await.unwrap();

        assert_eq!(engine.answerer.calls(), 1);
        let prompt = engine.answerer.last_user_prompt();
        assert!(prompt.contains("Diseño y empaquetado de semiconductores"));
        // Keyword filtering kept the other project out of the context
        assert!(!prompt.contains("Mini vehículos eléctricos"));
        assert_eq!(response.cited, vec!["Kutsari"]);
    }

    #[tokio::test]
    async fn general_question_gets_full_context_and_one_call() {
        let dir = tempfile::tempdir().unwrap();
        let answerer = MockAnswerer::new("respuesta");
        let engine = QueryEngine::new(seeded_store(dir.path()), answerer);

        let response = engine
            .run("Qué avances se anunciaron este año en tecnología?")
            .await
            .unwrap();

        assert_eq!(engine.answerer.calls(), 1);
        assert_eq!(response.answer, "respuesta");
        let prompt = engine.answerer.last_user_prompt();
        assert!(prompt.contains("Kutsari"));
        assert!(prompt.contains("Rosaura Ruiz Gutiérrez"));
    }

    #[tokio::test]
    async fn personas_written_by_extractor_are_read_back_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(dir.path());

        let loaded = store.load(Category::Personas).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].name, "Rosaura Ruiz Gutiérrez");
        assert_eq!(loaded.records[0].description, "Titular de la Secihti");
        assert_eq!(loaded.records[0].source_docs, vec!["comunicado_01.pdf"]);
    }

    #[tokio::test]
    async fn empty_store_fails_with_a_pointer_to_the_extractor() {
        let dir = tempfile::tempdir().unwrap();
        let answerer = MockAnswerer::new("nada");
        let engine = QueryEngine::new(RecordStore::new(dir.path()), answerer);

        let err = engine.run("Qué es el IPN?").await.unwrap_err();
        assert!(format!("{err:#}").contains("extractor"));
        assert_eq!(engine.answerer.calls(), 0);
    }
}
