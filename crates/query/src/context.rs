use anyhow::Result;
use extract::{Category, ExtractedRecord, RecordStore};
use tracing::debug;

use crate::intent::QueryIntent;

/// Which persisted categories an intent draws its context from.
pub fn categories_for(intent: &QueryIntent) -> &'static [Category] {
    match intent {
        QueryIntent::ProjectInfo { .. } => &[Category::Proyectos],
        QueryIntent::CategoryListing(_)
        | QueryIntent::Verify { .. }
        | QueryIntent::FindDocuments { .. }
        | QueryIntent::General => &Category::ALL,
    }
}

/// Load every available record for the given categories. Categories that
/// were never extracted are simply absent; it is the caller's problem if
/// nothing at all is available.
pub fn load_records(store: &RecordStore, categories: &[Category]) -> Result<Vec<ExtractedRecord>> {
    let mut records = Vec::new();

    for &category in categories {
        if let Some(file) = store.try_load(category)? {
            debug!(category = %category, records = file.records.len(), "loaded context records");
            records.extend(file.records);
        }
    }

    Ok(records)
}

/// Keep only records matching the keyword (normalized containment in
/// either direction over name and description). When nothing matches, the
/// full set is returned so the model still gets context to work with.
pub fn filter_records(records: Vec<ExtractedRecord>, keyword: &str) -> Vec<ExtractedRecord> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return records;
    }

    let matching: Vec<ExtractedRecord> = records
        .iter()
        .filter(|r| {
            let name = r.name.to_lowercase();
            name.contains(&needle)
                || needle.contains(&name)
                || r.description.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    if matching.is_empty() { records } else { matching }
}

/// Format records as the context block embedded in query prompts.
pub fn build_context(records: &[ExtractedRecord]) -> String {
    let mut context = String::from("REGISTROS EXTRAÍDOS DE LOS COMUNICADOS:\n");

    for record in records {
        context.push_str(&format!("- [{}] {}", record.category.singular(), record.name));
        if !record.description.is_empty() {
            context.push_str(&format!(": {}", record.description));
        }
        if !record.source_docs.is_empty() {
            context.push_str(&format!(
                " (menciones: {}; documentos: {})",
                record.mentions,
                record.source_docs.join(", ")
            ));
        }
        context.push('\n');
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, description: &str) -> ExtractedRecord {
        ExtractedRecord {
            category: Category::Proyectos,
            name: name.to_string(),
            description: description.to_string(),
            source_docs: vec!["comunicado_01.pdf".to_string()],
            mentions: 1,
        }
    }

    #[test]
    fn filter_matches_names_and_descriptions() {
        let records = vec![
            record("Kutsari", "semiconductores"),
            record("Olinia", "vehículos eléctricos"),
        ];

        let by_name = filter_records(records.clone(), "kutsari");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Kutsari");

        let by_description = filter_records(records.clone(), "eléctricos");
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].name, "Olinia");
    }

    #[test]
    fn filter_falls_back_to_everything_on_no_match() {
        let records = vec![record("Kutsari", ""), record("Olinia", "")];
        assert_eq!(filter_records(records, "inexistente").len(), 2);
    }

    #[test]
    fn context_block_carries_names_and_sources() {
        let block = build_context(&[record("Kutsari", "semiconductores")]);
        assert!(block.contains("[proyecto] Kutsari: semiconductores"));
        assert!(block.contains("comunicado_01.pdf"));
    }
}
