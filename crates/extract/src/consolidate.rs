use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::LazyLock;

use crate::schema::ExtractedRecord;

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.,!?;:'\u{201c}\u{201d}]").unwrap());
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Resolves record-name variants ("IPN" vs "el IPN.") to one canonical
/// key so the same project reported by two batches merges into one record.
pub struct NameNormalizer {
    /// Maps normalized name -> canonical name. Ordered so that alias
    /// resolution is deterministic when several candidates are similar.
    aliases: BTreeMap<String, String>,
}

impl NameNormalizer {
    pub fn new() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    /// Normalize a name: lowercase, trim punctuation, collapse whitespace,
    /// then resolve against previously seen variants.
    pub fn normalize(&mut self, name: &str) -> String {
        let mut normalized = name.to_lowercase().trim().to_string();
        normalized = PUNCTUATION.replace_all(&normalized, "").to_string();
        normalized = SPACES.replace_all(&normalized, " ").trim().to_string();

        if let Some(canonical) = self.aliases.get(&normalized) {
            return canonical.clone();
        }

        let mut found_canonical = None;
        for (existing, canonical) in &self.aliases {
            if are_similar(&normalized, existing) {
                found_canonical = Some(canonical.clone());
                break;
            }
        }

        if let Some(canonical) = found_canonical {
            self.aliases.insert(normalized, canonical.clone());
            return canonical;
        }

        self.aliases.insert(normalized.clone(), normalized.clone());
        normalized
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn are_similar(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    // One contained in the other handles acronym vs full-name variants
    if a.contains(b) || b.contains(a) {
        return true;
    }

    // Multi-word names: 70% word overlap counts as the same thing
    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();

    if words_a.len() > 1 && words_b.len() > 1 {
        let common = words_a.iter().filter(|w| words_b.contains(w)).count();
        let total = words_a.len().max(words_b.len());
        return common as f64 / total as f64 > 0.7;
    }

    false
}

/// Merge records from all batches: union source documents per canonical
/// name, keep the most detailed description and the longest display name,
/// recompute mentions, and order by mentions (then name) so listings are
/// stable run to run.
pub fn consolidate(records: Vec<ExtractedRecord>) -> Vec<ExtractedRecord> {
    let mut normalizer = NameNormalizer::new();
    let mut merged: HashMap<String, ExtractedRecord> = HashMap::new();
    let mut docs: HashMap<String, BTreeSet<String>> = HashMap::new();

    for record in records {
        if record.name.trim().is_empty() {
            continue;
        }
        let key = normalizer.normalize(&record.name);

        docs.entry(key.clone())
            .or_default()
            .extend(record.source_docs.iter().cloned());

        match merged.get_mut(&key) {
            Some(existing) => {
                if record.description.len() > existing.description.len() {
                    existing.description = record.description;
                }
                if record.name.len() > existing.name.len() {
                    existing.name = record.name;
                }
            }
            None => {
                merged.insert(key, record);
            }
        }
    }

    let mut result: Vec<ExtractedRecord> = merged
        .into_iter()
        .map(|(key, mut record)| {
            let sources = docs.remove(&key).unwrap_or_default();
            record.mentions = sources.len();
            record.source_docs = sources.into_iter().collect();
            record
        })
        .collect();

    result.sort_by(|a, b| b.mentions.cmp(&a.mentions).then_with(|| a.name.cmp(&b.name)));
    result
}
