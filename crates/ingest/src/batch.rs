use crate::Document;

/// Estimate token count for Spanish prose (rough: 1.3 tokens per word).
pub fn estimate_tokens(text: &str) -> usize {
    let word_count = text.split_whitespace().count();
    (word_count as f64 * 1.3) as usize
}

/// Groups whole documents into batches that fit a token budget. One LLM
/// call is made per batch, so the grouping never splits a document.
pub struct DocumentBatcher {
    max_batch_tokens: usize,
}

impl DocumentBatcher {
    pub fn new(max_batch_tokens: usize) -> Self {
        Self { max_batch_tokens }
    }

    /// Pack documents into batches, preserving input order. A document
    /// whose own estimate approaches the budget gets a batch to itself.
    pub fn batch(&self, documents: Vec<Document>) -> Vec<Vec<Document>> {
        let mut batches = Vec::new();
        let mut current: Vec<Document> = Vec::new();
        let mut current_tokens = 0usize;

        let oversize_threshold = (self.max_batch_tokens as f64 * 0.8) as usize;
        let flush_threshold = (self.max_batch_tokens as f64 * 0.75) as usize;

        for doc in documents {
            let doc_tokens = estimate_tokens(&doc.text);

            if doc_tokens > oversize_threshold {
                if !current.is_empty() {
                    batches.push(std::mem::take(&mut current));
                    current_tokens = 0;
                }
                batches.push(vec![doc]);
            } else if current_tokens + doc_tokens > flush_threshold && !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                current = vec![doc];
                current_tokens = doc_tokens;
            } else {
                current_tokens += doc_tokens;
                current.push(doc);
            }
        }

        if !current.is_empty() {
            batches.push(current);
        }

        batches
    }
}
