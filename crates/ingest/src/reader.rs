use anyhow::{Context, Result};
use std::path::Path;

/// Extracted text below this length counts as unparsable. Scanned-image
/// PDFs typically yield a few stray characters rather than nothing at all.
pub const MIN_TEXT_CHARS: usize = 200;

pub struct PdfReader;

impl PdfReader {
    /// Extract text from one PDF, truncated to `max_chars` on a character
    /// boundary so a single long communiqué cannot blow the prompt budget.
    pub fn read_pdf(path: &Path, max_chars: usize) -> Result<String> {
        let text = pdf_extract::extract_text(path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("failed to extract text from {}", path.display()))?;

        let text = text.trim();
        if text.chars().count() < MIN_TEXT_CHARS {
            anyhow::bail!(
                "PDF yielded only {} characters of text (likely a scanned image): {}",
                text.chars().count(),
                path.display()
            );
        }

        Ok(truncate_chars(text, max_chars))
    }
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        // "ñ" is two bytes; slicing by bytes would panic here
        let text = "añoañoaño";
        assert_eq!(truncate_chars(text, 4), "añoa");
        assert_eq!(truncate_chars(text, 100), text);
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn read_pdf_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        assert!(PdfReader::read_pdf(&path, 5000).is_err());
    }
}
