pub mod batch;
pub mod reader;

pub use batch::{DocumentBatcher, estimate_tokens};
pub use reader::PdfReader;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// One scanned PDF. Immutable once extracted; a re-run of the extractor
/// supersedes it wholesale.
#[derive(Debug, Clone)]
pub struct Document {
    pub doc_id: String,
    pub file_name: String,
    pub path: String,
    pub text: String,
    pub extracted_at: DateTime<Utc>,
}

/// A single PDF that could not be read or parsed. Recovered locally: the
/// scan logs it and moves on to the next file.
#[derive(Debug, Error)]
#[error("skipped {path}: {reason}")]
pub struct ExtractionError {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct ScanReport {
    pub documents: Vec<Document>,
    pub skipped: Vec<ExtractionError>,
}

/// Generate a stable document ID from the file path.
pub fn generate_doc_id(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// Scan every `*.pdf` in `dir` into `Document`s. Files are visited in
/// file-name order so the output is deterministic. A file that fails to
/// parse is logged and skipped; the batch continues.
pub fn scan_directory(dir: &Path, max_chars: usize) -> Result<ScanReport> {
    scan_directory_with(dir, |path| PdfReader::read_pdf(path, max_chars))
}

/// Seam over the per-file text extraction, so the skip-and-continue policy
/// can be exercised without real PDF fixtures.
fn scan_directory_with(dir: &Path, read: impl Fn(&Path) -> Result<String>) -> Result<ScanReport> {
    let mut pdf_paths = Vec::new();

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read source directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        {
            pdf_paths.push(path);
        }
    }

    pdf_paths.sort();

    let mut documents = Vec::new();
    let mut skipped = Vec::new();

    for path in pdf_paths {
        match read(&path) {
            Ok(text) => {
                let path_str = path.to_string_lossy().to_string();
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path_str.clone());

                documents.push(Document {
                    doc_id: generate_doc_id(&path_str),
                    file_name,
                    path: path_str,
                    text,
                    extracted_at: Utc::now(),
                });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable PDF");
                skipped.push(ExtractionError {
                    path,
                    reason: format!("{e:#}"),
                });
            }
        }
    }

    Ok(ScanReport { documents, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_is_stable_hex() {
        let a = generate_doc_id("/tmp/comunicado.pdf");
        let b = generate_doc_id("/tmp/comunicado.pdf");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));

        assert_ne!(a, generate_doc_id("/tmp/otro.pdf"));
    }

    #[test]
    fn scan_missing_directory_errors() {
        let result = scan_directory(Path::new("/nonexistent/for/test"), 5000);
        assert!(result.is_err());
    }

    #[test]
    fn scan_skips_corrupt_pdfs_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            std::fs::write(dir.path().join(name), b"not really a pdf").unwrap();
        }
        // Non-PDF files are ignored entirely, not reported as skipped
        std::fs::write(dir.path().join("notas.txt"), b"texto plano").unwrap();

        let report = scan_directory(dir.path(), 5000).unwrap();
        assert!(report.documents.is_empty());
        assert_eq!(report.skipped.len(), 3);
    }

    #[test]
    fn one_corrupt_pdf_among_valid_ones_yields_the_valid_documents() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "corrupto.pdf", "c.pdf"] {
            std::fs::write(dir.path().join(name), b"contenido").unwrap();
        }

        let report = scan_directory_with(dir.path(), |path| {
            if path.file_name().is_some_and(|n| n == "corrupto.pdf") {
                anyhow::bail!("garbled cross-reference table")
            }
            Ok("texto extraído del comunicado".to_string())
        })
        .unwrap();

        let names: Vec<&str> = report
            .documents
            .iter()
            .map(|d| d.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf"]);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].path.ends_with("corrupto.pdf"));
    }
}
