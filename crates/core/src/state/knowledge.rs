//! # Knowledge Corpus
//!
//! Uploaded reference documents, already converted to text, and their
//! concatenation into a single context block for chat instructions.
//!
//! Size and type are validated before a document exists; a document is
//! never mutated afterwards, only removed.

use super::fallback::{truncate_chars, Degradable, FallbackWriter, WriteOutcome};
use super::store::{keys, Store};
use crate::error::{LabError, LabResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upload size limit (10 MiB)
pub const FILE_SIZE_LIMIT: u64 = 10 * 1024 * 1024;

/// Characters kept in a document preview
pub const PREVIEW_CHARS: usize = 200;

/// Supported document kinds, derived from the filename extension
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Spreadsheet,
    WordProcessor,
    Pdf,
    PlainText,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::WordProcessor => "word-processor",
            Self::Pdf => "pdf",
            Self::PlainText => "plain-text",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Spreadsheet => &["xlsx", "xls", "csv"],
            Self::WordProcessor => &["docx"],
            Self::Pdf => &["pdf"],
            Self::PlainText => &["txt"],
        }
    }

    /// `None` for unrecognized or missing extensions
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        [
            Self::Spreadsheet,
            Self::WordProcessor,
            Self::Pdf,
            Self::PlainText,
        ]
        .into_iter()
        .find(|t| t.extensions().contains(&ext.as_str()))
    }
}

/// A parsed upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub size_bytes: u64,
    pub content: String,
    pub uploaded_at: DateTime<Utc>,
    pub preview: String,
}

impl KnowledgeDocument {
    /// Validate and build a document from extracted text
    pub fn from_upload(name: &str, size_bytes: u64, content: String) -> LabResult<Self> {
        let doc_type = validate_upload(name, size_bytes)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            doc_type,
            size_bytes,
            preview: truncate_chars(&content, PREVIEW_CHARS),
            content,
            uploaded_at: Utc::now(),
        })
    }
}

impl Degradable for Vec<KnowledgeDocument> {
    fn degraded(&self, max_chars: usize) -> Self {
        self.iter()
            .map(|doc| KnowledgeDocument {
                content: truncate_chars(&doc.content, max_chars),
                ..doc.clone()
            })
            .collect()
    }
}

/// Size and type checks shared by upload and `add`
pub fn validate_upload(name: &str, size_bytes: u64) -> LabResult<DocumentType> {
    if size_bytes > FILE_SIZE_LIMIT {
        return Err(LabError::UnsupportedInput(format!(
            "'{}' is {}, limit is {}",
            name,
            format_size(size_bytes),
            format_size(FILE_SIZE_LIMIT)
        )));
    }

    DocumentType::from_filename(name).ok_or_else(|| {
        LabError::UnsupportedInput(format!("'{}' has an unsupported file type", name))
    })
}

/// Human-readable size: `512 B`, `1.5 KB`, `2.0 MB`
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// File-to-text conversion
pub trait DocumentParser: Send + Sync {
    fn parse(&self, doc_type: DocumentType, bytes: &[u8]) -> LabResult<String>;
}

/// Handles plain text and CSV. Binary office formats are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextParser;

impl DocumentParser for PlainTextParser {
    fn parse(&self, doc_type: DocumentType, bytes: &[u8]) -> LabResult<String> {
        match doc_type {
            DocumentType::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
            DocumentType::Spreadsheet => {
                let text = std::str::from_utf8(bytes).map_err(|_| {
                    LabError::UnsupportedInput("binary spreadsheets need an external parser".into())
                })?;
                // Match the row rendering used for parsed sheets
                let rows: Vec<String> = text
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(|l| l.split(',').map(str::trim).collect::<Vec<_>>().join(" | "))
                    .collect();
                Ok(rows.join("\n"))
            }
            other => Err(LabError::UnsupportedInput(format!(
                "no parser available for {} documents",
                other.as_str()
            ))),
        }
    }
}

/// A raw file handed to `ingest_batch`
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Why an upload was skipped
#[derive(Debug, Clone, Serialize)]
pub struct SkippedUpload {
    pub name: String,
    pub reason: String,
}

/// Result of a batch upload
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub added: Vec<KnowledgeDocument>,
    pub skipped: Vec<SkippedUpload>,
}

/// Owner of the document set
pub struct KnowledgeCorpus {
    store: Store,
    writer: FallbackWriter,
    documents: Vec<KnowledgeDocument>,
}

impl KnowledgeCorpus {
    pub fn load(store: Store, writer: FallbackWriter) -> Self {
        let documents = store.get(keys::KNOWLEDGE_BASE, Vec::new());
        Self {
            store,
            writer,
            documents,
        }
    }

    /// Rejects oversized or unrecognized documents without touching the corpus
    pub fn add(&mut self, document: KnowledgeDocument) -> LabResult<WriteOutcome> {
        let doc_type = validate_upload(&document.name, document.size_bytes)?;
        if doc_type != document.doc_type {
            return Err(LabError::UnsupportedInput(format!(
                "'{}' does not match declared type {}",
                document.name,
                document.doc_type.as_str()
            )));
        }

        tracing::info!(
            document_id = %document.id,
            name = %document.name,
            size = document.size_bytes,
            "Knowledge document added"
        );
        self.documents.push(document);
        Ok(self.persist())
    }

    /// Validate, parse and add each upload. Failures skip that file only.
    pub fn ingest_batch(&mut self, uploads: Vec<Upload>, parser: &dyn DocumentParser) -> BatchReport {
        let mut report = BatchReport::default();

        for upload in uploads {
            let size = upload.bytes.len() as u64;
            let result = validate_upload(&upload.name, size)
                .and_then(|doc_type| parser.parse(doc_type, &upload.bytes))
                .and_then(|text| KnowledgeDocument::from_upload(&upload.name, size, text));

            match result {
                Ok(document) => {
                    self.documents.push(document.clone());
                    report.added.push(document);
                }
                Err(e) => {
                    tracing::warn!(name = %upload.name, error = %e, "Skipping upload");
                    report.skipped.push(SkippedUpload {
                        name: upload.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !report.added.is_empty() {
            self.persist();
        }
        report
    }

    pub fn remove(&mut self, document_id: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != document_id);
        let removed = self.documents.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        if let Err(e) = self.store.remove(keys::KNOWLEDGE_BASE) {
            tracing::warn!(error = %e, "Failed to clear knowledge base");
        }
    }

    /// Banner-wrapped concatenation, empty when there are no documents
    pub fn combined_context(&self) -> String {
        if self.documents.is_empty() {
            return String::new();
        }

        let mut combined = String::from("\n\n=== KNOWLEDGE BASE ===\n");
        combined.push_str("The following information is available from uploaded files:\n\n");
        for doc in &self.documents {
            combined.push_str(&format!("--- {} ({}) ---\n", doc.name, doc.doc_type.as_str()));
            combined.push_str(&doc.content);
            combined.push_str("\n\n");
        }
        combined.push_str("=== END KNOWLEDGE BASE ===\n\n");
        combined
    }

    pub fn documents(&self) -> &[KnowledgeDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn total_size(&self) -> u64 {
        self.documents.iter().map(|d| d.size_bytes).sum()
    }

    fn persist(&self) -> WriteOutcome {
        self.writer.write(&self.store, keys::KNOWLEDGE_BASE, &self.documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::MemoryBackend;
    use std::sync::Arc;

    fn corpus() -> KnowledgeCorpus {
        KnowledgeCorpus::load(Store::in_memory(), FallbackWriter::new(1000))
    }

    fn doc(name: &str, content: &str) -> KnowledgeDocument {
        KnowledgeDocument::from_upload(name, content.len() as u64, content.to_string()).unwrap()
    }

    #[test]
    fn test_type_from_filename() {
        assert_eq!(DocumentType::from_filename("sales.XLSX"), Some(DocumentType::Spreadsheet));
        assert_eq!(DocumentType::from_filename("data.csv"), Some(DocumentType::Spreadsheet));
        assert_eq!(DocumentType::from_filename("memo.docx"), Some(DocumentType::WordProcessor));
        assert_eq!(DocumentType::from_filename("a.b.pdf"), Some(DocumentType::Pdf));
        assert_eq!(DocumentType::from_filename("notes.txt"), Some(DocumentType::PlainText));
        assert_eq!(DocumentType::from_filename("image.png"), None);
        assert_eq!(DocumentType::from_filename("README"), None);
    }

    #[test]
    fn test_oversized_document_rejected() {
        let mut corpus = corpus();
        let mut document = doc("big.txt", "x");
        document.size_bytes = 11_000_000;

        let err = corpus.add(document).unwrap_err();
        assert!(matches!(err, LabError::UnsupportedInput(_)));
        assert!(corpus.is_empty());
        assert_eq!(corpus.total_size(), 0);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(KnowledgeDocument::from_upload("photo.png", 10, "x".into()).is_err());

        let mut corpus = corpus();
        let mut document = doc("notes.txt", "x");
        document.name = "notes.exe".into();
        assert!(corpus.add(document).is_err());
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_preview_is_first_200_chars() {
        let document = doc("long.txt", &"é".repeat(500));
        assert_eq!(document.preview.chars().count(), PREVIEW_CHARS);
        assert_eq!(doc("short.txt", "hi").preview, "hi");
    }

    #[test]
    fn test_combined_context_empty() {
        assert_eq!(corpus().combined_context(), "");
    }

    #[test]
    fn test_combined_context_banner() {
        let mut corpus = corpus();
        corpus.add(doc("faq.txt", "Q: hours? A: 9-5")).unwrap();
        corpus.add(doc("prices.csv", "item | price")).unwrap();

        let context = corpus.combined_context();
        assert!(context.starts_with("\n\n=== KNOWLEDGE BASE ===\n"));
        assert!(context.contains("--- faq.txt (plain-text) ---\nQ: hours? A: 9-5\n\n"));
        assert!(context.contains("--- prices.csv (spreadsheet) ---\n"));
        assert!(context.ends_with("=== END KNOWLEDGE BASE ===\n\n"));
        assert!(context.find("faq.txt").unwrap() < context.find("prices.csv").unwrap());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut corpus = corpus();
        let a = doc("a.txt", "aaa");
        let a_id = a.id.clone();
        corpus.add(a).unwrap();
        corpus.add(doc("b.txt", "bb")).unwrap();

        assert_eq!(corpus.total_size(), 5);
        assert!(corpus.remove(&a_id));
        assert!(!corpus.remove(&a_id));
        assert_eq!(corpus.len(), 1);

        corpus.clear();
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_batch_skips_invalid_and_continues() {
        let mut corpus = corpus();
        let uploads = vec![
            Upload { name: "one.txt".into(), bytes: b"first".to_vec() },
            Upload { name: "huge.txt".into(), bytes: vec![b'x'; (FILE_SIZE_LIMIT + 1) as usize] },
            Upload { name: "two.csv".into(), bytes: b"a, b\n1, 2\n".to_vec() },
            Upload { name: "scan.pdf".into(), bytes: b"%PDF".to_vec() },
            Upload { name: "three.txt".into(), bytes: b"third".to_vec() },
        ];

        let report = corpus.ingest_batch(uploads, &PlainTextParser);

        assert_eq!(report.added.len(), 3);
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skipped, vec!["huge.txt", "scan.pdf"]);
        assert_eq!(corpus.documents()[1].content, "a | b\n1 | 2");
    }

    #[test]
    fn test_degraded_write_truncates_content() {
        let store = Store::new(Arc::new(MemoryBackend::new().with_quota(2_000)));
        let mut corpus = KnowledgeCorpus::load(store.clone(), FallbackWriter::new(10));

        let outcome = corpus.add(doc("big.txt", &"y".repeat(5_000))).unwrap();
        assert_eq!(outcome, WriteOutcome::Degraded);

        // In-memory state keeps the full text
        assert_eq!(corpus.documents()[0].content.len(), 5_000);

        let reloaded = KnowledgeCorpus::load(store, FallbackWriter::new(10));
        assert_eq!(reloaded.documents()[0].content, "y".repeat(10));
    }

    #[test]
    fn test_reload_preserves_documents() {
        let store = Store::in_memory();
        let mut corpus = KnowledgeCorpus::load(store.clone(), FallbackWriter::new(1000));
        corpus.add(doc("a.txt", "alpha")).unwrap();
        corpus.add(doc("b.txt", "beta")).unwrap();

        let reloaded = KnowledgeCorpus::load(store, FallbackWriter::new(1000));
        assert_eq!(reloaded.documents(), corpus.documents());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(2 * 1024 * 1024), "2.0 MB");
    }
}
