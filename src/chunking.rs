//! Document loading and chunking.
//!
//! [`extract_text`] reads a document from a filesystem path (PDF or plain
//! text) and [`SentenceChunker`] splits the text into ordered, non-overlapping
//! units of a few sentences each. Units are kept short enough for precise
//! similarity search but long enough to carry context.

use std::path::Path;

use tracing::debug;

use crate::error::{QaError, Result};

/// A strategy for splitting document text into retrievable units.
///
/// Implementations return units in document order, with no overlap and no
/// duplicates. An empty document produces an empty `Vec`, not an error.
pub trait Chunker: Send + Sync {
    /// Split text into an ordered sequence of unit texts.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Read a document from `path` and return its text content.
///
/// Files with a `.pdf` extension are parsed with `pdf-extract` on a blocking
/// worker thread; everything else is read as UTF-8 plain text.
///
/// # Errors
///
/// Returns [`QaError::DocumentParse`] if the file is missing, unreadable,
/// corrupt, or not valid UTF-8 text.
pub async fn extract_text(path: &Path) -> Result<String> {
    let parse_err = |message: String| QaError::DocumentParse {
        path: path.display().to_string(),
        message,
    };

    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
            .await
            .map_err(|e| parse_err(format!("PDF extraction task failed: {e}")))?
            .map_err(|e| parse_err(format!("PDF extraction failed: {e}")))?;
        debug!(path = %path.display(), chars = text.len(), "extracted PDF text");
        Ok(text)
    } else {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| parse_err(format!("failed to read file: {e}")))?;
        debug!(path = %path.display(), chars = text.len(), "read plain text file");
        Ok(text)
    }
}

/// Splits text into units of at most `max_sentences` sentences.
///
/// Paragraph boundaries (`\n\n`) always start a new unit. Within a
/// paragraph, sentences are grouped until either the sentence budget or
/// `max_chars` is reached. Consecutive units never overlap, so re-chunking
/// the same text always reproduces the same unit sequence.
///
/// # Example
///
/// ```rust,ignore
/// use docqa::chunking::{Chunker, SentenceChunker};
///
/// let chunker = SentenceChunker::new(3, 512);
/// let units = chunker.chunk("First. Second. Third. Fourth.");
/// assert_eq!(units.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    max_sentences: usize,
    max_chars: usize,
}

impl SentenceChunker {
    /// Create a new `SentenceChunker`.
    ///
    /// # Arguments
    ///
    /// * `max_sentences` — maximum number of sentences per unit (min 1)
    /// * `max_chars` — soft cap on characters per unit; a unit is flushed
    ///   before it would exceed this
    pub fn new(max_sentences: usize, max_chars: usize) -> Self {
        Self { max_sentences: max_sentences.max(1), max_chars: max_chars.max(1) }
    }
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self::new(3, 512)
    }
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Split a paragraph into sentences on `. `, `! `, and `? ` boundaries.
fn split_sentences(paragraph: &str) -> Vec<String> {
    let mut segments = vec![paragraph.to_string()];
    for separator in [". ", "! ", "? "] {
        segments = segments
            .iter()
            .flat_map(|s| split_keeping_separator(s, separator))
            .map(str::to_string)
            .collect();
    }
    segments
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Chunker for SentenceChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        let mut units = Vec::new();

        for paragraph in text.split("\n\n") {
            let sentences = split_sentences(paragraph);

            let mut current = String::new();
            let mut count = 0;
            for sentence in sentences {
                let would_overflow = !current.is_empty()
                    && (count >= self.max_sentences
                        || current.len() + 1 + sentence.len() > self.max_chars);
                if would_overflow {
                    units.push(std::mem::take(&mut current));
                    count = 0;
                }
                if current.is_empty() {
                    current = sentence;
                } else {
                    current.push(' ');
                    current.push_str(&sentence);
                }
                count += 1;
            }
            if !current.is_empty() {
                units.push(current);
            }
        }

        units
    }
}
