//! PDF text extraction. Parsing is CPU-bound and runs on the blocking pool.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Error extracting text from PDF: {0}")]
    Pdf(String),

    #[error("PDF parser aborted: {0}")]
    Aborted(String),
}

/// Collapses every run of whitespace into a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_blocking(bytes: &[u8]) -> Result<String, ExtractError> {
    let raw = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(collapse_whitespace(&raw))
}

/// Extracts and cleans the text of every page.
pub async fn extract_text(bytes: bytes::Bytes) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_blocking(&bytes))
        .await
        .map_err(|e| ExtractError::Aborted(e.to_string()))?
}
