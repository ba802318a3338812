use anyhow::{anyhow, Result};
use axum::body::Bytes;

const PDF_MIME: &str = "application/pdf";

/// `extract_text` on the blocking pool. PDF parsing is CPU-bound and must not run on
/// an executor thread.
pub async fn extract_text_blocking(
    file_name: String,
    mime_type: String,
    data: Bytes,
) -> Result<String> {
    tokio::task::spawn_blocking(move || extract_text(&file_name, &mime_type, &data))
        .await
        .map_err(|e| anyhow!("spawn_blocking failed in text extraction: {e}"))?
}

/// Extracts the text of an uploaded knowledge file.
/// PDFs go through `pdf-extract`; everything else is read as (lossy) UTF-8.
pub fn extract_text(file_name: &str, mime_type: &str, data: &[u8]) -> Result<String> {
    if is_pdf(file_name, mime_type) {
        pdf_extract::extract_text_from_mem(data)
            .map_err(|e| anyhow!("PDF text extraction failed for '{file_name}': {e:?}"))
    } else {
        Ok(String::from_utf8_lossy(data).into_owned())
    }
}

pub fn is_pdf(file_name: &str, mime_type: &str) -> bool {
    mime_type.eq_ignore_ascii_case(PDF_MIME) || file_name.to_ascii_lowercase().ends_with(".pdf")
}
