use thiserror::Error;

/// Failures inside the ingestion pipeline.
///
/// None of these escape the public pipeline operations: the fetcher and the
/// normalizer log them and degrade to an empty result for the affected feed.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from relay for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed feed document: {0}")]
    Malformed(String),

    #[error("JSON envelope error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("relay reported status \"{0}\"")]
    RelayStatus(String),
}
