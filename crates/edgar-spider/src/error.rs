use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between the SEC and the `insider_trades` table.
#[derive(Debug, Error)]
pub enum Error {
    /// Network, DNS or timeout failure while talking to the SEC.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The SEC answered, but not with a 2xx.
    #[error("SEC API responded with status {status}")]
    UpstreamStatus { status: u16 },

    /// The SEC answered 2xx with nothing in the body.
    #[error("SEC API returned an empty body")]
    EmptyBody,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("store failure: {0}")]
    Store(#[from] sqlx::Error),

    /// The SEC rejects anonymous clients.
    #[error("a non-empty user agent is required")]
    UserAgent,
}

/// Malformed or incomplete upstream body.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid ticker JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid filings XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("filing #{index} is missing `{field}`")]
    MissingField { field: &'static str, index: usize },

    #[error("filings XML ended inside an open element")]
    UnexpectedEof,
}
