pub mod error;
pub mod store;

/// SEC EDGAR endpoints: the company ticker list and the per-company filing browser.
///
/// See the [SEC] API notes.
///
/// [SEC]: https://www.sec.gov/search-filings/edgar-application-programming-interfaces
pub mod sec;

pub use error::{Error, ParseError, Result};
pub use sec::client::{Endpoints, Fetched, SecClient};
pub use sec::filings::InsiderTransaction;
pub use sec::tickers::TickerMap;
pub use store::Store;
pub use sqlx::Error as StoreError;

/// Shortcut for required HTTP elements.
pub(crate) mod http {
    pub(crate) use reqwest::Client as HttpClient;
    pub(crate) use reqwest::StatusCode;
}
