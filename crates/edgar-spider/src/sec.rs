pub mod client;
pub mod filings;
pub mod insiders;
pub mod tickers;
