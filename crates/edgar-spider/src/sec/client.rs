use crate::{http::*, Error, Result};
use std::time::Duration;
use tracing::{debug, error, trace};

/// Contact-style identification sent to the SEC when no other agent is configured.
pub const DEFAULT_USER_AGENT: &str = "edgar-spider admin@edgar-spider.dev";

/// Upper bound on a single upstream call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream locations; everything points at `www.sec.gov` unless overridden.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// `company_tickers.json`, the full ticker -> CIK list.
    pub tickers: String,

    /// The `browse-edgar` CGI endpoint, queried with `output=xml`.
    pub browse: String,

    /// Base that relative `filingHref` paths are joined onto.
    pub archives: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            tickers: "https://www.sec.gov/files/company_tickers.json".to_string(),
            browse: "https://www.sec.gov/cgi-bin/browse-edgar".to_string(),
            archives: "https://www.sec.gov".to_string(),
        }
    }
}

/// Raw upstream answer. A non-2xx status is data here, not an error.
#[derive(Debug)]
pub struct Fetched {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl Fetched {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Thin wrapper over [`reqwest::Client`] that always identifies itself to the SEC.
///
/// No retries and no caching; the only bound is the request timeout.
#[derive(Clone, Debug)]
pub struct SecClient {
    http: HttpClient,
    endpoints: Endpoints,
}

impl SecClient {
    pub fn new(user_agent: &str, timeout: Duration, endpoints: Endpoints) -> Result<Self> {
        if user_agent.trim().is_empty() {
            error!("refusing to build SEC client without a user agent");
            return Err(Error::UserAgent);
        }

        let http = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|err| {
                error!("failed to build reqwest client, error({err})");
                err
            })?;

        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// GET `url` with `query` appended.
    pub async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<Fetched> {
        trace!("GET {url} {query:?}");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| {
                error!("failed to fetch {url}, error({err})");
                err
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| {
                error!("failed to read body from {url}, error({err})");
                err
            })?
            .to_vec();
        debug!("{url} responded {status} with {} bytes", body.len());

        Ok(Fetched { status, body })
    }
}
