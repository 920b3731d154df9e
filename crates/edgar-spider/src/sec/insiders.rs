use crate::sec::filings::{parse_insider_filings_bytes, InsiderTransaction};
use crate::{Error, Result, SecClient, Store};
use tracing::{debug, error, info};

/// `browse-edgar` query for a company's most recent filings of one form type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilingQuery {
    /// Form type, `4` for insider transactions.
    pub form_type: String,
    pub count: u32,
}

impl Default for FilingQuery {
    fn default() -> Self {
        Self {
            form_type: "4".to_string(),
            count: 10,
        }
    }
}

/// Fetch and parse the filing list for `cik`; nothing is stored.
pub async fn fetch(client: &SecClient, cik: &str, query: &FilingQuery) -> Result<Vec<InsiderTransaction>> {
    debug!("fetching form {} filings for CIK {cik}", query.form_type);
    let count = query.count.to_string();
    let fetched = client
        .fetch(
            &client.endpoints().browse,
            &[
                ("action", "getcompany"),
                ("CIK", cik),
                ("type", query.form_type.as_str()),
                ("output", "xml"),
                ("count", count.as_str()),
            ],
        )
        .await?;

    if !fetched.is_success() {
        error!("SEC filings for CIK {cik} responded {}", fetched.status);
        return Err(Error::UpstreamStatus {
            status: fetched.status.as_u16(),
        });
    }
    if fetched.body.iter().all(u8::is_ascii_whitespace) {
        error!("SEC filings for CIK {cik} came back empty");
        return Err(Error::EmptyBody);
    }

    let transactions =
        parse_insider_filings_bytes(&fetched.body, cik, &client.endpoints().archives).map_err(|err| {
            error!("failed to parse filings XML for CIK {cik}, error({err})");
            err
        })?;

    Ok(transactions)
}

/// Fetch, parse and append the filings for `cik`, returning what was parsed.
///
/// Filings already stored by an earlier call are stored again.
pub async fn fetch_and_store(
    client: &SecClient,
    store: &Store,
    cik: &str,
    query: &FilingQuery,
) -> Result<Vec<InsiderTransaction>> {
    let transactions = fetch(client, cik, query).await?;
    let inserted = store.insert_many(&transactions).await?;
    info!("{inserted} insider filings stored for CIK {cik}");

    Ok(transactions)
}
