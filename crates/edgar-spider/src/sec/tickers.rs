use crate::{Error, Result, SecClient};
use serde::de::{self, IgnoredAny, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error};

// scrape
// ----------------------------------------------------------------------------

/// Fetch `company_tickers.json` and reduce it to a ticker -> CIK map.
pub async fn fetch(client: &SecClient) -> Result<TickerMap> {
    debug!("fetching SEC Company Tickers");
    let fetched = client.fetch(&client.endpoints().tickers, &[]).await?;
    if !fetched.is_success() {
        error!("SEC Company Tickers responded {}", fetched.status);
        return Err(Error::UpstreamStatus {
            status: fetched.status.as_u16(),
        });
    }

    let tickers = parse_ticker_map(&fetched.body).map_err(|err| {
        error!("failed to parse JSON, error({err})");
        err
    })?;
    debug!("{} tickers mapped", tickers.len());

    Ok(tickers)
}

/// Parse the raw SEC ticker list.
///
/// Tickers are uppercased, CIKs are zero-padded to 10 digits, and a repeated ticker keeps the
/// last record seen.
pub fn parse_ticker_map(json: &[u8]) -> std::result::Result<TickerMap, crate::ParseError> {
    Ok(serde_json::from_slice(json)?)
}

// de
// ----------------------------------------------------------------------------

/// Ticker -> 10-digit CIK, serialized as a flat JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(transparent)]
#[schema(example = json!({"AAPL": "0000320193"}))]
pub struct TickerMap(pub BTreeMap<String, String>);

impl TickerMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, ticker: &str) -> Option<&str> {
        self.0.get(ticker).map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct Ticker {
    #[serde(rename = "cik_str", deserialize_with = "de_cik")]
    cik: String,
    ticker: String,
}

struct TickerVisitor;

impl<'de> Visitor<'de> for TickerVisitor {
    type Value = TickerMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("Map of tickers")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        // each entry is in the form of:
        // `"0": { "cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc." },
        //  "1": { ... },
        //  ...`
        let mut tickers = BTreeMap::new();
        while let Some((_, record)) = map.next_entry::<IgnoredAny, Ticker>()? {
            tickers.insert(record.ticker.to_uppercase(), record.cik);
        }
        Ok(TickerMap(tickers))
    }
}

impl<'de> Deserialize<'de> for TickerMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // the rows are keyed by position, but only the records matter
        deserializer.deserialize_map(TickerVisitor)
    }
}

/// `cik_str` arrives as a bare number (the SEC calls it a "str" anyway); pad it to 10 digits.
fn de_cik<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct CikVisitor;

    impl Visitor<'_> for CikVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a numeric CIK")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(format!("{v:0>10}"))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            match u64::try_from(v) {
                Ok(v) => self.visit_u64(v),
                Err(_) => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            if v.is_empty() || !v.bytes().all(|b| b.is_ascii_digit()) {
                return Err(E::invalid_value(de::Unexpected::Str(v), &self));
            }
            Ok(format!("{v:0>10}"))
        }
    }

    deserializer.deserialize_any(CikVisitor)
}
