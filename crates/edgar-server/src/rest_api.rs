use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::{get, post, web, HttpRequest, HttpResponse, ResponseError};
use edgar_spider::sec::insiders::{self, FilingQuery};
use edgar_spider::sec::tickers;
use edgar_spider::{Error as SpiderError, InsiderTransaction, SecClient, Store, TickerMap};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// Register every route on an actix `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error))
        .service(ticker_to_cik)
        .service(insider_history)
        .service(clear_insiders)
        .service(fetch_insiders);
}

/// Unparseable query strings get the same JSON envelope as every other failure.
fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("rejected query string for {}, error({err})", req.path());
    let response = HttpResponse::BadRequest().json(ErrorBody {
        error: "Invalid query parameters".to_string(),
        details: Some("`type` must be text and `count` a whole number".to_string()),
    });
    InternalError::from_response(err, response).into()
}

/// Browsers on any origin may call the API.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Error envelope returned with every 500, and with 400 for a bad query string.
///
/// ```json
/// {
///     "error": "Failed to fetch ticker data",
///     "details": "SEC API responded with status 503"
/// }
/// ```
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct Message {
    pub message: String,
}

/// What went wrong, per route. Clients only ever see the fixed messages below; the wrapped
/// error is logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to fetch ticker data")]
    Tickers(#[source] SpiderError),

    #[error("Unable to fetch data")]
    FetchInsiders(#[source] SpiderError),

    #[error("Unable to process filing data")]
    ParseInsiders(#[source] SpiderError),

    #[error("Unable to store transactions")]
    StoreInsiders(#[source] SpiderError),

    #[error("Unable to read transactions")]
    History(#[source] SpiderError),

    #[error("Unable to clear transactions")]
    Clear(#[source] SpiderError),
}

impl ApiError {
    /// Split a fetch-and-store failure by the stage that failed.
    fn from_insiders(err: SpiderError) -> Self {
        match err {
            SpiderError::Parse(_) => ApiError::ParseInsiders(err),
            SpiderError::Store(_) => ApiError::StoreInsiders(err),
            _ => ApiError::FetchInsiders(err),
        }
    }

    /// Client-safe detail: upstream status codes and fixed phrases, never internal error text.
    fn details(&self) -> Option<String> {
        match self {
            ApiError::Tickers(err) | ApiError::FetchInsiders(err) => match err {
                SpiderError::UpstreamStatus { status } => {
                    Some(format!("SEC API responded with status {status}"))
                }
                SpiderError::Transport(_) => Some("SEC API could not be reached".to_string()),
                SpiderError::EmptyBody => Some("SEC API returned no data".to_string()),
                SpiderError::Parse(_) => Some("SEC API returned unreadable data".to_string()),
                _ => None,
            },
            _ => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            details: self.details(),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Ticker to CIK
///
/// ```json
/// {
///     "AAPL": "0000320193",
///     "MSFT": "0000789019",
///     ...
/// }
/// ```
#[utoipa::path(
    get,
    path = "/ticker-to-cik",
    responses(
        (
            status = 200,
            description = "Every SEC-listed ticker (uppercased) mapped to its 10-digit CIK",
            body = TickerMap,
            content_type = "application/json",
            example = json!({"AAPL": "0000320193", "MSFT": "0000789019"})
        ),
        (status = 500, description = "The SEC ticker list could not be fetched or read", body = ErrorBody)
    )
)]
#[get("/ticker-to-cik")]
pub async fn ticker_to_cik(client: web::Data<SecClient>) -> Result<HttpResponse, ApiError> {
    let map = tickers::fetch(&client).await.map_err(|err| {
        error!("failed to fetch ticker data, error({err})");
        ApiError::Tickers(err)
    })?;
    debug!("serving {} ticker mappings", map.len());

    Ok(HttpResponse::Ok().json(map))
}

/// Overrides for the `browse-edgar` query.
#[derive(Debug, Default, Deserialize)]
pub struct FilingParams {
    #[serde(rename = "type")]
    pub form_type: Option<String>,
    pub count: Option<u32>,
}

impl From<FilingParams> for FilingQuery {
    fn from(params: FilingParams) -> Self {
        let defaults = FilingQuery::default();
        FilingQuery {
            form_type: params.form_type.unwrap_or(defaults.form_type),
            count: params.count.unwrap_or(defaults.count),
        }
    }
}

/// Fetch & store insider filings
///
/// Every call appends what it fetched, so filings seen before are stored again.
#[utoipa::path(
    get,
    path = "/insiders/{cik}",
    params(
        ("cik" = String, Path, description = "10-digit company CIK"),
        ("type" = Option<String>, Query, description = "Form type, defaults to 4"),
        ("count" = Option<u32>, Query, description = "Number of filings, defaults to 10")
    ),
    responses(
        (status = 200, description = "Filings just fetched from the SEC", body = [InsiderTransaction]),
        (status = 400, description = "`type` or `count` could not be parsed", body = ErrorBody),
        (status = 500, description = "The filings could not be fetched, read or stored", body = ErrorBody)
    )
)]
#[get("/insiders/{cik}")]
pub async fn fetch_insiders(
    cik: web::Path<String>,
    params: web::Query<FilingParams>,
    client: web::Data<SecClient>,
    store: web::Data<Store>,
) -> Result<HttpResponse, ApiError> {
    let cik = cik.into_inner();
    let query = FilingQuery::from(params.into_inner());

    let transactions = insiders::fetch_and_store(&client, &store, &cik, &query)
        .await
        .map_err(|err| {
            error!("failed to fetch insider filings for CIK {cik}, error({err})");
            ApiError::from_insiders(err)
        })?;

    Ok(HttpResponse::Ok().json(transactions))
}

/// Stored insider filings
///
/// Newest `transaction_date` first.
#[utoipa::path(
    get,
    path = "/insiders/history/{cik}",
    params(("cik" = String, Path, description = "10-digit company CIK")),
    responses(
        (status = 200, description = "Every stored filing for the CIK, possibly none", body = [InsiderTransaction]),
        (status = 500, description = "The store could not be read", body = ErrorBody)
    )
)]
#[get("/insiders/history/{cik}")]
pub async fn insider_history(
    cik: web::Path<String>,
    store: web::Data<Store>,
) -> Result<HttpResponse, ApiError> {
    let transactions = store.select_by_entity(&cik).await.map_err(|err| {
        error!("failed to read insider trades for CIK {cik}, error({err})");
        ApiError::History(err)
    })?;

    Ok(HttpResponse::Ok().json(transactions))
}

/// Clear stored filings
#[utoipa::path(
    post,
    path = "/insiders/clear",
    responses(
        (
            status = 200,
            description = "Every stored filing was deleted",
            body = Message,
            example = json!({"message": "All transactions cleared"})
        ),
        (status = 500, description = "The store could not be cleared", body = ErrorBody)
    )
)]
#[post("/insiders/clear")]
pub async fn clear_insiders(store: web::Data<Store>) -> Result<HttpResponse, ApiError> {
    let deleted = store.clear_all().await.map_err(|err| {
        error!("failed to clear insider trades, error({err})");
        ApiError::Clear(err)
    })?;
    debug!("cleared {deleted} insider trades");

    Ok(HttpResponse::Ok().json(Message {
        message: "All transactions cleared".to_string(),
    }))
}
