pub mod cli;
pub mod rest_api;

use utoipa::OpenApi;

/// OpenAPI description of every route, served at `/redoc`.
#[derive(OpenApi)]
#[openapi(
    info(title = "edgar-server", description = "SEC ticker lookups and insider filings"),
    paths(
        rest_api::ticker_to_cik,
        rest_api::fetch_insiders,
        rest_api::insider_history,
        rest_api::clear_insiders
    )
)]
pub struct ApiDoc;
