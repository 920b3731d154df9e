use edgar_spider::sec::insiders::{self, FilingQuery};
use edgar_spider::sec::tickers;
use edgar_spider::{Endpoints, Error, SecClient, Store};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "edgar-spider tests test@example.com";

const FILINGS_XML: &str = r#"<filings>
    <filing>
        <dateFiled>2024-01-05</dateFiled>
        <type>4</type>
        <filingHref>/Archives/edgar/data/320193/a-index.htm</filingHref>
    </filing>
    <filing>
        <dateFiled>2023-12-01</dateFiled>
        <type>4</type>
        <filingHref>/Archives/edgar/data/320193/b-index.htm</filingHref>
    </filing>
</filings>"#;

fn client(server: &MockServer) -> SecClient {
    SecClient::new(
        USER_AGENT,
        Duration::from_secs(5),
        Endpoints {
            tickers: format!("{}/files/company_tickers.json", server.uri()),
            browse: format!("{}/cgi-bin/browse-edgar", server.uri()),
            ..Endpoints::default()
        },
    )
    .unwrap()
}

async fn store() -> Store {
    let store = Store::open_in_memory().await.unwrap();
    store.init_schema().await.unwrap();
    store
}

#[test]
fn blank_user_agent_is_rejected() {
    assert!(matches!(
        SecClient::new("  ", Duration::from_secs(1), Endpoints::default()),
        Err(Error::UserAgent)
    ));
}

#[tokio::test]
async fn fetch_surfaces_non_2xx_as_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/company_tickers.json"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let fetched = client.fetch(&client.endpoints().tickers, &[]).await.unwrap();
    assert_eq!(fetched.status.as_u16(), 403);
    assert_eq!(fetched.body, b"denied");
}

#[tokio::test]
async fn fetch_reports_transport_failures() {
    let client = SecClient::new(
        USER_AGENT,
        Duration::from_secs(1),
        Endpoints {
            tickers: "http://127.0.0.1:1/files/company_tickers.json".to_string(),
            ..Endpoints::default()
        },
    )
    .unwrap();

    assert!(matches!(
        tickers::fetch(&client).await,
        Err(Error::Transport(_))
    ));
}

#[tokio::test]
async fn tickers_are_fetched_with_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/company_tickers.json"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"0": {"cik_str": 320193, "ticker": "aapl", "title": "Apple Inc."}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let map = tickers::fetch(&client(&server)).await.unwrap();
    assert_eq!(map.get("AAPL"), Some("0000320193"));
}

#[tokio::test]
async fn tickers_non_2xx_is_an_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    match tickers::fetch(&client(&server)).await {
        Err(Error::UpstreamStatus { status }) => assert_eq!(status, 503),
        other => panic!("expected upstream status, got {other:?}"),
    }
}

#[tokio::test]
async fn filings_query_and_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/browse-edgar"))
        .and(header("user-agent", USER_AGENT))
        .and(query_param("action", "getcompany"))
        .and(query_param("CIK", "0000320193"))
        .and(query_param("type", "4"))
        .and(query_param("output", "xml"))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FILINGS_XML))
        .expect(1)
        .mount(&server)
        .await;

    let store = store().await;
    let parsed = insiders::fetch_and_store(
        &client(&server),
        &store,
        "0000320193",
        &FilingQuery::default(),
    )
    .await
    .unwrap();

    assert_eq!(parsed.len(), 2);
    assert_eq!(
        parsed[0].filing_url,
        "https://www.sec.gov/Archives/edgar/data/320193/a-index.htm"
    );
    assert_eq!(store.select_by_entity("0000320193").await.unwrap().len(), 2);
}

#[tokio::test]
async fn repeated_fetches_store_duplicates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/browse-edgar"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FILINGS_XML))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    let store = store().await;
    let query = FilingQuery::default();
    insiders::fetch_and_store(&client, &store, "0000320193", &query).await.unwrap();
    insiders::fetch_and_store(&client, &store, "0000320193", &query).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 4);
}

#[tokio::test]
async fn custom_query_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("type", "4/A"))
        .and(query_param("count", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<filings/>"))
        .expect(1)
        .mount(&server)
        .await;

    let query = FilingQuery {
        form_type: "4/A".to_string(),
        count: 40,
    };
    let parsed = insiders::fetch(&client(&server), "0000320193", &query).await.unwrap();
    assert!(parsed.is_empty());
}

#[tokio::test]
async fn empty_filings_body_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let store = store().await;
    let result = insiders::fetch_and_store(
        &client(&server),
        &store,
        "0000320193",
        &FilingQuery::default(),
    )
    .await;

    assert!(matches!(result, Err(Error::EmptyBody)));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_filings_store_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<filings><filing></filings>"))
        .mount(&server)
        .await;

    let store = store().await;
    let result = insiders::fetch_and_store(
        &client(&server),
        &store,
        "0000320193",
        &FilingQuery::default(),
    )
    .await;

    assert!(matches!(result, Err(Error::Parse(_))));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn latin1_filings_are_accepted() {
    let body: &[u8] = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\" ?>\
        <companyFilings><companyInfo><CIK>0000071140</CIK><name>Nestl\xE9 SA</name></companyInfo>\
        <results><filing><dateFiled>2024-01-05</dateFiled><type>4</type>\
        <filingHREF>/Archives/edgar/data/71140/a-index.htm</filingHREF></filing></results>\
        </companyFilings>";

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/browse-edgar"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let parsed = insiders::fetch(&client(&server), "0000071140", &FilingQuery::default())
        .await
        .unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].transaction_date, "2024-01-05");
    assert_eq!(
        parsed[0].filing_url,
        "https://www.sec.gov/Archives/edgar/data/71140/a-index.htm"
    );
}
