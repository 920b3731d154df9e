use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use edgar_server::{cli::Cli, rest_api, ApiDoc};
use edgar_spider::{Endpoints, SecClient, Store};
use tracing::{info, trace, warn};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // actix's `log` records are bridged in by the subscriber
    tracing_subscriber::fmt().with_max_level(cli.level()).init();
    trace!("command line input recorded: {cli:?}");

    // open the store once; every worker shares it
    let store = Store::open(&cli.database_url).await?;
    store.init_schema().await?;
    let client = SecClient::new(&cli.user_agent, cli.timeout(), Endpoints::default())?;

    let store = web::Data::new(store);
    let client = web::Data::new(client);

    let host = cli.bind_host().to_string();
    if cli.dev {
        warn!("development mode, listening on every interface");
    }
    info!("listening on {host}:{}", cli.port);

    // run server
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(rest_api::cors())
            .app_data(store.clone())
            .app_data(client.clone())
            .configure(rest_api::configure)
            .service(Redoc::with_url("/redoc", ApiDoc::openapi()))
    })
    .bind((host.as_str(), cli.port))?
    .run()
    .await?;

    Ok(())
}
