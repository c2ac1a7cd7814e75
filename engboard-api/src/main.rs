use std::net::SocketAddr;

use engboard_api::{config, factory, router, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::from_filename("./engboard-api/.env.local").ok();
    dotenvy::dotenv().ok();

    let settings = config::read_config()?;
    telemetry::init(&settings.application.log_level)?;

    let factory = factory::build(&settings.store)?;
    let app = router::create(factory, settings.application.app_url.clone());

    let addr: SocketAddr = format!(
        "{}:{}",
        settings.application.host, settings.application.port
    )
    .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
