use reelsim::{
    api::{create_router, AppState},
    config::Config,
    data,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // Build or load the model before serving any query
    let build_config = config.clone();
    let model = tokio::task::spawn_blocking(move || data::load_or_build(&build_config)).await??;
    let tmdb_links = data::load_links(&config.links_csv)?;

    let state = AppState::new(model, tmdb_links, config.clone());
    let app = create_router(state);

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
