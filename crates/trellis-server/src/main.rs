use std::sync::Arc;

mod config;
mod routes;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let cfg = config::load_config()?;
    let state = Arc::new(state::AppState::init(&cfg).await?);

    let kinds: Vec<_> = state.registry.kinds().collect();
    tracing::info!("serving resource types: {}", kinds.join(", "));

    let addr = state.cfg.server.bind.clone();
    let app = routes::router(Arc::clone(&state));
    tracing::info!("trellis-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
