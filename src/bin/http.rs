#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use chrono::Local;
    use release_planner::{EngineConfig, Release, http_api, load_release_from_json};
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let addr: SocketAddr = std::env::var("RELEASE_PLANNER_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let config = match std::env::var("RELEASE_PLANNER_CONFIG") {
        Ok(path) => EngineConfig::load(&path)?,
        Err(_) => EngineConfig::default(),
    };

    let release = match std::env::var("RELEASE_PLANNER_RELEASE") {
        Ok(path) => load_release_from_json(&path)?,
        Err(_) => Release::new("release-1", "New Release", Local::now().date_naive()),
    };

    tracing::info!(release = %release.id, horizon_months = config.horizon_months, "starting");
    let state = http_api::AppState::with_config(release, config);
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
