use pitchcoach_relay::{RelayConfig, create_app};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pitchcoach_relay=info,tower_http=info")),
        )
        .init();

    let config = RelayConfig::from_env();
    if config.api_key.is_none() {
        // Not fatal: the token route reports the misconfiguration per request.
        warn!("OPENAI_API_KEY is not set; /api/token will fail until it is");
    }

    let bind_addr = config.bind_addr.clone();
    let app = create_app(config);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("credential relay listening on {bind_addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
