use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use babylog_client::Config;
use babylog_dashboard::http::{AppState, create_router};
use babylog_dashboard::{Dashboard, init_logging};

fn parse_address(raw: Option<&str>) -> SocketAddr {
    raw.and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)))
}

#[cfg(test)]
#[allow(clippy::items_after_test_module)]
mod tests {
    use super::*;

    #[test]
    fn address_defaults_to_localhost() {
        assert_eq!(parse_address(None).to_string(), "127.0.0.1:3000");
        assert_eq!(parse_address(Some("not an addr")).port(), 3000);
    }

    #[test]
    fn address_is_parsed() {
        assert_eq!(parse_address(Some("0.0.0.0:8080")).port(), 8080);
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let log_env = init_logging();
    tracing::info!(%log_env, "babylog_dashboard:http: log filter");

    let handle = PrometheusBuilder::new().install_recorder()?;

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration; aborting startup");
            std::process::exit(1);
        }
    };
    let dashboard = Dashboard::from_config(&cfg)?;
    info!(source = %dashboard.describe_source(), "data source configured");

    let state = Arc::new(AppState {
        dashboard,
        metrics: Some(handle),
    });
    let app = create_router(state);

    let addr = parse_address(std::env::var("ADDRESS").ok().as_deref());
    info!(%addr, "starting HTTP server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    let server = axum::serve(listener, app.into_make_service());
    if let Err(e) = server
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to install ctrl+c handler: {e}");
            }
        })
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
