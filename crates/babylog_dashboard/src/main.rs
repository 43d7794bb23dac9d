use babylog_client::Config;
use babylog_dashboard::domains::WindowSelector;
use babylog_dashboard::{Dashboard, init_logging, view};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let log_env = init_logging();
    tracing::info!("babylog_dashboard: log filter: {}", log_env);

    let range = std::env::var("BABYLOG_DEFAULT_RANGE").unwrap_or_else(|_| "last7".to_string());
    let start = std::env::var("BABYLOG_START").ok();
    let end = std::env::var("BABYLOG_END").ok();
    let selector = WindowSelector::from_parts(&range, start.as_deref(), end.as_deref())?;

    let cfg = Config::from_env()?;
    let dashboard = Dashboard::from_config(&cfg)?;
    tracing::info!(source = %dashboard.describe_source(), range = selector.label(), "loading dashboard");

    let dataset = match dashboard.load().await {
        Ok(ds) => ds,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    let out = serde_json::to_string_pretty(&view(&dataset, &selector))?;
    println!("{out}");
    Ok(())
}
