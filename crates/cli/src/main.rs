use anyhow::Context;
use clap::Parser;
use perp_agent_bot::ControlLoop;
use perp_agent_bybit::BybitClient;
use perp_agent_core::{AppConfig, ConfigLoader};
use perp_agent_oracle::{ChatOracle, HttpNewsFeed};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "perp-agent")]
#[command(about = "Unattended oracle-driven perpetual futures trader", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml", env = "PERP_AGENT_CONFIG")]
    config: String,

    /// Optional log file path (logs to file instead of stderr)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    tracing::info!("Starting perp-agent with config: {}", cli.config);
    let config = ConfigLoader::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config))?;

    run(config).await
}

fn init_logging(log_file: Option<&str>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {path}"))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let exchange =
        BybitClient::from_config(&config.bybit).context("Failed to create Bybit client")?;
    tracing::info!(
        base_url = exchange.base_url(),
        demo = config.bybit.use_demo,
        "Exchange client ready"
    );

    let oracle =
        ChatOracle::new(config.oracle.clone()).context("Failed to create oracle client")?;
    tracing::info!(model = oracle.model(), "Decision oracle ready");

    let news = HttpNewsFeed::new(&config.news).context("Failed to create news feed")?;

    let mut control = ControlLoop::new(
        &config.trading,
        Arc::new(exchange),
        Arc::new(oracle),
        Arc::new(news),
    );
    control.run().await;

    Ok(())
}
