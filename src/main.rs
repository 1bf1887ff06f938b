use anyhow::Result;
use sheetsink::{config::Config, pipeline};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cfg = Config::load()?;
    if let Err(err) = pipeline::run(&cfg).await {
        error!("run failed: {err}");
        std::process::exit(1);
    }
    info!("data transferred from spreadsheet to warehouse");
    Ok(())
}
