use jobscout::storage::JobStore;
use jobscout::{Aggregator, Config, DiskStorage, ScraperResult};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

const DEFAULT_CONFIG_PATH: &str = "config.json";

fn load_config(path: &Path) -> ScraperResult<Config> {
    if path.exists() {
        info!("Loading configuration from {}", path.display());
        Config::load(path)
    } else {
        warn!("{} not found, using default configuration", path.display());
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ScraperResult<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module("selectors", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Error)
        .filter_module("chromiumoxide", log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Arc::new(load_config(Path::new(&config_path))?);

    let aggregator = Aggregator::from_config(Arc::clone(&config));
    let jobs = aggregator.scrape_all_sites().await?;

    let storage = DiskStorage::new(&config.scraping.output_dir)?;
    let path = storage.store_jobs(&jobs).await?;
    println!("{} jobs written to {}", jobs.len(), path.display());

    aggregator.stats().print_summary();
    Ok(())
}
