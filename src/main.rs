use tracing_subscriber::EnvFilter;

use remitradar::api::Server;
use remitradar::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("remitradar=info".parse()?))
        .init();

    tracing::info!("remitradar v{} starting...", remitradar::VERSION);

    // Load configuration
    let config = Config::load("config.toml");
    tracing::info!("Config: {:?}", config);

    Server::new(config).run().await?;
    Ok(())
}
