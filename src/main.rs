#![warn(clippy::all)]
use dev_commons::{config, run, setup_store};

#[tokio::main]
async fn main() -> Result<(), handle_errors::Error> {
    dotenv::dotenv().ok();

    let config = config::Config::new()?;
    let store = setup_store(&config).await?;

    tracing::info!("Q&A service build ID {}", env!("DEV_COMMONS_VERSION"));

    run(config, store).await;

    Ok(())
}
