use qrstudio::config::Settings;
use qrstudio::telemetry::init_tracing;
use qrstudio::web::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(&settings.logging);

    let app = Application::build(settings).await?;
    tracing::info!(port = app.port(), "Starting qrstudio");

    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
