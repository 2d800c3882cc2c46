use bozokbot_web::config::get_configuration;
use bozokbot_web::observability::init_tracing;
use bozokbot_web::services::metrics::init_metrics;
use bozokbot_web::startup::Application;
use dotenvy::dotenv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("bozokbot-web", &configuration.telemetry)?;
    init_metrics();

    let app = Application::build(configuration)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build application: {}", e))?;

    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
