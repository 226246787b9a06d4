use service_core::observability::init_tracing;
use student_service::config::Config;
use student_service::services::init_metrics;
use student_service::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(&config.service_name, "info");
    init_metrics();

    let app = Application::build(config).await?;
    tracing::info!("Starting student-service on port {}", app.port());
    app.run_until_stopped().await?;

    Ok(())
}
