use std::time::Duration;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "spendbook={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let listen = settings.server;
    tracing::info!("Using data directory {}", listen.data_dir);

    let engine = engine::Engine::builder()
        .data_dir(&listen.data_dir)
        .build()
        .await
        .inspect_err(|err| tracing::error!("failed to build engine: {err}"))?;

    if listen.seed_demo && engine.seed_demo().await? {
        tracing::info!(
            "Demo user \"{}\" created",
            engine::DEMO_USERNAME
        );
    }

    let bind = listen.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, listen.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .inspect_err(|err| tracing::error!("failed to bind server listener on {addr}: {err}"))?;

    let session_ttl = Duration::from_secs(listen.session_ttl_minutes.saturating_mul(60));
    server::run_with_listener(engine, session_ttl, listener).await?;

    Ok(())
}
