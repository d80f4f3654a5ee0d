use std::net::SocketAddr;

use anyhow::Context;

use kinoteka_infra::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kinoteka_observability::init();

    let settings = Settings::from_env().context("invalid configuration")?;
    let app = kinoteka_api::app::build_app(&settings)
        .await
        .context("failed to build the application")?;

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("server error")?;
    Ok(())
}
