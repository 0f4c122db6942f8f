use std::net::SocketAddr;

use anyhow::Context;

use bridgecms_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bridgecms_observability::init();

    let config = Config::from_env()?;
    if config.uses_default_jwt_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let app = bridgecms_api::app::build_app(&config).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, environment = %config.app_env, "listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
