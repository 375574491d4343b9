use std::net::SocketAddr;
use std::str::FromStr;

use axum_server::tls_rustls::RustlsConfig;
use tracing::info;

use gslb_api::{create_api_routes, AppState};
use gslb_domain::ApiConfig;

pub async fn start_api_server(config: ApiConfig, state: AppState) -> anyhow::Result<()> {
    let addr = SocketAddr::from_str(&format!("{}:{}", config.listen_addr, config.listen_port))?;
    let router = create_api_routes(state);

    if config.tls_enabled() {
        // tls_enabled() guarantees both paths are present.
        let (Some(cert), Some(key)) = (config.tls_cert.clone(), config.tls_key.clone()) else {
            anyhow::bail!("api_tls_cert and api_tls_key must both be set");
        };
        let tls = RustlsConfig::from_pem_file(cert, key).await?;
        info!(%addr, tls = true, "Starting API server");
        axum_server::bind_rustls(addr, tls)
            .serve(router.into_make_service())
            .await?;
    } else {
        info!(%addr, tls = false, "Starting API server");
        axum_server::bind(addr)
            .serve(router.into_make_service())
            .await?;
    }

    Ok(())
}
