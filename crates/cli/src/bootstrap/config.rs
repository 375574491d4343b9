use gslb_domain::{CliOverrides, Config};
use tracing::info;

/// Load and validate the daemon configuration; startup failures here
/// are fatal by design.
pub fn load_config(config_path: &str, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(config_path, overrides)?;
    config.validate()?;

    info!(
        config_file = config_path,
        zones = config.zones.len(),
        dns_port = config.dns_listen_port,
        api_enabled = config.api.enable,
        "Configuration loaded"
    );

    Ok(config)
}
