use serde::{Deserialize, Serialize};

/// Control-plane HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub enable: bool,
    pub listen_addr: String,
    pub listen_port: u16,
    /// TLS is enabled when both paths are set.
    pub tls_cert: Option<String>,
    pub tls_key: Option<String>,
    /// Basic auth is enforced when both are set.
    pub basic_user: Option<String>,
    pub basic_pass: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable: true,
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            tls_cert: None,
            tls_key: None,
            basic_user: None,
            basic_pass: None,
        }
    }
}

impl ApiConfig {
    pub fn tls_enabled(&self) -> bool {
        self.tls_cert.is_some() && self.tls_key.is_some()
    }

    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (self.basic_user.as_deref(), self.basic_pass.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}
