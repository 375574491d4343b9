use thiserror::Error;

#[derive(Error, Debug)]
pub enum GslbError {
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),

    #[error("Unsupported selection mode: {0}")]
    UnsupportedMode(String),

    #[error("Unsupported healthcheck type: {0}")]
    UnsupportedHealthCheck(String),

    #[error("Healthcheck profile not found: {0}")]
    UnresolvedProfile(String),

    #[error("Failed to decode {kind} healthcheck params: {reason}")]
    HealthCheckParams { kind: String, reason: String },

    #[error("Invalid duration for {field}: {value}")]
    InvalidDuration { field: String, value: String },

    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("Invalid subnet: {0}")]
    InvalidSubnet(String),

    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for GslbError {
    fn from(e: std::io::Error) -> Self {
        GslbError::Io(e.to_string())
    }
}
