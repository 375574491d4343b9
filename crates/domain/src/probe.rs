//! Health-check parameter model.
//!
//! Zone files carry checks as a raw `{type, params}` pair (or a profile
//! name). Raw specs are decoded into one typed params struct per kind;
//! the typed form carries the defaults and is what probe identity
//! (structural equality) is computed over during reload diffing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::duration::{parse_duration, parse_duration_or};
use crate::errors::GslbError;

/// Raw healthcheck as it appears in YAML: `{type: tcp, params: {port: 443}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckSpec {
    #[serde(rename = "type")]
    pub check_type: String,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

/// Typed, default-filled health-check parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeParams {
    Http(HttpProbeParams),
    Https(HttpProbeParams),
    Icmp(IcmpProbeParams),
    Tcp(TcpProbeParams),
    Mysql(MysqlProbeParams),
    Grpc(GrpcProbeParams),
    Custom(CustomProbeParams),
    Lua(LuaProbeParams),
}

impl ProbeParams {
    /// Decode a raw spec into typed params, filling per-kind defaults.
    pub fn from_spec(spec: &HealthCheckSpec) -> Result<Self, GslbError> {
        fn decode<T>(kind: &str, params: &serde_yaml::Value) -> Result<T, GslbError>
        where
            T: Default + for<'de> Deserialize<'de>,
        {
            if params.is_null() {
                return Ok(T::default());
            }
            serde_yaml::from_value(params.clone()).map_err(|e| GslbError::HealthCheckParams {
                kind: kind.to_string(),
                reason: e.to_string(),
            })
        }

        match spec.check_type.as_str() {
            "http" => Ok(ProbeParams::Http(decode("http", &spec.params)?)),
            "https" => Ok(ProbeParams::Https(decode("https", &spec.params)?)),
            "icmp" => Ok(ProbeParams::Icmp(decode("icmp", &spec.params)?)),
            "tcp" => Ok(ProbeParams::Tcp(decode("tcp", &spec.params)?)),
            "mysql" => Ok(ProbeParams::Mysql(decode("mysql", &spec.params)?)),
            "grpc" => Ok(ProbeParams::Grpc(decode("grpc", &spec.params)?)),
            "custom" => Ok(ProbeParams::Custom(decode("custom", &spec.params)?)),
            "lua" => Ok(ProbeParams::Lua(decode("lua", &spec.params)?)),
            other => Err(GslbError::UnsupportedHealthCheck(other.to_string())),
        }
    }

    /// Type label used in logs and metrics. Port-bound kinds include the
    /// port, e.g. `tcp/443`.
    pub fn kind(&self) -> String {
        match self {
            ProbeParams::Http(p) => format!("http/{}", p.port(false)),
            ProbeParams::Https(p) => format!("https/{}", p.port(true)),
            ProbeParams::Icmp(_) => "icmp".to_string(),
            ProbeParams::Tcp(p) => format!("tcp/{}", p.port),
            ProbeParams::Mysql(p) => format!("mysql/{}", p.port),
            ProbeParams::Grpc(_) => "grpc".to_string(),
            ProbeParams::Custom(_) => "custom".to_string(),
            ProbeParams::Lua(_) => "lua".to_string(),
        }
    }

    /// Per-attempt deadline configured on the check itself.
    pub fn timeout(&self) -> Duration {
        match self {
            ProbeParams::Http(p) | ProbeParams::Https(p) => {
                parse_duration_or(&p.timeout, Duration::from_secs(5))
            }
            ProbeParams::Icmp(p) => parse_duration_or(&p.timeout, Duration::from_secs(5)),
            ProbeParams::Tcp(p) => parse_duration_or(&p.timeout, Duration::from_secs(5)),
            ProbeParams::Mysql(p) => parse_duration_or(&p.timeout, Duration::from_secs(3)),
            ProbeParams::Grpc(p) => parse_duration_or(&p.timeout, Duration::from_secs(5)),
            ProbeParams::Custom(p) => parse_duration_or(&p.timeout, Duration::from_secs(5)),
            ProbeParams::Lua(p) => parse_duration_or(&p.timeout, Duration::from_secs(5)),
        }
    }

    /// Reject malformed durations at load time.
    pub fn validate(&self) -> Result<(), GslbError> {
        let timeout = match self {
            ProbeParams::Http(p) | ProbeParams::Https(p) => &p.timeout,
            ProbeParams::Icmp(p) => &p.timeout,
            ProbeParams::Tcp(p) => &p.timeout,
            ProbeParams::Mysql(p) => &p.timeout,
            ProbeParams::Grpc(p) => &p.timeout,
            ProbeParams::Custom(p) => &p.timeout,
            ProbeParams::Lua(p) => &p.timeout,
        };
        parse_duration("timeout", timeout)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpProbeParams {
    /// Port override; scheme default (80/443) applies when absent.
    pub port: Option<u16>,
    pub uri: String,
    pub method: String,
    pub expected_codes: Vec<u16>,
    pub expected_body: Option<String>,
    /// Host header override; defaults to the backend address.
    pub host: Option<String>,
    pub basic_auth_user: Option<String>,
    pub basic_auth_pass: Option<String>,
    pub skip_tls_verify: bool,
    pub timeout: String,
}

impl Default for HttpProbeParams {
    fn default() -> Self {
        Self {
            port: None,
            uri: "/".to_string(),
            method: "GET".to_string(),
            expected_codes: vec![200],
            expected_body: None,
            host: None,
            basic_auth_user: None,
            basic_auth_pass: None,
            skip_tls_verify: false,
            timeout: "5s".to_string(),
        }
    }
}

impl HttpProbeParams {
    pub fn port(&self, https: bool) -> u16 {
        self.port.unwrap_or(if https { 443 } else { 80 })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcmpProbeParams {
    pub count: u32,
    pub timeout: String,
}

impl Default for IcmpProbeParams {
    fn default() -> Self {
        Self {
            count: 3,
            timeout: "5s".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpProbeParams {
    pub port: u16,
    pub timeout: String,
}

impl Default for TcpProbeParams {
    fn default() -> Self {
        Self {
            port: 80,
            timeout: "5s".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MysqlProbeParams {
    /// Connect host; defaults to the backend address.
    pub host: Option<String>,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub query: String,
    pub timeout: String,
}

impl Default for MysqlProbeParams {
    fn default() -> Self {
        Self {
            host: None,
            port: 3306,
            user: String::new(),
            password: String::new(),
            database: String::new(),
            query: "SELECT 1".to_string(),
            timeout: "3s".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrpcProbeParams {
    /// Dial host; defaults to the backend address.
    pub host: Option<String>,
    pub port: u16,
    /// Health service name; empty checks the whole server.
    pub service: String,
    pub timeout: String,
}

impl Default for GrpcProbeParams {
    fn default() -> Self {
        Self {
            host: None,
            port: 0,
            service: String::new(),
            timeout: "5s".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomProbeParams {
    pub script: String,
    pub timeout: String,
}

impl Default for CustomProbeParams {
    fn default() -> Self {
        Self {
            script: String::new(),
            timeout: "5s".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LuaProbeParams {
    pub script: String,
    pub timeout: String,
}

impl Default for LuaProbeParams {
    fn default() -> Self {
        Self {
            script: String::new(),
            timeout: "5s".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(check_type: &str, yaml: &str) -> HealthCheckSpec {
        HealthCheckSpec {
            check_type: check_type.to_string(),
            params: serde_yaml::from_str(yaml).unwrap(),
        }
    }

    #[test]
    fn tcp_defaults_fill_in() {
        let p = ProbeParams::from_spec(&spec("tcp", "{}")).unwrap();
        assert_eq!(p.kind(), "tcp/80");
        assert_eq!(p.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn absent_params_mean_defaults() {
        let raw = HealthCheckSpec {
            check_type: "icmp".to_string(),
            params: serde_yaml::Value::Null,
        };
        let p = ProbeParams::from_spec(&raw).unwrap();
        assert_eq!(p, ProbeParams::Icmp(IcmpProbeParams::default()));
    }

    #[test]
    fn http_port_follows_scheme() {
        let http = ProbeParams::from_spec(&spec("http", "{}")).unwrap();
        let https = ProbeParams::from_spec(&spec("https", "{}")).unwrap();
        assert_eq!(http.kind(), "http/80");
        assert_eq!(https.kind(), "https/443");
    }

    #[test]
    fn structural_equality_detects_param_change() {
        let a = ProbeParams::from_spec(&spec("tcp", "port: 443")).unwrap();
        let b = ProbeParams::from_spec(&spec("tcp", "port: 443")).unwrap();
        let c = ProbeParams::from_spec(&spec("tcp", "port: 8443")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = ProbeParams::from_spec(&spec("carrier-pigeon", "{}")).unwrap_err();
        assert!(matches!(err, GslbError::UnsupportedHealthCheck(_)));
    }

    #[test]
    fn malformed_timeout_fails_validation() {
        let p = ProbeParams::from_spec(&spec("tcp", "timeout: soon")).unwrap();
        assert!(p.validate().is_err());
    }
}
