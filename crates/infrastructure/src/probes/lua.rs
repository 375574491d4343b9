use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use mlua::{Lua, LuaSerdeExt, Value};
use tracing::debug;

use gslb_application::ports::{HealthProbe, ProbeTarget};
use gslb_domain::probe::LuaProbeParams;
use gslb_domain::ProbeParams;

use crate::metrics::{self, FailureReason};

/// Embedded-interpreter health check.
///
/// The script runs in a fresh interpreter per attempt with a small
/// helper library (HTTP GET, JSON decode, Prometheus metric extraction,
/// SSH exec, TLS certificate expiry) and a `backend` table; its final
/// value decides the check. Scripts are trusted operator code; the only
/// guard is the wall-clock deadline.
pub struct LuaProbe {
    cfg: LuaProbeParams,
    params: ProbeParams,
}

impl LuaProbe {
    pub fn new(cfg: LuaProbeParams) -> Self {
        Self {
            params: ProbeParams::Lua(cfg.clone()),
            cfg,
        }
    }
}

#[async_trait]
impl HealthProbe for LuaProbe {
    async fn perform(&self, target: &ProbeTarget, retries: u32) -> bool {
        let kind = self.kind();
        let address = target.address.to_string();
        let timeout = self.params.timeout();
        let start = Instant::now();

        let mut reason = FailureReason::Other;
        for attempt in 0..=retries {
            debug!(record = %target.fqdn, backend = %address, attempt, "Running lua health check");
            let script = self.cfg.script.clone();
            let script_target = target.clone();
            let handle =
                tokio::task::spawn_blocking(move || run_script(&script, &script_target));

            match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(Ok(true))) => {
                    metrics::observe_healthcheck(&target.fqdn, &kind, &address, start, true);
                    return true;
                }
                Ok(Ok(Ok(false))) => reason = FailureReason::Protocol,
                Ok(Ok(Err(e))) => {
                    debug!(record = %target.fqdn, backend = %address, error = %e, "lua script error");
                    reason = FailureReason::Protocol;
                }
                Ok(Err(_join)) => reason = FailureReason::Other,
                Err(_) => {
                    // The blocking task keeps running to completion but
                    // its verdict is discarded.
                    reason = FailureReason::Timeout;
                }
            }
        }

        metrics::inc_healthcheck_failure(&kind, &address, reason);
        metrics::observe_healthcheck(&target.fqdn, &kind, &address, start, false);
        false
    }

    fn kind(&self) -> String {
        self.params.kind()
    }

    fn params(&self) -> &ProbeParams {
        &self.params
    }
}

/// One script run in a fresh interpreter. The script's final value must
/// be the boolean verdict; anything else counts as unhealthy.
fn run_script(script: &str, target: &ProbeTarget) -> Result<bool, mlua::Error> {
    let lua = Lua::new();
    register_helpers(&lua)?;

    let backend = lua.create_table()?;
    backend.set("address", target.address.to_string())?;
    backend.set("priority", target.priority)?;
    lua.globals().set("backend", backend)?;

    let value = lua.load(script).eval::<Value>()?;
    Ok(matches!(value, Value::Boolean(true)))
}

fn register_helpers(lua: &Lua) -> Result<(), mlua::Error> {
    let globals = lua.globals();

    // http_get(url [, timeout_s, user, pass, tls_verify]) -> body ("" on error)
    let http_get = lua.create_function(
        |_,
         (url, timeout, user, pass, tls_verify): (
            String,
            Option<u64>,
            Option<String>,
            Option<String>,
            Option<bool>,
        )| { Ok(blocking_http_get(&url, timeout, user, pass, tls_verify)) },
    )?;
    globals.set("http_get", http_get)?;

    // json_decode(text) -> table or nil
    let json_decode = lua.create_function(|lua, text: String| {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => lua.to_value(&json),
            Err(_) => Ok(Value::Nil),
        }
    })?;
    globals.set("json_decode", json_decode)?;

    // metric_get(prometheus_text, metric_name) -> number or nil
    let metric_get = lua.create_function(|_, (text, name): (String, String)| {
        Ok(extract_metric(&text, &name))
    })?;
    globals.set("metric_get", metric_get)?;

    // ssh_exec(host, user, key_path, command) -> output or nil
    let ssh_exec = lua.create_function(
        |_, (host, user, key_path, command): (String, String, String, String)| {
            Ok(blocking_ssh_exec(&host, &user, &key_path, &command))
        },
    )?;
    globals.set("ssh_exec", ssh_exec)?;

    // tls_cert_days_left(host, port) -> days or nil
    let tls_days = lua.create_function(|_, (host, port): (String, u16)| {
        Ok(cert_days_left(&host, port))
    })?;
    globals.set("tls_cert_days_left", tls_days)?;

    Ok(())
}

fn blocking_http_get(
    url: &str,
    timeout: Option<u64>,
    user: Option<String>,
    pass: Option<String>,
    tls_verify: Option<bool>,
) -> String {
    let timeout = Duration::from_secs(timeout.unwrap_or(10));
    let client = match reqwest::blocking::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(!tls_verify.unwrap_or(true))
        .build()
    {
        Ok(client) => client,
        Err(_) => return String::new(),
    };

    let mut request = client.get(url);
    if let Some(user) = user {
        request = request.basic_auth(user, pass);
    }

    match request.send().and_then(|r| r.text()) {
        Ok(body) => body,
        Err(_) => String::new(),
    }
}

/// Pull a sample value out of Prometheus text exposition format.
fn extract_metric(text: &str, name: &str) -> Option<f64> {
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('#') || !line.starts_with(name) {
            continue;
        }
        let rest = &line[name.len()..];
        if !(rest.starts_with('{') || rest.starts_with(' ') || rest.starts_with('\t')) {
            continue;
        }
        if let Some(value) = line.split_whitespace().last() {
            if let Ok(parsed) = value.parse::<f64>() {
                return Some(parsed);
            }
        }
    }
    None
}

fn blocking_ssh_exec(host: &str, user: &str, key_path: &str, command: &str) -> Option<String> {
    let tcp = std::net::TcpStream::connect((host, 22)).ok()?;
    let mut session = ssh2::Session::new().ok()?;
    session.set_tcp_stream(tcp);
    session.handshake().ok()?;
    session
        .userauth_pubkey_file(user, None, Path::new(key_path), None)
        .ok()?;

    let mut channel = session.channel_session().ok()?;
    channel.exec(command).ok()?;
    let mut output = String::new();
    channel.read_to_string(&mut output).ok()?;
    let _ = channel.wait_close();
    Some(output)
}

/// Days until the presented certificate's NotAfter. Verification is
/// deliberately off; expiry of whatever the peer presents is the point.
fn cert_days_left(host: &str, port: u16) -> Option<i64> {
    let connector = native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .ok()?;

    let tcp = std::net::TcpStream::connect((host, port)).ok()?;
    let _ = tcp.set_read_timeout(Some(Duration::from_secs(10)));
    let _ = tcp.set_write_timeout(Some(Duration::from_secs(10)));

    let tls = connector.connect(host, tcp).ok()?;
    let cert = tls.peer_certificate().ok()??;
    let der = cert.to_der().ok()?;

    let (_, parsed) = x509_parser::parse_x509_certificate(&der).ok()?;
    let not_after = parsed.validity().not_after.timestamp();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs() as i64;
    Some((not_after - now) / 86_400)
}
