//! Health-check implementations, one module per kind.
//!
//! Each probe implements the [`HealthProbe`] port: a retry budget, a
//! per-attempt timeout from its own params, result metrics per finished
//! check, and failure counters labelled by reason. The caller bounds the
//! whole call with the record's scrape timeout on top.

pub mod custom;
pub mod grpc;
pub mod http;
pub mod icmp;
pub mod lua;
pub mod mysql;
pub mod tcp;

use std::sync::Arc;

use gslb_application::ports::HealthProbe;
use gslb_domain::ProbeParams;

pub use custom::CustomProbe;
pub use grpc::GrpcProbe;
pub use http::HttpProbe;
pub use icmp::IcmpProbe;
pub use lua::LuaProbe;
pub use mysql::MysqlProbe;
pub use tcp::TcpProbe;

/// Instantiate the probe for a set of typed params.
pub fn build_probe(params: ProbeParams) -> Arc<dyn HealthProbe> {
    match params {
        ProbeParams::Http(cfg) => Arc::new(HttpProbe::new(cfg, false)),
        ProbeParams::Https(cfg) => Arc::new(HttpProbe::new(cfg, true)),
        ProbeParams::Icmp(cfg) => Arc::new(IcmpProbe::new(cfg)),
        ProbeParams::Tcp(cfg) => Arc::new(TcpProbe::new(cfg)),
        ProbeParams::Mysql(cfg) => Arc::new(MysqlProbe::new(cfg)),
        ProbeParams::Grpc(cfg) => Arc::new(GrpcProbe::new(cfg)),
        ProbeParams::Custom(cfg) => Arc::new(CustomProbe::new(cfg)),
        ProbeParams::Lua(cfg) => Arc::new(LuaProbe::new(cfg)),
    }
}

/// Build every probe a backend is configured with.
pub fn build_probes(params: Vec<ProbeParams>) -> Vec<Arc<dyn HealthProbe>> {
    params.into_iter().map(build_probe).collect()
}
