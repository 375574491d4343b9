//! Client address extraction: EDNS Client Subnet when enabled and
//! present, otherwise the transport peer address.

use std::net::IpAddr;

use hickory_proto::rr::rdata::opt::{EdnsCode, EdnsOption};
use hickory_server::server::Request;
use tracing::debug;

/// The address selection decisions answer on. `None` only when the peer
/// address itself is unusable, which the handler turns into SERVFAIL.
pub fn extract_client_ip(request: &Request, use_edns_csubnet: bool) -> Option<IpAddr> {
    if use_edns_csubnet {
        if let Some(edns) = request.edns() {
            if let Some(EdnsOption::Subnet(subnet)) = edns.option(EdnsCode::Subnet) {
                let ip = subnet.addr();
                debug!(ecs = %ip, prefix = subnet.source_prefix(), "ECS detected");
                // An unspecified ECS address (::/0) carries no client
                // information; fall through to the peer address.
                if !ip.is_unspecified() {
                    return Some(ip);
                }
            }
        }
    }

    Some(request.src().ip())
}
