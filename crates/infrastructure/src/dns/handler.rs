use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use hickory_proto::op::{Header, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA, TXT};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use tracing::{debug, error};

use gslb_application::views::Family;
use gslb_domain::{format_rfc3339, in_zone, normalize_fqdn};

use crate::dns::client_info::extract_client_ip;
use crate::gslb::{Registry, Resolution};
use crate::metrics;

/// The authoritative GSLB request handler.
///
/// Only names under a configured zone are answered; everything else is
/// refused (the standalone daemon has no next handler to delegate to).
pub struct GslbHandler {
    registry: Arc<Registry>,
    use_edns_csubnet: bool,
    disable_txt: bool,
}

impl GslbHandler {
    pub fn new(registry: Arc<Registry>, use_edns_csubnet: bool, disable_txt: bool) -> Self {
        Self {
            registry,
            use_edns_csubnet,
            disable_txt,
        }
    }

    fn is_authoritative(&self, fqdn: &str) -> bool {
        self.registry
            .zones()
            .iter()
            .any(|(zone, _)| in_zone(fqdn, zone))
    }

    async fn process<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: &mut R,
    ) -> Result<ResponseInfo, ResponseCode> {
        let info = request
            .request_info()
            .map_err(|_| ResponseCode::ServFail)?;
        let query_name = Name::from(info.query.name().clone());
        let qtype = info.query.query_type();
        let fqdn = normalize_fqdn(&query_name.to_string());

        if !self.is_authoritative(&fqdn) {
            return Err(ResponseCode::Refused);
        }

        let Some(client_ip) = extract_client_ip(request, self.use_edns_csubnet) else {
            error!(record = %fqdn, "Failed to determine client IP, responding with SERVFAIL");
            return Err(ResponseCode::ServFail);
        };
        debug!(record = %fqdn, client = %client_ip, ?qtype, "GSLB query");

        self.registry.touch_last_resolution(&fqdn);

        match qtype {
            RecordType::A => {
                self.handle_address(
                    request,
                    response_handle,
                    &fqdn,
                    query_name,
                    Family::V4,
                    client_ip,
                )
                .await
            }
            RecordType::AAAA => {
                self.handle_address(
                    request,
                    response_handle,
                    &fqdn,
                    query_name,
                    Family::V6,
                    client_ip,
                )
                .await
            }
            RecordType::TXT if !self.disable_txt => {
                self.handle_txt(request, response_handle, &fqdn, query_name)
                    .await
            }
            _ => Err(ResponseCode::Refused),
        }
    }

    async fn handle_address<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: &mut R,
        fqdn: &str,
        query_name: Name,
        family: Family,
        client_ip: IpAddr,
    ) -> Result<ResponseInfo, ResponseCode> {
        let start = Instant::now();

        match self.registry.resolve(fqdn, family, Some(client_ip)).await {
            Resolution::NotFound => Err(ResponseCode::Refused),
            Resolution::NoBackend => {
                debug!(record = %fqdn, "No backend available for this family");
                metrics::observe_record_resolution(fqdn, "failure", start);
                Err(ResponseCode::ServFail)
            }
            Resolution::Answers { addresses, ttl } => {
                let answers: Vec<Record> = addresses
                    .iter()
                    .filter_map(|address| match address {
                        IpAddr::V4(v4) if family == Family::V4 => Some(Record::from_rdata(
                            query_name.clone(),
                            ttl,
                            RData::A(A::from(*v4)),
                        )),
                        IpAddr::V6(v6) if family == Family::V6 => Some(Record::from_rdata(
                            query_name.clone(),
                            ttl,
                            RData::AAAA(AAAA::from(*v6)),
                        )),
                        _ => None,
                    })
                    .map(|mut record| {
                        record.set_dns_class(DNSClass::IN);
                        record
                    })
                    .collect();

                let result = self.send_answers(request, response_handle, answers).await;
                let label = if result.is_ok() { "success" } else { "failure" };
                metrics::observe_record_resolution(fqdn, label, start);
                result
            }
        }
    }

    /// One TXT record per backend with a human-readable summary; handy
    /// for debugging a record without touching the API.
    async fn handle_txt<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: &mut R,
        fqdn: &str,
        query_name: Name,
    ) -> Result<ResponseInfo, ResponseCode> {
        let Some(view) = self.registry.record_view(fqdn).await else {
            return Err(ResponseCode::Refused);
        };

        let answers: Vec<Record> = view
            .backends
            .iter()
            .map(|backend| {
                let status = if backend.is_healthy() {
                    "healthy"
                } else {
                    "unhealthy"
                };
                let last = backend
                    .last_healthcheck
                    .map(format_rfc3339)
                    .unwrap_or_else(|| "never".to_string());
                let summary = format!(
                    "Backend: {} | Priority: {} | Status: {} | Enabled: {} | Last check: {}",
                    backend.address, backend.priority, status, backend.enabled, last
                );
                let mut record = Record::from_rdata(
                    query_name.clone(),
                    view.record_ttl,
                    RData::TXT(TXT::new(vec![summary])),
                );
                record.set_dns_class(DNSClass::IN);
                record
            })
            .collect();

        self.send_answers(request, response_handle, answers).await
    }

    async fn send_answers<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: &mut R,
        answers: Vec<Record>,
    ) -> Result<ResponseInfo, ResponseCode> {
        let mut header = Header::response_from_request(request.header());
        header.set_authoritative(true);
        header.set_recursion_available(false);

        let builder = MessageResponseBuilder::from_message_request(request);
        let response = builder.build(
            header,
            answers.iter(),
            std::iter::empty(),
            std::iter::empty(),
            std::iter::empty(),
        );

        response_handle.send_response(response).await.map_err(|e| {
            error!(error = %e, "Failed to write DNS response");
            ResponseCode::ServFail
        })
    }
}

#[async_trait]
impl RequestHandler for GslbHandler {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        match self.process(request, &mut response_handle).await {
            Ok(info) => info,
            Err(code) => {
                let builder = MessageResponseBuilder::from_message_request(request);
                let response = builder.error_msg(request.header(), code);
                match response_handle.send_response(response).await {
                    Ok(info) => info,
                    Err(e) => {
                        error!(error = %e, "Failed to write DNS error response");
                        let mut header = Header::response_from_request(request.header());
                        header.set_response_code(ResponseCode::ServFail);
                        ResponseInfo::from(header)
                    }
                }
            }
        }
    }
}
