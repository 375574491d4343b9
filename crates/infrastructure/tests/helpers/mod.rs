use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinDecodable, BinDecoder, BinEncoder};
use hickory_server::authority::{MessageRequest, MessageResponse};
use hickory_server::proto::xfer::Protocol;
use hickory_server::server::{Request, ResponseHandler, ResponseInfo};

use gslb_application::ports::{HealthProbe, ProbeTarget};
use gslb_domain::probe::CustomProbeParams;
use gslb_domain::ProbeParams;
use gslb_infrastructure::gslb::{Registry, RegistrySettings};

// --- Probe doubles ---

/// A probe with a canned verdict, optional latency, and an optional
/// panic for failure-containment tests.
pub struct StaticProbe {
    result: bool,
    delay: Option<Duration>,
    panics: bool,
    params: ProbeParams,
}

impl StaticProbe {
    pub fn ok() -> Arc<Self> {
        Self::build(true, None, false, "static-ok")
    }

    pub fn failing() -> Arc<Self> {
        Self::build(false, None, false, "static-fail")
    }

    pub fn panicking() -> Arc<Self> {
        Self::build(true, None, true, "static-panic")
    }

    pub fn slow(result: bool, delay: Duration) -> Arc<Self> {
        Self::build(result, Some(delay), false, "static-slow")
    }

    fn build(result: bool, delay: Option<Duration>, panics: bool, tag: &str) -> Arc<Self> {
        Arc::new(Self {
            result,
            delay,
            panics,
            params: ProbeParams::Custom(CustomProbeParams {
                script: tag.to_string(),
                timeout: "5s".to_string(),
            }),
        })
    }
}

#[async_trait]
impl HealthProbe for StaticProbe {
    async fn perform(&self, _target: &ProbeTarget, _retries: u32) -> bool {
        if self.panics {
            panic!("probe blew up");
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result
    }

    fn kind(&self) -> String {
        "static".to_string()
    }

    fn params(&self) -> &ProbeParams {
        &self.params
    }
}

// --- Registry construction ---

pub fn test_settings() -> RegistrySettings {
    RegistrySettings {
        max_stagger_start: Duration::from_millis(10),
        batch_size_start: 100,
        resolution_idle_timeout: Duration::from_secs(3600),
        healthcheck_idle_multiplier: 10,
    }
}

pub fn test_registry(zones: Vec<(&str, &str)>) -> Arc<Registry> {
    Registry::new(
        zones
            .into_iter()
            .map(|(zone, path)| (zone.to_string(), path.to_string()))
            .collect(),
        None,
        gslb_domain::LocationMap::default(),
        test_settings(),
    )
}

/// Force the alive flag of every backend of `fqdn`, in config order.
pub async fn set_alive(registry: &Registry, fqdn: &str, alive: &[bool]) {
    let record = registry.record(fqdn).await.expect("record missing");
    let backends = record.backends().await;
    assert_eq!(backends.len(), alive.len(), "alive flags must cover backends");
    for (backend, alive) in backends.iter().zip(alive) {
        backend.set_alive(*alive).await;
    }
}

// --- DNS request/response plumbing ---

/// Captures the serialized DNS response for inspection in tests.
#[derive(Clone)]
pub struct TestResponseHandler {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl TestResponseHandler {
    pub fn new() -> Self {
        Self {
            buf: Arc::new(Mutex::new(Vec::with_capacity(512))),
        }
    }

    /// Parse the captured wire bytes into a `Message` for assertions.
    pub fn into_message(self) -> Message {
        let buf = self.buf.lock().unwrap();
        assert!(!buf.is_empty(), "no response was captured");
        Message::from_vec(&buf).expect("failed to parse captured DNS response")
    }
}

#[async_trait]
impl ResponseHandler for TestResponseHandler {
    async fn send_response<'a>(
        &mut self,
        response: MessageResponse<
            '_,
            'a,
            impl Iterator<Item = &'a hickory_proto::rr::Record> + Send + 'a,
            impl Iterator<Item = &'a hickory_proto::rr::Record> + Send + 'a,
            impl Iterator<Item = &'a hickory_proto::rr::Record> + Send + 'a,
            impl Iterator<Item = &'a hickory_proto::rr::Record> + Send + 'a,
        >,
    ) -> io::Result<ResponseInfo> {
        let mut buf = self.buf.lock().unwrap();
        buf.clear();
        let mut encoder = BinEncoder::new(&mut *buf);
        encoder.set_max_size(u16::MAX);
        response
            .destructive_emit(&mut encoder)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

pub fn build_query_bytes(name: &str, record_type: RecordType, id: u16) -> Vec<u8> {
    let mut msg = Message::new();
    msg.set_id(id);
    msg.set_message_type(MessageType::Query);
    msg.set_op_code(OpCode::Query);
    msg.set_recursion_desired(true);
    let mut query = Query::new();
    query.set_name(Name::from_ascii(name).unwrap());
    query.set_query_type(record_type);
    query.set_query_class(DNSClass::IN);
    msg.add_query(query);
    msg.to_vec().unwrap()
}

/// Build a full `Request` with a crafted source address.
pub fn build_request(name: &str, record_type: RecordType, src: SocketAddr, id: u16) -> Request {
    let bytes = build_query_bytes(name, record_type, id);
    let mut decoder = BinDecoder::new(&bytes);
    let msg = MessageRequest::read(&mut decoder).expect("failed to parse MessageRequest");
    Request::new(msg, src, Protocol::Udp)
}
