//! Shared test infrastructure for zone integration tests.

#![allow(dead_code)]

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinDecodable, BinDecoder, BinEncoder};
use hickory_server::authority::{Catalog, MessageRequest, MessageResponse};
use hickory_server::proto::rr::Record;
use hickory_server::proto::xfer::Protocol;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

use subdomain_dns::config::DnsConfig;
use subdomain_dns::server::build_catalog;
use subdomain_dns::zone::Zone;

// --- Constants ---

pub const ZONE: &str = "example.test.";
pub const NAMESERVER: &str = "ns1.example.test.";
pub const SERVER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
pub const DEFAULT_NAMES: [&str; 3] = ["example.test.", "ns1.example.test.", "alice.example.test."];

// --- TestResponseHandler ---

/// Captures the serialized DNS response for inspection in tests.
///
/// Implements `ResponseHandler` so it can be passed to `Catalog::handle_request()`.
/// The response is serialized via `MessageResponse::destructive_emit()` and stored
/// as raw wire-format bytes, which can then be parsed with `Message::from_vec()`.
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
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
        >,
    ) -> io::Result<ResponseInfo> {
        let mut buf = self.buf.lock().unwrap();
        buf.clear();
        let mut encoder = BinEncoder::new(&mut *buf);
        encoder.set_max_size(u16::MAX);
        let info = response
            .destructive_emit(&mut encoder)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(info)
    }
}

// --- Zone builders ---

pub fn test_dns_config() -> DnsConfig {
    let mut config = DnsConfig::new(ZONE, NAMESERVER, SERVER_IP);
    config.listen_addr = "127.0.0.1:0".parse().unwrap();
    config
}

/// Zone whose default list is exactly `DEFAULT_NAMES`.
pub fn test_zone() -> Arc<Zone> {
    Arc::new(Zone::with_names(&test_dns_config(), DEFAULT_NAMES).expect("failed to build zone"))
}

pub fn client_src() -> SocketAddr {
    "10.0.0.2:12345".parse().unwrap()
}

// --- Query/Request construction ---

/// Build wire-format bytes for a DNS query.
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

/// Parse wire bytes into a MessageRequest.
pub fn parse_message_request(bytes: &[u8]) -> MessageRequest {
    let mut decoder = BinDecoder::new(bytes);
    MessageRequest::read(&mut decoder).expect("failed to parse MessageRequest")
}

/// Build a full `Request` from a client address.
pub fn build_request(name: &str, record_type: RecordType, src: SocketAddr, id: u16) -> Request {
    let bytes = build_query_bytes(name, record_type, id);
    let msg = parse_message_request(&bytes);
    Request::new(msg, src, Protocol::Udp)
}

pub fn test_catalog(zone: Arc<Zone>) -> Catalog {
    build_catalog(zone)
}

// --- Response helpers ---

/// Execute a query through the catalog and return the parsed response.
pub async fn execute_query(
    catalog: &Catalog,
    name: &str,
    record_type: RecordType,
    id: u16,
) -> Message {
    let request = build_request(name, record_type, client_src(), id);
    let handler = TestResponseHandler::new();
    catalog.handle_request(&request, handler.clone()).await;
    handler.into_message()
}

/// Extract A addresses from the answer section.
pub fn extract_a_ips(msg: &Message) -> Vec<Ipv4Addr> {
    msg.answers()
        .iter()
        .filter_map(|r| match r.data() {
            RData::A(a) => Some(Ipv4Addr::from(*a)),
            _ => None,
        })
        .collect()
}

/// Assert response code.
pub fn assert_response_code(msg: &Message, expected: ResponseCode) {
    assert_eq!(
        msg.response_code(),
        expected,
        "expected {:?}, got {:?}",
        expected,
        msg.response_code()
    );
}

/// Assert a positive answer carrying exactly one A record for `name`.
pub fn assert_a_answer(msg: &Message, name: &str) {
    assert_response_code(msg, ResponseCode::NoError);
    assert!(msg.authoritative(), "answer is not authoritative");
    assert_eq!(msg.answers().len(), 1, "answers: {:?}", msg.answers());
    let record = &msg.answers()[0];
    assert_eq!(record.name(), &Name::from_ascii(name).unwrap());
    assert_eq!(record.ttl(), 120);
    assert_eq!(extract_a_ips(msg), vec![SERVER_IP]);
}

/// Assert an authoritative NXDOMAIN carrying the zone SOA.
pub fn assert_nxdomain_with_soa(msg: &Message) {
    assert_response_code(msg, ResponseCode::NXDomain);
    assert!(msg.authoritative(), "negative answer is not authoritative");
    assert!(msg.answers().is_empty(), "answers: {:?}", msg.answers());
    assert!(
        msg.name_servers()
            .iter()
            .any(|r| r.record_type() == RecordType::SOA),
        "no SOA in authority section: {:?}",
        msg.name_servers()
    );
}
