//! DNS query construction and response decoding.
//!
//! Queries are single-question, recursion-desired, class `IN`. Responses are
//! decoded into [`DnsRecord`]s; records of types hostmap does not care about
//! are skipped.

use std::fmt;
use std::net::Ipv4Addr;

use anyhow::bail;
use dns_parser::{Packet, RData, ResponseCode};

pub const DNS_HDR_LEN: usize = 12;
const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;
const CLASS_IN: u16 = 1;
/// Standard query with recursion desired.
const QUERY_FLAGS: u16 = 0x0100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    A,
    Cname,
    Ns,
}

impl RecordKind {
    fn code(self) -> u16 {
        match self {
            RecordKind::A => 1,
            RecordKind::Ns => 2,
            RecordKind::Cname => 5,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::A => "A",
            RecordKind::Cname => "CNAME",
            RecordKind::Ns => "NS",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DnsRecord {
    A(Ipv4Addr),
    Cname(String),
    Ns(String),
}

impl DnsRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            DnsRecord::A(_) => RecordKind::A,
            DnsRecord::Cname(_) => RecordKind::Cname,
            DnsRecord::Ns(_) => RecordKind::Ns,
        }
    }

    /// The record data rendered as text: an address or a target name.
    pub fn value(&self) -> String {
        match self {
            DnsRecord::A(ip) => ip.to_string(),
            DnsRecord::Cname(name) | DnsRecord::Ns(name) => name.clone(),
        }
    }
}

/// The decoded answer section of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsAnswer {
    pub id: u16,
    /// `true` when the server answered NXDOMAIN.
    pub nx_domain: bool,
    pub records: Vec<DnsRecord>,
}

impl DnsAnswer {
    pub fn first_of(&self, kind: RecordKind) -> Option<&DnsRecord> {
        self.records.iter().find(|r| r.kind() == kind)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("malformed DNS packet: {0}")]
    Malformed(String),
    #[error("packet is a query, not a response")]
    NotAResponse,
    #[error("transaction id mismatch: expected {expected}, got {got}")]
    IdMismatch { expected: u16, got: u16 },
    #[error("server returned {0}")]
    ServerError(String),
}

pub fn random_transaction_id() -> u16 {
    rand::random()
}

/// Builds a standard query for `host`.
///
/// Names are checked against RFC 1035 limits first: labels of 1 to 63 bytes,
/// at most 253 bytes overall.
pub fn create_query_packet(host: &str, kind: RecordKind, id: u16) -> anyhow::Result<Vec<u8>> {
    let qname = encode_dns_name(host.trim_end_matches('.'))?;
    let mut buffer: Vec<u8> = Vec::with_capacity(DNS_HDR_LEN + qname.len() + 4);

    buffer.extend_from_slice(&id.to_be_bytes());
    buffer.extend_from_slice(&QUERY_FLAGS.to_be_bytes());
    buffer.extend_from_slice(&1u16.to_be_bytes()); // questions
    buffer.extend_from_slice(&[0; 6]); // answer, authority, additional

    buffer.extend_from_slice(&qname);
    buffer.extend_from_slice(&kind.code().to_be_bytes());
    buffer.extend_from_slice(&CLASS_IN.to_be_bytes());
    Ok(buffer)
}

fn encode_dns_name(name: &str) -> anyhow::Result<Vec<u8>> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        bail!("{name:?} is not a valid DNS name length");
    }

    let mut encoded: Vec<u8> = Vec::with_capacity(name.len() + 2);
    for label in name.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            bail!("label {label:?} of {name} must be 1 to {MAX_LABEL_LEN} bytes");
        }
        encoded.push(label.len() as u8);
        encoded.extend_from_slice(label.as_bytes());
    }
    encoded.push(0);
    Ok(encoded)
}

/// Decodes a response and checks it belongs to the query `expected_id`.
///
/// NXDOMAIN is not an error: it yields an empty record set with
/// [`DnsAnswer::nx_domain`] set.
pub fn parse_response(payload: &[u8], expected_id: u16) -> Result<DnsAnswer, ResponseError> {
    let packet = Packet::parse(payload).map_err(|e| ResponseError::Malformed(e.to_string()))?;

    if packet.header.query {
        return Err(ResponseError::NotAResponse);
    }
    if packet.header.id != expected_id {
        return Err(ResponseError::IdMismatch {
            expected: expected_id,
            got: packet.header.id,
        });
    }

    let nx_domain = match packet.header.response_code {
        ResponseCode::NoError => false,
        ResponseCode::NameError => true,
        other => return Err(ResponseError::ServerError(format!("{other:?}"))),
    };

    let records = packet
        .answers
        .iter()
        .filter_map(|answer| match &answer.data {
            RData::A(a) => Some(DnsRecord::A(a.0)),
            RData::CNAME(cname) => Some(DnsRecord::Cname(cname.0.to_string())),
            RData::NS(ns) => Some(DnsRecord::Ns(ns.0.to_string())),
            _ => None,
        })
        .collect();

    Ok(DnsAnswer {
        id: packet.header.id,
        nx_domain,
        records,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
