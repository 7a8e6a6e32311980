//! Wire codecs for the protocols hostmap speaks.

pub mod dns;

pub use dns::{DnsAnswer, DnsRecord, RecordKind, ResponseError};
