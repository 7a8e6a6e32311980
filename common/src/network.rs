pub mod ip;
pub mod nameserver;
