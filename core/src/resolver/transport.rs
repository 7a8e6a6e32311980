use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use hostmap_protocols::{DnsAnswer, RecordKind, ResponseError, dns};
use tokio::net::UdpSocket;

const MAX_DATAGRAM: usize = 4096;

/// Carries one DNS question to one nameserver and returns its answer.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn query(
        &self,
        nameserver: SocketAddr,
        host: &str,
        kind: RecordKind,
        timeout: Duration,
    ) -> anyhow::Result<DnsAnswer>;
}

/// Plain DNS over UDP. Each query binds its own ephemeral socket, which is
/// closed as soon as the answer (or the timeout) arrives.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpTransport;

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn query(
        &self,
        nameserver: SocketAddr,
        host: &str,
        kind: RecordKind,
        timeout: Duration,
    ) -> anyhow::Result<DnsAnswer> {
        let local: SocketAddr = if nameserver.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local).await.context("binding DNS socket")?;
        socket
            .connect(nameserver)
            .await
            .with_context(|| format!("connecting to {nameserver}"))?;

        let id = dns::random_transaction_id();
        let packet = dns::create_query_packet(host, kind, id)?;

        tokio::time::timeout(timeout, exchange(&socket, &packet, id))
            .await
            .map_err(|_| anyhow!("{kind} query for {host} to {nameserver} timed out"))?
    }
}

async fn exchange(socket: &UdpSocket, packet: &[u8], id: u16) -> anyhow::Result<DnsAnswer> {
    socket.send(packet).await.context("sending DNS query")?;

    let mut buf = [0u8; MAX_DATAGRAM];
    loop {
        let len = socket.recv(&mut buf).await.context("receiving DNS response")?;
        match dns::parse_response(&buf[..len], id) {
            Ok(answer) => return Ok(answer),
            // A late answer to someone else's question; keep waiting for ours.
            Err(ResponseError::IdMismatch { .. }) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
