//! TCP connect liveness checks.

use std::io::{self, ErrorKind};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

/// Attempts a TCP connect to `ip:port`, closing the connection right away
/// on success.
///
/// Timeouts and the usual refused/unreachable failures mean "closed" and
/// yield `Ok(false)`. Any other socket error is returned so the caller can
/// record it as a fault.
pub async fn probe(ip: IpAddr, port: u16, limit: Duration) -> io::Result<bool> {
    let addr = SocketAddr::new(ip, port);
    match timeout(limit, TcpStream::connect(addr)).await {
        Err(_elapsed) => Ok(false),
        Ok(Ok(stream)) => {
            drop(stream);
            Ok(true)
        }
        Ok(Err(e)) if is_closed(&e) => Ok(false),
        Ok(Err(e)) => Err(e),
    }
}

/// Like [`probe`], but any failure counts as closed.
pub async fn is_open(ip: IpAddr, port: u16, limit: Duration) -> bool {
    probe(ip, port, limit).await.unwrap_or(false)
}

fn is_closed(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::HostUnreachable
            | ErrorKind::NetworkUnreachable
            | ErrorKind::NetworkDown
            | ErrorKind::TimedOut
            | ErrorKind::AddrNotAvailable
            | ErrorKind::NotConnected
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
