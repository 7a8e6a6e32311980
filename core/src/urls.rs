use hostmap_common::ports::is_ssl_port;

/// Builds the URL a browser would use for `host` on `port`.
///
/// Ports 80 and 443 are implied; other ports from the SSL table get `https`.
pub fn make_url(host: &str, port: u16) -> String {
    match port {
        80 => format!("http://{host}/"),
        443 => format!("https://{host}/"),
        p if is_ssl_port(p) => format!("https://{host}:{p}/"),
        p => format!("http://{host}:{p}/"),
    }
}
