use std::collections::BTreeSet;
use std::fs;

use hostmap_common::Error;
use hostmap_core::assessment::{Assessment, HostMap, OPEN_PORTS_TXT, URLS_TXT};
use hostmap_core::scan;
use tokio::net::TcpListener;

use crate::support::{StubTransport, config, context};

/// A port on localhost that was just released, so nothing listens on it.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn open_ports_and_urls_are_persisted() {
    let root = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open = listener.local_addr().unwrap().port();
    let closed = closed_port().await;

    let assessment = Assessment::open(root.path(), "example.com").unwrap();
    let hosts = HostMap::from([
        ("a.example.com".to_string(), "127.0.0.1".parse().unwrap()),
        ("b.example.com".to_string(), "127.0.0.1".parse().unwrap()),
    ]);
    assessment.write_hosts(&hosts).unwrap();

    let mut cfg = config(root.path());
    cfg.ports = vec![open, closed];
    let (ctx, reporter) = context(cfg, StubTransport::default());

    let outcome = scan(&ctx, "example.com").await.unwrap();

    assert_eq!(outcome.probes, 2, "shared address is probed once per port");
    assert_eq!(outcome.open_ports.len(), 1);
    assert_eq!(outcome.open_ports.values().next().unwrap(), &BTreeSet::from([open]));
    assert!(outcome.faults.is_empty());
    assert_eq!(reporter.ports.lock().unwrap().len(), 1);

    let dir = assessment.dir();
    assert_eq!(
        fs::read_to_string(dir.join(OPEN_PORTS_TXT)).unwrap(),
        format!("127.0.0.1,{open}\n")
    );
    assert_eq!(
        fs::read_to_string(dir.join(URLS_TXT)).unwrap(),
        format!("http://a.example.com:{open}/\nhttp://b.example.com:{open}/\n")
    );
}

#[tokio::test]
async fn scan_requires_discovery_results() {
    let root = tempfile::tempdir().unwrap();
    let (ctx, _reporter) = context(config(root.path()), StubTransport::default());

    let err = scan(&ctx, "example.com").await.unwrap_err();
    match err {
        Error::MissingPrerequisite { file, hint, .. } => {
            assert_eq!(file, "hosts.json");
            assert_eq!(hint, "hostmap discover");
        }
        other => panic!("unexpected error: {other}"),
    }
}
