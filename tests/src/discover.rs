use std::fs;
use std::net::IpAddr;

use hostmap_common::Error;
use hostmap_core::assessment::{HOSTS_JSON, HOSTS_TXT};
use hostmap_core::discover;
use hostmap_plugins::default_collectors;

use crate::support::{StubTransport, config, context};

#[tokio::test]
async fn persists_only_resolved_hosts() {
    let root = tempfile::tempdir().unwrap();
    let list = root.path().join("candidates.txt");
    fs::write(&list, "www.example.com\napi.example.com\nghost.example.com\n").unwrap();

    let mut cfg = config(root.path());
    cfg.host_list = Some(list);
    cfg.only_collectors = vec!["host-list".into()];

    let stub = StubTransport::default()
        .with_a("www.example.com", [93, 184, 216, 34])
        .with_a("api.example.com", [93, 184, 216, 35]);
    let (ctx, reporter) = context(cfg, stub);

    let outcome = discover(&ctx, "example.com", default_collectors()).await.unwrap();

    assert!(!outcome.wildcard.is_wildcard);
    assert_eq!(outcome.candidates, 4, "root domain plus three listed names");
    assert_eq!(outcome.hosts.len(), 2);
    assert!(outcome.faults.is_empty());
    assert_eq!(reporter.hosts.lock().unwrap().len(), 2);

    let dir = root.path().join("example.com");
    assert_eq!(
        fs::read_to_string(dir.join(HOSTS_TXT)).unwrap(),
        "api.example.com,93.184.216.35\nwww.example.com,93.184.216.34\n"
    );
    let json: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(dir.join(HOSTS_JSON)).unwrap()).unwrap();
    assert_eq!(json.len(), 2);
    assert_eq!(json["www.example.com"], "93.184.216.34");
}

#[tokio::test]
async fn private_addresses_are_excluded() {
    let root = tempfile::tempdir().unwrap();
    let list = root.path().join("candidates.txt");
    fs::write(&list, "intranet.example.com\nwww.example.com\n").unwrap();

    let mut cfg = config(root.path());
    cfg.host_list = Some(list);
    cfg.only_collectors = vec!["host-list".into()];
    cfg.ignore_private = true;

    let stub = StubTransport::default()
        .with_a("intranet.example.com", [10, 0, 0, 8])
        .with_a("www.example.com", [93, 184, 216, 34]);
    let (ctx, _reporter) = context(cfg, stub);

    let outcome = discover(&ctx, "example.com", default_collectors()).await.unwrap();
    assert_eq!(outcome.hosts.keys().collect::<Vec<_>>(), vec!["www.example.com"]);
}

#[tokio::test]
async fn wildcard_addresses_are_excluded() {
    let root = tempfile::tempdir().unwrap();
    let list = root.path().join("candidates.txt");
    fs::write(&list, "star.example.com\ncdn.example.com\nwww.example.com\n").unwrap();

    let mut cfg = config(root.path());
    cfg.host_list = Some(list);
    cfg.only_collectors = vec!["host-list".into()];

    let stub = StubTransport::default()
        .with_wildcard("example.com", [203, 0, 113, 5])
        .with_a("cdn.example.com", [203, 0, 113, 5])
        .with_a("www.example.com", [93, 184, 216, 34]);
    let (ctx, reporter) = context(cfg, stub);

    let outcome = discover(&ctx, "example.com", default_collectors()).await.unwrap();

    let wildcard_ip: IpAddr = "203.0.113.5".parse().unwrap();
    assert!(outcome.wildcard.is_wildcard);
    assert!(outcome.wildcard.contains(&wildcard_ip));
    assert_eq!(outcome.hosts.keys().collect::<Vec<_>>(), vec!["www.example.com"]);
    assert!(reporter.warnings.lock().unwrap().iter().any(|w| w.contains("wildcard")));

    let dir = root.path().join("example.com");
    assert_eq!(
        fs::read_to_string(dir.join(HOSTS_TXT)).unwrap(),
        "www.example.com,93.184.216.34\n"
    );
    let json: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(dir.join(HOSTS_JSON)).unwrap()).unwrap();
    assert_eq!(json.len(), 1);
}

#[tokio::test]
async fn collector_missing_input_is_reported_as_skipped() {
    let root = tempfile::tempdir().unwrap();
    let mut cfg = config(root.path());
    cfg.only_collectors = vec!["host-list".into()];
    let (ctx, reporter) = context(cfg, StubTransport::default().with_a("example.com", [93, 184, 216, 34]));

    let outcome = discover(&ctx, "example.com", default_collectors()).await.unwrap();

    assert_eq!(outcome.candidates, 1);
    let warnings = reporter.warnings.lock().unwrap();
    assert!(warnings.iter().any(|w| w.starts_with("Skipped collector host-list")));
}

#[tokio::test]
async fn malformed_domain_fails_before_running() {
    let root = tempfile::tempdir().unwrap();
    let (ctx, _reporter) = context(config(root.path()), StubTransport::default());

    let err = discover(&ctx, "not a domain", default_collectors()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidDomain(_)));
    assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
}
