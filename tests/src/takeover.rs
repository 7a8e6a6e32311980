use std::fs;

use async_trait::async_trait;
use hostmap_core::assessment::{Assessment, HostMap, TAKEOVERS_JSON};
use hostmap_core::takeover;
use hostmap_plugins::{DetectionContext, Detector, DetectorInfo, Plugin, PluginError, Registry, Verdict};
use hostmap_protocols::DnsRecord;

use crate::support::{StubTransport, config, context};

/// Flags any CNAME pointing into `suffix`.
struct DanglingCname {
    suffix: &'static str,
}

impl Plugin for DanglingCname {
    fn name(&self) -> &str {
        "Dangling Bucket"
    }
}

#[async_trait]
impl Detector for DanglingCname {
    fn info(&self) -> DetectorInfo {
        DetectorInfo {
            service: "Bucket Hosting".into(),
            service_website: "https://buckets.example.net".into(),
            description: "CNAME points at an unclaimed bucket".into(),
        }
    }

    async fn run(&self, ctx: &DetectionContext<'_>) -> Result<Verdict, PluginError> {
        match ctx.resource {
            DnsRecord::Cname(target) if target.ends_with(self.suffix) => Ok(Verdict::Positive),
            _ => Ok(Verdict::Negative),
        }
    }
}

fn detectors() -> Registry<dyn Detector> {
    let detectors: Vec<Box<dyn Detector>> = vec![Box::new(DanglingCname {
        suffix: ".buckets.example.net",
    })];
    Registry::new(detectors)
}

#[tokio::test]
async fn dangling_cname_is_reported_and_persisted() {
    let root = tempfile::tempdir().unwrap();
    let assessment = Assessment::open(root.path(), "example.com").unwrap();
    let hosts = HostMap::from([
        ("assets.example.com".to_string(), "198.51.100.4".parse().unwrap()),
        ("www.example.com".to_string(), "93.184.216.34".parse().unwrap()),
    ]);
    assessment.write_hosts(&hosts).unwrap();

    let stub = StubTransport::default()
        .with_cname("assets.example.com", "old-site.buckets.example.net")
        .with_a("www.example.com", [93, 184, 216, 34]);
    let (ctx, reporter) = context(config(root.path()), stub);

    let outcome = takeover(&ctx, "example.com", detectors()).await.unwrap();

    assert_eq!(outcome.checked, 2);
    assert_eq!(outcome.vulnerable(), 1);
    assert_eq!(outcome.not_vulnerable(), 1);
    assert_eq!(*reporter.takeovers.lock().unwrap(), vec!["assets.example.com".to_string()]);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(assessment.dir().join(TAKEOVERS_JSON)).unwrap()).unwrap();
    assert_eq!(json["assets.example.com"]["service"], "Bucket Hosting");
    assert_eq!(json["assets.example.com"]["resource"]["type"], "CNAME");
    assert!(json.get("www.example.com").is_none());
}

#[tokio::test]
async fn disabled_detectors_leave_nothing_to_check() {
    let root = tempfile::tempdir().unwrap();
    let assessment = Assessment::open(root.path(), "example.com").unwrap();
    assessment
        .write_hosts(&HostMap::from([("www.example.com".to_string(), "93.184.216.34".parse().unwrap())]))
        .unwrap();

    let mut cfg = config(root.path());
    cfg.disable_detectors = vec!["dangling-bucket".into()];
    let (ctx, reporter) = context(cfg, StubTransport::default());

    let outcome = takeover(&ctx, "example.com", detectors()).await.unwrap();
    assert_eq!(outcome.checked, 0);
    assert_eq!(reporter.warnings.lock().unwrap().len(), 1);
}
