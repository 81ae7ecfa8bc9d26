use kiln::error::{Error, Result};
use kiln::versions::{spawn_loader, HttpVersionSource, VersionSource, VersionsLoader};
use std::thread;
use std::time::Duration;
use test_log::test;

struct StubSource {
    versions: Result<Vec<String>>,
    delay: Duration,
}

impl StubSource {
    fn ok(versions: &[&str]) -> Self {
        Self { versions: Ok(versions.iter().map(|v| v.to_string()).collect()), delay: Duration::ZERO }
    }

    fn failing() -> Self {
        Self { versions: Err(Error::RemoteError("503 Service Unavailable".to_string())), delay: Duration::ZERO }
    }
}

impl VersionSource for StubSource {
    fn fetch(&self) -> Result<Vec<String>> {
        thread::sleep(self.delay);
        match &self.versions {
            Ok(versions) => Ok(versions.clone()),
            Err(e) => Err(Error::RemoteError(e.to_string())),
        }
    }
}

#[test]
fn test_join_returns_versions() {
    let loader = VersionsLoader::spawn(StubSource::ok(&["7.2.1", "7.1.3"]));
    assert_eq!(loader.join(Duration::from_secs(5)), vec!["7.2.1", "7.1.3"]);
}

#[test]
fn test_failed_fetch_yields_empty_list() {
    let loader = VersionsLoader::spawn(StubSource::failing());
    assert!(loader.join(Duration::from_secs(5)).is_empty());
}

#[test]
fn test_slow_fetch_times_out() {
    let source = StubSource { delay: Duration::from_secs(2), ..StubSource::ok(&["7.2.1"]) };
    let loader = VersionsLoader::spawn(source);
    assert!(loader.join(Duration::from_millis(50)).is_empty());
}

#[test]
fn test_invalid_url() {
    assert!(matches!(HttpVersionSource::new("not a url"), Err(Error::ConfigError(_))));
    assert!(HttpVersionSource::new("https://repo.example.org/versions.json").is_ok());
}

#[test]
fn test_no_endpoint_means_no_loader() {
    assert!(spawn_loader(None).unwrap().is_none());
    assert!(matches!(spawn_loader(Some("not a url")), Err(Error::ConfigError(_))));
}
