//! Platform versions offered by `init`.
//!
//! The list is fetched on a background thread as soon as the process starts
//! and joined with a timeout right before the version question is asked.

use crate::error::{Error, Result};
use log::{debug, error};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use url::Url;

/// Somewhere platform versions can be read from.
pub trait VersionSource {
    fn fetch(&self) -> Result<Vec<String>>;
}

/// Reads a JSON array of version strings over HTTP.
pub struct HttpVersionSource {
    url: Url,
}

impl HttpVersionSource {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| Error::ConfigError(format!("invalid versions url '{url}': {e}")))?;
        Ok(Self { url })
    }
}

impl VersionSource for HttpVersionSource {
    fn fetch(&self) -> Result<Vec<String>> {
        debug!("Fetching platform versions from {}", self.url);
        reqwest::blocking::get(self.url.as_str())
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json::<Vec<String>>())
            .map_err(|e| Error::RemoteError(e.to_string()))
    }
}

/// A version list being loaded in the background.
pub struct VersionsLoader {
    receiver: Receiver<Result<Vec<String>>>,
}

impl VersionsLoader {
    /// Starts fetching from `source` on a new thread.
    pub fn spawn<S: VersionSource + Send + 'static>(source: S) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            // The receiver is gone when the command finished without asking.
            let _ = sender.send(source.fetch());
        });
        Self { receiver }
    }

    /// Waits up to `timeout` for the list.
    ///
    /// Failures and timeouts are logged and yield an empty list so the
    /// command can continue with a manually entered version.
    pub fn join(self, timeout: Duration) -> Vec<String> {
        match self.receiver.recv_timeout(timeout) {
            Ok(Ok(versions)) => {
                debug!("Loaded {} platform versions", versions.len());
                versions
            }
            Ok(Err(e)) => {
                error!("Failed to load platform versions: {e}");
                Vec::new()
            }
            Err(RecvTimeoutError::Timeout) => {
                error!("Loading platform versions timed out after {}s", timeout.as_secs());
                Vec::new()
            }
            Err(RecvTimeoutError::Disconnected) => {
                error!("Platform versions loader stopped unexpectedly");
                Vec::new()
            }
        }
    }
}

/// Starts loading versions from `url`, or returns `None` when no endpoint
/// is configured.
///
/// # Errors
/// * `Error::ConfigError` if `url` is not a valid URL
pub fn spawn_loader(url: Option<&str>) -> Result<Option<VersionsLoader>> {
    match url {
        Some(url) => Ok(Some(VersionsLoader::spawn(HttpVersionSource::new(url)?))),
        None => {
            debug!("No versions endpoint configured");
            Ok(None)
        }
    }
}

/// Returns true for versions like `7.2.1` or `7.2-SNAPSHOT`.
pub fn is_version(value: &str) -> bool {
    let (numbers, _) = value.split_once('-').unwrap_or((value, ""));
    let parts: Vec<&str> = numbers.split('.').collect();
    (2..=3).contains(&parts.len())
        && parts.iter().all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}
