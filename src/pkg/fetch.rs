//! Retrieval of package header bytes.
//!
//! Only the leading bytes of a package are needed, so remote packages are
//! requested with an HTTP `Range` header and the body is capped locally as
//! well, in case the server ignores the range and streams the whole file.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use log::{debug, info, warn};
use ureq::{Agent, Proxy};
use super::types::error::FetchError;

/// Bytes `0..=10000` of a package. Large enough for every known header.
pub const DEFAULT_HEADER_BYTES: u64 = 10_001;

/// Settings for header retrieval.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// Upper bound on the bytes requested and read.
    pub max_bytes: u64,
    /// Total attempts per URL, counting the first one.
    pub max_attempts: u32,
    /// Pause between attempts after a transient failure.
    pub retry_delay: Duration,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Proxy for remote requests; defaults to the `*_PROXY` environment.
    pub proxy: Option<Proxy>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_HEADER_BYTES,
            max_attempts: 10,
            retry_delay: Duration::from_millis(250),
            timeout: Some(Duration::from_secs(30)),
            user_agent: Some(concat!("vita-pkginfo/", env!("CARGO_PKG_VERSION")).to_string()),
            proxy: Proxy::try_from_env(),
        }
    }
}

impl FetchConfig {
    /// Builds an HTTP `Agent` with this config's proxy, timeout and user agent.
    pub fn build_agent(&self) -> Agent {
        let mut config = Agent::config_builder()
            .proxy(self.proxy.clone())
            .timeout_global(self.timeout);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

/// Where a package comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// `http://` and `https://` targets are URLs, anything else is a path.
    pub fn parse(target: &str) -> Self {
        let lower = target.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(target.to_string())
        } else {
            Self::File(PathBuf::from(target))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches header bytes with a shared agent.
///
/// The agent is safe to use from several threads, so one fetcher can serve a
/// whole batch.
#[derive(Clone)]
pub struct HeaderFetcher {
    agent: Agent,
    config: FetchConfig,
}

impl HeaderFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            agent: config.build_agent(),
            config,
        }
    }

    /// Loads the leading bytes of `source`.
    pub fn load(&self, source: &Source) -> Result<Vec<u8>, FetchError> {
        match source {
            Source::Url(url) => self.fetch_header(url),
            Source::File(path) => read_file_header(path, self.config.max_bytes),
        }
    }

    /// Downloads at most `max_bytes` leading bytes of `url`.
    ///
    /// Transient network failures are retried up to `max_attempts` times in
    /// total. HTTP error statuses are returned immediately.
    pub fn fetch_header(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let range = format!("bytes=0-{}", self.config.max_bytes.saturating_sub(1));
        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!("GET {} ({}), attempt {}/{}", url, range, attempt, attempts);
            match self.try_fetch(url, &range) {
                Ok(bytes) => {
                    info!("Fetched {} header bytes from {}", bytes.len(), url);
                    return Ok(bytes);
                }
                Err(err) if is_transient(&err) => {
                    if attempt >= attempts {
                        return Err(FetchError::RetriesExhausted {
                            url: url.to_string(),
                            attempts,
                            source: Box::new(err),
                        });
                    }
                    warn!("Transient error fetching {}: {}; retrying", url, err);
                    thread::sleep(self.config.retry_delay);
                    attempt += 1;
                }
                Err(ureq::Error::StatusCode(status)) => {
                    return Err(FetchError::Http {
                        status,
                        url: url.to_string(),
                    });
                }
                Err(err) => return Err(FetchError::Network(Box::new(err))),
            }
        }
    }

    fn try_fetch(&self, url: &str, range: &str) -> Result<Vec<u8>, ureq::Error> {
        let response = self.agent.get(url).header("Range", range).call()?;
        debug!("{} answered {}", url, response.status());

        let mut buffer = Vec::new();
        response
            .into_body()
            .into_reader()
            .take(self.config.max_bytes)
            .read_to_end(&mut buffer)
            .map_err(ureq::Error::Io)?;
        Ok(buffer)
    }
}

/// Whether a request failure is worth another attempt.
pub fn is_transient(err: &ureq::Error) -> bool {
    match err {
        ureq::Error::ConnectionFailed | ureq::Error::Timeout(_) => true,
        ureq::Error::Io(io_err) => matches!(
            io_err.kind(),
            io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::TimedOut
                | io::ErrorKind::UnexpectedEof
                | io::ErrorKind::Interrupted
        ),
        _ => false,
    }
}

/// Reads at most `max_bytes` leading bytes of a local file.
pub fn read_file_header(path: &Path, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    let mut buffer = Vec::new();
    File::open(path)?.take(max_bytes).read_to_end(&mut buffer)?;
    debug!("Read {} header bytes from {}", buffer.len(), path.display());
    Ok(buffer)
}
