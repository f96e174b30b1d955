// src/core/net.rs
// Blocking HTTP(S) GET. One request at a time; pacing is the caller's job (see Pacer).

use std::{thread, time::Duration};

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use tracing::debug;
use url::Url;

use crate::config::{consts::MAX_REDIRECTS, NetOptions};
use crate::error::{Result, ScrapeError};

/// Anything that can GET a URL. The pipeline only talks to this trait,
/// so fixtures can stand in for the live site.
pub trait Fetch {
    fn get_text(&self, url: &Url) -> Result<String>;
    fn get_bytes(&self, url: &Url) -> Result<Vec<u8>>;
}

pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(opts: &NetOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(opts.timeout)
            .user_agent(opts.user_agent.as_str())
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| ScrapeError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn get(&self, url: &Url) -> Result<reqwest::blocking::Response> {
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| ScrapeError::Request { url: url.to_string(), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status { url: url.to_string(), status: status.as_u16() });
        }
        Ok(resp)
    }
}

impl Fetch for HttpClient {
    fn get_text(&self, url: &Url) -> Result<String> {
        self.get(url)?
            .text()
            .map_err(|source| ScrapeError::Request { url: url.to_string(), source })
    }

    fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let bytes = self
            .get(url)?
            .bytes()
            .map_err(|source| ScrapeError::Request { url: url.to_string(), source })?;
        Ok(bytes.to_vec())
    }
}

/// Fixed blocking pause between successive requests.
/// The first `wait()` returns immediately; every later one sleeps `interval`.
pub struct Pacer {
    interval: Duration,
    primed: bool,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, primed: false }
    }

    pub fn wait(&mut self) {
        if self.primed && !self.interval.is_zero() {
            thread::sleep(self.interval);
        }
        self.primed = true;
    }
}
