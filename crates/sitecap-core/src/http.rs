//! HTTP GET for pages and assets.
//!
//! Uses the curl crate (libcurl). Each GET buffers the whole body in memory and
//! is bounded by the configured connect and request timeouts. Transfers run on
//! tokio's blocking pool.

use std::time::Duration;
use url::Url;

use crate::config::HttpConfig;

/// Why a GET failed.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection refused, DNS, TLS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The blocking task died before returning.
    #[error("fetch task failed: {0}")]
    Join(String),
}

impl FetchError {
    /// True when the request never completed (as opposed to an HTTP error status).
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Curl(_))
    }
}

/// Body and final location of a successful GET.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// URL after redirects.
    pub effective_url: Option<String>,
    pub bytes: Vec<u8>,
}

/// Options applied to every transfer.
#[derive(Debug, Clone)]
pub struct HttpClient {
    connect_timeout: Duration,
    request_timeout: Duration,
    max_redirects: u32,
    user_agent: Option<String>,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(&HttpConfig::default())
    }
}

impl HttpClient {
    pub fn new(cfg: &HttpConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout(),
            request_timeout: cfg.request_timeout(),
            max_redirects: cfg.max_redirects,
            user_agent: cfg.user_agent.clone(),
        }
    }

    /// Performs a GET in the current thread; call [`HttpClient::get`] from async code.
    pub fn get_blocking(&self, url: &str) -> Result<FetchedBody, FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirects)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.request_timeout)?;
        // Let libcurl decode any Content-Encoding it supports.
        easy.accept_encoding("")?;
        if let Some(agent) = &self.user_agent {
            easy.useragent(agent)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        let effective_url = easy.effective_url()?.map(str::to_string);

        Ok(FetchedBody {
            effective_url,
            bytes: body,
        })
    }

    /// Runs [`HttpClient::get_blocking`] on the blocking pool.
    pub async fn get(&self, url: &Url) -> Result<FetchedBody, FetchError> {
        let client = self.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || client.get_blocking(&url))
            .await
            .map_err(|e| FetchError::Join(e.to_string()))?
    }
}
