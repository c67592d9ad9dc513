use crate::config::FetchConfig;
use crate::error::{FetchError, ScrapeError};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use scraper::Html;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Where raw page bytes come from. One call is one request.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP GET, no retries.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (k, v) in &config.headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .with_context(|| format!("invalid header name {k}"))?;
            let value = HeaderValue::from_str(v)
                .with_context(|| format!("invalid header value for {k}"))?;
            headers.insert(name, value);
        }

        if let Some(user_agent) = &config.user_agent {
            headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let resp = self.client.get(url).send().map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(resp.bytes().map_err(transport)?.to_vec())
    }
}

/// A page persisted on disk under its logical key.
#[derive(Debug, Clone)]
pub struct LocalPage {
    pub key: String,
    pub path: PathBuf,
}

impl LocalPage {
    pub fn read_html(&self) -> Result<Html, ScrapeError> {
        let bytes = std::fs::read(&self.path).map_err(|source| ScrapeError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(Html::parse_document(&String::from_utf8_lossy(&bytes)))
    }
}

/// Fetch-if-needed over a directory of raw pages.
pub struct PageStore<'a> {
    root: PathBuf,
    source: &'a dyn PageSource,
    fetched: Cell<usize>,
}

impl<'a> PageStore<'a> {
    pub fn new(root: impl Into<PathBuf>, source: &'a dyn PageSource) -> Self {
        Self {
            root: root.into(),
            source,
            fetched: Cell::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `key` may contain `/` to place the page in a sub-directory.
    pub fn page_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.html"))
    }

    /// Returns the local copy of `key`, fetching `source_url` first when
    /// `force_refresh` is set or no copy exists yet.
    pub fn ensure(
        &self,
        key: &str,
        source_url: &str,
        force_refresh: bool,
    ) -> Result<LocalPage, FetchError> {
        let path = self.page_path(key);
        if !force_refresh && path.exists() {
            debug!(key, path = %path.display(), "reusing local page");
            return Ok(LocalPage {
                key: key.to_string(),
                path,
            });
        }

        let body = self.source.fetch(source_url)?;
        let persist = |source| FetchError::Persist {
            url: source_url.to_string(),
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(persist)?;
        }
        std::fs::write(&path, &body).map_err(persist)?;
        self.fetched.set(self.fetched.get() + 1);

        info!(
            key,
            url = %source_url,
            bytes = body.len(),
            "fetched page"
        );

        Ok(LocalPage {
            key: key.to_string(),
            path,
        })
    }

    pub fn fetched(&self) -> usize {
        self.fetched.get()
    }
}
