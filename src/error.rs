use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a page. Fatal to the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to persist page {} fetched from {url}", path.display())]
    Persist {
        url: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A document with no usable structure at all. Missing fields inside an
/// otherwise parseable page never produce this.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("no `table.{marker}` found in the {dataset} list page")]
    MissingListTable {
        dataset: &'static str,
        marker: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("failed to read local page {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
