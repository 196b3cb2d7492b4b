use crate::taxonomy::{Finding, IssueKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One heading element in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// Everything the single-page analyzer learned about one URL. Countable
/// fields always carry a value, zero when nothing was parsed, so callers
/// never have to null-check counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    /// HTTP status, 0 when the page could not be reached at all.
    pub status_code: u16,
    pub title: String,
    pub meta_description: String,
    pub headings: Vec<Heading>,
    pub image_count: usize,
    pub images_missing_alt: usize,
    pub internal_links: usize,
    pub external_links: usize,
    pub word_count: usize,
    pub response_size: usize,
    pub load_time: Duration,
    pub findings: Vec<Finding>,
    pub error: Option<String>,
}

impl PageRecord {
    pub fn new(url: String) -> Self {
        Self {
            url,
            status_code: 0,
            title: String::new(),
            meta_description: String::new(),
            headings: Vec::new(),
            image_count: 0,
            images_missing_alt: 0,
            internal_links: 0,
            external_links: 0,
            word_count: 0,
            response_size: 0,
            load_time: Duration::from_secs(0),
            findings: Vec::new(),
            error: None,
        }
    }

    /// Record for a page that could not be retrieved or parsed: zeroed
    /// counts, the failure stored as data, and exactly one content/error
    /// finding describing it.
    pub fn with_error(url: String, error: String) -> Self {
        let mut record = Self::new(url);
        record.findings.push(Finding::of(IssueKind::FetchFailed, error.clone()));
        record.error = Some(error);
        record
    }
}
