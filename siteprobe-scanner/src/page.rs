use crate::error::{Result, ScanError};
use crate::record::{Heading, PageRecord};
use crate::taxonomy::{
    Finding, IssueKind, MAX_META_DESCRIPTION_LEN, MAX_TITLE_LEN, MIN_CONTENT_WORDS,
    SLOW_RESPONSE_THRESHOLD,
};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

/// Normalize user-supplied input into an absolute URL: default a missing
/// scheme to https and strip the trailing slash from non-root paths.
/// Malformed input is the only synchronous rejection in the engine.
pub fn normalize_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScanError::InvalidUrl("empty URL".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme)
        .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", trimmed, e)))?;

    if url.host_str().is_none() {
        return Err(ScanError::InvalidUrl(format!("{}: no host", trimmed)));
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Ok(url)
}

/// Fetches one page and produces a `PageRecord`. Pure function of its
/// input modulo the fetch itself, so a retry is always safe. Retrieval
/// failures come back as data, never as an error, so a site scan keeps
/// going when one page dies.
pub struct PageAnalyzer {
    client: Client,
    include_subdomains: bool,
}

impl PageAnalyzer {
    pub fn new() -> Self {
        Self::with_options(10, true)
    }

    pub fn with_options(timeout_secs: u64, follow_redirects: bool) -> Self {
        let redirect_policy = if follow_redirects {
            reqwest::redirect::Policy::limited(5)
        } else {
            reqwest::redirect::Policy::none()
        };

        let client = Client::builder()
            .user_agent(concat!("Siteprobe/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .redirect(redirect_policy)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            include_subdomains: false,
        }
    }

    pub fn with_include_subdomains(mut self, include_subdomains: bool) -> Self {
        self.include_subdomains = include_subdomains;
        self
    }

    pub async fn analyze(&self, url: &Url) -> PageRecord {
        debug!("Analyzing {}", url);

        let start = Instant::now();
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Fetch failed for {}: {}", url, e);
                return PageRecord::with_error(
                    url.as_str().to_string(),
                    format!("failed to fetch {}: {}", url, e),
                );
            }
        };

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Body read failed for {}: {}", url, e);
                return PageRecord::with_error(
                    url.as_str().to_string(),
                    format!("failed to read body of {}: {}", url, e),
                );
            }
        };
        let load_time = start.elapsed();

        let is_html = content_type
            .as_ref()
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);

        let mut record = if is_html {
            parse_page(url, &body, self.include_subdomains)
        } else {
            PageRecord::new(url.as_str().to_string())
        };
        record.status_code = status_code;
        record.response_size = body.len();
        record.load_time = load_time;

        if is_html {
            audit_page(&mut record);
        }

        record
    }
}

impl Default for PageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_page(url: &Url, html: &str, include_subdomains: bool) -> PageRecord {
    let document = Html::parse_document(html);
    let mut record = PageRecord::new(url.as_str().to_string());

    let title_selector = Selector::parse("head title").unwrap();
    record.title = document
        .select(&title_selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let meta_selector = Selector::parse(r#"meta[name="description"]"#).unwrap();
    record.meta_description = document
        .select(&meta_selector)
        .next()
        .and_then(|m| m.value().attr("content"))
        .unwrap_or("")
        .trim()
        .to_string();

    let heading_selector = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
    for element in document.select(&heading_selector) {
        let name = element.value().name();
        let level = name[1..].parse::<u8>().unwrap_or(1);
        record.headings.push(Heading {
            level,
            text: element.text().collect::<String>().trim().to_string(),
        });
    }

    let img_selector = Selector::parse("img").unwrap();
    for element in document.select(&img_selector) {
        record.image_count += 1;
        let has_alt = element
            .value()
            .attr("alt")
            .map(|alt| !alt.trim().is_empty())
            .unwrap_or(false);
        if !has_alt {
            record.images_missing_alt += 1;
        }
    }

    let link_selector = Selector::parse("a[href]").unwrap();
    for element in document.select(&link_selector) {
        if let Some(href) = element.value().attr("href")
            && let Some(resolved) = resolve_href(url, href)
        {
            if is_internal(&resolved, url, include_subdomains) {
                record.internal_links += 1;
            } else {
                record.external_links += 1;
            }
        }
    }

    let body_selector = Selector::parse("body").unwrap();
    if let Some(body) = document.select(&body_selector).next() {
        record.word_count = body
            .text()
            .map(|chunk| chunk.split_whitespace().count())
            .sum();
    }

    record
}

/// Append findings for everything the parsed page gets wrong. Zero H1s and
/// multiple H1s are distinct findings and can never co-occur.
fn audit_page(record: &mut PageRecord) {
    if record.title.is_empty() {
        record
            .findings
            .push(Finding::of(IssueKind::MissingTitle, "Page has no <title> element"));
    } else if record.title.chars().count() > MAX_TITLE_LEN {
        record.findings.push(Finding::of(
            IssueKind::TitleTooLong,
            format!(
                "Title is {} characters (recommended maximum {})",
                record.title.chars().count(),
                MAX_TITLE_LEN
            ),
        ));
    }

    if record.meta_description.is_empty() {
        record.findings.push(Finding::of(
            IssueKind::MissingMetaDescription,
            "Page has no meta description",
        ));
    } else if record.meta_description.chars().count() > MAX_META_DESCRIPTION_LEN {
        record.findings.push(Finding::of(
            IssueKind::MetaDescriptionTooLong,
            format!(
                "Meta description is {} characters (recommended maximum {})",
                record.meta_description.chars().count(),
                MAX_META_DESCRIPTION_LEN
            ),
        ));
    }

    let h1_count = record.headings.iter().filter(|h| h.level == 1).count();
    if h1_count == 0 {
        record
            .findings
            .push(Finding::of(IssueKind::MissingH1, "Page has no H1 heading"));
    } else if h1_count > 1 {
        record.findings.push(Finding::of(
            IssueKind::MultipleH1,
            format!("Page has {} H1 headings", h1_count),
        ));
    }

    if record.images_missing_alt > 0 {
        record.findings.push(Finding::of(
            IssueKind::MissingAltText,
            format!(
                "{} of {} images have no alt text",
                record.images_missing_alt, record.image_count
            ),
        ));
    }

    if record.status_code < 400 && record.word_count < MIN_CONTENT_WORDS {
        record.findings.push(Finding::of(
            IssueKind::ThinContent,
            format!("Page body has only {} words", record.word_count),
        ));
    }

    if record.load_time > SLOW_RESPONSE_THRESHOLD {
        record.findings.push(Finding::of(
            IssueKind::SlowResponse,
            format!("Page took {} ms to load", record.load_time.as_millis()),
        ));
    }
}

fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    // Skip empty, javascript:, mailto:, tel:, and fragment-only links
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
    {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

fn is_internal(link: &Url, base: &Url, include_subdomains: bool) -> bool {
    let (Some(host), Some(base_host)) = (link.host_str(), base.host_str()) else {
        return false;
    };
    host == base_host || (include_subdomains && host.ends_with(&format!(".{}", base_host)))
}
