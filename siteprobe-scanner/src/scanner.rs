use crate::discovery::{CommonPaths, UrlDiscovery};
use crate::error::Result;
use crate::page::{PageAnalyzer, normalize_url};
use crate::record::PageRecord;
use crate::taxonomy::{Finding, IssueKind, IssueSeverity};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::info;

/// Options for configuring a site scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Upper bound on pages analyzed. 0 means unbounded.
    pub max_pages: usize,
    /// Treat subdomain links as internal.
    pub include_subdomains: bool,
    pub follow_redirects: bool,
    /// Pages fetched concurrently during a scan.
    pub concurrency: usize,
    pub timeout_secs: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_pages: 10,
            include_subdomains: false,
            follow_redirects: true,
            concurrency: 4,
            timeout_secs: 10,
        }
    }
}

/// Cap on sample URLs carried by one technical-issue summary.
pub const MAX_SAMPLE_URLS: usize = 5;

/// Same-kind findings aggregated across a whole scan. Derived once, never
/// mutated afterwards; severity comes from the fixed taxonomy mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalIssueSummary {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub count: usize,
    /// Up to MAX_SAMPLE_URLS distinct affected URLs, first seen first.
    pub urls: Vec<String>,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub domain: String,
    /// Per-page records in discovery order.
    pub pages: Vec<PageRecord>,
    pub total_pages: usize,
    pub errors: Vec<String>,
    pub scan_time: Duration,
    pub issues: Vec<TechnicalIssueSummary>,
}

/// Analyzes a bounded set of pages discovered from a root URL and
/// aggregates the per-page findings into a scan report.
pub struct SiteScanner {
    analyzer: PageAnalyzer,
    discovery: Box<dyn UrlDiscovery>,
    options: ScanOptions,
}

impl SiteScanner {
    pub fn new(options: ScanOptions) -> Self {
        let analyzer = PageAnalyzer::with_options(options.timeout_secs, options.follow_redirects)
            .with_include_subdomains(options.include_subdomains);
        Self {
            analyzer,
            discovery: Box::new(CommonPaths),
            options,
        }
    }

    pub fn with_discovery(mut self, discovery: Box<dyn UrlDiscovery>) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan up to `max_pages` pages reachable from `root`. One page
    /// failing never aborts the scan; only a malformed root errors.
    pub async fn scan(&self, root: &str) -> Result<ScanReport> {
        let root_url = normalize_url(root)?;
        let domain = root_url.host_str().unwrap_or("unknown").to_string();
        let bound = if self.options.max_pages == 0 {
            usize::MAX
        } else {
            self.options.max_pages
        };

        let start = Instant::now();
        let targets = self.discovery.discover(&root_url, bound);
        info!("Starting scan of {} ({} pages)", domain, targets.len());
        let analyzer = &self.analyzer;
        let concurrency = self.options.concurrency.max(1);

        // Buffered (not buffer_unordered) keeps discovery order in `pages`.
        let mut pages: Vec<PageRecord> = futures::stream::iter(targets)
            .map(|url| async move { analyzer.analyze(&url).await })
            .buffered(concurrency)
            .collect()
            .await;

        let mut errors = Vec::new();
        for page in &mut pages {
            if let Some(error) = &page.error {
                errors.push(error.clone());
            }
            flag_broken_link(page);
        }

        let issues = summarize_issues(&pages);
        let scan_time = start.elapsed();
        info!(
            "Scan of {} complete: {} pages, {} issue kinds in {:?}",
            domain,
            pages.len(),
            issues.len(),
            scan_time
        );

        Ok(ScanReport {
            domain,
            total_pages: pages.len(),
            pages,
            errors,
            scan_time,
            issues,
        })
    }
}

/// Tag a scanned internal page that answered with a client or server
/// error status.
pub fn flag_broken_link(page: &mut PageRecord) {
    if page.status_code >= 400 {
        page.findings.push(Finding::of(
            IssueKind::BrokenInternalLink,
            format!("{} answered HTTP {}", page.url, page.status_code),
        ));
    }
}

/// Group findings by issue kind across all pages: occurrence count, up to
/// MAX_SAMPLE_URLS distinct affected URLs in first-seen order, severity and
/// guidance from the taxonomy. Sorted by severity then kind, so the same
/// input always produces the same summaries.
pub fn summarize_issues(pages: &[PageRecord]) -> Vec<TechnicalIssueSummary> {
    let mut grouped: HashMap<IssueKind, (usize, Vec<String>)> = HashMap::new();

    for page in pages {
        for finding in &page.findings {
            let entry = grouped.entry(finding.kind).or_default();
            entry.0 += 1;
            if entry.1.len() < MAX_SAMPLE_URLS && !entry.1.contains(&page.url) {
                entry.1.push(page.url.clone());
            }
        }
    }

    let mut issues: Vec<TechnicalIssueSummary> = grouped
        .into_iter()
        .map(|(kind, (count, urls))| TechnicalIssueSummary {
            kind,
            severity: kind.severity(),
            count,
            urls,
            description: kind.description().to_string(),
            recommendation: kind.recommendation().to_string(),
        })
        .collect();

    issues.sort_by_key(|issue| (issue.severity.rank(), issue.kind.as_str()));
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::FixedList;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page_with(url: &str, kinds: &[IssueKind]) -> PageRecord {
        let mut record = PageRecord::new(url.to_string());
        record.status_code = 200;
        for kind in kinds {
            record.findings.push(Finding::of(*kind, "test"));
        }
        record
    }

    #[test]
    fn test_summarize_counts_and_fixed_severity() {
        let pages = vec![
            page_with("https://a.test/", &[IssueKind::MissingTitle]),
            page_with("https://a.test/x", &[IssueKind::MissingTitle]),
            page_with("https://a.test/y", &[IssueKind::ThinContent]),
        ];
        let issues = summarize_issues(&pages);

        let missing = issues
            .iter()
            .find(|i| i.kind == IssueKind::MissingTitle)
            .unwrap();
        assert_eq!(missing.count, 2);
        assert_eq!(missing.severity, IssueSeverity::High);
        assert_eq!(missing.urls.len(), 2);

        let thin = issues.iter().find(|i| i.kind == IssueKind::ThinContent).unwrap();
        assert_eq!(thin.severity, IssueSeverity::Low);
    }

    #[test]
    fn test_summarize_caps_sample_urls() {
        let pages: Vec<PageRecord> = (0..9)
            .map(|i| {
                page_with(
                    &format!("https://a.test/p{}", i),
                    &[IssueKind::MissingMetaDescription],
                )
            })
            .collect();
        let issues = summarize_issues(&pages);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].count, 9);
        assert_eq!(issues[0].urls.len(), MAX_SAMPLE_URLS);
    }

    #[test]
    fn test_summarize_orders_by_severity_then_kind() {
        let pages = vec![page_with(
            "https://a.test/",
            &[
                IssueKind::ThinContent,
                IssueKind::MissingTitle,
                IssueKind::MissingH1,
            ],
        )];
        let issues = summarize_issues(&pages);
        let ranks: Vec<u8> = issues.iter().map(|i| i.severity.rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted);
        assert_eq!(issues[0].kind, IssueKind::MissingTitle);
    }

    #[test]
    fn test_summarize_deterministic() {
        let pages = vec![
            page_with("https://a.test/", &[IssueKind::MissingTitle, IssueKind::MissingH1]),
            page_with("https://a.test/b", &[IssueKind::MissingH1]),
        ];
        let first = summarize_issues(&pages);
        let second = summarize_issues(&pages);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    async fn mount_page(server: &MockServer, route: &str, html: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(html.as_bytes().to_vec()),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_scan_respects_max_pages_and_sample_cap() {
        let mock_server = MockServer::start().await;
        mount_page(
            &mock_server,
            "/",
            "<html><head><title>Root</title></head><body><h1>Hi</h1></body></html>",
        )
        .await;
        // Unmatched common paths answer 404 by default.

        let options = ScanOptions {
            max_pages: 5,
            concurrency: 2,
            ..Default::default()
        };
        let scanner = SiteScanner::new(options);
        let report = scanner.scan(&mock_server.uri()).await.unwrap();

        assert_eq!(report.total_pages, 5);
        assert_eq!(report.pages.len(), report.total_pages);
        for issue in &report.issues {
            assert!(issue.urls.len() <= MAX_SAMPLE_URLS);
        }
    }

    #[tokio::test]
    async fn test_scan_preserves_discovery_order() {
        let mock_server = MockServer::start().await;
        mount_page(&mock_server, "/", "<html><body>root</body></html>").await;
        mount_page(&mock_server, "/a", "<html><body>a</body></html>").await;
        mount_page(&mock_server, "/b", "<html><body>b</body></html>").await;

        let base = Url::parse(&mock_server.uri()).unwrap();
        let fixed = FixedList(vec![
            base.clone(),
            base.join("/a").unwrap(),
            base.join("/b").unwrap(),
        ]);

        let scanner =
            SiteScanner::new(ScanOptions::default()).with_discovery(Box::new(fixed));
        let report = scanner.scan(&mock_server.uri()).await.unwrap();

        let paths: Vec<String> = report
            .pages
            .iter()
            .map(|p| Url::parse(&p.url).unwrap().path().to_string())
            .collect();
        assert_eq!(paths, vec!["/", "/a", "/b"]);
    }

    #[tokio::test]
    async fn test_scan_flags_broken_internal_pages() {
        let mock_server = MockServer::start().await;
        mount_page(
            &mock_server,
            "/",
            "<html><head><title>Root</title></head><body><h1>Hi</h1></body></html>",
        )
        .await;

        let options = ScanOptions {
            max_pages: 3,
            ..Default::default()
        };
        let scanner = SiteScanner::new(options);
        let report = scanner.scan(&mock_server.uri()).await.unwrap();

        let broken = report
            .issues
            .iter()
            .find(|i| i.kind == IssueKind::BrokenInternalLink)
            .expect("404 common paths should be flagged");
        assert_eq!(broken.severity, IssueSeverity::High);
        assert_eq!(broken.count, 2);
    }

    #[tokio::test]
    async fn test_scan_rejects_malformed_root_only() {
        let scanner = SiteScanner::new(ScanOptions::default());
        assert!(scanner.scan("").await.is_err());
    }
}
