// Report rendering for scan results. Rendering returns strings; where
// they go (screen, file) is the caller's concern.

use siteprobe_scanner::record::PageRecord;
use siteprobe_scanner::scanner::ScanReport;
use siteprobe_scanner::taxonomy::IssueSeverity;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

fn severity_counts(report: &ScanReport) -> (usize, usize, usize) {
    let mut high = 0;
    let mut medium = 0;
    let mut low = 0;
    for issue in &report.issues {
        match issue.severity {
            IssueSeverity::High => high += issue.count,
            IssueSeverity::Medium => medium += issue.count,
            IssueSeverity::Low => low += issue.count,
        }
    }
    (high, medium, low)
}

fn page_path(page: &PageRecord) -> String {
    Url::parse(&page.url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() { "/".to_string() } else { path }
        })
        .unwrap_or_else(|| page.url.clone())
}

pub fn generate_text_report(data: &ScanReport) -> String {
    let mut report = String::new();

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                          SITEPROBE SCAN REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Domain:        {}\n", data.domain));
    report.push_str(&format!("Pages scanned: {}\n", data.total_pages));
    report.push_str(&format!("Scan time:     {} ms\n", data.scan_time.as_millis()));

    if !data.errors.is_empty() {
        report.push_str(&format!("Fetch errors:  {}\n", data.errors.len()));
    }
    report.push('\n');

    // Issue summary
    let (high, medium, low) = severity_counts(data);
    let total = high + medium + low;

    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("ISSUE SUMMARY\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str(&format!("Total issue occurrences: {}\n\n", total));

    if high > 0 {
        report.push_str(&format!("  [HIGH]   {}  (Fix first)\n", high));
    }
    if medium > 0 {
        report.push_str(&format!("  [MEDIUM] {}  (Should be addressed)\n", medium));
    }
    if low > 0 {
        report.push_str(&format!("  [LOW]    {}  (Minor improvements)\n", low));
    }
    report.push('\n');

    // Detailed issues
    if !data.issues.is_empty() {
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        report.push_str("TECHNICAL ISSUES\n");
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        for (idx, issue) in data.issues.iter().enumerate() {
            report.push_str(&format!("[{}] {}\n", idx + 1, issue.description));
            report.push_str(&format!("Severity:     {}\n", issue.severity.as_str().to_uppercase()));
            report.push_str(&format!("Occurrences:  {}\n", issue.count));
            report.push_str(&format!("Recommendation:\n  {}\n", issue.recommendation));

            if !issue.urls.is_empty() {
                report.push_str("Affected pages (sample):\n");
                for url in &issue.urls {
                    report.push_str(&format!("  - {}\n", url));
                }
            }
            report.push('\n');
        }
    }

    // Per-page listing
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("PAGES\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    for page in &data.pages {
        let marker = match page.status_code {
            200..=299 => "✓",
            300..=399 => "→",
            400..=499 => "⚠",
            500..=599 => "✗",
            _ => "?",
        };
        let mut line = format!("  {} {:>3} {}", marker, page.status_code, page_path(page));
        if !page.title.is_empty() {
            line.push_str(&format!("  ({})", page.title));
        }
        if !page.findings.is_empty() {
            line.push_str(&format!("  [{} findings]", page.findings.len()));
        }
        report.push_str(&line);
        report.push('\n');
    }

    report.push('\n');
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                              End of Report\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    report
}

pub fn generate_json_report(data: &ScanReport) -> Result<String, serde_json::Error> {
    let (high, medium, low) = severity_counts(data);

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Siteprobe",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "domain": data.domain,
                "total_pages": data.total_pages,
                "scan_time_ms": data.scan_time.as_millis() as u64,
                "fetch_errors": data.errors,
                "issue_occurrences": high + medium + low,
                "severity_breakdown": {
                    "high": high,
                    "medium": medium,
                    "low": low
                }
            },
            "issues": data.issues,
            "pages": data.pages
        }
    });

    serde_json::to_string_pretty(&json_report)
}
