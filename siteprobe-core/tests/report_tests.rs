// Tests for report rendering

use siteprobe_core::report::{ReportFormat, generate_json_report, generate_text_report};
use siteprobe_scanner::record::PageRecord;
use siteprobe_scanner::scanner::{ScanReport, summarize_issues};
use siteprobe_scanner::taxonomy::{Finding, IssueKind};
use std::time::Duration;

fn sample_report() -> ScanReport {
    let mut home = PageRecord::new("https://example.com/".to_string());
    home.status_code = 200;
    home.title = "Home".to_string();
    home.findings.push(Finding::of(
        IssueKind::MissingMetaDescription,
        "Page has no meta description",
    ));

    let mut missing = PageRecord::new("https://example.com/missing".to_string());
    missing.status_code = 404;
    missing.findings.push(Finding::of(
        IssueKind::BrokenInternalLink,
        "https://example.com/missing answered HTTP 404",
    ));

    let pages = vec![home, missing];
    let issues = summarize_issues(&pages);

    ScanReport {
        domain: "example.com".to_string(),
        total_pages: pages.len(),
        pages,
        errors: Vec::new(),
        scan_time: Duration::from_millis(1234),
        issues,
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str_text() {
    assert!(matches!(ReportFormat::from_str("text"), Some(ReportFormat::Text)));
}

#[test]
fn test_report_format_from_str_json() {
    assert!(matches!(ReportFormat::from_str("json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert!(matches!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text)));
    assert!(matches!(ReportFormat::from_str("Json"), Some(ReportFormat::Json)));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("html").is_none());
    assert!(ReportFormat::from_str("").is_none());
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_contains_summary() {
    let report = generate_text_report(&sample_report());

    assert!(report.contains("example.com"));
    assert!(report.contains("Pages scanned: 2"));
    assert!(report.contains("Scan time:     1234 ms"));
}

#[test]
fn test_text_report_lists_issues_with_severity() {
    let report = generate_text_report(&sample_report());

    assert!(report.contains("[HIGH]"));
    assert!(report.contains("Internal page answered with an error status"));
    assert!(report.contains("Page has no meta description"));
    assert!(report.contains("Fix or remove links"));
}

#[test]
fn test_text_report_lists_pages_with_status() {
    let report = generate_text_report(&sample_report());

    assert!(report.contains("200 /"));
    assert!(report.contains("404 /missing"));
    assert!(report.contains("(Home)"));
}

#[test]
fn test_text_report_handles_empty_scan() {
    let empty = ScanReport {
        domain: "example.com".to_string(),
        pages: Vec::new(),
        total_pages: 0,
        errors: Vec::new(),
        scan_time: Duration::from_millis(5),
        issues: Vec::new(),
    };
    let report = generate_text_report(&empty);
    assert!(report.contains("Pages scanned: 0"));
    assert!(!report.contains("TECHNICAL ISSUES"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_is_valid_json_with_summary() {
    let json = generate_json_report(&sample_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["report"]["summary"]["domain"], "example.com");
    assert_eq!(value["report"]["summary"]["total_pages"], 2);
    assert_eq!(value["report"]["metadata"]["generator"], "Siteprobe");
}

#[test]
fn test_json_report_severity_breakdown() {
    let json = generate_json_report(&sample_report()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let breakdown = &value["report"]["summary"]["severity_breakdown"];
    assert_eq!(breakdown["high"], 1);
    assert_eq!(breakdown["medium"], 1);
}

#[test]
fn test_json_report_carries_issue_taxonomy_names() {
    let json = generate_json_report(&sample_report()).unwrap();
    assert!(json.contains("broken_internal_link"));
    assert!(json.contains("missing_meta_description"));
}
