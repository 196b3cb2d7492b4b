// Tests for performance scoring, vitals classification and caching

use siteprobe_core::perf::{
    CACHE_TTL, DeviceProfile, FixedSource, Impact, MetricSource, PerfMetrics,
    PerformanceAnalyzer, SimulatedSource, VitalStatus, core_web_vitals, opportunities, score,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Metrics comfortably inside every threshold.
fn good_metrics() -> PerfMetrics {
    PerfMetrics {
        fcp_s: 1.0,
        lcp_s: 2.0,
        fid_ms: 50.0,
        cls: 0.05,
        ttfb_s: 0.3,
        si_s: 2.5,
    }
}

// ============================================================================
// Scoring Tests
// ============================================================================

#[test]
fn test_score_all_metrics_within_thresholds() {
    assert_eq!(score(&good_metrics()), 100);
}

#[test]
fn test_score_lcp_penalty_is_fifteen() {
    let mut metrics = good_metrics();
    metrics.lcp_s = 4.2;
    assert_eq!(score(&metrics), 85);
}

#[test]
fn test_score_threshold_is_exclusive() {
    // A value exactly at the threshold is not exceeded.
    let mut metrics = good_metrics();
    metrics.lcp_s = 2.5;
    metrics.fcp_s = 1.8;
    assert_eq!(score(&metrics), 100);
}

#[test]
fn test_score_every_threshold_exceeded() {
    let metrics = PerfMetrics {
        fcp_s: 5.0,
        lcp_s: 6.0,
        fid_ms: 400.0,
        cls: 0.5,
        ttfb_s: 2.0,
        si_s: 9.0,
    };
    // 100 - 10 - 15 - 10 - 15 - 10 - 10
    assert_eq!(score(&metrics), 30);
}

#[test]
fn test_score_is_reproducible() {
    let mut metrics = good_metrics();
    metrics.ttfb_s = 0.9;
    assert_eq!(score(&metrics), score(&metrics));
}

// ============================================================================
// Core Web Vitals Tests
// ============================================================================

fn vital_status(metrics: &PerfMetrics, name: &str) -> VitalStatus {
    core_web_vitals(metrics)
        .into_iter()
        .find(|v| v.metric == name)
        .unwrap()
        .status
}

#[test]
fn test_lcp_over_both_cutoffs_is_poor() {
    let mut metrics = good_metrics();
    metrics.lcp_s = 4.2;
    assert_eq!(vital_status(&metrics, "LCP"), VitalStatus::Poor);
}

#[test]
fn test_lcp_between_cutoffs_needs_improvement() {
    let mut metrics = good_metrics();
    metrics.lcp_s = 3.0;
    assert_eq!(vital_status(&metrics, "LCP"), VitalStatus::NeedsImprovement);
}

#[test]
fn test_lcp_at_good_cutoff_is_good() {
    let mut metrics = good_metrics();
    metrics.lcp_s = 2.5;
    assert_eq!(vital_status(&metrics, "LCP"), VitalStatus::Good);
}

#[test]
fn test_all_four_standard_vitals_present() {
    let vitals = core_web_vitals(&good_metrics());
    let names: Vec<&str> = vitals.iter().map(|v| v.metric.as_str()).collect();
    assert_eq!(names, vec!["FCP", "LCP", "FID", "CLS"]);
}

#[test]
fn test_cls_classification() {
    let mut metrics = good_metrics();
    metrics.cls = 0.3;
    assert_eq!(vital_status(&metrics, "CLS"), VitalStatus::Poor);
    metrics.cls = 0.2;
    assert_eq!(vital_status(&metrics, "CLS"), VitalStatus::NeedsImprovement);
}

// ============================================================================
// Opportunity Tests
// ============================================================================

#[test]
fn test_baseline_opportunities_always_emitted() {
    let out = opportunities(&good_metrics(), DeviceProfile::Desktop);
    assert!(out.iter().any(|o| o.id == "enable-text-compression"));
    assert!(out.iter().any(|o| o.id == "remove-unused-css"));
}

#[test]
fn test_lcp_over_threshold_emits_render_blocking_high_impact() {
    let mut metrics = good_metrics();
    metrics.lcp_s = 4.2;
    let out = opportunities(&metrics, DeviceProfile::Desktop);
    let render_blocking = out
        .iter()
        .find(|o| o.id == "render-blocking-resources")
        .unwrap();
    assert_eq!(render_blocking.impact, Impact::High);
    assert!(render_blocking.estimated_savings_ms > 0);
}

#[test]
fn test_no_conditional_opportunity_without_exceeded_threshold() {
    let out = opportunities(&good_metrics(), DeviceProfile::Desktop);
    assert!(!out.iter().any(|o| o.id == "render-blocking-resources"));
    assert!(!out.iter().any(|o| o.id == "server-response-time"));
}

#[test]
fn test_mobile_always_gets_mobile_opportunity() {
    let mobile = opportunities(&good_metrics(), DeviceProfile::Mobile);
    let desktop = opportunities(&good_metrics(), DeviceProfile::Desktop);
    assert!(mobile.iter().any(|o| o.id == "responsive-images"));
    assert!(!desktop.iter().any(|o| o.id == "responsive-images"));
}

#[test]
fn test_opportunities_ordered_high_impact_first() {
    let mut metrics = good_metrics();
    metrics.lcp_s = 5.0;
    metrics.ttfb_s = 1.5;
    let out = opportunities(&metrics, DeviceProfile::Mobile);
    let ranks: Vec<u8> = out
        .iter()
        .map(|o| match o.impact {
            Impact::High => 0,
            Impact::Medium => 1,
            Impact::Low => 2,
        })
        .collect();
    let mut sorted = ranks.clone();
    sorted.sort();
    assert_eq!(ranks, sorted);
    assert_eq!(out[0].impact, Impact::High);
}

// ============================================================================
// Simulated Source Tests
// ============================================================================

#[test]
fn test_simulated_source_deterministic_per_url() {
    let url = Url::parse("https://example.com/").unwrap();
    let first = SimulatedSource.collect(&url, DeviceProfile::Desktop);
    let second = SimulatedSource.collect(&url, DeviceProfile::Desktop);
    assert_eq!(first.fcp_s, second.fcp_s);
    assert_eq!(first.lcp_s, second.lcp_s);
    assert_eq!(first.fid_ms, second.fid_ms);
    assert_eq!(first.cls, second.cls);
}

#[test]
fn test_mobile_slowdown_applied_to_render_metrics() {
    let url = Url::parse("https://example.com/").unwrap();
    let desktop = SimulatedSource.collect(&url, DeviceProfile::Desktop);
    let mobile = SimulatedSource.collect(&url, DeviceProfile::Mobile);

    assert!(mobile.fcp_s > desktop.fcp_s);
    assert!(mobile.lcp_s > desktop.lcp_s);
    assert!(mobile.si_s > desktop.si_s);
    assert!(mobile.fid_ms > desktop.fid_ms);
    // CLS is not device-sensitive in the simulation.
    assert_eq!(mobile.cls, desktop.cls);
}

#[test]
fn test_different_urls_differ() {
    let a = SimulatedSource.collect(
        &Url::parse("https://example.com/").unwrap(),
        DeviceProfile::Desktop,
    );
    let b = SimulatedSource.collect(
        &Url::parse("https://other.example.net/").unwrap(),
        DeviceProfile::Desktop,
    );
    assert!(a.fcp_s != b.fcp_s || a.lcp_s != b.lcp_s);
}

// ============================================================================
// Analyzer + Cache Tests
// ============================================================================

#[test]
fn test_analyzer_scores_fixed_metrics() {
    let mut metrics = good_metrics();
    metrics.lcp_s = 4.2;
    let analyzer = PerformanceAnalyzer::with_source(Arc::new(FixedSource(metrics)));

    let report = analyzer
        .analyze("https://example.com", DeviceProfile::Desktop)
        .unwrap();
    assert_eq!(report.score, 85);

    let lcp = report.vitals.iter().find(|v| v.metric == "LCP").unwrap();
    assert_eq!(lcp.status, VitalStatus::Poor);
}

#[test]
fn test_analyzer_normalizes_and_rejects_input() {
    let analyzer = PerformanceAnalyzer::new();
    let report = analyzer
        .analyze("example.com", DeviceProfile::Desktop)
        .unwrap();
    assert_eq!(report.url, "https://example.com/");

    assert!(analyzer.analyze("", DeviceProfile::Desktop).is_err());
}

#[test]
fn test_cache_reused_within_freshness_window() {
    let analyzer = PerformanceAnalyzer::new();
    let first = analyzer
        .analyze("https://example.com", DeviceProfile::Desktop)
        .unwrap();
    let second = analyzer
        .analyze("https://example.com", DeviceProfile::Desktop)
        .unwrap();
    assert_eq!(first.generated_at, second.generated_at);
}

#[test]
fn test_cache_recomputed_after_window_elapses() {
    let analyzer = PerformanceAnalyzer::new().with_ttl(Duration::from_millis(50));
    let first = analyzer
        .analyze("https://example.com", DeviceProfile::Desktop)
        .unwrap();
    std::thread::sleep(Duration::from_millis(80));
    let second = analyzer
        .analyze("https://example.com", DeviceProfile::Desktop)
        .unwrap();
    assert!(second.generated_at > first.generated_at);
}

#[test]
fn test_cache_keyed_by_device() {
    let analyzer = PerformanceAnalyzer::new();
    let desktop = analyzer
        .analyze("https://example.com", DeviceProfile::Desktop)
        .unwrap();
    let mobile = analyzer
        .analyze("https://example.com", DeviceProfile::Mobile)
        .unwrap();
    assert!(mobile.metrics.lcp_s > desktop.metrics.lcp_s);
}

#[test]
fn test_default_ttl_is_five_minutes() {
    assert_eq!(CACHE_TTL, Duration::from_secs(300));
}
