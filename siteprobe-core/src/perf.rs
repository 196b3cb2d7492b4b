// Performance analysis: timing metrics per device profile, a 0-100 score,
// Core Web Vitals classification, and prioritized improvement
// opportunities. Metric collection sits behind `MetricSource` so a real
// timing collector can replace the simulated one without touching the
// scoring or caching rules.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use siteprobe_scanner::error::Result;
use siteprobe_scanner::page::normalize_url;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// Device profile a performance analysis is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceProfile {
    Desktop,
    Mobile,
}

impl DeviceProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceProfile::Desktop => "desktop",
            DeviceProfile::Mobile => "mobile",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "desktop" => Some(DeviceProfile::Desktop),
            "mobile" => Some(DeviceProfile::Mobile),
            _ => None,
        }
    }
}

/// Raw timing metrics. Seconds unless the field name says otherwise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerfMetrics {
    pub fcp_s: f64,
    pub lcp_s: f64,
    pub fid_ms: f64,
    pub cls: f64,
    pub ttfb_s: f64,
    pub si_s: f64,
}

// Published pass/fail thresholds and the score penalty for exceeding each.
pub const FCP_THRESHOLD_S: f64 = 1.8;
pub const LCP_THRESHOLD_S: f64 = 2.5;
pub const FID_THRESHOLD_MS: f64 = 100.0;
pub const CLS_THRESHOLD: f64 = 0.1;
pub const TTFB_THRESHOLD_S: f64 = 0.6;
pub const SI_THRESHOLD_S: f64 = 3.4;

const FCP_PENALTY: i32 = 10;
const LCP_PENALTY: i32 = 15;
const FID_PENALTY: i32 = 10;
const CLS_PENALTY: i32 = 15;
const TTFB_PENALTY: i32 = 10;
const SI_PENALTY: i32 = 10;

/// Score a set of metrics: start at 100, subtract the fixed penalty for
/// every threshold exceeded, clamp to [0, 100]. No other inputs.
pub fn score(metrics: &PerfMetrics) -> u8 {
    let mut score: i32 = 100;
    if metrics.fcp_s > FCP_THRESHOLD_S {
        score -= FCP_PENALTY;
    }
    if metrics.lcp_s > LCP_THRESHOLD_S {
        score -= LCP_PENALTY;
    }
    if metrics.fid_ms > FID_THRESHOLD_MS {
        score -= FID_PENALTY;
    }
    if metrics.cls > CLS_THRESHOLD {
        score -= CLS_PENALTY;
    }
    if metrics.ttfb_s > TTFB_THRESHOLD_S {
        score -= TTFB_PENALTY;
    }
    if metrics.si_s > SI_THRESHOLD_S {
        score -= SI_PENALTY;
    }
    score.clamp(0, 100) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VitalStatus {
    Good,
    NeedsImprovement,
    Poor,
}

impl VitalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalStatus::Good => "good",
            VitalStatus::NeedsImprovement => "needs-improvement",
            VitalStatus::Poor => "poor",
        }
    }
}

/// One Core Web Vital evaluated against its two fixed cutoffs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreWebVital {
    pub metric: String,
    pub value: f64,
    pub unit: String,
    /// The pass threshold (the "good" cutoff).
    pub threshold: f64,
    pub status: VitalStatus,
}

fn classify(value: f64, good: f64, needs_improvement: f64) -> VitalStatus {
    if value <= good {
        VitalStatus::Good
    } else if value <= needs_improvement {
        VitalStatus::NeedsImprovement
    } else {
        VitalStatus::Poor
    }
}

/// Evaluate the four standard vitals. Each uses two fixed cutoffs, not
/// just the single scoring threshold.
pub fn core_web_vitals(metrics: &PerfMetrics) -> Vec<CoreWebVital> {
    vec![
        CoreWebVital {
            metric: "FCP".to_string(),
            value: metrics.fcp_s,
            unit: "s".to_string(),
            threshold: FCP_THRESHOLD_S,
            status: classify(metrics.fcp_s, FCP_THRESHOLD_S, 3.0),
        },
        CoreWebVital {
            metric: "LCP".to_string(),
            value: metrics.lcp_s,
            unit: "s".to_string(),
            threshold: LCP_THRESHOLD_S,
            status: classify(metrics.lcp_s, LCP_THRESHOLD_S, 4.0),
        },
        CoreWebVital {
            metric: "FID".to_string(),
            value: metrics.fid_ms,
            unit: "ms".to_string(),
            threshold: FID_THRESHOLD_MS,
            status: classify(metrics.fid_ms, FID_THRESHOLD_MS, 300.0),
        },
        CoreWebVital {
            metric: "CLS".to_string(),
            value: metrics.cls,
            unit: "".to_string(),
            threshold: CLS_THRESHOLD,
            status: classify(metrics.cls, CLS_THRESHOLD, 0.25),
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "high",
            Impact::Medium => "medium",
            Impact::Low => "low",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Impact::High => 0,
            Impact::Medium => 1,
            Impact::Low => 2,
        }
    }
}

/// A suggested improvement with its estimated impact and time savings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub impact: Impact,
    pub estimated_savings_ms: u64,
    pub description: String,
}

/// A descriptive observation not tied to a pass/fail threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub title: String,
    pub description: String,
}

fn overshoot_ms(value_s: f64, threshold_s: f64) -> u64 {
    ((value_s - threshold_s).max(0.0) * 1000.0).round() as u64
}

fn opportunity(
    id: &str,
    title: &str,
    impact: Impact,
    estimated_savings_ms: u64,
    description: &str,
) -> Opportunity {
    Opportunity {
        id: id.to_string(),
        title: title.to_string(),
        impact,
        estimated_savings_ms,
        description: description.to_string(),
    }
}

/// Build the opportunity list: a baseline pair always, one entry per
/// exceeded threshold, and an extra mobile-specific entry on mobile.
/// Ordered by impact, then estimated savings.
pub fn opportunities(metrics: &PerfMetrics, device: DeviceProfile) -> Vec<Opportunity> {
    let mut out = vec![
        opportunity(
            "enable-text-compression",
            "Enable text compression",
            Impact::Medium,
            350,
            "Text resources should be served with gzip or brotli compression.",
        ),
        opportunity(
            "remove-unused-css",
            "Remove unused CSS",
            Impact::Low,
            150,
            "Stylesheets contain rules not used by this page.",
        ),
    ];

    if metrics.fcp_s > FCP_THRESHOLD_S {
        out.push(opportunity(
            "preconnect-origins",
            "Preconnect to required origins",
            Impact::Medium,
            overshoot_ms(metrics.fcp_s, FCP_THRESHOLD_S) + 100,
            "Early connections to important third-party origins speed up first paint.",
        ));
    }
    if metrics.lcp_s > LCP_THRESHOLD_S {
        out.push(opportunity(
            "render-blocking-resources",
            "Eliminate render-blocking resources",
            Impact::High,
            overshoot_ms(metrics.lcp_s, LCP_THRESHOLD_S) + 400,
            "Scripts and stylesheets block the first render of the largest element.",
        ));
    }
    if metrics.fid_ms > FID_THRESHOLD_MS {
        out.push(opportunity(
            "javascript-execution",
            "Reduce JavaScript execution time",
            Impact::High,
            ((metrics.fid_ms - FID_THRESHOLD_MS).round() as u64) + 150,
            "Long tasks keep the main thread busy and delay input handling.",
        ));
    }
    if metrics.cls > CLS_THRESHOLD {
        out.push(opportunity(
            "layout-shift-media",
            "Set explicit dimensions on images and embeds",
            Impact::Medium,
            250,
            "Media without reserved space shifts the layout as it loads.",
        ));
    }
    if metrics.ttfb_s > TTFB_THRESHOLD_S {
        out.push(opportunity(
            "server-response-time",
            "Reduce initial server response time",
            Impact::High,
            overshoot_ms(metrics.ttfb_s, TTFB_THRESHOLD_S) + 200,
            "The server is slow to produce the first byte of the main document.",
        ));
    }
    if metrics.si_s > SI_THRESHOLD_S {
        out.push(opportunity(
            "offscreen-images",
            "Defer offscreen images",
            Impact::Medium,
            overshoot_ms(metrics.si_s, SI_THRESHOLD_S) + 300,
            "Images below the fold load eagerly and compete for bandwidth.",
        ));
    }

    if device == DeviceProfile::Mobile {
        out.push(opportunity(
            "responsive-images",
            "Properly size images for mobile",
            Impact::Medium,
            400,
            "Images are served at desktop resolutions to small viewports.",
        ));
    }

    out.sort_by(|a, b| {
        a.impact
            .rank()
            .cmp(&b.impact.rank())
            .then(b.estimated_savings_ms.cmp(&a.estimated_savings_ms))
            .then(a.id.cmp(&b.id))
    });
    out
}

pub fn diagnostics(metrics: &PerfMetrics) -> Vec<Diagnostic> {
    vec![
        Diagnostic {
            title: "Initial server response".to_string(),
            description: format!(
                "The server answered the initial request in {} ms.",
                (metrics.ttfb_s * 1000.0).round() as u64
            ),
        },
        Diagnostic {
            title: "Main-thread work".to_string(),
            description: format!(
                "Scripting and layout kept the main thread busy for roughly {:.1} s.",
                metrics.si_s * 0.6
            ),
        },
        Diagnostic {
            title: "Largest Contentful Paint element".to_string(),
            description: format!(
                "The largest above-the-fold element rendered at {:.1} s.",
                metrics.lcp_s
            ),
        },
    ]
}

/// One performance analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub url: String,
    pub device: DeviceProfile,
    pub metrics: PerfMetrics,
    pub score: u8,
    pub opportunities: Vec<Opportunity>,
    pub diagnostics: Vec<Diagnostic>,
    pub vitals: Vec<CoreWebVital>,
    pub generated_at: DateTime<Utc>,
}

/// Where raw metrics come from. The scoring, vitals and opportunity rules
/// above apply to whatever this produces.
pub trait MetricSource: Send + Sync {
    fn collect(&self, url: &Url, device: DeviceProfile) -> PerfMetrics;
}

/// Slowdown applied to render metrics on the mobile profile.
const MOBILE_SLOWDOWN: f64 = 1.8;
/// Extra input delay factor on the mobile profile.
const MOBILE_INPUT_FACTOR: f64 = 1.4;

/// Deterministic stand-in for a real timing collector: metrics are a pure
/// function of the URL, with the mobile slowdown applied on top of the
/// same base values so the device asymmetry is visible in the output.
pub struct SimulatedSource;

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn unit(state: &mut u64) -> f64 {
    (splitmix64(state) >> 11) as f64 / (1u64 << 53) as f64
}

impl MetricSource for SimulatedSource {
    fn collect(&self, url: &Url, device: DeviceProfile) -> PerfMetrics {
        // DefaultHasher is stable within a process, which is all the cache
        // and the reproducibility contract need.
        let mut hasher = DefaultHasher::new();
        url.as_str().hash(&mut hasher);
        let mut state = hasher.finish();

        let fcp_s = 0.8 + unit(&mut state) * 1.4;
        let lcp_s = fcp_s + 0.5 + unit(&mut state) * 2.0;
        let fid_ms = 30.0 + unit(&mut state) * 120.0;
        let cls = unit(&mut state) * 0.22;
        let ttfb_s = 0.15 + unit(&mut state) * 0.65;
        let si_s = 1.8 + unit(&mut state) * 2.4;

        let mut metrics = PerfMetrics {
            fcp_s,
            lcp_s,
            fid_ms,
            cls,
            ttfb_s,
            si_s,
        };

        if device == DeviceProfile::Mobile {
            metrics.fcp_s *= MOBILE_SLOWDOWN;
            metrics.lcp_s *= MOBILE_SLOWDOWN;
            metrics.si_s *= MOBILE_SLOWDOWN;
            metrics.fid_ms *= MOBILE_INPUT_FACTOR;
        }

        metrics
    }
}

/// A source that always returns the same metrics. Useful for callers that
/// collect timings elsewhere and for exercising the scoring rules.
pub struct FixedSource(pub PerfMetrics);

impl MetricSource for FixedSource {
    fn collect(&self, _url: &Url, _device: DeviceProfile) -> PerfMetrics {
        self.0
    }
}

/// How long a cached report stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    report: PerformanceReport,
    stored_at: Instant,
}

/// Computes and caches performance reports keyed by (url, device). An
/// explicit store object: construct once, share by reference or `Arc`.
pub struct PerformanceAnalyzer {
    source: Arc<dyn MetricSource>,
    cache: DashMap<(String, DeviceProfile), CacheEntry>,
    ttl: Duration,
}

impl PerformanceAnalyzer {
    pub fn new() -> Self {
        Self::with_source(Arc::new(SimulatedSource))
    }

    pub fn with_source(source: Arc<dyn MetricSource>) -> Self {
        Self {
            source,
            cache: DashMap::new(),
            ttl: CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Analyze a URL for the given device profile. A cached report is
    /// reused only while younger than the freshness window; after that the
    /// entry is recomputed and replaced whole (no partial entries).
    pub fn analyze(&self, url: &str, device: DeviceProfile) -> Result<PerformanceReport> {
        let url = normalize_url(url)?;
        let key = (url.as_str().to_string(), device);

        if let Some(entry) = self.cache.get(&key)
            && entry.stored_at.elapsed() < self.ttl
        {
            debug!("Performance cache hit for {} ({})", url, device.as_str());
            return Ok(entry.report.clone());
        }

        let report = self.compute(&url, device);
        self.cache.insert(
            key,
            CacheEntry {
                report: report.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(report)
    }

    fn compute(&self, url: &Url, device: DeviceProfile) -> PerformanceReport {
        debug!("Computing performance report for {} ({})", url, device.as_str());
        let metrics = self.source.collect(url, device);
        PerformanceReport {
            url: url.as_str().to_string(),
            device,
            score: score(&metrics),
            opportunities: opportunities(&metrics, device),
            diagnostics: diagnostics(&metrics),
            vitals: core_web_vitals(&metrics),
            metrics,
            generated_at: Utc::now(),
        }
    }
}

impl Default for PerformanceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
