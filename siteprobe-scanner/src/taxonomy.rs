// Closed vocabulary shared by every analyzer: finding severities and
// categories, technical-issue kinds, and the fixed issue -> severity mapping.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum recommended `<title>` length, in characters.
pub const MAX_TITLE_LEN: usize = 60;
/// Maximum recommended meta description length, in characters.
pub const MAX_META_DESCRIPTION_LEN: usize = 160;
/// Pages with fewer body words than this are flagged as thin content.
pub const MIN_CONTENT_WORDS: usize = 300;
/// Load times above this threshold produce a slow-response finding.
pub const SLOW_RESPONSE_THRESHOLD: Duration = Duration::from_secs(2);

/// Severity attached to a single page-level finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Which part of the page a finding concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Title,
    Meta,
    Headings,
    Images,
    Links,
    Content,
    Performance,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Title => "title",
            Category::Meta => "meta",
            Category::Headings => "headings",
            Category::Images => "images",
            Category::Links => "links",
            Category::Content => "content",
            Category::Performance => "performance",
        }
    }
}

/// Severity scale used by aggregated technical-issue summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    High,
    Medium,
    Low,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::High => "high",
            IssueSeverity::Medium => "medium",
            IssueSeverity::Low => "low",
        }
    }

    /// Sort rank, most severe first.
    pub fn rank(&self) -> u8 {
        match self {
            IssueSeverity::High => 0,
            IssueSeverity::Medium => 1,
            IssueSeverity::Low => 2,
        }
    }
}

/// Every technical issue the engine can report. The mappings below are
/// exhaustive matches with no wildcard arm, so adding a kind without
/// deciding its severity, category and guidance is a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingTitle,
    TitleTooLong,
    MissingMetaDescription,
    MetaDescriptionTooLong,
    MissingH1,
    MultipleH1,
    MissingAltText,
    BrokenInternalLink,
    ThinContent,
    SlowResponse,
    FetchFailed,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingTitle => "missing_title",
            IssueKind::TitleTooLong => "title_too_long",
            IssueKind::MissingMetaDescription => "missing_meta_description",
            IssueKind::MetaDescriptionTooLong => "meta_description_too_long",
            IssueKind::MissingH1 => "missing_h1",
            IssueKind::MultipleH1 => "multiple_h1",
            IssueKind::MissingAltText => "missing_alt_text",
            IssueKind::BrokenInternalLink => "broken_internal_link",
            IssueKind::ThinContent => "thin_content",
            IssueKind::SlowResponse => "slow_response",
            IssueKind::FetchFailed => "fetch_failed",
        }
    }

    /// Severity reported when occurrences of this kind are aggregated
    /// across a scan. Fixed per kind, never per occurrence.
    pub fn severity(&self) -> IssueSeverity {
        match self {
            IssueKind::MissingTitle => IssueSeverity::High,
            IssueKind::TitleTooLong => IssueSeverity::Low,
            IssueKind::MissingMetaDescription => IssueSeverity::Medium,
            IssueKind::MetaDescriptionTooLong => IssueSeverity::Low,
            IssueKind::MissingH1 => IssueSeverity::Medium,
            IssueKind::MultipleH1 => IssueSeverity::Medium,
            IssueKind::MissingAltText => IssueSeverity::Medium,
            IssueKind::BrokenInternalLink => IssueSeverity::High,
            IssueKind::ThinContent => IssueSeverity::Low,
            IssueKind::SlowResponse => IssueSeverity::Medium,
            IssueKind::FetchFailed => IssueSeverity::High,
        }
    }

    /// Severity of the individual page-level finding.
    pub fn finding_severity(&self) -> Severity {
        match self {
            IssueKind::MissingTitle => Severity::Error,
            IssueKind::TitleTooLong => Severity::Warning,
            IssueKind::MissingMetaDescription => Severity::Warning,
            IssueKind::MetaDescriptionTooLong => Severity::Info,
            IssueKind::MissingH1 => Severity::Warning,
            IssueKind::MultipleH1 => Severity::Warning,
            IssueKind::MissingAltText => Severity::Warning,
            IssueKind::BrokenInternalLink => Severity::Error,
            IssueKind::ThinContent => Severity::Info,
            IssueKind::SlowResponse => Severity::Warning,
            IssueKind::FetchFailed => Severity::Error,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            IssueKind::MissingTitle => Category::Title,
            IssueKind::TitleTooLong => Category::Title,
            IssueKind::MissingMetaDescription => Category::Meta,
            IssueKind::MetaDescriptionTooLong => Category::Meta,
            IssueKind::MissingH1 => Category::Headings,
            IssueKind::MultipleH1 => Category::Headings,
            IssueKind::MissingAltText => Category::Images,
            IssueKind::BrokenInternalLink => Category::Links,
            IssueKind::ThinContent => Category::Content,
            IssueKind::SlowResponse => Category::Performance,
            IssueKind::FetchFailed => Category::Content,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            IssueKind::MissingTitle => "Page has no title tag",
            IssueKind::TitleTooLong => "Page title exceeds the recommended length",
            IssueKind::MissingMetaDescription => "Page has no meta description",
            IssueKind::MetaDescriptionTooLong => {
                "Meta description exceeds the recommended length"
            }
            IssueKind::MissingH1 => "Page has no H1 heading",
            IssueKind::MultipleH1 => "Page has more than one H1 heading",
            IssueKind::MissingAltText => "Images are missing alt text",
            IssueKind::BrokenInternalLink => "Internal page answered with an error status",
            IssueKind::ThinContent => "Page body contains very little text",
            IssueKind::SlowResponse => "Page took too long to respond",
            IssueKind::FetchFailed => "Page could not be retrieved",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            IssueKind::MissingTitle => {
                "Add a unique, descriptive <title> element to the page head."
            }
            IssueKind::TitleTooLong => {
                "Shorten the title to 60 characters or fewer so it is not truncated in results."
            }
            IssueKind::MissingMetaDescription => {
                "Add a meta description summarizing the page in 50-160 characters."
            }
            IssueKind::MetaDescriptionTooLong => {
                "Trim the meta description to 160 characters or fewer."
            }
            IssueKind::MissingH1 => "Add exactly one H1 heading describing the page content.",
            IssueKind::MultipleH1 => {
                "Keep a single H1 per page and demote the others to H2 or below."
            }
            IssueKind::MissingAltText => {
                "Add alt attributes describing each image for accessibility and indexing."
            }
            IssueKind::BrokenInternalLink => {
                "Fix or remove links pointing at pages that return error statuses."
            }
            IssueKind::ThinContent => {
                "Expand the page with substantive content or consolidate it into another page."
            }
            IssueKind::SlowResponse => {
                "Reduce server processing time and payload size for this page."
            }
            IssueKind::FetchFailed => {
                "Verify the page is reachable and the server is answering requests."
            }
        }
    }
}

/// A single detected problem or note on a page. Immutable once produced;
/// everything except the message comes from the fixed taxonomy mappings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub kind: IssueKind,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    pub recommendation: String,
}

impl Finding {
    pub fn of(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.finding_severity(),
            category: kind.category(),
            message: message.into(),
            recommendation: kind.recommendation().to_string(),
        }
    }
}
