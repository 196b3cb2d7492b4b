// Asynchronous job lifecycle for whole-site analysis. Each job runs as an
// independent background task that owns all writes to its own registry
// entry; callers only ever read cloned snapshots.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use siteprobe_scanner::discovery::{CommonPaths, UrlDiscovery};
use siteprobe_scanner::error::Result;
use siteprobe_scanner::page::{PageAnalyzer, normalize_url};
use siteprobe_scanner::record::PageRecord;
use siteprobe_scanner::scanner::{ScanOptions, TechnicalIssueSummary, flag_broken_link, summarize_issues};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::oneshot;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

/// Lifecycle state of an analysis job. Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Snapshot of one analysis job. Progress is monotone while running;
/// errors and warnings are only ever appended.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisJob {
    pub id: Uuid,
    pub url: String,
    pub status: JobStatus,
    /// 0-100, non-decreasing; exactly 100 once completed.
    pub progress: u8,
    pub pages_found: usize,
    pub pages_crawled: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub technical_issues: Vec<TechnicalIssueSummary>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_completion: Option<DateTime<Utc>>,
}

struct JobEntry {
    job: AnalysisJob,
    // oneshot::Sender is not Clone, so it lives behind a Mutex.
    cancel_tx: StdMutex<Option<oneshot::Sender<()>>>,
}

/// Registry and scheduler for analysis jobs. An explicit store object:
/// construct once, inject wherever jobs are started or polled. Supports
/// concurrent polling while each job's own task writes its entry.
pub struct JobManager {
    jobs: Arc<DashMap<Uuid, JobEntry>>,
}

impl JobManager {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(DashMap::new()),
        }
    }

    /// Validate the URL, register a running job at progress 0, and spawn
    /// its background task. Returns immediately with the job id; malformed
    /// input is the only synchronous failure.
    pub fn start_job(&self, url: &str, options: ScanOptions) -> Result<Uuid> {
        let root = normalize_url(url)?;
        let job_id = Uuid::new_v4();
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let job = AnalysisJob {
            id: job_id,
            url: root.as_str().to_string(),
            status: JobStatus::Running,
            progress: 0,
            pages_found: 0,
            pages_crawled: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            technical_issues: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
            estimated_completion: None,
        };

        self.jobs.insert(
            job_id,
            JobEntry {
                job,
                cancel_tx: StdMutex::new(Some(cancel_tx)),
            },
        );

        let jobs = Arc::clone(&self.jobs);
        tokio::spawn(async move {
            run_analysis_job(job_id, root, options, jobs, cancel_rx).await;
        });

        info!("Started analysis job {}", job_id);
        Ok(job_id)
    }

    /// Current snapshot of a job, or None if it was deleted or never
    /// existed. Never blocks on the job's background work.
    pub fn get_status(&self, job_id: Uuid) -> Option<AnalysisJob> {
        self.jobs.get(&job_id).map(|entry| entry.job.clone())
    }

    /// All known jobs, most recently started first.
    pub fn list_jobs(&self) -> Vec<AnalysisJob> {
        let mut jobs: Vec<AnalysisJob> = self.jobs.iter().map(|entry| entry.job.clone()).collect();
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        jobs
    }

    /// Signal a running job to stop. The job's task marks itself failed
    /// with a cancellation reason at its next check; a terminal job is
    /// left untouched.
    pub fn stop_job(&self, job_id: Uuid) -> bool {
        if let Some(entry) = self.jobs.get(&job_id) {
            if entry.job.status != JobStatus::Running {
                return false;
            }
            if let Ok(mut guard) = entry.cancel_tx.lock()
                && let Some(tx) = guard.take()
            {
                let _ = tx.send(());
                return true;
            }
        }
        false
    }

    /// Remove a job's record. The cancel signal fires too, so an in-flight
    /// task stops advancing instead of writing into a registry entry that
    /// no longer exists.
    pub fn delete_job(&self, job_id: Uuid) -> bool {
        if let Some((_, entry)) = self.jobs.remove(&job_id) {
            if let Ok(mut guard) = entry.cancel_tx.lock()
                && let Some(tx) = guard.take()
            {
                let _ = tx.send(());
            }
            true
        } else {
            false
        }
    }
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a mutation to a job's entry. A no-op when the job was deleted.
fn with_job(jobs: &DashMap<Uuid, JobEntry>, job_id: Uuid, f: impl FnOnce(&mut AnalysisJob)) {
    if let Some(mut entry) = jobs.get_mut(&job_id) {
        f(&mut entry.job);
    }
}

fn estimate_completion(
    started_at: DateTime<Utc>,
    crawled: usize,
    total: usize,
) -> Option<DateTime<Utc>> {
    if crawled == 0 || crawled >= total {
        return None;
    }
    let now = Utc::now();
    let per_page = now.signed_duration_since(started_at) / crawled as i32;
    Some(now + per_page * (total - crawled) as i32)
}

async fn run_analysis_job(
    job_id: Uuid,
    root: Url,
    options: ScanOptions,
    jobs: Arc<DashMap<Uuid, JobEntry>>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let analyzer = PageAnalyzer::with_options(options.timeout_secs, options.follow_redirects)
        .with_include_subdomains(options.include_subdomains);
    let bound = if options.max_pages == 0 {
        usize::MAX
    } else {
        options.max_pages
    };
    let targets = CommonPaths.discover(&root, bound);
    let total = targets.len();

    // pages_found is fixed once discovery settles.
    with_job(&jobs, job_id, |job| {
        job.pages_found = total;
    });

    let mut pages: Vec<PageRecord> = Vec::with_capacity(total);

    for (idx, url) in targets.iter().enumerate() {
        let mut record = tokio::select! {
            biased;
            _ = &mut cancel_rx => {
                warn!("Analysis job {} cancelled", job_id);
                with_job(&jobs, job_id, |job| {
                    job.errors.push("cancelled by operator".to_string());
                    job.status = JobStatus::Failed;
                    job.completed_at = Some(Utc::now());
                    job.estimated_completion = None;
                });
                return;
            }
            record = analyzer.analyze(url) => record,
        };

        flag_broken_link(&mut record);
        let failure = record.error.clone();
        let status_code = record.status_code;
        let is_root = idx == 0;
        pages.push(record);

        let crawled = idx + 1;
        with_job(&jobs, job_id, |job| {
            if let Some(error) = failure {
                job.errors.push(error);
            }
            if is_root && status_code >= 400 {
                job.warnings
                    .push(format!("root page answered HTTP {}", status_code));
            }
            job.pages_crawled = crawled;
            // Hold the last point until summaries are attached.
            let pct = ((crawled * 100 / total.max(1)) as u8).min(99);
            job.progress = job.progress.max(pct);
            job.estimated_completion = estimate_completion(job.started_at, crawled, total);
        });

        // Keep status reads responsive between increments.
        tokio::task::yield_now().await;
    }

    // Every page failing means the site was never reachable at all.
    if !pages.is_empty() && pages.iter().all(|p| p.error.is_some()) {
        warn!("Analysis job {} failed: no pages reachable", job_id);
        with_job(&jobs, job_id, |job| {
            job.errors.push(format!("{} is unreachable", root));
            job.status = JobStatus::Failed;
            job.completed_at = Some(Utc::now());
            job.estimated_completion = None;
        });
        return;
    }

    let issues = summarize_issues(&pages);
    with_job(&jobs, job_id, |job| {
        job.technical_issues = issues;
        job.progress = 100;
        job.status = JobStatus::Completed;
        job.completed_at = Some(Utc::now());
        job.estimated_completion = None;
    });
    info!("Analysis job {} completed ({} pages)", job_id, total);
}
