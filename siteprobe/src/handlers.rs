use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use siteprobe_core::jobs::{AnalysisJob, JobManager, JobStatus};
use siteprobe_core::perf::{DeviceProfile, PerformanceAnalyzer, PerformanceReport};
use siteprobe_core::report::{ReportFormat, generate_json_report, generate_text_report};
use siteprobe_scanner::scanner::{ScanOptions, SiteScanner};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

fn scan_options_from(sub_matches: &ArgMatches) -> ScanOptions {
    ScanOptions {
        max_pages: *sub_matches.get_one::<usize>("max-pages").unwrap_or(&10),
        include_subdomains: sub_matches.get_flag("include-subdomains"),
        ..Default::default()
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub async fn handle_scan(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<String>("url").unwrap();
    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|s| ReportFormat::from_str(s))
        .unwrap_or(ReportFormat::Text);
    let output = sub_matches.get_one::<std::path::PathBuf>("output");
    let options = scan_options_from(sub_matches);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Scanning {}...", url));

    let scanner = SiteScanner::new(options);
    let report = match scanner.scan(url).await {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("✗ Scan failed: {}", e);
            std::process::exit(1);
        }
    };
    spinner.finish_and_clear();

    let rendered = match format {
        ReportFormat::Text => generate_text_report(&report),
        ReportFormat::Json => match generate_json_report(&report) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("✗ Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        },
    };

    match output {
        Some(path) => match save_report(&rendered, path) {
            Ok(()) => println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            ),
            Err(e) => {
                eprintln!("✗ Failed to write {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => print!("{}", rendered),
    }
}

pub async fn handle_analyze(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let url = sub_matches.get_one::<String>("url").unwrap();
    let options = scan_options_from(sub_matches);

    let manager = JobManager::new();
    let job_id = match manager.start_job(url, options) {
        Ok(job_id) => job_id,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    println!("{} Analysis job {}\n", "→".blue(), job_id);

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Poll the snapshot until the job settles in a terminal state.
    let job = loop {
        let Some(job) = manager.get_status(job_id) else {
            pb.finish_and_clear();
            eprintln!("✗ Job record disappeared");
            std::process::exit(1);
        };
        pb.set_position(job.progress as u64);
        pb.set_message(format!("{}/{} pages", job.pages_crawled, job.pages_found));
        if job.status.is_terminal() {
            break job;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    };
    pb.finish_and_clear();

    if sub_matches.get_flag("json") {
        match serde_json::to_string_pretty(&job) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("✗ Failed to serialize job: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        match job.status {
            JobStatus::Completed => println!("{}\n", "✓ Analysis complete".green().bold()),
            _ => println!("{}\n", "✗ Analysis failed".red().bold()),
        }
        print!("{}", render_job_summary(&job));
    }

    if job.status == JobStatus::Failed {
        std::process::exit(1);
    }
}

pub async fn handle_perf(sub_matches: &ArgMatches) {
    let url = sub_matches.get_one::<String>("url").unwrap();
    let device = sub_matches
        .get_one::<String>("device")
        .and_then(|s| DeviceProfile::from_str(s))
        .unwrap_or(DeviceProfile::Desktop);

    let analyzer = PerformanceAnalyzer::new();
    let report = match analyzer.analyze(url, device) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    if sub_matches.get_flag("json") {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("✗ Failed to serialize report: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let score_line = format!("Performance score: {}/100", report.score);
    match report.score {
        90..=100 => println!("{}\n", score_line.green().bold()),
        50..=89 => println!("{}\n", score_line.yellow().bold()),
        _ => println!("{}\n", score_line.red().bold()),
    }
    print!("{}", render_perf_report(&report));
}

/// Plain-text summary of a finished (or failed) analysis job.
pub fn render_job_summary(job: &AnalysisJob) -> String {
    let mut out = String::new();
    out.push_str(&format!("Job:       {}\n", job.id));
    out.push_str(&format!("URL:       {}\n", job.url));
    out.push_str(&format!("Status:    {}\n", job.status.as_str()));
    out.push_str(&format!(
        "Pages:     {}/{} analyzed\n",
        job.pages_crawled, job.pages_found
    ));
    if let Some(completed_at) = job.completed_at {
        let elapsed = completed_at.signed_duration_since(job.started_at);
        out.push_str(&format!("Duration:  {} ms\n", elapsed.num_milliseconds()));
    }

    if !job.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for warning in &job.warnings {
            out.push_str(&format!("  - {}\n", warning));
        }
    }

    if !job.errors.is_empty() {
        out.push_str("\nErrors:\n");
        for error in &job.errors {
            out.push_str(&format!("  - {}\n", error));
        }
    }

    if !job.technical_issues.is_empty() {
        out.push_str("\nTechnical issues:\n");
        for issue in &job.technical_issues {
            out.push_str(&format!(
                "  [{:<6}] {} ({} occurrences)\n",
                issue.severity.as_str(),
                issue.description,
                issue.count
            ));
            for url in &issue.urls {
                out.push_str(&format!("           - {}\n", url));
            }
        }
    }

    out
}

pub fn format_savings_ms(ms: u64) -> String {
    if ms >= 1000 {
        format!("~{:.1} s", ms as f64 / 1000.0)
    } else {
        format!("~{} ms", ms)
    }
}

/// Plain-text body of a performance report, printed under the colored
/// score headline.
pub fn render_perf_report(report: &PerformanceReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("URL:     {}\n", report.url));
    out.push_str(&format!("Device:  {}\n", report.device.as_str()));

    out.push_str("\nCore Web Vitals:\n");
    for vital in &report.vitals {
        let value = if vital.unit.is_empty() {
            format!("{:.3}", vital.value)
        } else {
            format!("{:.1} {}", vital.value, vital.unit)
        };
        out.push_str(&format!(
            "  {:<4} {:>10}  {}\n",
            vital.metric,
            value,
            vital.status.as_str()
        ));
    }

    out.push_str("\nOpportunities:\n");
    for opportunity in &report.opportunities {
        out.push_str(&format!(
            "  [{:<6}] {} ({})\n",
            opportunity.impact.as_str(),
            opportunity.title,
            format_savings_ms(opportunity.estimated_savings_ms)
        ));
    }

    out.push_str("\nDiagnostics:\n");
    for diagnostic in &report.diagnostics {
        out.push_str(&format!("  {}: {}\n", diagnostic.title, diagnostic.description));
    }

    out
}
