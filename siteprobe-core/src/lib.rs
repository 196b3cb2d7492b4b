pub mod jobs;
pub mod perf;
pub mod report;

pub use jobs::{AnalysisJob, JobManager, JobStatus};
pub use perf::{
    DeviceProfile, MetricSource, PerfMetrics, PerformanceAnalyzer, PerformanceReport,
};
pub use report::{ReportFormat, generate_json_report, generate_text_report};

use colored::Colorize;

pub fn print_banner() {
    println!(
        "{}",
        r#"
   _____ _ __                       __
  / ___/(_) /____  ____  _________  / /_  ___
  \__ \/ / __/ _ \/ __ \/ ___/ __ \/ __ \/ _ \
 ___/ / / /_/  __/ /_/ / /  / /_/ / /_/ /  __/
/____/_/\__/\___/ .___/_/   \____/_.___/\___/
               /_/
"#
        .cyan()
    );
    println!(
        "{}  {}\n",
        "siteprobe".bright_white().bold(),
        concat!("v", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
