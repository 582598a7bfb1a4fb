mod failures;
mod format;
mod jobs;
mod performance;
mod progress;
mod projects;
mod styling;
mod tables;
mod watch;

use serde::Serialize;

use styling::{bright_red, dim, magenta_bold};

pub use failures::{render_classifications, render_errors, render_failures};
pub use jobs::{render_job_detail, render_jobs, render_log_matches, render_similar_jobs};
pub use performance::{render_alert_summaries, render_frameworks};
pub use progress::FetchProgress;
pub use projects::{render_pushes, render_repositories};
pub use watch::{render_diff, render_snapshot_summary};

/// Prints the lumberjack banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🪵 lumberjack"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Treeherder CLI")
    );
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {err:#}", bright_red("Error:"));
}
