use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};

use lumberjack::client::JobQuery;
use lumberjack::snapshot::JobSnapshot;
use lumberjack::TreeherderClient;

use crate::output;

pub enum PushTarget {
    Id(u64),
    Revision(String),
}

pub struct WatchOptions {
    pub project: String,
    pub target: PushTarget,
    pub interval: Duration,
    pub until_complete: bool,
    pub json: bool,
}

/// Polls a push's jobs and prints what changed between polls until Ctrl-C,
/// or until every job has completed when `until_complete` is set.
pub async fn run(client: &TreeherderClient, options: &WatchOptions) -> Result<()> {
    let push_id = match &options.target {
        PushTarget::Id(id) => *id,
        PushTarget::Revision(revision) => {
            client
                .push_by_revision(&options.project, revision)
                .await
                .with_context(|| format!("Failed to resolve revision {revision}"))?
                .id
        }
    };

    info!(
        "Watching push {} on {} every {}s",
        push_id,
        options.project,
        options.interval.as_secs()
    );
    if !options.json {
        output::print_banner();
        eprintln!(
            "Watching push {push_id} on {} every {}s, Ctrl-C to stop\n",
            options.project,
            options.interval.as_secs()
        );
    }

    let query = JobQuery::for_push(push_id);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut previous: Option<JobSnapshot> = None;
    loop {
        let jobs = tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping watch");
                return Ok(());
            }
            jobs = client.jobs(&options.project, &query) => jobs?,
        };

        let snapshot = JobSnapshot::from_jobs(&jobs);
        debug!("Polled {} jobs for push {}", snapshot.len(), push_id);

        if let Some(report) = report(push_id, previous.as_ref(), &snapshot, options.json)? {
            println!("{report}");
        }

        if options.until_complete && snapshot.is_complete() {
            info!("All {} jobs for push {} completed", snapshot.len(), push_id);
            return Ok(());
        }
        previous = Some(snapshot);

        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping watch");
                return Ok(());
            }
            () = tokio::time::sleep(options.interval) => {}
        }
    }
}

/// What to print after a poll. The first poll prints a summary; later polls
/// print only when something changed. JSON mode emits one diff per line, the
/// first one listing every job as added.
fn report(
    push_id: u64,
    previous: Option<&JobSnapshot>,
    current: &JobSnapshot,
    json: bool,
) -> Result<Option<String>> {
    let baseline = JobSnapshot::default();
    let diff = previous.unwrap_or(&baseline).diff(current);

    if json {
        if previous.is_some() && diff.is_empty() {
            return Ok(None);
        }
        return Ok(Some(serde_json::to_string(&diff)?));
    }

    let summary = output::render_snapshot_summary(push_id, current);
    match previous {
        None => Ok(Some(summary)),
        Some(_) if diff.is_empty() => Ok(None),
        Some(_) => Ok(Some(format!(
            "{summary}\n{}",
            output::render_diff(&diff).trim_end()
        ))),
    }
}
