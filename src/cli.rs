use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;

use lumberjack::client::{
    AlertSummaryQuery, FailureQuery, JobQuery, PushQuery, DEFAULT_ALERT_LIMIT,
    DEFAULT_FAILURE_DAYS,
};
use lumberjack::filters::{FailureFilter, JobFilter};
use lumberjack::log_search::{LogMatch, LogSearch};
use lumberjack::models::{BugSuggestion, Job, JobLogUrl, JobState, TextLogError};
use lumberjack::{TreeherderClient, TreeherderError};

use crate::config::{Config, OutputFormat};
use crate::output::{self, FetchProgress};
use crate::watch::{self, PushTarget, WatchOptions};

const DEFAULT_LOG_NAME: &str = "live_backing_log";

#[derive(Parser)]
#[command(name = "lumberjack")]
#[command(author, version, about = "Query Mozilla's Treeherder CI service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Treeherder server URL
    #[arg(short, long, global = true, env = "TREEHERDER_URL")]
    server: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Path to a configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List repositories
    Repos {
        /// Include inactive repositories
        #[arg(long)]
        all: bool,
    },

    /// List recent pushes for a project
    Pushes {
        project: String,

        #[arg(short = 'n', long)]
        count: Option<usize>,

        #[arg(short, long)]
        revision: Option<String>,

        #[arg(short, long)]
        author: Option<String>,
    },

    /// List jobs for a project
    Jobs {
        project: String,

        #[arg(long)]
        push_id: Option<u64>,

        #[arg(long)]
        guid: Option<String>,

        /// success, testfailed, busted, exception, retry, usercancel, ...
        #[arg(long)]
        result: Option<String>,

        #[arg(long)]
        state: Option<JobState>,

        #[arg(long)]
        tier: Option<u8>,

        /// Defaults to every job of the push when --push-id is given
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Regex matched against the platform
        #[arg(short, long)]
        platform: Option<String>,

        /// Regex matched against the job name
        #[arg(short, long)]
        filter: Option<String>,

        /// Minimum duration in seconds
        #[arg(long)]
        min_duration: Option<u64>,

        /// Maximum duration in seconds
        #[arg(long)]
        max_duration: Option<u64>,
    },

    /// Show one job by numeric id or guid
    Job {
        project: String,

        job: String,

        /// Also list the job's log URLs
        #[arg(long)]
        logs: bool,
    },

    /// Classified failures for a Bugzilla bug
    Failures {
        bug_id: u64,

        #[arg(long, default_value = "all")]
        tree: String,

        #[arg(long, default_value_t = DEFAULT_FAILURE_DAYS)]
        days: u64,

        /// YYYY-MM-DD, overrides --days
        #[arg(long)]
        startday: Option<NaiveDate>,

        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        endday: Option<NaiveDate>,

        /// Regex matched against the platform
        #[arg(short, long)]
        platform: Option<String>,

        /// Regex matched against the build type
        #[arg(short, long)]
        build_type: Option<String>,
    },

    /// Error lines and bug suggestions for a job
    Errors {
        project: String,

        job_id: u64,

        /// Skip bug suggestions
        #[arg(long)]
        no_suggestions: bool,
    },

    /// Earlier runs of the same job type
    SimilarJobs {
        project: String,

        job_id: u64,

        #[arg(short = 'n', long, default_value_t = 20)]
        count: usize,
    },

    /// Search a job's log for a regex
    Log {
        project: String,

        job_id: u64,

        pattern: String,

        #[arg(long, default_value = DEFAULT_LOG_NAME)]
        log_name: String,

        /// Lines of context around each match
        #[arg(short = 'C', long, default_value_t = 0)]
        context: usize,

        #[arg(short, long, default_value_t = 50)]
        max_matches: usize,

        #[arg(short, long)]
        ignore_case: bool,
    },

    /// Performance alert summaries, newest first
    PerfAlerts {
        #[arg(short, long)]
        repository: Option<String>,

        /// Framework id, see perf-frameworks
        #[arg(short, long)]
        framework: Option<u64>,

        #[arg(short = 'n', long, default_value_t = DEFAULT_ALERT_LIMIT)]
        limit: usize,
    },

    /// List performance frameworks
    PerfFrameworks,

    /// List failure classifications
    Classifications,

    /// Poll a push and report job state changes
    Watch {
        project: String,

        #[arg(long, required_unless_present = "revision", conflicts_with = "revision")]
        push_id: Option<u64>,

        #[arg(short, long)]
        revision: Option<String>,

        /// Seconds between polls
        #[arg(long)]
        interval: Option<u64>,

        /// Exit once every job has completed
        #[arg(long)]
        until_complete: bool,
    },
}

/// Serialized form of `job --logs`.
#[derive(Serialize)]
struct JobWithLogs<'a> {
    #[serde(flatten)]
    job: &'a Job,
    log_urls: &'a [JobLogUrl],
}

#[derive(Serialize)]
struct JobErrors {
    errors: Vec<TextLogError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bug_suggestions: Option<Vec<BugSuggestion>>,
}

#[derive(Serialize)]
struct LogSearchResult<'a> {
    log: &'a JobLogUrl,
    matches: &'a [LogMatch],
}

/// Everything a command needs once flags and config are merged.
struct Session {
    client: TreeherderClient,
    config: Config,
    json: bool,
}

impl Session {
    /// Runs a request behind a spinner, which is cleared whatever the outcome.
    async fn fetch<T>(
        &self,
        message: &str,
        request: impl Future<Output = lumberjack::Result<T>>,
    ) -> Result<T> {
        let progress = FetchProgress::start(message, !self.json);
        let result = request.await;
        progress.clear();
        Ok(result?)
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T, render: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            output::print_json(value)
        } else {
            println!("{}", render());
            Ok(())
        }
    }
}

impl Cli {
    fn build_client(&self, config: &Config) -> Result<TreeherderClient> {
        let url = self.server.as_deref().unwrap_or(&config.server.url);
        let mut client = TreeherderClient::new(url)
            .with_context(|| format!("Invalid server URL: {url}"))?;

        if let Some(secs) = config.server.timeout_secs {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        if let Some(user_agent) = &config.server.user_agent {
            client = client.with_user_agent(user_agent.clone());
        }

        info!("Using Treeherder at {}", client.server_url());
        Ok(client)
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let client = self.build_client(&config)?;
        let json = self.json || config.output.format == OutputFormat::Json;
        let session = Session {
            client,
            config,
            json,
        };

        match &self.command {
            Commands::Repos { all } => execute_repos(&session, *all).await,
            Commands::Pushes {
                project,
                count,
                revision,
                author,
            } => {
                let query = PushQuery {
                    count: Some(count.unwrap_or(session.config.defaults.push_count)),
                    revision: revision.clone(),
                    author: author.clone(),
                    ..PushQuery::default()
                };
                execute_pushes(&session, project, &query).await
            }
            Commands::Jobs {
                project,
                push_id,
                guid,
                result,
                state,
                tier,
                count,
                platform,
                filter,
                min_duration,
                max_duration,
            } => {
                let default_count = push_id
                    .is_none()
                    .then_some(session.config.defaults.job_count);
                let query = JobQuery {
                    count: count.or(default_count),
                    push_id: *push_id,
                    job_guid: guid.clone(),
                    result: result.clone(),
                    state: *state,
                    tier: *tier,
                };
                let filter = JobFilter::new(platform.as_deref(), filter.as_deref())
                    .context("Invalid filter pattern")?
                    .with_duration(*min_duration, *max_duration);
                execute_jobs(&session, project, &query, &filter).await
            }
            Commands::Job { project, job, logs } => {
                execute_job(&session, project, job, *logs).await
            }
            Commands::Failures {
                bug_id,
                tree,
                days,
                startday,
                endday,
                platform,
                build_type,
            } => {
                let end_day = endday.unwrap_or_else(|| Utc::now().date_naive());
                let mut query = match startday {
                    Some(start_day) => FailureQuery {
                        bug_id: *bug_id,
                        start_day: *start_day,
                        end_day,
                        tree: String::new(),
                    },
                    None => FailureQuery::ending_on(*bug_id, end_day, *days)
                        .with_context(|| format!("Invalid --days value: {days}"))?,
                };
                query.tree = tree.clone();
                if query.start_day > query.end_day {
                    bail!(
                        "Start day {} is after end day {}",
                        query.start_day,
                        query.end_day
                    );
                }
                let filter = FailureFilter::new(platform.as_deref(), build_type.as_deref())
                    .context("Invalid filter pattern")?;
                execute_failures(&session, &query, &filter).await
            }
            Commands::Errors {
                project,
                job_id,
                no_suggestions,
            } => execute_errors(&session, project, *job_id, !*no_suggestions).await,
            Commands::SimilarJobs {
                project,
                job_id,
                count,
            } => {
                let jobs = session
                    .fetch(
                        "Fetching similar jobs",
                        session.client.similar_jobs(project, *job_id, *count),
                    )
                    .await?;
                session.emit(&jobs, || output::render_similar_jobs(*job_id, &jobs))
            }
            Commands::Log {
                project,
                job_id,
                pattern,
                log_name,
                context,
                max_matches,
                ignore_case,
            } => {
                let search = LogSearch::new(pattern, *ignore_case)
                    .with_context(|| format!("Invalid pattern: {pattern}"))?
                    .with_context(*context)
                    .with_max_matches(*max_matches);
                execute_log(&session, project, *job_id, log_name, &search).await
            }
            Commands::PerfAlerts {
                repository,
                framework,
                limit,
            } => {
                let query = AlertSummaryQuery {
                    repository: repository.clone(),
                    framework: *framework,
                    limit: *limit,
                };
                let summaries = session
                    .fetch(
                        "Fetching alert summaries",
                        session.client.performance_alert_summaries(&query),
                    )
                    .await?;
                session.emit(&summaries, || output::render_alert_summaries(&summaries))
            }
            Commands::PerfFrameworks => {
                let frameworks = session
                    .fetch(
                        "Fetching frameworks",
                        session.client.performance_frameworks(),
                    )
                    .await?;
                session.emit(&frameworks, || output::render_frameworks(&frameworks))
            }
            Commands::Classifications => {
                let classifications = session
                    .fetch(
                        "Fetching classifications",
                        session.client.failure_classifications(),
                    )
                    .await?;
                session.emit(&classifications, || {
                    output::render_classifications(&classifications)
                })
            }
            Commands::Watch {
                project,
                push_id,
                revision,
                interval,
                until_complete,
            } => {
                let target = match (push_id, revision) {
                    (Some(id), _) => PushTarget::Id(*id),
                    (None, Some(revision)) => PushTarget::Revision(revision.clone()),
                    (None, None) => bail!("Either --push-id or --revision is required"),
                };
                let interval_secs = interval.unwrap_or(session.config.watch.interval_secs);
                if interval_secs == 0 {
                    bail!("--interval must be at least 1 second");
                }
                let options = WatchOptions {
                    project: project.clone(),
                    target,
                    interval: Duration::from_secs(interval_secs),
                    until_complete: *until_complete,
                    json: session.json,
                };
                watch::run(&session.client, &options).await
            }
        }
    }
}

async fn execute_repos(session: &Session, all: bool) -> Result<()> {
    let mut repos = session
        .fetch("Fetching repositories", session.client.repositories())
        .await?;
    if !all {
        repos.retain(|repo| repo.is_active());
    }
    session.emit(&repos, || output::render_repositories(&repos))
}

async fn execute_pushes(session: &Session, project: &str, query: &PushQuery) -> Result<()> {
    info!("Fetching pushes for {project}");
    let pushes = session
        .fetch("Fetching pushes", session.client.pushes(project, query))
        .await?;
    session.emit(&pushes, || output::render_pushes(project, &pushes))
}

async fn execute_jobs(
    session: &Session,
    project: &str,
    query: &JobQuery,
    filter: &JobFilter,
) -> Result<()> {
    info!(
        "Fetching up to {} jobs for {project}",
        query.effective_count()
    );
    let jobs = session
        .fetch("Fetching jobs", session.client.jobs(project, query))
        .await?;

    let fetched = jobs.len();
    let jobs = filter.apply(jobs);
    if !filter.is_empty() {
        info!("{} of {} jobs matched the filters", jobs.len(), fetched);
    }

    session.emit(&jobs, || output::render_jobs(project, &jobs))
}

async fn execute_job(session: &Session, project: &str, job: &str, logs: bool) -> Result<()> {
    let client = &session.client;
    let job = match job.parse::<u64>() {
        Ok(id) => session.fetch("Fetching job", client.job(project, id)).await?,
        Err(_) => {
            session
                .fetch("Fetching job", client.job_by_guid(project, job))
                .await?
        }
    };

    if !logs {
        return session.emit(&job, || output::render_job_detail(&job, None));
    }

    let log_urls = session
        .fetch("Fetching log URLs", client.job_log_urls(project, job.id))
        .await?;
    let with_logs = JobWithLogs {
        job: &job,
        log_urls: &log_urls,
    };
    session.emit(&with_logs, || {
        output::render_job_detail(&job, Some(&log_urls))
    })
}

async fn execute_failures(
    session: &Session,
    query: &FailureQuery,
    filter: &FailureFilter,
) -> Result<()> {
    info!(
        "Fetching failures for bug {} from {} to {} on {}",
        query.bug_id, query.start_day, query.end_day, query.tree
    );
    let failures = session
        .fetch("Fetching failures", session.client.failures_by_bug(query))
        .await?;
    let failures = filter.apply(failures);
    session.emit(&failures, || {
        output::render_failures(query.bug_id, &failures)
    })
}

async fn execute_errors(
    session: &Session,
    project: &str,
    job_id: u64,
    with_suggestions: bool,
) -> Result<()> {
    let client = &session.client;
    let errors = session
        .fetch("Fetching errors", client.text_log_errors(project, job_id))
        .await?;
    let bug_suggestions = if with_suggestions {
        Some(
            session
                .fetch(
                    "Fetching bug suggestions",
                    client.bug_suggestions(project, job_id),
                )
                .await?,
        )
    } else {
        None
    };

    let result = JobErrors {
        errors,
        bug_suggestions,
    };
    session.emit(&result, || {
        output::render_errors(job_id, &result.errors, result.bug_suggestions.as_deref())
    })
}

async fn execute_log(
    session: &Session,
    project: &str,
    job_id: u64,
    log_name: &str,
    search: &LogSearch,
) -> Result<()> {
    let client = &session.client;
    let log_urls = session
        .fetch("Fetching log URLs", client.job_log_urls(project, job_id))
        .await?;
    let log = select_log(&log_urls, log_name, job_id)?;

    let progress = FetchProgress::start(&format!("Downloading {}", log.name), !session.json);
    let text = match client.log_text(&log.url).await {
        Ok(text) => {
            progress.finish(&format!("Downloaded {}", log.name));
            text
        }
        Err(err) => {
            progress.clear();
            return Err(err.into());
        }
    };

    let matches = search.search(&text);
    let result = LogSearchResult {
        log,
        matches: &matches,
    };
    session.emit(&result, || output::render_log_matches(log, &matches))
}

/// The log called `name`, else the job's first log.
fn select_log<'a>(
    log_urls: &'a [JobLogUrl],
    name: &str,
    job_id: u64,
) -> Result<&'a JobLogUrl, TreeherderError> {
    if let Some(log) = log_urls.iter().find(|log| log.name == name) {
        return Ok(log);
    }
    match log_urls.first() {
        Some(log) => {
            warn!(
                "No log named {name} for job {job_id}, using {} instead",
                log.name
            );
            Ok(log)
        }
        None => Err(TreeherderError::NotFound {
            resource: "Log",
            id: job_id.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    fn log_urls() -> Vec<JobLogUrl> {
        serde_json::from_value(json!([
            {"id": 1, "job_id": 7, "name": "builds-4h", "url": "https://logs/builds-4h.log"},
            {"id": 2, "job_id": 7, "name": "live_backing_log", "url": "https://logs/live.log"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_jobs_flags() {
        let cli = Cli::try_parse_from([
            "lumberjack",
            "--json",
            "jobs",
            "autoland",
            "--push-id",
            "12345",
            "--state",
            "completed",
            "-p",
            "linux",
            "--min-duration",
            "60",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Jobs {
                push_id,
                state,
                platform,
                min_duration,
                count,
                ..
            } => {
                assert_eq!(push_id, Some(12345));
                assert_eq!(state, Some(JobState::Completed));
                assert_eq!(platform.as_deref(), Some("linux"));
                assert_eq!(min_duration, Some(60));
                assert_eq!(count, None);
            }
            _ => panic!("expected jobs command"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_state() {
        assert!(Cli::try_parse_from(["lumberjack", "jobs", "autoland", "--state", "queued"]).is_err());
    }

    #[test]
    fn test_watch_requires_push_or_revision() {
        assert!(Cli::try_parse_from(["lumberjack", "watch", "autoland"]).is_err());
        assert!(Cli::try_parse_from([
            "lumberjack",
            "watch",
            "autoland",
            "--push-id",
            "1",
            "--revision",
            "abc"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["lumberjack", "watch", "autoland", "-r", "abc"]).is_ok());
    }

    #[test]
    fn test_parse_failures_dates() {
        let cli = Cli::try_parse_from([
            "lumberjack",
            "failures",
            "1800000",
            "--startday",
            "2024-03-01",
            "--endday",
            "2024-03-08",
        ])
        .unwrap();

        match cli.command {
            Commands::Failures {
                bug_id,
                tree,
                days,
                startday,
                endday,
                ..
            } => {
                assert_eq!(bug_id, 1_800_000);
                assert_eq!(tree, "all");
                assert_eq!(days, 7);
                assert_eq!(startday, NaiveDate::from_ymd_opt(2024, 3, 1));
                assert_eq!(endday, NaiveDate::from_ymd_opt(2024, 3, 8));
            }
            _ => panic!("expected failures command"),
        }
    }

    #[tokio::test]
    async fn test_failures_rejects_overflowing_days() {
        let cli = Cli::try_parse_from([
            "lumberjack",
            "--server",
            "http://127.0.0.1:9",
            "failures",
            "1800000",
            "--days",
            "18446744073709551615",
        ])
        .unwrap();

        let err = cli.execute().await.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid --days value"));
    }

    #[tokio::test]
    async fn test_failures_rejects_start_after_end() {
        let cli = Cli::try_parse_from([
            "lumberjack",
            "--server",
            "http://127.0.0.1:9",
            "failures",
            "1800000",
            "--startday",
            "2024-03-09",
            "--endday",
            "2024-03-08",
        ])
        .unwrap();

        let err = cli.execute().await.unwrap_err();
        assert!(err.to_string().contains("is after end day"));
    }

    #[test]
    fn test_select_log_by_name() {
        let logs = log_urls();
        assert_eq!(select_log(&logs, "live_backing_log", 7).unwrap().id, 2);
    }

    #[test]
    fn test_select_log_falls_back_to_first() {
        let logs = log_urls();
        assert_eq!(select_log(&logs, "errorsummary", 7).unwrap().id, 1);
    }

    #[test]
    fn test_select_log_without_logs() {
        let err = select_log(&[], DEFAULT_LOG_NAME, 7).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_job_with_logs_flattens_job() {
        let job: Job = serde_json::from_value(json!({
            "id": 7,
            "job_guid": "abc/0",
            "push_id": 3,
            "state": "completed",
            "result": "success"
        }))
        .unwrap();
        let logs = log_urls();

        let value = serde_json::to_value(JobWithLogs {
            job: &job,
            log_urls: &logs,
        })
        .unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["log_urls"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_execute_pushes_against_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/project/mozilla-central/push/")
            .match_query(mockito::Matcher::UrlEncoded("count".into(), "5".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"results": [], "meta": {}}).to_string())
            .create_async()
            .await;

        let cli = Cli::try_parse_from([
            "lumberjack",
            "--server",
            &server.url(),
            "--json",
            "pushes",
            "mozilla-central",
            "-n",
            "5",
        ])
        .unwrap();

        cli.execute().await.unwrap();
        mock.assert_async().await;
    }
}
