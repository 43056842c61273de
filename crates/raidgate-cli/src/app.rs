//! Run driver: configuration, pipeline, persistence, then notification.

use raidgate_config::{RunnerConfig, load_config};
use raidgate_notify::{SlackNotifier, SummaryOptions, format_summary};
use raidgate_pipeline::{ChangeKind, PipelineRunner, RunOutcome, SnapraidExecutor};
use raidgate_telemetry::{RunContextGuard, new_run_id, run_span};
use tracing::{Instrument, Span, error, info, warn};
use url::Url;

use crate::cli::Cli;
use crate::error::{CliError, CliResult};

/// Execute one supervised run for the parsed `cli` flags.
///
/// Logging must already be installed; [`crate::run`] does this before calling in.
///
/// # Errors
///
/// Returns [`CliError::Validation`] for configuration problems detected before any
/// snapraid process starts, and [`CliError::Failure`] when the run itself failed.
pub async fn drive(cli: Cli) -> CliResult<()> {
    let config = prepare(&cli)?;
    let web_url = config.web_url().map(parse_web_url).transpose()?;
    let pipeline = config.pipeline_config().map_err(CliError::config)?;

    let executor = SnapraidExecutor::new(
        config.snapraid_bin.clone(),
        config.snapraid_config.clone(),
        pipeline.scrub,
    );
    let runner = PipelineRunner::new(executor, pipeline, config.thresholds);

    let span = run_span(new_run_id());
    execute(runner, &config, web_url.as_ref(), span.clone())
        .instrument(span)
        .await
}

async fn execute(
    runner: PipelineRunner<SnapraidExecutor>,
    config: &RunnerConfig,
    web_url: Option<&Url>,
    worker_span: Span,
) -> CliResult<()> {
    let mut outcome = tokio::task::spawn_blocking(move || {
        let _context = RunContextGuard::enter(worker_span);
        runner.run()
    })
    .await
    .map_err(|err| {
        CliError::failure(anyhow::Error::new(err).context("pipeline worker panicked"))
    })?;

    log_summary(&outcome);
    persist(config, &outcome);
    if config.wants_slack() {
        notify(config, &outcome, web_url).await;
    }

    match outcome.error.take() {
        Some(err) => Err(CliError::failure(err)),
        None => {
            info!("all done");
            Ok(())
        }
    }
}

fn prepare(cli: &Cli) -> CliResult<RunnerConfig> {
    let mut config = load_config(&cli.config).map_err(CliError::config)?.resolve();
    config.validate().map_err(CliError::config)?;
    config
        .apply_overrides(&cli.overrides())
        .map_err(CliError::config)?;
    info!(
        config = %cli.config.display(),
        dry_run = config.dry_run,
        touch = config.steps.touch,
        scrub = config.steps.scrub,
        smart = config.steps.smart,
        "configuration loaded"
    );
    Ok(config)
}

fn parse_web_url(value: &str) -> CliResult<Url> {
    Url::parse(value).map_err(|err| {
        CliError::validation(format!("invalid value for 'notifications.web': {err}"))
    })
}

fn log_summary(outcome: &RunOutcome) {
    let changes = &outcome.result;
    if !changes.has_changes() {
        info!(equal = changes.equal, "no changes detected");
        return;
    }
    info!(
        added = changes.count(ChangeKind::Added),
        removed = changes.count(ChangeKind::Removed),
        updated = changes.count(ChangeKind::Updated),
        moved = changes.count(ChangeKind::Moved),
        copied = changes.count(ChangeKind::Copied),
        restored = changes.count(ChangeKind::Restored),
        equal = changes.equal,
        "changes detected"
    );
}

fn persist(config: &RunnerConfig, outcome: &RunOutcome) {
    let Some(dir) = &config.output_dir else {
        return;
    };
    match outcome.write_json(dir) {
        Ok(path) => info!(path = %path.display(), "run result saved"),
        Err(err) => warn!(error = %err, dir = %dir.display(), "failed to save run result"),
    }
}

async fn notify(config: &RunnerConfig, outcome: &RunOutcome, web_url: Option<&Url>) {
    let notifications = &config.notifications;
    let notifier = match SlackNotifier::new(
        notifications.slack_token.clone(),
        &notifications.slack_channel,
    ) {
        Ok(notifier) => notifier,
        Err(err) => {
            error!(error = %err, "failed to build slack client");
            return;
        }
    };
    let message = format_summary(
        outcome,
        SummaryOptions {
            dry_run: config.dry_run,
            web_url,
        },
    );
    if let Err(err) = notifier.send(&message).await {
        error!(error = %err, channel = notifier.channel(), "failed to send slack summary");
    }
}
