//! Formats a [`RunOutcome`] as a Slack attachment.

use std::fmt::Write as _;
use std::time::Duration;

use raidgate_pipeline::{ChangeKind, RunOutcome, Step};
use serde::Serialize;
use url::Url;

/// Attachment colour for runs without a terminal error.
pub const COLOR_SUCCESS: &str = "#2ECC71";
/// Attachment colour for failed runs.
pub const COLOR_FAILURE: &str = "#E74C3C";

const SUMMARY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Rendering options that are not part of the outcome itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions<'a> {
    /// The run only detected changes.
    pub dry_run: bool,
    /// Web UI base; adds a "View run" link when set.
    pub web_url: Option<&'a Url>,
}

/// Message body and colour ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessage {
    /// `mrkdwn` text.
    pub text: String,
    /// Hex colour of the attachment bar.
    pub color: &'static str,
}

/// Render a human-readable summary of `outcome`.
#[must_use]
pub fn format_summary(outcome: &RunOutcome, options: SummaryOptions<'_>) -> SlackMessage {
    let mut text = format!(
        "SnapRAID run ({} UTC){}:",
        outcome.timestamp.format(SUMMARY_TIME_FORMAT),
        if options.dry_run { " (dry run)" } else { "" }
    );
    for kind in ChangeKind::ALL {
        let _ = write!(
            text,
            "\n• {}: {}",
            capitalise(kind.as_str()),
            outcome.result.count(kind)
        );
    }
    let _ = write!(text, "\n• Equal: {}", outcome.result.equal);

    let timings: Vec<String> = [Step::Touch, Step::Diff, Step::Sync, Step::Scrub, Step::Smart]
        .into_iter()
        .map(|step| (capitalise(step.as_str()), outcome.timings.get(step)))
        .chain([("Total".to_string(), outcome.timings.total)])
        .filter(|(_, elapsed)| !elapsed.is_zero())
        .map(|(label, elapsed)| format!("• {label}: {}", whole_seconds(elapsed)))
        .collect();
    if !timings.is_empty() {
        text.push_str("\n\nTimings:\n");
        text.push_str(&timings.join("\n"));
    }

    if let Some(error) = &outcome.error {
        let _ = write!(text, "\n\nError: {error}");
    }

    if let Some(base) = options.web_url {
        let _ = write!(
            text,
            "\n\n<{}|View run>",
            run_link(base, &outcome.timestamp_label())
        );
    }

    SlackMessage {
        text,
        color: if outcome.is_success() {
            COLOR_SUCCESS
        } else {
            COLOR_FAILURE
        },
    }
}

/// Deep link to a run in the web UI: `<base>/#/run/<timestamp>`.
///
/// The timestamp is percent-encoded as a URL fragment.
#[must_use]
pub fn run_link(base: &Url, timestamp: &str) -> Url {
    let mut link = base.clone();
    let trimmed = link.path().trim_end_matches('/').to_string();
    link.set_path(&format!("{trimmed}/"));
    link.set_query(None);
    link.set_fragment(Some(&format!("/run/{timestamp}")));
    link
}

fn capitalise(label: &str) -> String {
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn whole_seconds(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, _) => format!("{minutes}m{seconds}s"),
        _ => format!("{hours}h{minutes}m{seconds}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use raidgate_pipeline::{PipelineError, ThresholdViolation};

    type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

    fn outcome() -> TestResult<RunOutcome> {
        let timestamp = Utc
            .with_ymd_and_hms(2026, 3, 14, 2, 30, 5)
            .single()
            .ok_or("invalid timestamp")?;
        let mut outcome = RunOutcome::new(timestamp);
        outcome.result.equal = 21_156;
        outcome.result.added = vec!["a".into(), "b".into()];
        outcome.result.removed = vec!["c".into()];
        outcome.timings.diff = Duration::from_millis(2_900);
        outcome.timings.sync = Duration::from_secs(3_725);
        outcome.timings.total = Duration::from_secs(3_728);
        Ok(outcome)
    }

    #[test]
    fn success_summary_lists_counts_and_timings() -> TestResult<()> {
        let message = format_summary(&outcome()?, SummaryOptions::default());
        assert_eq!(message.color, COLOR_SUCCESS);
        assert_eq!(
            message.text,
            "SnapRAID run (2026-03-14 02:30 UTC):\n\
             • Added: 2\n\
             • Removed: 1\n\
             • Updated: 0\n\
             • Moved: 0\n\
             • Copied: 0\n\
             • Restored: 0\n\
             • Equal: 21156\n\
             \n\
             Timings:\n\
             • Diff: 2s\n\
             • Sync: 1h2m5s\n\
             • Total: 1h2m8s"
        );
        Ok(())
    }

    #[test]
    fn failure_summary_is_red_and_includes_error() -> TestResult<()> {
        let mut outcome = outcome()?;
        outcome.error = Some(PipelineError::from(ThresholdViolation {
            category: ChangeKind::Added,
            actual: 2,
            limit: 1,
        }));
        let message = format_summary(
            &outcome,
            SummaryOptions {
                dry_run: true,
                web_url: None,
            },
        );
        assert_eq!(message.color, COLOR_FAILURE);
        assert!(message.text.starts_with("SnapRAID run (2026-03-14 02:30 UTC) (dry run):"));
        assert!(message.text.ends_with("Error: added files exceed threshold (2 > 1)"));
        Ok(())
    }

    #[test]
    fn summary_without_timings_omits_section() -> TestResult<()> {
        let mut outcome = outcome()?;
        outcome.timings = raidgate_pipeline::StepTiming::default();
        let message = format_summary(&outcome, SummaryOptions::default());
        assert!(!message.text.contains("Timings"));
        Ok(())
    }

    #[test]
    fn link_appends_fragment_route() -> TestResult<()> {
        let base = Url::parse("https://nas.local/snapraid//")?;
        assert_eq!(
            run_link(&base, "2026-03-14T02:30:05Z").as_str(),
            "https://nas.local/snapraid/#/run/2026-03-14T02:30:05Z"
        );

        let root = Url::parse("https://nas.local")?;
        assert_eq!(
            run_link(&root, "a b").as_str(),
            "https://nas.local/#/run/a%20b"
        );
        Ok(())
    }

    #[test]
    fn summary_includes_view_link() -> TestResult<()> {
        let base = Url::parse("https://nas.local/")?;
        let message = format_summary(
            &outcome()?,
            SummaryOptions {
                dry_run: false,
                web_url: Some(&base),
            },
        );
        assert!(message
            .text
            .ends_with("<https://nas.local/#/run/2026-03-14T02:30:05Z|View run>"));
        Ok(())
    }

    #[test]
    fn whole_seconds_truncates() {
        assert_eq!(whole_seconds(Duration::from_millis(999)), "0s");
        assert_eq!(whole_seconds(Duration::from_secs(61)), "1m1s");
    }
}
