#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use clap::Parser;
use raidgate_cli::{Cli, CliError, drive};
use raidgate_test_support::fixtures::{touch_file, write_script};
use serde_json::Value;
use tempfile::TempDir;

static SPAWN_LOCK: Mutex<()> = Mutex::new(());

const HEALTHY: &str = r#"
case "$1" in
  diff)
    printf 'add photos/2026/a.jpg\n'
    printf 'update docs/report.odt\n'
    printf '  12 equal\n'
    exit 2
    ;;
esac
exit 0
"#;

const SYNC_FAILS: &str = r#"
case "$1" in
  diff)
    printf 'add photos/2026/a.jpg\n'
    exit 2
    ;;
  sync)
    echo "Error writing the parity file" >&2
    exit 1
    ;;
esac
exit 0
"#;

struct Array {
    _guard: MutexGuard<'static, ()>,
    dir: TempDir,
}

impl Array {
    fn new(script: &str, extra_config: &str) -> Result<Self> {
        let guard = SPAWN_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let dir = tempfile::tempdir()?;
        let binary = write_script(dir.path(), "snapraid", script)?;
        let snapraid_conf = touch_file(dir.path(), "snapraid.conf")?;
        fs::write(
            dir.path().join("raidgate.yml"),
            format!(
                "snapraid_bin: {}\nsnapraid_config: {}\noutput_dir: {}\n{extra_config}",
                binary.display(),
                snapraid_conf.display(),
                dir.path().join("runs").display()
            ),
        )?;
        Ok(Self { _guard: guard, dir })
    }

    fn cli(&self, flags: &[&str]) -> Result<Cli> {
        let config = self.dir.path().join("raidgate.yml");
        let mut args = vec![
            "raidgate".to_string(),
            "--config".to_string(),
            config.display().to_string(),
        ];
        args.extend(flags.iter().map(ToString::to_string));
        Ok(Cli::try_parse_from(args)?)
    }

    fn runs(&self) -> PathBuf {
        self.dir.path().join("runs")
    }
}

fn only_run(dir: &Path) -> Result<Value> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("missing output dir {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    assert_eq!(entries.len(), 1, "expected exactly one run file");
    let path = entries.remove(0).path();
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    Ok(serde_json::from_slice(&fs::read(path)?)?)
}

#[tokio::test]
async fn missing_config_is_a_validation_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let cli = Cli::try_parse_from([
        "raidgate",
        "--config",
        &dir.path().join("absent.yml").display().to_string(),
    ])?;

    let err = drive(cli).await.expect_err("config does not exist");
    assert!(matches!(err, CliError::Validation(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(err.display_message().starts_with("failed to read config file"));
    Ok(())
}

#[tokio::test]
async fn successful_run_persists_outcome() -> Result<()> {
    let array = Array::new(HEALTHY, "")?;
    drive(array.cli(&[])?)
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;

    let run = only_run(&array.runs())?;
    assert_eq!(run["result"]["added_files"][0], "photos/2026/a.jpg");
    assert_eq!(run["result"]["updated_files"][0], "docs/report.odt");
    assert_eq!(run["result"]["equal"], 12);
    assert!(run.get("error").is_none());
    assert!(run["timings"]["sync"].as_u64().is_some());
    Ok(())
}

#[tokio::test]
async fn threshold_flag_violation_fails_run_and_records_error() -> Result<()> {
    let array = Array::new(HEALTHY, "thresholds:\n  add: 0\n")?;
    let err = drive(array.cli(&["--no-notify"])?)
        .await
        .expect_err("one added file exceeds a zero limit");
    assert_eq!(err.exit_code(), 3);
    assert_eq!(
        err.display_message(),
        "added files exceed threshold (1 > 0)"
    );

    let run = only_run(&array.runs())?;
    assert_eq!(run["error"], "added files exceed threshold (1 > 0)");
    assert_eq!(run["timings"]["sync"], 0);
    Ok(())
}

#[tokio::test]
async fn failing_sync_is_an_operational_failure() -> Result<()> {
    let array = Array::new(SYNC_FAILS, "")?;
    let err = drive(array.cli(&[])?).await.expect_err("sync exits 1");
    assert!(matches!(err, CliError::Failure(_)));
    assert_eq!(err.exit_code(), 3);
    assert!(err.display_message().contains("Error writing the parity file"));
    Ok(())
}

#[tokio::test]
async fn dry_run_never_syncs() -> Result<()> {
    let array = Array::new(SYNC_FAILS, "thresholds:\n  add: 0\n")?;
    drive(array.cli(&["--dry-run"])?)
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;

    let run = only_run(&array.runs())?;
    assert_eq!(run["result"]["added_files"][0], "photos/2026/a.jpg");
    assert!(run.get("error").is_none());
    Ok(())
}

#[tokio::test]
async fn out_of_range_plan_flag_is_rejected_before_running() -> Result<()> {
    let array = Array::new(HEALTHY, "")?;
    let err = drive(array.cli(&["--plan", "101"])?)
        .await
        .expect_err("plan above 100");
    assert_eq!(err.exit_code(), 2);
    assert!(!array.runs().exists());
    Ok(())
}
