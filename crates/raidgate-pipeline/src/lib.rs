#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Supervised maintenance pipeline for SnapRAID arrays.
//!
//! Layout: `model/` (change sets, limits, step configuration), `diff.rs`
//! (diff output parser), `threshold.rs` (change gate), `tap.rs` (line-buffered
//! output capture), `executor.rs` (`CommandExecutor` + process adapter),
//! `runner.rs` (the step state machine), `outcome.rs` (run record + persistence).

pub mod diff;
pub mod error;
pub mod executor;
pub mod model;
pub mod outcome;
pub mod runner;
pub mod tap;
pub mod threshold;

pub use diff::parse_diff;
pub use error::{PipelineError, PipelineResult};
pub use executor::{CommandExecutor, SnapraidExecutor, accepts_exit_code};
pub use model::{ChangeKind, ChangeSet, PipelineConfig, ScrubOptions, Step, Steps, ThresholdSet};
pub use outcome::{RunOutcome, StepTiming};
pub use runner::PipelineRunner;
pub use tap::{LineRecord, LineSink, LineTap, TracingSink};
pub use threshold::{ThresholdViolation, check_thresholds};
