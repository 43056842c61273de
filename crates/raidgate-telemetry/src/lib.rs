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

//! Telemetry primitives shared across the raidgate workspace.
//!
//! Layout: `init.rs` (subscriber installation and build identifier), `context.rs`
//! (run-scoped span guard), `error.rs` (telemetry errors).

pub mod context;
pub mod error;
pub mod init;

pub use context::{RunContextGuard, new_run_id, run_span};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
