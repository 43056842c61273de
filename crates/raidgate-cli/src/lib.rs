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
#![allow(clippy::redundant_pub_crate)]

//! Unattended SnapRAID maintenance runner.
//!
//! Layout:
//! - `cli.rs`: argument parsing and the process entry point
//! - `app.rs`: the driver wiring config, pipeline, persistence, and notifications
//! - `error.rs`: CLI error classes and exit codes
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod app;
pub(crate) mod cli;
pub(crate) mod error;

pub use app::drive;
pub use error::{CliError, CliResult};
pub use cli::{Cli, run};
