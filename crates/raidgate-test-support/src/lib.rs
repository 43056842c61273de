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

//! Shared test helpers used across integration suites.
//! Layout: mocks.rs (scripted `CommandExecutor`), sink.rs (recording `LineSink`),
//! logs.rs (JSON capture of `tracing` events), fixtures.rs (shell-script stand-ins
//! for the snapraid binary).

pub mod fixtures;
pub mod logs;
pub mod mocks;
pub mod sink;

pub use logs::CapturedLogs;
pub use mocks::FakeExecutor;
pub use sink::{RecordedLine, RecordingSink};
