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

//! Run summary notifications.
//!
//! Layout: `summary.rs` (message formatting), `slack.rs` (delivery via
//! `chat.postMessage`), `error.rs` (delivery errors).

pub mod error;
pub mod slack;
pub mod summary;

pub use error::{NotifyError, NotifyResult};
pub use slack::{SLACK_POST_MESSAGE_URL, SlackNotifier};
pub use summary::{COLOR_FAILURE, COLOR_SUCCESS, SlackMessage, SummaryOptions, format_summary, run_link};
