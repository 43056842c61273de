//! Parser for the plain-text output of `snapraid diff`.
//!
//! Recognised shapes, after trimming:
//! - `<count> equal` accumulates into [`ChangeSet::equal`].
//! - `<action> <path>` appends `<path>` verbatim to the matching category.
//!
//! Everything else (banners, the tool's own `N added` totals, blank lines) is ignored.

use crate::model::{ChangeKind, ChangeSet};

const EQUAL_TOKEN: &str = "equal";

/// Convert raw diff output lines into a [`ChangeSet`].
///
/// Never fails; unrecognised lines do not affect the result.
#[must_use]
pub fn parse_diff<I, S>(lines: I) -> ChangeSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut changes = ChangeSet::default();
    for raw in lines {
        let line = raw.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if let Some(count) = equal_count(line) {
            changes.equal = changes.equal.saturating_add(count);
            continue;
        }
        if let Some((kind, path)) = itemised_path(line) {
            changes.paths_mut(kind).push(path.to_string());
        }
    }
    changes
}

fn equal_count(line: &str) -> Option<u64> {
    let mut fields = line.split_whitespace();
    let (Some(count), Some(label), None) = (fields.next(), fields.next(), fields.next()) else {
        return None;
    };
    if !label.eq_ignore_ascii_case(EQUAL_TOKEN) {
        return None;
    }
    count.parse().ok()
}

fn itemised_path(line: &str) -> Option<(ChangeKind, &str)> {
    let (action, rest) = line.split_once(' ')?;
    let kind = ChangeKind::from_action(&action.to_ascii_lowercase())?;
    Some((kind, rest.trim()))
}
