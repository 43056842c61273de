//! Go/no-go gate comparing detected changes against configured limits.

use serde::Serialize;
use thiserror::Error;

use crate::model::{ChangeKind, ChangeSet, ThresholdSet};

/// A category whose change count exceeded its enabled limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[error("{category} files exceed threshold ({actual} > {limit})")]
pub struct ThresholdViolation {
    /// Offending category.
    pub category: ChangeKind,
    /// Number of paths detected for the category.
    pub actual: usize,
    /// Configured limit that was exceeded.
    pub limit: u64,
}

/// Check `changes` against `limits` in the fixed category order.
///
/// Returns the first violation found; later categories are not examined.
#[must_use]
pub fn check_thresholds(changes: &ChangeSet, limits: &ThresholdSet) -> Option<ThresholdViolation> {
    ChangeKind::ALL.into_iter().find_map(|category| {
        let limit = limits.limit(category)?;
        let actual = changes.count(category);
        let exceeded = u64::try_from(actual).map_or(true, |count| count > limit);
        exceeded.then_some(ThresholdViolation {
            category,
            actual,
            limit,
        })
    })
}
