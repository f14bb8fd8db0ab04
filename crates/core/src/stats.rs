//! Completion statistics shared by the per-segment and per-user views.

use serde::{Deserialize, Serialize};

use crate::model::Segment;

/// Which users count as eligible when computing a segment's completion rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Audience {
    AllUsers,
    PremiumOnly,
}

impl Audience {
    /// Premium segments are measured against premium users only.
    #[must_use]
    pub fn for_segment(segment: &Segment) -> Self {
        if segment.is_premium() {
            Audience::PremiumOnly
        } else {
            Audience::AllUsers
        }
    }
}

/// Percentage of `total` represented by `completed`, in `[0, 100]`.
///
/// Returns `0.0` when `total` is zero. `completed` may exceed `total` when a
/// user lost their premium entitlement after watching a premium segment; the
/// result is clamped to 100 in that case.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completion_percentage(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = completed as f64 / total as f64;
    (ratio * 100.0).clamp(0.0, 100.0)
}
