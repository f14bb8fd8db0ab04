use std::collections::HashSet;

use serde::Serialize;

use crate::model::ids::{SegmentId, UserId};
use crate::model::segment::Segment;
use crate::stats::completion_percentage;

/// Fact that `user_id` has watched `segment_id`. Presence is the whole signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub segment_id: SegmentId,
}

impl ProgressRecord {
    #[must_use]
    pub fn new(user_id: UserId, segment_id: SegmentId) -> Self {
        Self {
            user_id,
            segment_id,
        }
    }
}

/// A user's overall course completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CourseCompletion {
    pub watched: u64,
    pub total: u64,
    pub percentage: f64,
}

impl CourseCompletion {
    /// Combine a user's progress with the current segment list.
    ///
    /// Records pointing at segments that no longer exist are ignored.
    #[must_use]
    pub fn compute(progress: &[ProgressRecord], segments: &[Segment]) -> Self {
        let existing: HashSet<SegmentId> = segments.iter().map(Segment::id).collect();
        let watched: HashSet<SegmentId> = progress
            .iter()
            .map(|p| p.segment_id)
            .filter(|id| existing.contains(id))
            .collect();

        let watched = watched.len() as u64;
        let total = existing.len() as u64;
        Self {
            watched,
            total,
            percentage: completion_percentage(watched, total),
        }
    }
}
