//! Pure pipeline-position logic.
//!
//! The next round is always recomputed from the job's ordered round list
//! rather than read from a stored successor pointer. Round Directory can
//! therefore reorder or delete rounds freely; advancement picks up the
//! re-compacted order on its next call with no migration step.

use uuid::Uuid;

/// Outcome of planning one advancement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceStep {
    /// Move into the round with this id and mark the application in progress.
    Enter(Uuid),
    /// The pipeline is exhausted: mark the application shortlisted and leave
    /// the current-round pointer where it is.
    Shortlist,
}

/// Plans the next step for an application given the job's rounds ordered by
/// index. Returns `None` when the job defines no rounds at all
/// (`NoRoundsDefined` at the operation boundary).
///
/// A `current` pointer that no longer appears in the list (its round was
/// deleted) resolves to position -1, restarting the application at the
/// first round.
pub fn plan_advance(ordered_rounds: &[Uuid], current: Option<Uuid>) -> Option<AdvanceStep> {
    if ordered_rounds.is_empty() {
        return None;
    }

    let current_index = current
        .and_then(|id| ordered_rounds.iter().position(|&r| r == id).map(|p| p as i64))
        .unwrap_or(-1);
    let next_index = current_index + 1;

    match ordered_rounds.get(next_index as usize) {
        Some(&next) => Some(AdvanceStep::Enter(next)),
        None => Some(AdvanceStep::Shortlist),
    }
}

/// Page/limit pair clamped to sane bounds: page is 1-based, limit 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    pub page: i64,
    pub limit: i64,
}

impl PageBounds {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    pub fn clamp(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT);
        PageBounds { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_walks_rounds_in_order() {
        let rounds = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];

        assert_eq!(
            plan_advance(&rounds, None),
            Some(AdvanceStep::Enter(rounds[0]))
        );
        assert_eq!(
            plan_advance(&rounds, Some(rounds[0])),
            Some(AdvanceStep::Enter(rounds[1]))
        );
        assert_eq!(
            plan_advance(&rounds, Some(rounds[1])),
            Some(AdvanceStep::Enter(rounds[2]))
        );
        assert_eq!(
            plan_advance(&rounds, Some(rounds[2])),
            Some(AdvanceStep::Shortlist)
        );
    }

    #[test]
    fn test_advance_with_no_rounds_is_none() {
        assert_eq!(plan_advance(&[], None), None);
        assert_eq!(plan_advance(&[], Some(Uuid::new_v4())), None);
    }

    #[test]
    fn test_stale_pointer_restarts_at_first_round() {
        let rounds = [Uuid::new_v4(), Uuid::new_v4()];
        let deleted = Uuid::new_v4();
        assert_eq!(
            plan_advance(&rounds, Some(deleted)),
            Some(AdvanceStep::Enter(rounds[0]))
        );
    }

    #[test]
    fn test_single_round_pipeline_exhausts_after_one_step() {
        let rounds = [Uuid::new_v4()];
        assert_eq!(
            plan_advance(&rounds, Some(rounds[0])),
            Some(AdvanceStep::Shortlist)
        );
    }

    #[test]
    fn test_page_bounds_defaults() {
        let b = PageBounds::clamp(None, None);
        assert_eq!(b, PageBounds { page: 1, limit: 20 });
        assert_eq!(b.offset(), 0);
    }

    #[test]
    fn test_page_bounds_clamped() {
        let b = PageBounds::clamp(Some(0), Some(5000));
        assert_eq!(b, PageBounds { page: 1, limit: 100 });

        let b = PageBounds::clamp(Some(3), Some(10));
        assert_eq!(b.offset(), 20);
    }
}
