//! Pure ordering logic for a job's rounds.
//!
//! Rounds carry a dense, zero-based `order_index` with a uniqueness
//! constraint on (job_id, order_index). Deletion repairs the range by
//! re-compaction; reordering relabels through a high offset so the two-phase
//! write never trips the constraint mid-transaction.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use uuid::Uuid;

/// Offset added during phase one of a reorder. Larger than any real index,
/// so intermediate labels cannot collide with final ones.
pub const REORDER_OFFSET: i32 = 10_000;

/// One entry of a requested permutation.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderEntry {
    pub round_id: Uuid,
    pub new_index: i32,
}

/// Validates that `requested` is an exact permutation of `existing`:
/// every existing round appears exactly once, and the target indices are
/// exactly `0..n-1`. Returns the (round_id, new_index) plan sorted by
/// target index, or a description of the first problem found.
pub fn validate_permutation(
    existing: &[Uuid],
    requested: &[ReorderEntry],
) -> Result<Vec<(Uuid, i32)>, String> {
    if requested.len() != existing.len() {
        return Err(format!(
            "Expected {} rounds, got {}",
            existing.len(),
            requested.len()
        ));
    }

    let known: HashSet<Uuid> = existing.iter().copied().collect();
    let mut seen_ids: HashSet<Uuid> = HashSet::new();
    let mut seen_indices: HashSet<i32> = HashSet::new();

    for entry in requested {
        if !known.contains(&entry.round_id) {
            return Err(format!("Round {} does not belong to this job", entry.round_id));
        }
        if !seen_ids.insert(entry.round_id) {
            return Err(format!("Round {} listed more than once", entry.round_id));
        }
        if entry.new_index < 0 || entry.new_index as usize >= existing.len() {
            return Err(format!(
                "Index {} out of range 0..{}",
                entry.new_index,
                existing.len()
            ));
        }
        if !seen_indices.insert(entry.new_index) {
            return Err(format!("Index {} assigned more than once", entry.new_index));
        }
    }

    let mut plan: Vec<(Uuid, i32)> = requested
        .iter()
        .map(|e| (e.round_id, e.new_index))
        .collect();
    plan.sort_by_key(|&(_, idx)| idx);
    Ok(plan)
}

/// Given the surviving rounds ordered by their current index, returns the
/// (round_id, new_index) rewrites needed to restore a contiguous `0..n-1`
/// range. Rounds already at the correct index are skipped.
pub fn compaction_plan(ordered: &[(Uuid, i32)]) -> Vec<(Uuid, i32)> {
    ordered
        .iter()
        .enumerate()
        .filter(|(position, (_, current))| *position as i32 != *current)
        .map(|(position, (id, _))| (*id, position as i32))
        .collect()
}

/// True when the permutation is the identity over the current order, in
/// which case the two-phase write can be skipped entirely.
pub fn is_identity(current: &HashMap<Uuid, i32>, plan: &[(Uuid, i32)]) -> bool {
    plan.iter()
        .all(|(id, idx)| current.get(id) == Some(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn entries(pairs: &[(Uuid, i32)]) -> Vec<ReorderEntry> {
        pairs
            .iter()
            .map(|&(round_id, new_index)| ReorderEntry {
                round_id,
                new_index,
            })
            .collect()
    }

    #[test]
    fn test_valid_swap_accepted() {
        let r = ids(2);
        let plan = validate_permutation(&r, &entries(&[(r[0], 1), (r[1], 0)])).unwrap();
        assert_eq!(plan, vec![(r[1], 0), (r[0], 1)]);
    }

    #[test]
    fn test_missing_round_rejected() {
        let r = ids(3);
        let err = validate_permutation(&r, &entries(&[(r[0], 0), (r[1], 1)])).unwrap_err();
        assert!(err.contains("Expected 3"), "{err}");
    }

    #[test]
    fn test_foreign_round_rejected() {
        let r = ids(2);
        let stranger = Uuid::new_v4();
        let err =
            validate_permutation(&r, &entries(&[(r[0], 0), (stranger, 1)])).unwrap_err();
        assert!(err.contains("does not belong"), "{err}");
    }

    #[test]
    fn test_duplicate_round_rejected() {
        let r = ids(2);
        let err = validate_permutation(&r, &entries(&[(r[0], 0), (r[0], 1)])).unwrap_err();
        assert!(err.contains("more than once"), "{err}");
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let r = ids(2);
        let err = validate_permutation(&r, &entries(&[(r[0], 0), (r[1], 0)])).unwrap_err();
        assert!(err.contains("assigned more than once"), "{err}");
    }

    #[test]
    fn test_gap_in_indices_rejected() {
        let r = ids(2);
        let err = validate_permutation(&r, &entries(&[(r[0], 0), (r[1], 2)])).unwrap_err();
        assert!(err.contains("out of range"), "{err}");
    }

    #[test]
    fn test_negative_index_rejected() {
        let r = ids(1);
        let err = validate_permutation(&r, &entries(&[(r[0], -1)])).unwrap_err();
        assert!(err.contains("out of range"), "{err}");
    }

    #[test]
    fn test_empty_permutation_of_empty_job() {
        assert_eq!(validate_permutation(&[], &[]).unwrap(), vec![]);
    }

    #[test]
    fn test_compaction_skips_correct_indices() {
        let r = ids(3);
        // Index 1 was deleted: [0, 2, 3] should become [0, 1, 2] with the
        // first round untouched.
        let plan = compaction_plan(&[(r[0], 0), (r[1], 2), (r[2], 3)]);
        assert_eq!(plan, vec![(r[1], 1), (r[2], 2)]);
    }

    #[test]
    fn test_compaction_noop_when_contiguous() {
        let r = ids(2);
        assert!(compaction_plan(&[(r[0], 0), (r[1], 1)]).is_empty());
    }

    #[test]
    fn test_identity_detection() {
        let r = ids(2);
        let current: HashMap<Uuid, i32> = [(r[0], 0), (r[1], 1)].into_iter().collect();
        assert!(is_identity(&current, &[(r[0], 0), (r[1], 1)]));
        assert!(!is_identity(&current, &[(r[0], 1), (r[1], 0)]));
    }
}
