//! Content fingerprints for change detection on the schedule graph.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::models::{Activity, ActivityId};

/// Fingerprint of the parts of the activity set that the critical-path pass
/// reads: ids, durations and predecessor edges.
///
/// Independent of input order, except that a duplicated id only contributes
/// its first occurrence (the one the critical-path pass keeps). Dates, names
/// and progress do not contribute, so editing them does not invalidate a
/// cached critical path.
pub fn graph_fingerprint(activities: &[Activity]) -> String {
    let mut seen: HashSet<ActivityId> = HashSet::new();
    let mut rows: Vec<String> = activities
        .iter()
        .filter(|a| seen.insert(a.id))
        .map(|a| {
            let preds: Vec<String> = a.predecessor_ids.iter().map(|p| p.to_string()).collect();
            format!("{}|{}|{}", a.id, a.effective_duration(), preds.join(","))
        })
        .collect();
    rows.sort();

    let mut hasher = Sha256::new();
    for row in &rows {
        hasher.update(row.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn activity(id: i64, days: i64) -> Activity {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Activity::planned(id, format!("A{}", id), start, start + chrono::Duration::days(days))
    }

    #[test]
    fn test_fingerprint_ignores_order_and_progress() {
        let a = vec![activity(1, 2), activity(2, 3).with_predecessors([1])];
        let mut b = vec![a[1].clone().with_progress(80.0), a[0].clone()];
        assert_eq!(graph_fingerprint(&a), graph_fingerprint(&b));

        b[0].predecessor_ids.clear();
        assert_ne!(graph_fingerprint(&a), graph_fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_follows_first_duplicate() {
        let short = activity(1, 2).with_duration(2.0);
        let long = activity(1, 2).with_duration(9.0);
        let a = vec![short.clone(), long.clone()];
        let b = vec![long.clone(), short.clone()];
        assert_ne!(graph_fingerprint(&a), graph_fingerprint(&b));
        assert_eq!(graph_fingerprint(&a), graph_fingerprint(&[short]));
        assert_eq!(graph_fingerprint(&b), graph_fingerprint(&[long]));
    }

    #[test]
    fn test_fingerprint_tracks_duration() {
        let a = vec![activity(1, 2)];
        let b = vec![activity(1, 2).with_duration(5.0)];
        assert_ne!(graph_fingerprint(&a), graph_fingerprint(&b));
    }
}
