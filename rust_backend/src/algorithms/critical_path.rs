//! Critical Path Method over the activity predecessor graph.
//!
//! Standard two-pass CPM:
//! 1. forward pass in topological order computes earliest start/finish,
//! 2. backward pass in reverse order computes latest start/finish from the
//!    project end (the maximum earliest finish),
//! 3. an activity is critical when its total float is zero (within
//!    [`FLOAT_EPSILON`]).
//!
//! A predecessor cycle makes the graph unschedulable and is reported as a
//! [`CycleError`]. [`CriticalPathCache`] turns that into "nothing is critical"
//! for the visibility engine and guards against consulting a result computed
//! for an older graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::fingerprint::graph_fingerprint;
use crate::models::{Activity, ActivityId};

/// Tolerance for comparing day-valued schedule figures.
pub const FLOAT_EPSILON: f64 = 1e-6;

/// The predecessor graph contains at least one cycle.
///
/// `members` lists every activity that could not be placed in topological
/// order: the cycle itself plus anything downstream of it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("predecessor cycle detected among activities [{}]", format_ids(.members))]
pub struct CycleError {
    pub members: Vec<ActivityId>,
}

fn format_ids(ids: &[ActivityId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Per-activity CPM figures, in days from the project start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFigures {
    pub earliest_start: f64,
    pub earliest_finish: f64,
    pub latest_start: f64,
    pub latest_finish: f64,
    pub total_float: f64,
}

/// Output of one critical-path pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPathResult {
    pub critical: BTreeSet<ActivityId>,
    pub figures: BTreeMap<ActivityId, ScheduleFigures>,
    pub project_duration: f64,
}

impl CriticalPathResult {
    /// An empty result: no activity is critical.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_critical(&self, id: ActivityId) -> bool {
        self.critical.contains(&id)
    }

    /// Critical activities in earliest-start order (ties by id).
    pub fn ordered_path(&self) -> Vec<ActivityId> {
        let mut path: Vec<ActivityId> = self.critical.iter().copied().collect();
        path.sort_by(|a, b| {
            let fa = self.figures.get(a).map(|f| f.earliest_start).unwrap_or(0.0);
            let fb = self.figures.get(b).map(|f| f.earliest_start).unwrap_or(0.0);
            fa.total_cmp(&fb).then(a.cmp(b))
        });
        path
    }
}

/// Run the two-pass Critical Path Method.
///
/// Predecessor ids that do not name a known activity are ignored (and logged).
/// Duplicate activity ids keep the first occurrence.
///
/// # Errors
/// [`CycleError`] if the predecessor edges contain a cycle.
pub fn compute_critical_path(activities: &[Activity]) -> Result<CriticalPathResult, CycleError> {
    let mut nodes: BTreeMap<ActivityId, &Activity> = BTreeMap::new();
    for activity in activities {
        if nodes.contains_key(&activity.id) {
            log::warn!("Duplicate activity id {} ignored by critical path pass", activity.id);
            continue;
        }
        nodes.insert(activity.id, activity);
    }

    if nodes.is_empty() {
        return Ok(CriticalPathResult::empty());
    }

    // Edges restricted to known activities
    let mut predecessors: BTreeMap<ActivityId, Vec<ActivityId>> = BTreeMap::new();
    let mut successors: BTreeMap<ActivityId, Vec<ActivityId>> = BTreeMap::new();
    for (id, activity) in &nodes {
        let mut preds = Vec::new();
        for pred in &activity.predecessor_ids {
            if nodes.contains_key(pred) {
                preds.push(*pred);
                successors.entry(*pred).or_default().push(*id);
            } else {
                log::warn!(
                    "Activity {} references unknown predecessor {}; edge ignored",
                    id,
                    pred
                );
            }
        }
        predecessors.insert(*id, preds);
    }

    let order = topological_order(&nodes, &predecessors, &successors)?;
    let duration = |id: &ActivityId| nodes.get(id).map(|a| a.effective_duration()).unwrap_or(0.0);

    // Forward pass
    let mut earliest: BTreeMap<ActivityId, (f64, f64)> = BTreeMap::new();
    for id in &order {
        let es = predecessors
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|p| earliest.get(p).map(|(_, ef)| *ef))
            .fold(0.0_f64, f64::max);
        earliest.insert(*id, (es, es + duration(id)));
    }

    let project_end = order
        .iter()
        .filter(|id| successors.get(*id).map_or(true, |s| s.is_empty()))
        .filter_map(|id| earliest.get(id).map(|(_, ef)| *ef))
        .fold(0.0_f64, f64::max);

    // Backward pass
    let mut latest: BTreeMap<ActivityId, (f64, f64)> = BTreeMap::new();
    for id in order.iter().rev() {
        let lf = successors
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|s| latest.get(s).map(|(ls, _)| *ls))
            .fold(project_end, f64::min);
        latest.insert(*id, (lf - duration(id), lf));
    }

    let mut result = CriticalPathResult {
        project_duration: project_end,
        ..Default::default()
    };
    for id in &order {
        let (es, ef) = earliest[id];
        let (ls, lf) = latest[id];
        let total_float = ls - es;
        if total_float.abs() < FLOAT_EPSILON {
            result.critical.insert(*id);
        }
        result.figures.insert(
            *id,
            ScheduleFigures {
                earliest_start: es,
                earliest_finish: ef,
                latest_start: ls,
                latest_finish: lf,
                total_float,
            },
        );
    }

    log::debug!(
        "Critical path: {} of {} activities critical, project duration {} days",
        result.critical.len(),
        order.len(),
        project_end
    );

    Ok(result)
}

/// Kahn's algorithm with an id-ordered ready set so the order is deterministic.
fn topological_order(
    nodes: &BTreeMap<ActivityId, &Activity>,
    predecessors: &BTreeMap<ActivityId, Vec<ActivityId>>,
    successors: &BTreeMap<ActivityId, Vec<ActivityId>>,
) -> Result<Vec<ActivityId>, CycleError> {
    let mut in_degree: BTreeMap<ActivityId, usize> = nodes
        .keys()
        .map(|id| (*id, predecessors.get(id).map_or(0, |p| p.len())))
        .collect();

    let mut ready: BTreeSet<ActivityId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(id) = ready.pop_first() {
        order.push(id);
        for succ in successors.get(&id).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(succ) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(*succ);
                }
            }
        }
    }

    if order.len() < nodes.len() {
        let placed: BTreeSet<ActivityId> = order.iter().copied().collect();
        let members = nodes.keys().filter(|id| !placed.contains(id)).copied().collect();
        return Err(CycleError { members });
    }

    Ok(order)
}

/// Holds the critical-path result for exactly one version of the schedule graph.
///
/// Every lookup goes through [`CriticalPathCache::resolve`] with the current
/// activities; a changed graph fingerprint forces recomputation, so a result
/// computed for an older graph is never returned.
#[derive(Debug, Default)]
pub struct CriticalPathCache {
    fingerprint: Option<String>,
    result: CriticalPathResult,
    last_error: Option<CycleError>,
}

impl CriticalPathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the critical path for `activities`, recomputing if the graph changed.
    ///
    /// A cycle is logged and yields the empty result.
    pub fn resolve(&mut self, activities: &[Activity]) -> &CriticalPathResult {
        let fingerprint = graph_fingerprint(activities);
        if self.fingerprint.as_deref() != Some(fingerprint.as_str()) {
            self.store(fingerprint, compute_critical_path(activities));
        }
        &self.result
    }

    /// Recompute unconditionally (used when fresh data lands).
    pub fn recompute(&mut self, activities: &[Activity]) -> Result<&CriticalPathResult, CycleError> {
        let fingerprint = graph_fingerprint(activities);
        self.store(fingerprint, compute_critical_path(activities));
        match &self.last_error {
            Some(err) => Err(err.clone()),
            None => Ok(&self.result),
        }
    }

    /// Drop the cached result; the next `resolve` recomputes.
    pub fn invalidate(&mut self) {
        self.fingerprint = None;
        self.result = CriticalPathResult::empty();
        self.last_error = None;
    }

    /// The cycle reported by the most recent computation, if any.
    pub fn last_error(&self) -> Option<&CycleError> {
        self.last_error.as_ref()
    }

    pub fn is_current_for(&self, activities: &[Activity]) -> bool {
        self.fingerprint.as_deref() == Some(graph_fingerprint(activities).as_str())
    }

    fn store(&mut self, fingerprint: String, computed: Result<CriticalPathResult, CycleError>) {
        match computed {
            Ok(result) => {
                self.result = result;
                self.last_error = None;
            }
            Err(err) => {
                log::error!("{}; continuing with no critical activities", err);
                self.result = CriticalPathResult::empty();
                self.last_error = Some(err);
            }
        }
        self.fingerprint = Some(fingerprint);
    }
}
