//! Element-activity link index.
//!
//! Groups links by activity and fixes a deterministic order inside each group
//! (lexicographic by element stable id). The element-count visualization
//! reveals elements in this order, so the same progress ratio always reveals
//! the same elements regardless of how the provider ordered its records.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::models::{ActivityId, ElementActivityLink, ElementId};

#[derive(Debug, Clone, Default)]
pub struct LinkIndex {
    by_activity: BTreeMap<ActivityId, Vec<ElementActivityLink>>,
    by_element: BTreeMap<ElementId, BTreeSet<ActivityId>>,
    link_count: usize,
}

impl LinkIndex {
    /// Build the index from raw links.
    ///
    /// Inactive links are skipped. A repeated (element, activity) pair keeps
    /// its first occurrence.
    pub fn build(links: &[ElementActivityLink]) -> Self {
        let mut index = LinkIndex::default();
        let mut seen: HashSet<(&ElementId, ActivityId)> = HashSet::new();

        for link in links {
            if !link.is_active() {
                continue;
            }
            if !seen.insert((&link.element_stable_id, link.activity_id)) {
                log::debug!(
                    "Duplicate link {} -> {} ignored",
                    link.element_stable_id,
                    link.activity_id
                );
                continue;
            }

            index
                .by_activity
                .entry(link.activity_id)
                .or_default()
                .push(link.clone());
            index
                .by_element
                .entry(link.element_stable_id.clone())
                .or_default()
                .insert(link.activity_id);
            index.link_count += 1;
        }

        // Stable sort: equal ids (impossible after dedup) would keep insertion order
        for group in index.by_activity.values_mut() {
            group.sort_by(|a, b| a.element_stable_id.cmp(&b.element_stable_id));
        }

        index
    }

    /// Links of one activity in stable element order (empty if none).
    pub fn links_for_activity(&self, id: ActivityId) -> &[ElementActivityLink] {
        self.by_activity.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Activity ids that have at least one link, ascending.
    pub fn activities(&self) -> impl Iterator<Item = ActivityId> + '_ {
        self.by_activity.keys().copied()
    }

    /// Activities an element is linked to, ascending.
    pub fn activities_for_element(&self, id: &ElementId) -> Vec<ActivityId> {
        self.by_element
            .get(id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Every linked element, ascending by stable id.
    pub fn linked_elements(&self) -> impl Iterator<Item = &ElementId> + '_ {
        self.by_element.keys()
    }

    /// Elements linked to more than one activity.
    pub fn shared_elements(&self) -> Vec<&ElementId> {
        self.by_element
            .iter()
            .filter(|(_, acts)| acts.len() > 1)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn element_count(&self) -> usize {
        self.by_element.len()
    }

    /// Number of indexed links.
    pub fn len(&self) -> usize {
        self.link_count
    }

    pub fn is_empty(&self) -> bool {
        self.link_count == 0
    }
}
