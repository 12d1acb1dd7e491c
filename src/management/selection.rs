use std::collections::BTreeSet;

use crate::{
    error::GatewayError,
    management::DataGateway,
    remote::Remote,
    types::{Entity, EntityId},
};

/// Outcome of a bulk delete, one entry per selected id.
#[derive(Debug, Default)]
pub struct BulkDeleteReport {
    pub deleted: Vec<EntityId>,
    pub failed: Vec<(EntityId, GatewayError)>,
}

impl BulkDeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<&EntityId> {
        self.failed.iter().map(|(id, _)| id).collect()
    }
}

/// Snapshot taken by `toggle_all` when it selected a whole view, so the
/// next `toggle_all` over the same view can put the set back.
#[derive(Debug, Clone)]
struct ToggleAllMemo {
    view: BTreeSet<EntityId>,
    previously_selected: BTreeSet<EntityId>,
}

/// Set of entity ids chosen for a bulk action.
#[derive(Debug, Default)]
pub struct SelectionController {
    selected: BTreeSet<EntityId>,
    memo: Option<ToggleAllMemo>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: &EntityId) {
        self.memo = None;
        if !self.selected.remove(id) {
            self.selected.insert(id.clone());
        }
    }

    /// Selects every entity of the view, or deselects them when all are
    /// already selected. Ids outside the view are never touched.
    pub fn toggle_all(&mut self, view: &[&Entity]) {
        let view_ids: BTreeSet<EntityId> = view.iter().map(|e| e.id.clone()).collect();
        if view_ids.is_empty() {
            return;
        }

        if view_ids.is_subset(&self.selected) {
            for id in &view_ids {
                self.selected.remove(id);
            }
            if let Some(memo) = self.memo.take().filter(|m| m.view == view_ids) {
                self.selected.extend(memo.previously_selected);
            }
        } else {
            let previously_selected = view_ids.intersection(&self.selected).cloned().collect();
            self.selected.extend(view_ids.iter().cloned());
            self.memo = Some(ToggleAllMemo {
                view: view_ids,
                previously_selected,
            });
        }
    }

    pub fn clear(&mut self) {
        self.memo = None;
        self.selected.clear();
    }

    /// Drops ids that are no longer in the cache.
    pub fn prune(&mut self, cache: &[Entity]) {
        let before = self.selected.len();
        self.selected
            .retain(|id| cache.iter().any(|entity| &entity.id == id));
        if self.selected.len() != before {
            self.memo = None;
        }
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.selected.iter()
    }

    /// Deletes every selected entity, one call at a time in id order. A
    /// failure does not stop the remaining deletes. The selection is empty
    /// afterwards whatever the outcome.
    pub async fn bulk_delete<R: Remote>(&mut self, gateway: &mut DataGateway<R>) -> BulkDeleteReport {
        let ids: Vec<EntityId> = std::mem::take(&mut self.selected).into_iter().collect();
        self.memo = None;

        let mut report = BulkDeleteReport::default();
        for id in ids {
            match gateway.delete(&id).await {
                Ok(()) => report.deleted.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }
        report
    }
}
