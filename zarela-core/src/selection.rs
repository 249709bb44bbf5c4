use indexmap::IndexMap;
use serde::Serialize;

use crate::aggregate::ContributionGroup;
use crate::domain::{Address, ContentHash};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Toggle {
    Select,
    Deselect,
}

/// Tri-state of a contributor's checkbox.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GroupState {
    None,
    Partial,
    All,
}

/// Contributor -> chosen hashes. Keys always mirror the group it was built
/// from; there is no public way to add or drop a key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionState {
    chosen: IndexMap<Address, Vec<ContentHash>>,
}

impl SelectionState {
    pub(crate) fn empty_for(group: &ContributionGroup) -> Self {
        Self {
            chosen: group.contributors().map(|a| (a.clone(), Vec::new())).collect(),
        }
    }

    pub fn contributors(&self) -> impl Iterator<Item = &Address> {
        self.chosen.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &[ContentHash])> {
        self.chosen.iter().map(|(a, h)| (a, h.as_slice()))
    }

    pub fn selected(&self, address: &Address) -> Option<&[ContentHash]> {
        self.chosen.get(address).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn selected_count(&self) -> usize {
        self.chosen.values().map(Vec::len).sum()
    }
}

/// Distinct hashes of one contributor, first occurrence wins.
fn distinct_hashes(group: &ContributionGroup, address: &Address) -> Vec<ContentHash> {
    let mut out: Vec<ContentHash> = Vec::new();
    for f in group.files(address).unwrap_or_default() {
        if !out.contains(&f.content_hash) {
            out.push(f.content_hash.clone());
        }
    }
    out
}

/// Group plus the selection made against it.
#[derive(Clone, Debug, Default)]
pub struct SelectionStore {
    group: ContributionGroup,
    state: SelectionState,
}

impl SelectionStore {
    pub fn new(group: ContributionGroup) -> Self {
        let state = SelectionState::empty_for(&group);
        Self { group, state }
    }

    pub fn group(&self) -> &ContributionGroup {
        &self.group
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn toggle_file(&mut self, address: &Address, hash: &ContentHash, action: Toggle) {
        if !self.group.contains(address, hash) {
            return;
        }
        let Some(chosen) = self.state.chosen.get_mut(address) else {
            return;
        };
        match action {
            Toggle::Select => {
                if !chosen.contains(hash) {
                    chosen.push(hash.clone());
                }
            }
            Toggle::Deselect => chosen.retain(|h| h != hash),
        }
    }

    pub fn toggle_group(&mut self, address: &Address, action: Toggle) {
        let next = match action {
            Toggle::Select => distinct_hashes(&self.group, address),
            Toggle::Deselect => Vec::new(),
        };
        if let Some(chosen) = self.state.chosen.get_mut(address) {
            *chosen = next;
        }
    }

    pub fn toggle_all(&mut self, action: Toggle) {
        let addresses: Vec<Address> = self.group.contributors().cloned().collect();
        for a in &addresses {
            self.toggle_group(a, action);
        }
    }

    /// True when every contributor has all of its distinct hashes chosen.
    /// Vacuously true for an empty group.
    pub fn is_all_selected(&self) -> bool {
        self.group
            .contributors()
            .all(|a| self.group_state(a) == GroupState::All)
    }

    pub fn group_state(&self, address: &Address) -> GroupState {
        let chosen = self.state.selected(address).map_or(0, <[_]>::len);
        let total = self.total_for(address);
        match chosen {
            0 if total > 0 => GroupState::None,
            n if n == total => GroupState::All,
            _ => GroupState::Partial,
        }
    }

    pub fn is_selected(&self, address: &Address, hash: &ContentHash) -> bool {
        self.state
            .selected(address)
            .is_some_and(|chosen| chosen.contains(hash))
    }

    pub fn selected_count(&self) -> usize {
        self.state.selected_count()
    }

    fn total_for(&self, address: &Address) -> usize {
        distinct_hashes(&self.group, address).len()
    }
}
