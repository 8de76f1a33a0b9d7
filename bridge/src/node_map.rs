//! Bidirectional correspondence between source and target nodes
//!
//! Both directions are keyed by handle identity. A source node may fan out to
//! several target nodes; every registered target node has exactly one source.

use crate::source::SourceId;
use crate::target::TargetId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeMap {
    /// Targets of each source node, in emission order
    source_to_target: HashMap<SourceId, Vec<TargetId>>,
    /// Indexed by `TargetId`; `None` for synthetic nodes
    target_to_source: Vec<Option<SourceId>>,
    mapped: usize,
}

impl NodeMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record `target` as produced from `source`.
    ///
    /// Target handles are allocated monotonically by the driver, so each
    /// source's target list stays sorted.
    pub(crate) fn register(&mut self, source: SourceId, target: TargetId) {
        let index = target.index();
        if self.target_to_source.len() <= index {
            self.target_to_source.resize(index + 1, None);
        }

        let slot = &mut self.target_to_source[index];
        debug_assert!(slot.is_none(), "target {} registered twice", target);
        if slot.replace(source).is_none() {
            self.mapped += 1;
        }

        self.source_to_target.entry(source).or_default().push(target);
    }

    /// Forget every target whose handle is `first_discarded` or later.
    pub(crate) fn rollback(&mut self, first_discarded: TargetId) {
        let cutoff = first_discarded.index();
        if cutoff >= self.target_to_source.len() {
            return;
        }

        for slot in self.target_to_source.drain(cutoff..).rev() {
            let Some(source) = slot else { continue };
            self.mapped -= 1;
            if let Entry::Occupied(mut entry) = self.source_to_target.entry(source) {
                entry.get_mut().pop();
                if entry.get().is_empty() {
                    entry.remove();
                }
            }
        }
    }

    /// Carry the entries over to renumbered targets, dropping any target that
    /// maps to `None`.
    pub(crate) fn remap(&self, remap: &[Option<TargetId>]) -> NodeMap {
        let mut renumbered = NodeMap::new();
        for (target, source) in self.iter() {
            if let Some(Some(new)) = remap.get(target.index()) {
                renumbered.register(source, *new);
            }
        }
        renumbered
    }

    pub fn source_of(&self, target: TargetId) -> Option<SourceId> {
        self.target_to_source.get(target.index()).copied().flatten()
    }

    /// All targets produced from `source`, in emission order
    pub fn targets_of(&self, source: SourceId) -> &[TargetId] {
        self.source_to_target
            .get(&source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first_target_of(&self, source: SourceId) -> Option<TargetId> {
        self.targets_of(source).first().copied()
    }

    pub fn contains_source(&self, source: SourceId) -> bool {
        self.source_to_target.contains_key(&source)
    }

    pub fn contains_target(&self, target: TargetId) -> bool {
        self.source_of(target).is_some()
    }

    /// Number of mapped target nodes
    pub fn len(&self) -> usize {
        self.mapped
    }

    pub fn is_empty(&self) -> bool {
        self.mapped == 0
    }

    /// Number of distinct source nodes with at least one target
    pub fn source_count(&self) -> usize {
        self.source_to_target.len()
    }

    /// `(target, source)` pairs in target order
    pub fn iter(&self) -> impl Iterator<Item = (TargetId, SourceId)> + '_ {
        self.target_to_source
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|source| (TargetId::from_index(index), source)))
    }
}
