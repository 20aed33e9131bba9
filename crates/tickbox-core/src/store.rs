//! The map of all currently tracked regions, keyed by node marker.
//!
//! Discovery attaches a marker to unmarked nodes and indexes a new `Region`
//! for them; eviction drops every region whose marker did not show up in the
//! latest page scan. Comparison is by marker, never by node reference: the
//! host may swap node objects under us, and a region survives exactly as
//! long as its marker does.

use smol_str::SmolStr;
use std::collections::{HashMap, HashSet};

use crate::error::SyncError;
use crate::node::RegionNode;
use crate::region::{Region, RegionRole};

#[derive(Debug, Default)]
pub struct RegionStore {
    regions: HashMap<SmolStr, Region>,
    /// Markers of nodes that failed classification. Kept so the loop does
    /// not re-log the same failure on every tick.
    excluded: HashSet<SmolStr>,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.regions.contains_key(marker)
    }

    pub fn is_excluded(&self, marker: &str) -> bool {
        self.excluded.contains(marker)
    }

    pub fn get(&self, marker: &str) -> Option<&Region> {
        self.regions.get(marker)
    }

    pub fn get_mut(&mut self, marker: &str) -> Option<&mut Region> {
        self.regions.get_mut(marker)
    }

    /// Look up the region backing a marked node.
    pub fn lookup(&self, node: &impl RegionNode) -> Option<&Region> {
        node.marker().and_then(|m| self.regions.get(&m))
    }

    /// Track a node that carries no live marker.
    ///
    /// Classifies the node, creates an `Uninitialized` region, attaches the
    /// region id as the node's marker and returns it. Classification failure
    /// excludes the node from all further processing, as does a comment
    /// without a remote key.
    pub fn discover(&mut self, node: &impl RegionNode) -> Option<SmolStr> {
        let role = match node.classify() {
            Some(role) => role,
            None => {
                self.exclude(node, SyncError::Classification);
                return None;
            }
        };

        let remote_key = match role {
            RegionRole::Comment => match node.remote_key() {
                Some(key) => Some(key),
                None => {
                    self.exclude(node, SyncError::MissingCommentKey);
                    return None;
                }
            },
            _ => None,
        };

        let region = Region::new(role, remote_key);
        let marker = region.id.clone();
        node.set_marker(&marker);
        tracing::debug!(region = %marker, role = ?role, "discovered region");
        self.regions.insert(marker.clone(), region);
        Some(marker)
    }

    /// Drop every region (and exclusion) whose marker is absent from the
    /// latest scan. Returns how many regions were evicted.
    pub fn evict(&mut self, live: &[SmolStr]) -> usize {
        let before = self.regions.len();
        self.regions.retain(|marker, _| live.contains(marker));
        self.excluded.retain(|marker| live.contains(marker));
        let evicted = before - self.regions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "evicted stale regions");
        }
        evicted
    }

    /// The comment region with this remote key, if tracked.
    pub fn comment_by_key_mut(&mut self, key: &str) -> Option<&mut Region> {
        self.regions
            .values_mut()
            .find(|r| r.role == RegionRole::Comment && r.remote_key.as_deref() == Some(key))
    }

    /// The description region, if tracked.
    pub fn description_mut(&mut self) -> Option<&mut Region> {
        self.regions
            .values_mut()
            .find(|r| r.role == RegionRole::Description)
    }

    /// Comment regions still waiting for remote text: (marker, remote key).
    ///
    /// After applying a comment fetch, anything left here had no matching
    /// remote item; the driver decides between benign
    /// (node marked deleted) and error.
    pub fn uninitialized_comments(&self) -> Vec<(SmolStr, SmolStr)> {
        self.regions
            .values()
            .filter(|r| r.role == RegionRole::Comment && !r.is_ready())
            .filter_map(|r| r.remote_key.clone().map(|key| (r.id.clone(), key)))
            .collect()
    }

    fn exclude(&mut self, node: &impl RegionNode, err: SyncError) {
        let marker = crate::ident::unique_id();
        node.set_marker(&marker);
        tracing::error!(marker = %marker, %err, "excluding node from tracking");
        self.excluded.insert(marker);
    }
}
