//! Tag hierarchy
//!
//! Tags form a directed acyclic graph of super-tag -> sub-tag edges. Unlike a
//! tree, a tag may have several parents. Both directions are indexed so that
//! upward and downward walks are equally cheap:
//!
//! - `children`: parent -> direct sub-tags
//! - `parents`:  child -> direct super-tags
//!
//! The two maps are private and every mutation updates both, so `b` is a child
//! of `a` exactly when `a` is a parent of `b`. Only tags that take part in at
//! least one edge have entries, and no entry ever holds an empty set.
//!
//! Every traversal is an explicit worklist with a visited set. The graph is
//! acyclic by construction, but a walk over a corrupted graph still terminates.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::tag::{ChildSelector, Tag};

static NO_TAGS: BTreeSet<Tag> = BTreeSet::new();

/// Persisted form of the hierarchy: each super-tag with its direct sub-tags
pub type ChildrenMap = BTreeMap<Tag, BTreeSet<Tag>>;

/// Multi-parent tag DAG
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagHierarchy {
    children: BTreeMap<Tag, BTreeSet<Tag>>,
    parents: BTreeMap<Tag, BTreeSet<Tag>>,
}

impl TagHierarchy {
    /// Create an empty hierarchy
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a hierarchy from its persisted parent -> children mapping.
    ///
    /// The parent index is reconstructed from the mapping. Self edges and
    /// cycles are rejected since the file was not produced by a valid model.
    pub fn from_children_map(map: &ChildrenMap) -> CoreResult<Self> {
        let mut hierarchy = Self::new();
        for (parent, children) in map {
            for child in children {
                hierarchy.add_edge(parent, child).map_err(|_| {
                    CoreError::corrupt_snapshot(format!(
                        "tag hierarchy edge '{}' -> '{}' forms a cycle",
                        parent, child
                    ))
                })?;
            }
        }
        Ok(hierarchy)
    }

    /// The parent -> children mapping, suitable for persistence
    pub fn to_children_map(&self) -> ChildrenMap {
        self.children.clone()
    }

    /// Add a super-tag -> sub-tag edge.
    ///
    /// Fails without mutating anything if `parent == child` or if `parent` is
    /// already reachable from `child`.
    pub fn add_edge(&mut self, parent: &Tag, child: &Tag) -> CoreResult<()> {
        if parent == child || self.is_descendant_of(parent, child) {
            return Err(CoreError::CyclicDependency {
                parent: parent.clone(),
                child: child.clone(),
            });
        }

        if self.insert_edge(parent, child) {
            debug!(%parent, %child, "added tag edge");
        }
        self.debug_check();
        Ok(())
    }

    /// Remove edges from `parent` to the selected children.
    ///
    /// Returns the children that were actually detached. Removing an edge
    /// that does not exist is a no-op.
    pub fn remove_edge(&mut self, parent: &Tag, selector: &ChildSelector) -> Vec<Tag> {
        let targets: Vec<Tag> = match selector {
            ChildSelector::All => self.children(parent).iter().cloned().collect(),
            ChildSelector::One(child) if self.has_edge(parent, child) => vec![child.clone()],
            ChildSelector::One(_) => Vec::new(),
        };

        for child in &targets {
            self.unlink(parent, child);
        }
        if !targets.is_empty() {
            debug!(%parent, removed = targets.len(), "removed tag edges");
        }

        self.debug_check();
        targets
    }

    /// Direct sub-tags of `tag`
    pub fn children(&self, tag: &Tag) -> &BTreeSet<Tag> {
        self.children.get(tag).unwrap_or(&NO_TAGS)
    }

    /// Direct super-tags of `tag`
    pub fn parents(&self, tag: &Tag) -> &BTreeSet<Tag> {
        self.parents.get(tag).unwrap_or(&NO_TAGS)
    }

    pub fn has_edge(&self, parent: &Tag, child: &Tag) -> bool {
        self.children(parent).contains(child)
    }

    /// Whether `tag` takes part in at least one edge
    pub fn contains(&self, tag: &Tag) -> bool {
        self.children.contains_key(tag) || self.parents.contains_key(tag)
    }

    /// Whether `tag` has at least one child
    pub fn is_super_tag(&self, tag: &Tag) -> bool {
        self.children.contains_key(tag)
    }

    /// Tags with at least one child
    pub fn super_tags(&self) -> impl Iterator<Item = &Tag> {
        self.children.keys()
    }

    /// Every tag that takes part in at least one edge
    pub fn tags(&self) -> BTreeSet<&Tag> {
        self.children.keys().chain(self.parents.keys()).collect()
    }

    /// Every edge as `(parent, child)`
    pub fn edges(&self) -> impl Iterator<Item = (&Tag, &Tag)> {
        self.children
            .iter()
            .flat_map(|(parent, children)| children.iter().map(move |child| (parent, child)))
    }

    pub fn edge_count(&self) -> usize {
        self.children.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// All tags reachable from `tag` by following child edges, excluding `tag`
    pub fn descendants(&self, tag: &Tag) -> BTreeSet<Tag> {
        Self::closure(&self.children, tag)
    }

    /// All tags from which `tag` is reachable, excluding `tag`
    pub fn ancestors(&self, tag: &Tag) -> BTreeSet<Tag> {
        Self::closure(&self.parents, tag)
    }

    /// Whether `candidate` is reachable from `of` through child edges
    pub fn is_descendant_of(&self, candidate: &Tag, of: &Tag) -> bool {
        let mut visited: BTreeSet<&Tag> = BTreeSet::new();
        let mut stack: Vec<&Tag> = vec![of];

        while let Some(current) = stack.pop() {
            for child in self.children(current) {
                if child == candidate {
                    return true;
                }
                if visited.insert(child) {
                    stack.push(child);
                }
            }
        }
        false
    }

    /// `{tag} ∪ descendants(tag)`, ordered so that each tag comes after every
    /// one of its own descendants. `tag` is always last.
    pub fn subtree_post_order(&self, tag: &Tag) -> Vec<Tag> {
        let mut order = Vec::new();
        let mut visited: BTreeSet<&Tag> = BTreeSet::new();
        // (tag, children already pushed)
        let mut stack: Vec<(&Tag, bool)> = vec![(tag, false)];

        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                order.push(current.clone());
                continue;
            }
            // a tag reachable along two paths may be stacked twice
            if !visited.insert(current) {
                continue;
            }
            stack.push((current, true));
            for child in self.children(current) {
                if !visited.contains(child) {
                    stack.push((child, false));
                }
            }
        }
        order
    }

    /// Drop `tag`, linking each of its parents directly to each of its
    /// children. Returns the edges that were newly created.
    pub(crate) fn remove_reconnecting(&mut self, tag: &Tag) -> Vec<(Tag, Tag)> {
        let parents: Vec<Tag> = self.parents(tag).iter().cloned().collect();
        let children: Vec<Tag> = self.children(tag).iter().cloned().collect();

        self.detach(tag);

        // A parent is an ancestor and a child a descendant of `tag`, so a
        // parent -> child edge cannot close a cycle.
        let mut added = Vec::new();
        for parent in &parents {
            for child in &children {
                if self.insert_edge(parent, child) {
                    added.push((parent.clone(), child.clone()));
                }
            }
        }

        debug!(%tag, reconnected = added.len(), "removed tag from hierarchy");
        self.debug_check();
        added
    }

    /// Drop `tag` and all of its descendants together with every edge that
    /// touches them. Returns the removed tags in post order.
    pub(crate) fn remove_subtree(&mut self, tag: &Tag) -> Vec<Tag> {
        let order = self.subtree_post_order(tag);
        for member in &order {
            self.detach(member);
        }

        debug!(%tag, removed = order.len(), "removed tag subtree from hierarchy");
        self.debug_check();
        order
    }

    /// Verify the structural invariants, returning a description of the first
    /// violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (name, map, inverse) in [
            ("children", &self.children, &self.parents),
            ("parents", &self.parents, &self.children),
        ] {
            for (tag, neighbours) in map {
                if neighbours.is_empty() {
                    return Err(format!("{} entry for '{}' is empty", name, tag));
                }
                for other in neighbours {
                    if !inverse.get(other).is_some_and(|back| back.contains(tag)) {
                        return Err(format!(
                            "{} of '{}' lists '{}' without the reverse entry",
                            name, tag, other
                        ));
                    }
                }
            }
        }

        // Kahn's algorithm: every tag must drain when the graph is acyclic.
        let mut in_degree: HashMap<&Tag, usize> = self
            .tags()
            .into_iter()
            .map(|tag| (tag, self.parents(tag).len()))
            .collect();
        let mut ready: VecDeque<&Tag> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(tag, _)| *tag)
            .collect();
        let mut drained = 0usize;

        while let Some(tag) = ready.pop_front() {
            drained += 1;
            for child in self.children(tag) {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(child);
                    }
                }
            }
        }

        if drained != in_degree.len() {
            return Err("tag hierarchy contains a cycle".to_string());
        }
        Ok(())
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariants().is_ok(),
            "tag hierarchy invariant violated: {:?}",
            self.check_invariants()
        );
    }

    fn closure(edges: &BTreeMap<Tag, BTreeSet<Tag>>, start: &Tag) -> BTreeSet<Tag> {
        let mut visited: BTreeSet<Tag> = BTreeSet::new();
        let mut stack: Vec<&Tag> = vec![start];

        while let Some(current) = stack.pop() {
            if let Some(next) = edges.get(current) {
                for tag in next {
                    if visited.insert(tag.clone()) {
                        stack.push(tag);
                    }
                }
            }
        }
        visited
    }

    /// Insert an edge into both maps without a cycle check.
    fn insert_edge(&mut self, parent: &Tag, child: &Tag) -> bool {
        let inserted = self
            .children
            .entry(parent.clone())
            .or_default()
            .insert(child.clone());
        self.parents
            .entry(child.clone())
            .or_default()
            .insert(parent.clone());
        inserted
    }

    fn unlink(&mut self, parent: &Tag, child: &Tag) {
        Self::remove_from(&mut self.children, parent, child);
        Self::remove_from(&mut self.parents, child, parent);
    }

    /// Remove every edge touching `tag`
    fn detach(&mut self, tag: &Tag) {
        if let Some(children) = self.children.remove(tag) {
            for child in &children {
                Self::remove_from(&mut self.parents, child, tag);
            }
        }
        if let Some(parents) = self.parents.remove(tag) {
            for parent in &parents {
                Self::remove_from(&mut self.children, parent, tag);
            }
        }
    }

    fn remove_from(map: &mut BTreeMap<Tag, BTreeSet<Tag>>, key: &Tag, value: &Tag) {
        if let Some(set) = map.get_mut(key) {
            set.remove(value);
            if set.is_empty() {
                map.remove(key);
            }
        }
    }
}
