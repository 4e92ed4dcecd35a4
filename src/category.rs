//src/category.rs

use crate::tree::TaxTree;
use crate::types::{Category, CategoryMap, CategoryRoots, TaxId};

/// Precomputed classification of every known taxon into host, microbe, or
/// unassigned.
///
/// Built once after the tree, immutable afterwards; `category_of` is a
/// constant-time lookup.
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    map: CategoryMap,
}

impl CategoryIndex {
    /// Stamps each category root and all of its transitive descendants with
    /// that root's identity. Microbe roots are expanded first, host roots
    /// second, so a node reachable from both ends up tagged host
    /// (last-writer-wins, in the documented order). Every taxon outside all
    /// configured subtrees gets the `Unassigned` sentinel.
    pub fn build(tree: &TaxTree, roots: &CategoryRoots) -> Self {
        let mut map = CategoryMap::with_capacity(tree.len());

        for &root in &roots.microbe {
            stamp_subtree(tree, root, Category::Microbe(root), &mut map);
        }
        for &root in &roots.host {
            stamp_subtree(tree, root, Category::Host(root), &mut map);
        }

        for &taxid in tree.parent_map().keys() {
            map.entry(taxid).or_insert(Category::Unassigned);
        }

        let index = Self { map };
        let (host, microbe, unassigned) = index.counts();
        log::info!(
            "category map built: {host} host, {microbe} microbe, {unassigned} unassigned taxa"
        );
        index
    }

    /// Category of `taxid`; taxids absent from the node table report
    /// `Unassigned`.
    pub fn category_of(&self, taxid: TaxId) -> Category {
        self.map.get(&taxid).copied().unwrap_or(Category::Unassigned)
    }

    pub fn map(&self) -> &CategoryMap {
        &self.map
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// (host, microbe, unassigned) taxon counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut host = 0;
        let mut microbe = 0;
        let mut unassigned = 0;
        for category in self.map.values() {
            match category {
                Category::Host(_) => host += 1,
                Category::Microbe(_) => microbe += 1,
                Category::Unassigned => unassigned += 1,
            }
        }
        (host, microbe, unassigned)
    }
}

fn stamp_subtree(tree: &TaxTree, root: TaxId, category: Category, map: &mut CategoryMap) {
    if !tree.contains(root) {
        log::warn!("category root {root} is not in the node table, skipping");
        return;
    }
    map.insert(root, category);
    for descendant in tree.descendants(root) {
        map.insert(descendant, category);
    }
}
