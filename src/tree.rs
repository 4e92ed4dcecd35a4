//src/tree.rs

use ahash::{AHashMap, AHashSet};

use crate::error::TaxonomyError;
use crate::name_lookup::NameLookup;
use crate::taxdb::NodeTable;
use crate::types::{ChildMap, LcaResult, ParentMap, TaxId};

/// The taxonomy tree: child -> parent and parent -> children relations over
/// the node table, plus the root taxid.
///
/// Built once at startup and never mutated afterwards; every query method
/// takes `&self`, so a shared reference can be handed to any number of
/// threads.
#[derive(Debug, Clone)]
pub struct TaxTree {
    parent_map: ParentMap,
    child_map: ChildMap,
    root: TaxId,
}

impl TaxTree {
    /// Builds the tree from a parsed node table, deriving the child map by
    /// inverting the parent map. The root's self-entry is not inverted (the
    /// root is nobody's child), which keeps subtree walks cycle-free.
    pub fn from_node_table(table: NodeTable) -> Self {
        let NodeTable { parent_map, root } = table;

        let mut child_map: ChildMap = AHashMap::new();
        for (&child, &parent) in &parent_map {
            if child != parent {
                child_map.entry(parent).or_default().push(child);
            }
        }

        Self {
            parent_map,
            child_map,
            root,
        }
    }

    pub fn root(&self) -> TaxId {
        self.root
    }

    /// Number of taxa in the node table.
    pub fn len(&self) -> usize {
        self.parent_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent_map.is_empty()
    }

    pub fn contains(&self, taxid: TaxId) -> bool {
        self.parent_map.contains_key(&taxid)
    }

    pub fn parent_of(&self, taxid: TaxId) -> Option<TaxId> {
        self.parent_map.get(&taxid).copied()
    }

    pub fn parent_map(&self) -> &ParentMap {
        &self.parent_map
    }

    /// Direct children of `taxid`; empty for leaves and unknown taxids.
    pub fn children_of(&self, taxid: TaxId) -> &[TaxId] {
        self.child_map
            .get(&taxid)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Tests whether `node` lies strictly below `ancestor`.
    ///
    /// A node is never its own descendant; every other node is a descendant
    /// of the root. A missing parent entry mid-walk means the node table is
    /// incomplete: the walk stops and reports "no relation".
    pub fn is_descendant(&self, node: TaxId, ancestor: TaxId) -> bool {
        if node == ancestor {
            return false;
        }
        if ancestor == self.root {
            return true;
        }

        let mut current = node;
        loop {
            let parent = match self.parent_map.get(&current) {
                Some(&p) => p,
                None => {
                    log::warn!("broken ancestry chain: taxid {current} has no parent entry");
                    return false;
                }
            };
            if parent == ancestor {
                return true;
            }
            if parent == self.root || parent == current {
                return false;
            }
            current = parent;
        }
    }

    /// Lowest common ancestor of a set of taxids.
    pub fn lowest_common_ancestor(&self, taxids: &[TaxId]) -> Result<TaxId, TaxonomyError> {
        self.lowest_common_ancestor_traced(taxids).map(|r| r.taxid)
    }

    /// Lowest common ancestor, keeping the per-node visit counts of the
    /// ascent for diagnostics.
    ///
    /// Level-synchronous multi-source ascent: every distinct input climbs
    /// toward the root one step per round, incrementing a visit counter on
    /// each node it passes. The first node reached by all inputs is the LCA.
    /// Duplicates in a round are kept on purpose; paths that converge early
    /// must still each count. All scratch state is local to the call, so
    /// concurrent queries need no synchronization.
    pub fn lowest_common_ancestor_traced(
        &self,
        taxids: &[TaxId],
    ) -> Result<LcaResult, TaxonomyError> {
        if taxids.is_empty() {
            return Err(TaxonomyError::EmptyTaxidSet);
        }

        let mut seen = AHashSet::with_capacity(taxids.len());
        let mut frontier = Vec::with_capacity(taxids.len());
        for &taxid in taxids {
            if !self.parent_map.contains_key(&taxid) {
                return Err(TaxonomyError::UnknownTaxon(taxid));
            }
            if seen.insert(taxid) {
                frontier.push(taxid);
            }
        }
        let target = frontier.len() as u32;

        let mut num_visited: AHashMap<TaxId, u32> = AHashMap::new();
        let mut last_broken = None;

        while !frontier.is_empty() {
            let mut next = Vec::with_capacity(frontier.len());
            for &taxid in &frontier {
                let visits = {
                    let n = num_visited.entry(taxid).or_insert(0);
                    *n += 1;
                    *n
                };
                if visits == target {
                    return Ok(LcaResult {
                        taxid,
                        num_visited,
                    });
                }
                // The root does not advance further; its chain ends here.
                if taxid != self.root {
                    match self.parent_map.get(&taxid) {
                        Some(&p) => next.push(p),
                        None => {
                            log::warn!(
                                "broken ancestry chain: taxid {taxid} has no parent entry during LCA"
                            );
                            last_broken = Some(taxid);
                        }
                    }
                }
            }
            frontier = next;
        }

        // Only reachable when enough chains died on missing parent entries
        // that the counters could never converge.
        Err(TaxonomyError::BrokenChain(last_broken.unwrap_or(self.root)))
    }

    /// All transitive descendants of `taxid` (the node itself excluded),
    /// collected breadth-first over the child map.
    pub fn descendants(&self, taxid: TaxId) -> Vec<TaxId> {
        let mut all = Vec::new();
        let mut frontier: Vec<TaxId> = self.children_of(taxid).to_vec();

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &child in &frontier {
                next.extend_from_slice(self.children_of(child));
            }
            all.extend_from_slice(&frontier);
            frontier = next;
        }
        all
    }

    /// Ancestor chain of `taxid` in root-to-leaf order, the root itself
    /// excluded, `taxid` included. Stops early (with a warning) if the node
    /// table is incomplete.
    pub fn lineage_taxids(&self, taxid: TaxId) -> Vec<TaxId> {
        let mut chain = Vec::new();
        let mut current = taxid;
        while current != self.root {
            chain.push(current);
            match self.parent_map.get(&current) {
                Some(&p) => current = p,
                None => {
                    log::warn!(
                        "broken ancestry chain: taxid {current} has no parent entry during lineage"
                    );
                    break;
                }
            }
        }
        chain.reverse();
        chain
    }

    /// Resolves the lineage of `taxid` to organism names, root-to-leaf.
    /// Taxids the lookup cannot name are skipped, so the result may be
    /// shorter than the id chain. Recomputed from scratch on every call.
    pub fn lineage<L: NameLookup + ?Sized>(&self, taxid: TaxId, names: &L) -> Vec<String> {
        self.lineage_taxids(taxid)
            .into_iter()
            .filter_map(|t| names.scientific_name(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name_lookup::FlatNameTable;
    use crate::taxdb::parse_node_records;

    //      1 (root)
    //      |
    //      2
    //     / \
    //    3   4
    //    |
    //    5
    fn sample_tree() -> TaxTree {
        let table =
            parse_node_records(["2 1", "1 1", "3 2", "4 2", "5 3"]).unwrap();
        TaxTree::from_node_table(table)
    }

    #[test]
    fn child_map_inversion() {
        let tree = sample_tree();
        let mut kids = tree.children_of(2).to_vec();
        kids.sort_unstable();
        assert_eq!(kids, vec![3, 4]);
        assert_eq!(tree.children_of(5), &[] as &[TaxId]);
        // root self-entry is not inverted
        assert_eq!(tree.children_of(1), &[2]);
    }

    #[test]
    fn child_map_rebuild_is_idempotent() {
        let tree_a = sample_tree();
        let tree_b = sample_tree();
        for &taxid in tree_a.parent_map().keys() {
            let mut a = tree_a.children_of(taxid).to_vec();
            let mut b = tree_b.children_of(taxid).to_vec();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn no_node_is_its_own_descendant() {
        let tree = sample_tree();
        for &taxid in tree.parent_map().keys() {
            assert!(!tree.is_descendant(taxid, taxid));
        }
    }

    #[test]
    fn every_node_descends_from_root() {
        let tree = sample_tree();
        for &taxid in tree.parent_map().keys() {
            if taxid != tree.root() {
                assert!(tree.is_descendant(taxid, tree.root()));
            }
        }
    }

    #[test]
    fn descendant_queries() {
        let tree = sample_tree();
        assert!(tree.is_descendant(5, 1));
        assert!(tree.is_descendant(5, 2));
        assert!(tree.is_descendant(5, 3));
        assert!(!tree.is_descendant(5, 4));
        assert!(!tree.is_descendant(2, 5));
        assert!(!tree.is_descendant(1, 2));
    }

    #[test]
    fn broken_chain_is_no_relation() {
        // 7's parent 6 has no entry of its own.
        let table = parse_node_records(["1 1", "2 1", "7 6"]).unwrap();
        let tree = TaxTree::from_node_table(table);
        assert!(!tree.is_descendant(7, 2));
        // rule 2 still applies: the root is everyone's ancestor
        assert!(tree.is_descendant(7, 1));
    }

    #[test]
    fn lca_singleton_is_itself() {
        let tree = sample_tree();
        for &taxid in tree.parent_map().keys() {
            assert_eq!(tree.lowest_common_ancestor(&[taxid]).unwrap(), taxid);
        }
    }

    #[test]
    fn lca_of_siblings_and_cousins() {
        let tree = sample_tree();
        assert_eq!(tree.lowest_common_ancestor(&[5, 4]).unwrap(), 2);
        assert_eq!(tree.lowest_common_ancestor(&[3, 4, 5]).unwrap(), 2);
        assert_eq!(tree.lowest_common_ancestor(&[3, 5]).unwrap(), 3);
        assert_eq!(tree.lowest_common_ancestor(&[2, 5]).unwrap(), 2);
    }

    #[test]
    fn lca_is_permutation_invariant() {
        let tree = sample_tree();
        let orderings: &[&[TaxId]] = &[
            &[3, 4, 5],
            &[5, 4, 3],
            &[4, 5, 3],
            &[5, 3, 4],
        ];
        for taxids in orderings {
            assert_eq!(tree.lowest_common_ancestor(taxids).unwrap(), 2);
        }
    }

    #[test]
    fn lca_ignores_duplicate_inputs() {
        let tree = sample_tree();
        assert_eq!(tree.lowest_common_ancestor(&[5, 5, 4]).unwrap(), 2);
        assert_eq!(tree.lowest_common_ancestor(&[4, 4, 4]).unwrap(), 4);
    }

    #[test]
    fn lca_inputs_descend_from_result() {
        let tree = sample_tree();
        let input = [3, 4, 5];
        let lca = tree.lowest_common_ancestor(&input).unwrap();
        for &taxid in &input {
            assert!(taxid == lca || tree.is_descendant(taxid, lca));
        }
    }

    #[test]
    fn lca_unknown_taxon() {
        let tree = sample_tree();
        let err = tree.lowest_common_ancestor(&[5, 99]).unwrap_err();
        assert!(matches!(err, TaxonomyError::UnknownTaxon(99)));
    }

    #[test]
    fn lca_empty_set() {
        let tree = sample_tree();
        assert!(matches!(
            tree.lowest_common_ancestor(&[]),
            Err(TaxonomyError::EmptyTaxidSet)
        ));
    }

    #[test]
    fn lca_of_disjoint_branches_is_root() {
        let table =
            parse_node_records(["1 1", "2 1", "3 1", "4 2", "5 3"]).unwrap();
        let tree = TaxTree::from_node_table(table);
        assert_eq!(tree.lowest_common_ancestor(&[4, 5]).unwrap(), 1);
    }

    #[test]
    fn lca_trace_counts_every_visit() {
        let tree = sample_tree();
        let result = tree.lowest_common_ancestor_traced(&[5, 4]).unwrap();
        assert_eq!(result.taxid, 2);
        // each input visits itself once
        assert_eq!(result.num_visited[&5], 1);
        assert_eq!(result.num_visited[&4], 1);
        // the answer was reached by both chains
        assert_eq!(result.num_visited[&2], 2);
    }

    #[test]
    fn descendants_of_internal_node() {
        let tree = sample_tree();
        let mut subtree = tree.descendants(2);
        subtree.sort_unstable();
        assert_eq!(subtree, vec![3, 4, 5]);
        assert!(tree.descendants(5).is_empty());

        let mut everything = tree.descendants(1);
        everything.sort_unstable();
        assert_eq!(everything, vec![2, 3, 4, 5]);
    }

    #[test]
    fn lineage_taxids_root_to_leaf() {
        let tree = sample_tree();
        assert_eq!(tree.lineage_taxids(5), vec![2, 3, 5]);
        assert_eq!(tree.lineage_taxids(2), vec![2]);
        assert!(tree.lineage_taxids(1).is_empty());
    }

    #[test]
    fn lineage_skips_unnamed_taxids() {
        let tree = sample_tree();
        let mut names = FlatNameTable::new();
        names.insert(2, "scientific name", "Eukaryota");
        names.insert(5, "scientific name", "Homo sapiens");
        // 3 has no name and is skipped, not emitted as an empty string
        assert_eq!(tree.lineage(5, &names), vec!["Eukaryota", "Homo sapiens"]);
    }
}
