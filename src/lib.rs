// src/lib.rs
pub mod category;
pub mod error;
pub mod host_filter;
pub mod name_lookup;
pub mod taxdb;
pub mod tree;
pub mod types;

use std::path::Path;

pub use crate::category::CategoryIndex;
pub use crate::error::TaxonomyError;
pub use crate::host_filter::HostCall;
pub use crate::name_lookup::{FlatNameTable, NameLookup, SCIENTIFIC_NAME};
pub use crate::taxdb::{parse_node_records, parse_nodes, NodeTable};
pub use crate::tree::TaxTree;
pub use crate::types::{
    Alignment, Category, CategoryMap, CategoryRoots, ChildMap, LcaResult, ParentMap,
    ReadHits, TaxId,
};

/// The fully built taxonomy state: the ancestry tree plus the precomputed
/// host/microbe classification. Everything in here is read-only after
/// construction, so a shared reference can serve queries from any number of
/// threads.
pub struct Taxonomy {
    pub tree: TaxTree,
    pub categories: CategoryIndex,
}

impl Taxonomy {
    /// Constant-time category lookup; see [`CategoryIndex::category_of`].
    pub fn category_of(&self, taxid: TaxId) -> Category {
        self.categories.category_of(taxid)
    }
}

/// Loads a node table and builds the tree and category map in one call.
///
/// This is the whole initialization phase: after it returns, no structure
/// is mutated again.
pub fn load_taxonomy<P: AsRef<Path>>(
    nodes_path: P,
    roots: &CategoryRoots,
) -> Result<Taxonomy, TaxonomyError> {
    let table = taxdb::parse_nodes(nodes_path)?;
    let tree = TaxTree::from_node_table(table);
    let categories = CategoryIndex::build(&tree, roots);
    Ok(Taxonomy { tree, categories })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host_filter::partition_reads;

    /// End-to-end pass over an in-memory node table: build the tree,
    /// classify it, and partition a batch of reads against the result.
    #[test]
    fn test_binning_pipeline() {
        //        1
        //       / \
        //      2   10
        //     / \    \
        //    3   4    11
        //    |
        //    5
        let table = parse_node_records([
            "2 1", "1 1", "3 2", "4 2", "5 3", "10 1", "11 10",
        ])
        .expect("node table failed to parse");
        let tree = TaxTree::from_node_table(table);
        assert_eq!(tree.root(), 1);
        assert_eq!(tree.len(), 7);

        // ancestry sanity
        assert!(tree.is_descendant(11, 10));
        assert!(!tree.is_descendant(11, 2));
        assert_eq!(tree.lowest_common_ancestor(&[5, 11]).unwrap(), 1);

        // microbes under 2, hosts under 10
        let roots = CategoryRoots::new(vec![10], vec![2]);
        let categories = CategoryIndex::build(&tree, &roots);
        assert_eq!(categories.len(), tree.len());
        assert_eq!(categories.category_of(5), Category::Microbe(2));
        assert_eq!(categories.category_of(11), Category::Host(10));
        assert_eq!(categories.category_of(1), Category::Unassigned);

        // reads hitting each side of the tree
        let reads = vec![
            ReadHits {
                id: "host".to_string(),
                alignments: vec![Alignment {
                    tax_id: Some(11),
                    score: 55.0,
                }],
            },
            ReadHits {
                id: "microbe".to_string(),
                alignments: vec![Alignment {
                    tax_id: Some(5),
                    score: 48.0,
                }],
            },
        ];
        let (host, non_host) =
            partition_reads(&reads, &categories, HostCall::BestScore, true);
        assert_eq!(host.len(), 1);
        assert_eq!(non_host.len(), 1);
        assert_eq!(host[0].id, "host");
        assert_eq!(non_host[0].id, "microbe");
    }
}
