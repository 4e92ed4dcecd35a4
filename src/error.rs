//src/error.rs

use crate::types::TaxId;

/// Errors surfaced by taxonomy loading and queries.
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    /// A node-table line did not parse into exactly two integers.
    /// Loading aborts immediately; a partial tree is not usable.
    #[error("malformed node record at line {line}: {content:?}")]
    MalformedRecord { line: usize, content: String },

    /// More than one self-parenting line was found in the node table.
    #[error("duplicate root: taxid {second} is self-parenting but root {first} was already set")]
    DuplicateRoot { first: TaxId, second: TaxId },

    /// No self-parenting line was found in the node table.
    #[error("node table has no self-parenting root entry")]
    MissingRoot,

    /// An LCA query referenced a taxid absent from the parent map.
    #[error("unknown taxon {0}")]
    UnknownTaxon(TaxId),

    /// An ancestry walk hit a node with no parent entry before reaching the
    /// root. Fatal only for LCA queries; `is_descendant` treats it as
    /// "no relation".
    #[error("broken ancestry chain at taxid {0}: no parent entry")]
    BrokenChain(TaxId),

    #[error("LCA of an empty taxid set")]
    EmptyTaxidSet,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
