//src/types.rs

use ahash::AHashMap;

/// Integer identifier for a node in the taxonomy tree.
pub type TaxId = u32;

/// A parent map: taxon -> parent taxon. The root maps to itself.
pub type ParentMap = AHashMap<TaxId, TaxId>;

/// A child map: taxon -> direct children. Leaves have no entry.
pub type ChildMap = AHashMap<TaxId, Vec<TaxId>>;

/// The category-root configuration for the classifier.
///
/// Replaces dynamically injected organism constants with a plain struct
/// supplied by the calling application. Both lists are ordered; order
/// matters because later expansions overwrite earlier stamps.
#[derive(Debug, Clone, Default)]
pub struct CategoryRoots {
    /// Potential-host roots (e.g. primates, rodents, green plants).
    pub host: Vec<TaxId>,
    /// Microbe roots (e.g. bacteria, viruses, archaea, fungi).
    pub microbe: Vec<TaxId>,
}

impl CategoryRoots {
    pub fn new(host: Vec<TaxId>, microbe: Vec<TaxId>) -> Self {
        Self { host, microbe }
    }
}

/// Classification of a single taxon: which category subtree it falls under,
/// carrying the taxid of the category root that claimed it.
///
/// `Unassigned` is the sentinel for nodes outside every configured subtree
/// (artificial constructs, unclassified environmental samples). It is a
/// valid state, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Host(TaxId),
    Microbe(TaxId),
    Unassigned,
}

impl Category {
    /// The category-root taxid, if any.
    pub fn root(&self) -> Option<TaxId> {
        match *self {
            Category::Host(t) | Category::Microbe(t) => Some(t),
            Category::Unassigned => None,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, Category::Host(_))
    }

    pub fn is_microbe(&self) -> bool {
        matches!(self, Category::Microbe(_))
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Category::Unassigned)
    }
}

/// Total mapping from every known taxid to its category.
pub type CategoryMap = AHashMap<TaxId, Category>;

/// The lowest common ancestor of an input set, together with how many times
/// each node was reached during the ascent. The visit counts are diagnostic
/// data only; correctness never depends on them.
#[derive(Debug, Clone)]
pub struct LcaResult {
    pub taxid: TaxId,
    pub num_visited: AHashMap<TaxId, u32>,
}

/// One alignment of a read against a reference sequence, reduced to what the
/// host filter needs: the aligned organism (if resolvable) and the score.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub tax_id: Option<TaxId>,
    pub score: f64,
}

/// A read together with its alignments, as handed over by the alignment
/// parsing layer.
#[derive(Debug, Clone)]
pub struct ReadHits {
    pub id: String,
    pub alignments: Vec<Alignment>,
}
