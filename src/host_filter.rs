//src/host_filter.rs

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::category::CategoryIndex;
use crate::types::{Alignment, ReadHits};

/// How a read's alignments are combined into a single host call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCall {
    /// The read is host if its best-scoring alignment is host.
    BestScore,
    /// The read is host if at least this fraction of its alignments are
    /// host (0.0..=1.0).
    FractionAtLeast(f64),
    /// The read is host only if every alignment is host.
    All,
}

impl HostCall {
    /// Applies the strategy to one read. Reads with no alignments are never
    /// called host.
    pub fn is_host_read(
        &self,
        read: &ReadHits,
        categories: &CategoryIndex,
        treat_unassigned_as_host: bool,
    ) -> bool {
        if read.alignments.is_empty() {
            return false;
        }
        match *self {
            HostCall::BestScore => {
                best_scoring(&read.alignments).is_some_and(|aln| {
                    alignment_is_host(aln, categories, treat_unassigned_as_host)
                })
            }
            HostCall::FractionAtLeast(fraction) => {
                host_fraction(&read.alignments, categories, treat_unassigned_as_host)
                    >= fraction
            }
            HostCall::All => {
                read.alignments
                    .iter()
                    .all(|aln| alignment_is_host(aln, categories, treat_unassigned_as_host))
            }
        }
    }
}

/// Whether one alignment points at a host organism.
///
/// An alignment whose taxid could not be resolved at all is treated as
/// host-suspect; an organism classified `Unassigned` counts as host only
/// when `treat_unassigned_as_host` is set. The delete-vs-mark decision for
/// reads called host belongs to the caller.
pub fn alignment_is_host(
    alignment: &Alignment,
    categories: &CategoryIndex,
    treat_unassigned_as_host: bool,
) -> bool {
    match alignment.tax_id {
        None => true,
        Some(taxid) => {
            let category = categories.category_of(taxid);
            category.is_host() || (treat_unassigned_as_host && category.is_unassigned())
        }
    }
}

fn best_scoring(alignments: &[Alignment]) -> Option<&Alignment> {
    alignments.iter().max_by(|a, b| {
        a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal)
    })
}

fn host_fraction(
    alignments: &[Alignment],
    categories: &CategoryIndex,
    treat_unassigned_as_host: bool,
) -> f64 {
    let host = alignments
        .iter()
        .filter(|aln| alignment_is_host(aln, categories, treat_unassigned_as_host))
        .count();
    host as f64 / alignments.len() as f64
}

/// Splits reads into (host, non-host) by reference, in parallel.
///
/// Each worker partitions its share into thread-local vectors which are
/// merged at the end; the category index is only read, so no locking is
/// needed.
pub fn partition_reads<'a>(
    reads: &'a [ReadHits],
    categories: &CategoryIndex,
    call: HostCall,
    treat_unassigned_as_host: bool,
) -> (Vec<&'a ReadHits>, Vec<&'a ReadHits>) {
    reads
        .par_iter()
        .fold(
            || (Vec::new(), Vec::new()),
            |mut acc, read| {
                if call.is_host_read(read, categories, treat_unassigned_as_host) {
                    acc.0.push(read);
                } else {
                    acc.1.push(read);
                }
                acc
            },
        )
        .reduce(
            || (Vec::new(), Vec::new()),
            |mut a, mut b| {
                a.0.append(&mut b.0);
                a.1.append(&mut b.1);
                a
            },
        )
}
