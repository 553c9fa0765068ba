//! Read filters applied before windowing.

use std::collections::HashMap;

use log::debug;

use crate::models::{Read, Strand};

/// Result of [remove_redundant].
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredReads {
    pub reads: Vec<Read>,
    pub removed: usize,
}

///
/// Keep at most `threshold` reads per identical `(chr, position, strand)`.
///
/// Reads are kept in input order: the first `threshold` copies of each
/// position survive. A threshold of 0 turns the filter off.
///
pub fn remove_redundant(reads: Vec<Read>, threshold: u32) -> FilteredReads {
    if threshold == 0 {
        return FilteredReads { reads, removed: 0 };
    }

    let total = reads.len();
    let keep: Vec<bool> = {
        let mut seen: HashMap<(&str, i64, Strand), u32> = HashMap::new();
        reads
            .iter()
            .map(|read| {
                let copies = seen
                    .entry((read.chr.as_str(), read.position, read.strand))
                    .or_insert(0);
                *copies += 1;
                *copies <= threshold
            })
            .collect()
    };

    let kept: Vec<Read> = reads
        .into_iter()
        .zip(keep)
        .filter_map(|(read, keep)| keep.then_some(read))
        .collect();

    let removed = total - kept.len();
    debug!("Redundancy filter removed {} of {} reads", removed, total);

    FilteredReads {
        reads: kept,
        removed,
    }
}
