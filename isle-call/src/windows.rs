//! Genome tiling and per-window read counting.

use std::collections::BTreeMap;

use isle_core::models::{GenomeTable, Read};
use log::debug;
use rayon::prelude::*;

use crate::models::{DropCounts, Window};

#[inline]
pub fn window_index(position: u64, window_size: u64) -> u64 {
    position / window_size
}

/// `[start, end)` of a window, the last one clipped to the chromosome end.
#[inline]
pub fn window_bounds(index: u64, window_size: u64, chrom_length: u64) -> (u64, u64) {
    let start = index * window_size;
    (start, (start + window_size).min(chrom_length))
}

/// Number of windows tiling a chromosome.
pub fn windows_in_chromosome(chrom_length: u64, window_size: u64) -> u64 {
    chrom_length.div_ceil(window_size)
}

///
/// Every window of a chromosome, in order: consecutive, non-overlapping,
/// starting at 0 and ending exactly at the chromosome length.
///
pub fn tile_chromosome(
    chrom_length: u64,
    window_size: u64,
) -> impl Iterator<Item = (u64, u64)> {
    (0..windows_in_chromosome(chrom_length, window_size))
        .map(move |idx| window_bounds(idx, window_size, chrom_length))
}

///
/// Count positions per window in one pass. Only non-empty windows are
/// materialised and they come back sorted by index, whatever the order of
/// the positions.
///
pub fn count_windows(positions: &[u64], window_size: u64) -> Vec<Window> {
    let mut buckets: BTreeMap<u64, u32> = BTreeMap::new();
    for position in positions {
        *buckets.entry(window_index(*position, window_size)).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(index, count)| Window { index, count })
        .collect()
}

/// The non-empty windows of one chromosome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromWindows {
    pub chr: String,
    pub length: u64,
    pub windows: Vec<Window>,
}

impl ChromWindows {
    pub fn total_reads(&self) -> u64 {
        self.windows.iter().map(|w| w.count as u64).sum()
    }

    /// Windows with `first <= index <= last`.
    pub fn range(&self, first: u64, last: u64) -> &[Window] {
        let lo = self.windows.partition_point(|w| w.index < first);
        let hi = self.windows.partition_point(|w| w.index <= last);
        &self.windows[lo..hi.max(lo)]
    }

    pub fn count_in_range(&self, first: u64, last: u64) -> u64 {
        self.range(first, last).iter().map(|w| w.count as u64).sum()
    }

    /// A copy keeping only windows with at least `min_count` reads.
    pub fn with_min_count(&self, min_count: u32) -> ChromWindows {
        ChromWindows {
            chr: self.chr.clone(),
            length: self.length,
            windows: self
                .windows
                .iter()
                .filter(|w| w.count >= min_count)
                .copied()
                .collect(),
        }
    }
}

/// Window counts of one sample over the whole genome, in genome-table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleWindows {
    pub chromosomes: Vec<ChromWindows>,
    pub drops: DropCounts,
}

impl SampleWindows {
    pub fn total_reads(&self) -> u64 {
        self.chromosomes.iter().map(ChromWindows::total_reads).sum()
    }

    pub fn non_empty_windows(&self) -> usize {
        self.chromosomes.iter().map(|c| c.windows.len()).sum()
    }
}

///
/// Tiles every chromosome of a genome table into `window_size` windows and
/// counts the fragment centers of a read set per window.
///
pub struct WindowCounter<'a> {
    genome: &'a GenomeTable,
    window_size: u64,
    fragment_size: u32,
}

impl<'a> WindowCounter<'a> {
    pub fn new(genome: &'a GenomeTable, window_size: u64, fragment_size: u32) -> Self {
        WindowCounter {
            genome,
            window_size,
            fragment_size,
        }
    }

    ///
    /// Split reads by chromosome and shift them to their fragment centers.
    ///
    /// Reads on unknown chromosomes, with a negative 5' coordinate or a 5'
    /// coordinate past the chromosome end are dropped and counted. Shifts that
    /// cross a chromosome boundary are clamped onto the first or last base.
    ///
    pub fn partition(&self, reads: &[Read]) -> (Vec<Vec<u64>>, DropCounts) {
        let mut per_chrom: Vec<Vec<u64>> = vec![Vec::new(); self.genome.len()];
        let mut drops = DropCounts::default();

        for read in reads {
            let Some(idx) = self.genome.position_of(&read.chr) else {
                drops.unknown_chromosome += 1;
                continue;
            };
            if read.position < 0 {
                drops.negative_position += 1;
                continue;
            }

            let length = self.genome.length_of(&read.chr).unwrap_or(0);
            if read.position as u64 >= length {
                drops.out_of_bounds += 1;
                continue;
            }

            let center = read
                .fragment_center(self.fragment_size)
                .clamp(0, length as i64 - 1);
            per_chrom[idx].push(center as u64);
        }

        (per_chrom, drops)
    }

    ///
    /// Count one sample. Chromosomes are counted in parallel on the current
    /// rayon pool; the result is in genome-table order.
    ///
    pub fn count(&self, reads: &[Read]) -> SampleWindows {
        let (per_chrom, drops) = self.partition(reads);
        let window_size = self.window_size;

        let chromosomes = per_chrom
            .par_iter()
            .enumerate()
            .map(|(idx, positions)| {
                let chr = self.genome.name_at(idx).unwrap_or_default().to_string();
                let length = self.genome.length_of(&chr).unwrap_or(0);
                let windows = count_windows(positions, window_size);
                debug!(
                    "{}: {} reads in {} non-empty windows",
                    chr,
                    positions.len(),
                    windows.len()
                );
                ChromWindows {
                    chr,
                    length,
                    windows,
                }
            })
            .collect();

        SampleWindows { chromosomes, drops }
    }
}
