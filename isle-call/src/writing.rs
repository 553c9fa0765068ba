use std::io::{self, Write};

use serde::Serialize;

use crate::models::CalledIsland;
use crate::windows::{SampleWindows, window_bounds};

pub const TSV_HEADER: &str = "#chr\tstart\tend\ttreatment_count\tcontrol_count\tfold_change\tbackground_pvalue\tenrichment_pvalue\tqvalue";

/// Flat view of a [CalledIsland] used for JSON output.
#[derive(Debug, Serialize)]
struct IslandRecord<'a> {
    chr: &'a str,
    start: u64,
    end: u64,
    window_count: u32,
    treatment_count: u64,
    control_count: u64,
    fold_change: f64,
    score: f64,
    e_value: f64,
    background_pvalue: f64,
    enrichment_pvalue: f64,
    qvalue: f64,
    zero_control: bool,
}

impl<'a> From<&'a CalledIsland> for IslandRecord<'a> {
    fn from(called: &'a CalledIsland) -> Self {
        IslandRecord {
            chr: &called.island.chr,
            start: called.island.start,
            end: called.island.end,
            window_count: called.island.window_count,
            treatment_count: called.island.read_count,
            control_count: called.control.control_count,
            fold_change: called.control.fold_change,
            score: called.background.score,
            e_value: called.background.e_value,
            background_pvalue: called.background.p_value,
            enrichment_pvalue: called.control.p_value,
            qvalue: called.q_value,
            zero_control: called.control.zero_control,
        }
    }
}

///
/// Write called islands as a tab-separated table with a `#` header line.
///
/// Fold changes are written with 4 decimals, probabilities in scientific
/// notation with 6 significant digits.
///
pub fn write_islands_tsv<W: Write>(islands: &[CalledIsland], mut out: W) -> io::Result<()> {
    writeln!(out, "{}", TSV_HEADER)?;
    for called in islands {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{:.4}\t{:.5e}\t{:.5e}\t{:.5e}",
            called.island.chr,
            called.island.start,
            called.island.end,
            called.island.read_count,
            called.control.control_count,
            called.control.fold_change,
            called.background.p_value,
            called.control.p_value,
            called.q_value
        )?;
    }
    out.flush()
}

pub fn write_islands_json<W: Write>(islands: &[CalledIsland], mut out: W) -> io::Result<()> {
    let records: Vec<IslandRecord> = islands.iter().map(IslandRecord::from).collect();
    serde_json::to_writer_pretty(&mut out, &records)?;
    writeln!(out)?;
    out.flush()
}

///
/// Write the non-empty windows of a sample as bedGraph, in genome order.
///
pub fn write_windows_bedgraph<W: Write>(
    windows: &SampleWindows,
    window_size: u64,
    mut out: W,
) -> io::Result<()> {
    for chrom in &windows.chromosomes {
        for window in &chrom.windows {
            let (start, end) = window_bounds(window.index, window_size, chrom.length);
            writeln!(out, "{}\t{}\t{}\t{}", chrom.chr, start, end, window.count)?;
        }
    }
    out.flush()
}
