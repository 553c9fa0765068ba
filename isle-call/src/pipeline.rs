//! The island-calling run: windowing → islands → background → control → FDR.

use std::fmt::{self, Display};

use isle_core::filter::remove_redundant;
use isle_core::models::{GenomeTable, Read};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::background::BackgroundModel;
use crate::config::{Config, Params};
use crate::control::ControlComparator;
use crate::errors::{CallError, CallResult, ConfigError, check_finite, check_probability};
use crate::fdr::FdrFilter;
use crate::islands::IslandBuilder;
use crate::models::{CalledIsland, CandidateIsland, DropCounts, EnrichedIsland, Island};
use crate::windows::{SampleWindows, WindowCounter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    WindowingTreatment,
    WindowingControl,
    BuildingIslands,
    ScoringBackground,
    ScoringControl,
    FilteringFdr,
    Done,
}

impl Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::WindowingTreatment => "windowing treatment reads",
            PipelineState::WindowingControl => "windowing control reads",
            PipelineState::BuildingIslands => "building islands",
            PipelineState::ScoringBackground => "scoring islands against background",
            PipelineState::ScoringControl => "scoring islands against control",
            PipelineState::FilteringFdr => "filtering by false discovery rate",
            PipelineState::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// Counts and model parameters of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub treatment_reads: u64,
    pub control_reads: u64,
    pub treatment_redundant: u64,
    pub control_redundant: u64,
    pub treatment_drops: DropCounts,
    pub control_drops: DropCounts,
    pub lambda: f64,
    /// `treatmentTotal / controlTotal`; absent without control reads.
    pub scale: Option<f64>,
    pub min_window_count: u64,
    pub candidate_islands: usize,
    pub zero_control_islands: usize,
    pub called_islands: usize,
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            "Treatment: {} reads windowed, {} redundant, {} dropped",
            self.treatment_reads,
            self.treatment_redundant,
            self.treatment_drops.total()
        );
        info!(
            "Control: {} reads windowed, {} redundant, {} dropped",
            self.control_reads,
            self.control_redundant,
            self.control_drops.total()
        );
        info!(
            "Background λ = {:.6} reads/window, scale = {}",
            self.lambda,
            self.scale
                .map_or("n/a".to_string(), |s| format!("{:.6}", s))
        );
        info!(
            "{} candidate islands, {} without control reads, {} called",
            self.candidate_islands, self.zero_control_islands, self.called_islands
        );
    }
}

/// Final, annotated island list of a run, in genome-table order.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSet {
    pub islands: Vec<CalledIsland>,
    pub treatment_windows: SampleWindows,
    pub summary: RunSummary,
}

///
/// Island caller for one genome build and one configuration.
///
/// Holds nothing but immutable inputs; every [Pipeline::run] starts from
/// `Idle` and either returns the complete island list or the first error.
///
pub struct Pipeline {
    params: Params,
    genome: GenomeTable,
}

fn warn_drops(sample: &str, drops: &DropCounts) {
    if drops.total() > 0 {
        warn!(
            "{}: dropped {} reads ({} on unknown chromosomes, {} with negative positions, {} past chromosome ends)",
            sample,
            drops.total(),
            drops.unknown_chromosome,
            drops.negative_position,
            drops.out_of_bounds
        );
    }
}

impl Pipeline {
    pub fn new(config: &Config, genome: GenomeTable) -> Result<Self, ConfigError> {
        let params = config.validate(&genome)?;
        Ok(Pipeline { params, genome })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn genome(&self) -> &GenomeTable {
        &self.genome
    }

    ///
    /// Apply the redundancy filter to both samples, then [Pipeline::run].
    ///
    pub fn filter_and_run(&self, treatment: Vec<Read>, control: Vec<Read>) -> CallResult<CallSet> {
        let threshold = self.params.redundancy_threshold;
        let treatment = remove_redundant(treatment, threshold);
        let control = remove_redundant(control, threshold);

        let mut calls = self.run(&treatment.reads, &control.reads)?;
        calls.summary.treatment_redundant = treatment.removed as u64;
        calls.summary.control_redundant = control.removed as u64;
        Ok(calls)
    }

    ///
    /// Call islands on already filtered treatment and control reads.
    ///
    pub fn run(&self, treatment: &[Read], control: &[Read]) -> CallResult<CallSet> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.params.threads)
            .build()?;

        pool.install(|| self.run_stages(treatment, control))
    }

    fn enter(&self, state: PipelineState) -> PipelineState {
        info!("Stage: {}", state);
        state
    }

    fn finish(
        &self,
        islands: Vec<CalledIsland>,
        treatment_windows: SampleWindows,
        mut summary: RunSummary,
    ) -> CallSet {
        self.enter(PipelineState::Done);
        summary.called_islands = islands.len();
        summary.log();

        CallSet {
            islands,
            treatment_windows,
            summary,
        }
    }

    fn run_stages(&self, treatment: &[Read], control: &[Read]) -> CallResult<CallSet> {
        let params = &self.params;
        let counter = WindowCounter::new(&self.genome, params.window_size, params.fragment_size);
        let mut summary = RunSummary::default();

        self.enter(PipelineState::WindowingTreatment);
        let treatment_windows = counter.count(treatment);
        warn_drops("Treatment", &treatment_windows.drops);

        self.enter(PipelineState::WindowingControl);
        let control_windows = counter.count(control);
        warn_drops("Control", &control_windows.drops);

        summary.treatment_reads = treatment_windows.total_reads();
        summary.control_reads = control_windows.total_reads();
        summary.treatment_drops = treatment_windows.drops;
        summary.control_drops = control_windows.drops;

        let background = BackgroundModel::new(
            summary.treatment_reads,
            params.window_size,
            params.effective_genome_size,
        );
        summary.lambda = background.lambda();

        if summary.treatment_reads == 0 {
            info!("No treatment reads inside the genome, nothing to call");
            return Ok(self.finish(Vec::new(), treatment_windows, summary));
        }

        self.enter(PipelineState::BuildingIslands);
        summary.min_window_count = params
            .window_pvalue
            .map_or(1, |pvalue| background.min_eligible_count(pvalue));
        let min_count = u32::try_from(summary.min_window_count).unwrap_or(u32::MAX);
        let builder = IslandBuilder::new(params.gap_windows, params.window_size);

        let islands: Vec<Vec<Island>> = treatment_windows
            .chromosomes
            .par_iter()
            .map(|chrom| {
                let mut islands = builder.build(&chrom.with_min_count(min_count));
                // ineligible windows inside the span still count
                if min_count > 1 {
                    for island in &mut islands {
                        island.read_count =
                            chrom.count_in_range(island.start_window, island.end_window);
                    }
                }
                islands
            })
            .collect();
        info!(
            "{} islands from {} non-empty windows (eligible windows hold at least {} reads)",
            islands.iter().map(Vec::len).sum::<usize>(),
            treatment_windows.non_empty_windows(),
            summary.min_window_count
        );

        let state = self.enter(PipelineState::ScoringBackground);
        let candidates: Vec<Vec<CandidateIsland>> = islands
            .into_par_iter()
            .zip(treatment_windows.chromosomes.par_iter())
            .map(|(chrom_islands, chrom)| {
                let mut kept = Vec::with_capacity(chrom_islands.len());
                for island in chrom_islands {
                    let score =
                        background.score(&island, chrom.range(island.start_window, island.end_window));
                    check_probability(score.p_value, state, "background p-value")?;
                    check_finite(score.score, state, "island score")?;

                    if params.evalue.is_none_or(|threshold| score.e_value <= threshold) {
                        kept.push(CandidateIsland {
                            island,
                            background: score,
                        });
                    }
                }
                Ok(kept)
            })
            .collect::<CallResult<Vec<_>>>()?;
        summary.candidate_islands = candidates.iter().map(Vec::len).sum();
        info!("{} candidate islands pass discovery", summary.candidate_islands);

        let state = self.enter(PipelineState::ScoringControl);
        let comparator = ControlComparator::new(
            summary.treatment_reads,
            summary.control_reads,
            background,
            params.zero_control,
            params.enrichment_model,
        );
        summary.scale = comparator.scale();
        if summary.scale.is_none() {
            warn!("Control library has no reads inside the genome; every island falls back to the background");
        }

        let enriched: Vec<Vec<EnrichedIsland>> = candidates
            .into_par_iter()
            .zip(control_windows.chromosomes.par_iter())
            .map(|(chrom_candidates, control)| {
                chrom_candidates
                    .into_iter()
                    .map(|candidate| {
                        let enriched = comparator.compare(candidate, control);
                        check_probability(enriched.control.p_value, state, "enrichment p-value")?;
                        if enriched.control.fold_change.is_nan() {
                            return Err(CallError::Computation {
                                stage: state,
                                message: "fold change is NaN".to_string(),
                            });
                        }
                        Ok(enriched)
                    })
                    .collect::<CallResult<Vec<_>>>()
            })
            .collect::<CallResult<Vec<_>>>()?;
        let enriched: Vec<EnrichedIsland> = enriched.into_iter().flatten().collect();
        summary.zero_control_islands = enriched.iter().filter(|e| e.control.zero_control).count();
        if summary.zero_control_islands > 0 {
            warn!(
                "{} islands have no control reads in their span",
                summary.zero_control_islands
            );
        }

        let state = self.enter(PipelineState::FilteringFdr);
        let islands = FdrFilter::new(params.fdr).apply(enriched);
        for called in &islands {
            check_probability(called.q_value, state, "q-value")?;
        }

        Ok(self.finish(islands, treatment_windows, summary))
    }
}
