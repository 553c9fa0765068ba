//! Island significance against the control library.

use log::debug;

use crate::background::BackgroundModel;
use crate::config::{EnrichmentModel, ZeroControlPolicy};
use crate::models::{CandidateIsland, ControlScore, EnrichedIsland};
use crate::stats::{neg_binomial_log_sf, poisson_log_sf};
use crate::windows::ChromWindows;

///
/// Rescales control counts to the treatment library and tests each island
/// against the scaled control.
///
/// The scale factor is `treatmentTotal / controlTotal`, so an island with
/// `c` control reads expects `scale × c` treatment reads under the null.
///
#[derive(Debug, Clone, Copy)]
pub struct ControlComparator {
    scale: Option<f64>,
    background: BackgroundModel,
    policy: ZeroControlPolicy,
    model: EnrichmentModel,
}

impl ControlComparator {
    pub fn new(
        treatment_total: u64,
        control_total: u64,
        background: BackgroundModel,
        policy: ZeroControlPolicy,
        model: EnrichmentModel,
    ) -> Self {
        let scale = (control_total > 0).then(|| treatment_total as f64 / control_total as f64);
        ControlComparator {
            scale,
            background,
            policy,
            model,
        }
    }

    /// `None` when the control library is empty.
    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    pub fn log_p_value(&self, observed: u64, expected: f64) -> f64 {
        match self.model {
            EnrichmentModel::Poisson => poisson_log_sf(observed, expected),
            EnrichmentModel::NegativeBinomial { dispersion } => {
                neg_binomial_log_sf(observed, expected, dispersion)
            }
        }
    }

    ///
    /// Score one island given its control count.
    ///
    /// Without control reads in the span (or without a control library at
    /// all) the expected count falls back to the background expectation over
    /// the span, and the fold change follows the configured policy.
    ///
    pub fn score(&self, treatment_count: u64, control_count: u64, span_windows: u64) -> ControlScore {
        let (expected, fold_change, zero_control) = match self.scale {
            Some(scale) if control_count > 0 => {
                let expected = scale * control_count as f64;
                (expected, treatment_count as f64 / expected, false)
            }
            _ => {
                let expected = self.background.expected(span_windows);
                let fold_change = match self.policy {
                    ZeroControlPolicy::Background => treatment_count as f64 / expected,
                    ZeroControlPolicy::Sentinel { fold_change } => fold_change,
                };
                (expected, fold_change, true)
            }
        };

        ControlScore {
            control_count,
            expected,
            fold_change,
            p_value: self.log_p_value(treatment_count, expected).exp(),
            zero_control,
        }
    }

    ///
    /// Recount the control reads inside the island span and extend the
    /// candidate with its control score.
    ///
    pub fn compare(&self, candidate: CandidateIsland, control: &ChromWindows) -> EnrichedIsland {
        let island = &candidate.island;
        let control_count = control.count_in_range(island.start_window, island.end_window);
        let score = self.score(island.read_count, control_count, island.span_windows());

        if score.zero_control {
            debug!(
                "{}:{}-{} has no control reads, using background expectation {:.4}",
                island.chr, island.start, island.end, score.expected
            );
        }

        candidate.with_control(score)
    }
}
