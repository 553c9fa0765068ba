use serde::Serialize;

/// One non-empty window: reads whose fragment center falls in
/// `[index × windowSize, (index + 1) × windowSize)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Window {
    pub index: u64,
    pub count: u32,
}

/// Reads that never made it into a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    /// Chromosome not present in the genome table.
    pub unknown_chromosome: u64,
    /// 5' coordinate below zero.
    pub negative_position: u64,
    /// 5' coordinate at or past the chromosome end.
    pub out_of_bounds: u64,
}

impl DropCounts {
    pub fn total(&self) -> u64 {
        self.unknown_chromosome + self.negative_position + self.out_of_bounds
    }
}

/// A maximal run of eligible windows on one chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Island {
    pub chr: String,
    pub start_window: u64,
    pub end_window: u64,
    /// BED start of the island.
    pub start: u64,
    /// BED end of the island, clipped to the chromosome length.
    pub end: u64,
    /// Eligible windows merged into the island.
    pub window_count: u32,
    /// Treatment reads over the whole span, ineligible windows included.
    pub read_count: u64,
}

impl Island {
    /// Windows spanned, empty gap windows included.
    pub fn span_windows(&self) -> u64 {
        self.end_window - self.start_window + 1
    }
}

/// Significance of an island under the uniform background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundScore {
    /// `P(X ≥ readCount)` for `X ~ Poisson(λ × spanWindows)`.
    pub p_value: f64,
    /// Sum of `-ln(p)` over the island's windows.
    pub score: f64,
    /// Expected number of islands this significant in a genome of random reads.
    pub e_value: f64,
}

/// Significance of an island against the scaled control sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlScore {
    pub control_count: u64,
    /// Expected treatment reads in the span under the null.
    pub expected: f64,
    pub fold_change: f64,
    pub p_value: f64,
    /// No control reads in the span: the zero-control policy decided
    /// `expected` and `fold_change`.
    pub zero_control: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateIsland {
    pub island: Island,
    pub background: BackgroundScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedIsland {
    pub island: Island,
    pub background: BackgroundScore,
    pub control: ControlScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalledIsland {
    pub island: Island,
    pub background: BackgroundScore,
    pub control: ControlScore,
    pub q_value: f64,
}

impl CandidateIsland {
    pub fn with_control(self, control: ControlScore) -> EnrichedIsland {
        EnrichedIsland {
            island: self.island,
            background: self.background,
            control,
        }
    }
}

impl EnrichedIsland {
    pub fn with_q_value(self, q_value: f64) -> CalledIsland {
        CalledIsland {
            island: self.island,
            background: self.background,
            control: self.control,
            q_value,
        }
    }
}
