//! Enriched-island calling for ChIP-seq style read sets.
//!
//! A run goes through these stages:
//!
//! - Tiling every chromosome into fixed-size windows and counting shifted reads per window
//! - Merging eligible windows separated by short gaps into islands
//! - Scoring islands against a uniform Poisson background (score, p-value, E-value)
//! - Comparing islands against a library-size-scaled control sample
//! - Benjamini–Hochberg correction and final filtering
//!
//! # Example
//!
//! ```no_run
//! use isle_call::{Config, Pipeline};
//! use isle_core::models::GenomeTable;
//! use isle_core::utils::read_bed_reads;
//!
//! let genome = GenomeTable::from_species("mm10").unwrap();
//! let treatment = read_bed_reads("chip.bed.gz").unwrap();
//! let control = read_bed_reads("input.bed.gz").unwrap();
//!
//! let pipeline = Pipeline::new(&Config::default(), genome).unwrap();
//! let calls = pipeline.filter_and_run(treatment, control).unwrap();
//!
//! for called in &calls.islands {
//!     println!("{}:{}-{}\t{}", called.island.chr, called.island.start, called.island.end, called.q_value);
//! }
//! ```

pub mod background;
pub mod config;
pub mod control;
pub mod errors;
pub mod fdr;
pub mod islands;
pub mod models;
pub mod pipeline;
pub mod stats;
pub mod windows;
pub mod writing;

// re-exports
pub use config::Config;
pub use errors::{CallError, ConfigError};
pub use pipeline::{CallSet, Pipeline, RunSummary};
