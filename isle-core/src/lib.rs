//! Core types shared by the isle crates.
//!
//! This crate holds the immutable inputs of an island-calling run:
//!
//! - [`GenomeTable`](models::GenomeTable): the ordered chromosome name → length lookup
//! - [`Read`](models::Read): one aligned read reduced to its 5' coordinate and strand
//! - readers for chrom-sizes and BED read files, and the redundancy filter
//!
//! # Example
//!
//! ```no_run
//! use isle_core::models::GenomeTable;
//! use isle_core::utils::read_bed_reads;
//!
//! let genome = GenomeTable::from_species("hg38").unwrap();
//! let reads = read_bed_reads("treatment.bed.gz").unwrap();
//!
//! println!("{} reads over {} chromosomes", reads.len(), genome.len());
//! ```

pub mod errors;
pub mod filter;
pub mod models;
pub mod species;
pub mod utils;
