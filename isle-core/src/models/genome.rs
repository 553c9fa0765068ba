use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::GenomeTableError;
use crate::species;
use crate::utils::read_chrom_sizes;

///
/// GenomeTable struct, the ordered chromosome name → length lookup of one
/// genome build.
///
/// Iteration always follows the order in which chromosomes were declared,
/// so anything keyed by chromosome and emitted through the table comes out
/// in a stable order.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenomeTable {
    chromosomes: Vec<(String, u64)>,
    positions: HashMap<String, usize>,
}

impl GenomeTable {
    ///
    /// Create a new [GenomeTable] from `(name, length)` pairs, keeping their order.
    ///
    pub fn new(chromosomes: Vec<(String, u64)>) -> Result<Self, GenomeTableError> {
        let mut positions = HashMap::with_capacity(chromosomes.len());

        for (idx, (chr, length)) in chromosomes.iter().enumerate() {
            if *length == 0 {
                return Err(GenomeTableError::ZeroLength(chr.clone()));
            }
            if positions.insert(chr.clone(), idx).is_some() {
                return Err(GenomeTableError::DuplicateChromosome(chr.clone()));
            }
        }

        Ok(GenomeTable {
            chromosomes,
            positions,
        })
    }

    ///
    /// Look up one of the built-in species tables (see [crate::species]).
    ///
    pub fn from_species(name: &str) -> Result<Self, GenomeTableError> {
        let table = species::lookup(name)
            .ok_or_else(|| GenomeTableError::UnknownSpecies(name.to_string()))?;

        GenomeTable::new(
            table
                .iter()
                .map(|(chr, length)| (chr.to_string(), *length))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn length_of(&self, chr: &str) -> Option<u64> {
        self.positions.get(chr).map(|idx| self.chromosomes[*idx].1)
    }

    /// Index of the chromosome in declaration order.
    pub fn position_of(&self, chr: &str) -> Option<usize> {
        self.positions.get(chr).copied()
    }

    pub fn name_at(&self, idx: usize) -> Option<&str> {
        self.chromosomes.get(idx).map(|(chr, _)| chr.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.chromosomes
            .iter()
            .map(|(chr, length)| (chr.as_str(), *length))
    }

    pub fn total_length(&self) -> u64 {
        self.chromosomes.iter().map(|(_, length)| length).sum()
    }
}

impl TryFrom<&Path> for GenomeTable {
    type Error = GenomeTableError;

    ///
    /// Create a new [GenomeTable] from a chrom sizes file.
    ///
    fn try_from(value: &Path) -> Result<Self, GenomeTableError> {
        GenomeTable::new(read_chrom_sizes(value)?)
    }
}

impl TryFrom<&str> for GenomeTable {
    type Error = GenomeTableError;

    fn try_from(value: &str) -> Result<Self, GenomeTableError> {
        GenomeTable::try_from(Path::new(value))
    }
}

impl TryFrom<PathBuf> for GenomeTable {
    type Error = GenomeTableError;

    fn try_from(value: PathBuf) -> Result<Self, GenomeTableError> {
        GenomeTable::try_from(value.as_path())
    }
}
