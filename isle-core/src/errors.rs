use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenomeTableError {
    #[error("Chromosome listed more than once in genome table: {0}")]
    DuplicateChromosome(String),

    #[error("Chromosome {0} has zero length")]
    ZeroLength(String),

    #[error("Error parsing chrom sizes line {line}: {content}")]
    ChromSizesParseError { line: usize, content: String },

    #[error("Unknown species: {0}. Run `isle genomes` to list the built-in tables")]
    UnknownSpecies(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ReadParseError {
    #[error("Error parsing read at line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("Invalid strand: {0}")]
    InvalidStrand(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
