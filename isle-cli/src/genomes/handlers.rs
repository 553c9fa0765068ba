use std::io::{self, Write};

use anyhow::Result;
use clap::ArgMatches;

use isle_core::models::GenomeTable;
use isle_core::species::SPECIES;

fn describe_genomes<W: Write>(with_chromosomes: bool, mut out: W) -> Result<()> {
    for name in SPECIES {
        let genome = GenomeTable::from_species(name)?;
        writeln!(
            out,
            "{}\t{} chromosomes\t{} bp",
            name,
            genome.len(),
            genome.total_length()
        )?;

        if with_chromosomes {
            for (chr, length) in genome.iter() {
                writeln!(out, "  {}\t{}", chr, length)?;
            }
        }
    }

    Ok(())
}

pub fn run_genomes(matches: &ArgMatches) -> Result<()> {
    let with_chromosomes = matches.get_flag("chromosomes");
    describe_genomes(with_chromosomes, io::stdout().lock())
}
