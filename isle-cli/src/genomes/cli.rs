use clap::{Command, arg};

pub const GENOMES_CMD: &str = "genomes";

pub fn create_genomes_cli() -> Command {
    Command::new(GENOMES_CMD)
        .about("List the built-in genome tables usable with `isle call --species`.")
        .arg(
            arg!(--chromosomes)
                .required(false)
                .help("Also print every chromosome with its length"),
        )
}
