mod call;
mod genomes;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "isle";
    pub const VERBOSE_FLAG: &str = "verbose";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Call enriched islands in ChIP-seq read sets against a control library.")
        .subcommand_required(true)
        .arg(
            Arg::new(consts::VERBOSE_FLAG)
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Log more (-v for debug output). RUST_LOG overrides this"),
        )
        .subcommand(call::cli::create_call_cli())
        .subcommand(genomes::cli::create_genomes_cli())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_count(consts::VERBOSE_FLAG));

    match matches.subcommand() {
        //
        // ISLAND CALLING
        //
        Some((call::cli::CALL_CMD, matches)) => {
            call::handlers::run_call(matches)?;
        }

        //
        // BUILT-IN GENOMES
        //
        Some((genomes::cli::GENOMES_CMD, matches)) => {
            genomes::handlers::run_genomes(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }
}
