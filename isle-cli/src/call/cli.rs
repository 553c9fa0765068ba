use clap::{Arg, ArgAction, ArgGroup, Command, arg, value_parser};

pub const CALL_CMD: &str = "call";

pub const DEFAULT_SENTINEL_FOLD_CHANGE: f64 = 1000.0;

pub fn create_call_cli() -> Command {
    Command::new(CALL_CMD)
        .about("Call enriched islands in a treatment read set against a control read set.")
        .arg(
            arg!(-t --treatment <TREATMENT>)
                .required(true)
                .help("Treatment reads as BED6 (.gz allowed, - for stdin)"),
        )
        .arg(
            arg!(-c --control <CONTROL>)
                .required(false)
                .help("Control reads as BED6 (.gz allowed). Without it every island is scored against the background"),
        )
        .arg(
            arg!(-s --species <SPECIES>)
                .required(false)
                .help("Built-in genome (see `isle genomes`)"),
        )
        .arg(
            Arg::new("chrom-sizes")
                .short('g')
                .long("chrom-sizes")
                .help("Path to a chrom.sizes file"),
        )
        .group(
            ArgGroup::new("genome")
                .args(["species", "chrom-sizes"])
                .required(true),
        )
        .arg(
            arg!(--config <CONFIG>)
                .required(false)
                .help("TOML config file; command line options override its values"),
        )
        .arg(
            arg!(-w --"window-size" <BP>)
                .required(false)
                .value_parser(value_parser!(i64))
                .help("Window size in bp [default: 200]"),
        )
        .arg(
            arg!(--gap <WINDOWS>)
                .required(false)
                .value_parser(value_parser!(i64))
                .help("Empty windows allowed inside an island [default: 3]"),
        )
        .arg(
            arg!(--"fragment-size" <BP>)
                .required(false)
                .value_parser(value_parser!(i64))
                .help("Average fragment length; reads are shifted by half of it [default: 150]"),
        )
        .arg(
            arg!(--"effective-fraction" <FRACTION>)
                .required(false)
                .value_parser(value_parser!(f64))
                .help("Mappable fraction of the genome [default: 0.74]"),
        )
        .arg(
            arg!(--"effective-genome-size" <BP>)
                .required(false)
                .value_parser(value_parser!(f64))
                .help("Absolute effective genome size; overrides --effective-fraction"),
        )
        .arg(
            arg!(--"redundancy-threshold" <COPIES>)
                .required(false)
                .value_parser(value_parser!(u32))
                .help("Keep at most this many reads per position and strand, 0 keeps all [default: 0]"),
        )
        .arg(
            arg!(--evalue <EVALUE>)
                .required(false)
                .value_parser(value_parser!(f64))
                .help("Discard islands whose background E-value exceeds this [default: 1000]"),
        )
        .arg(
            arg!(--fdr <FDR>)
                .required(false)
                .value_parser(value_parser!(f64))
                .help("Discard islands whose q-value exceeds this; applied after the E-value cutoff"),
        )
        .arg(
            Arg::new("no-filter")
                .long("no-filter")
                .action(ArgAction::SetTrue)
                .conflicts_with_all(["evalue", "fdr"])
                .help("Report every island, dropping both the E-value and the q-value cutoff"),
        )
        .arg(
            arg!(--"window-pvalue" <PVALUE>)
                .required(false)
                .value_parser(value_parser!(f64))
                .help("Only windows at least this significant under the background join islands"),
        )
        .arg(
            arg!(--"zero-control" <POLICY>)
                .required(false)
                .value_parser(["background", "sentinel"])
                .help("Fold change of islands without control reads [default: background]"),
        )
        .arg(
            arg!(--"sentinel-fold-change" <FOLD>)
                .required(false)
                .value_parser(value_parser!(f64))
                .help("Fold change reported under --zero-control sentinel [default: 1000]"),
        )
        .arg(
            arg!(--"nb-dispersion" <DISPERSION>)
                .required(false)
                .value_parser(value_parser!(f64))
                .help("Test enrichment with a negative binomial of this dispersion instead of a Poisson"),
        )
        .arg(
            arg!(--threads <THREADS>)
                .required(false)
                .value_parser(value_parser!(usize))
                .help("Worker threads [default: 1]"),
        )
        .arg(
            arg!(--format <FORMAT>)
                .required(false)
                .value_parser(["tsv", "json"])
                .default_value("tsv")
                .help("Output format"),
        )
        .arg(
            arg!(--"windows-out" <PATH>)
                .required(false)
                .help("Also write treatment window counts as bedGraph"),
        )
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(false)
                .help("Output path (default: stdout, .gz compresses)"),
        )
}
