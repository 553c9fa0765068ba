use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use isle_call::config::{EnrichmentModel, ZeroControlPolicy};
use isle_call::writing::{write_islands_json, write_islands_tsv, write_windows_bedgraph};
use isle_call::{Config, Pipeline};
use isle_core::models::{GenomeTable, Read};
use isle_core::utils::{get_dynamic_reader_w_stdin, get_dynamic_writer, parse_bed_reads};

use super::cli::DEFAULT_SENTINEL_FOLD_CHANGE;

fn read_sample(path: &str, label: &str) -> Result<Vec<Read>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg} ({bytes})")?,
    );
    pb.set_message(format!("Reading {} reads from {}", label, path));
    pb.enable_steady_tick(Duration::from_millis(120));

    let reader = get_dynamic_reader_w_stdin(path)?;
    let reads = parse_bed_reads(BufReader::new(pb.wrap_read(reader)))
        .with_context(|| format!("Failed to read {} reads from {}", label, path))?;

    pb.finish_and_clear();
    info!("Read {} {} reads from {}", reads.len(), label, path);

    Ok(reads)
}

fn load_genome(matches: &ArgMatches) -> Result<GenomeTable> {
    if let Some(species) = matches.get_one::<String>("species") {
        return GenomeTable::from_species(species)
            .with_context(|| format!("Failed to load built-in genome {}", species));
    }

    let path = matches
        .get_one::<String>("chrom-sizes")
        .context("Either --species or --chrom-sizes is required")?;
    GenomeTable::try_from(Path::new(path))
        .with_context(|| format!("Failed to load chrom sizes from {}", path))
}

///
/// Start from the config file (or the defaults) and let every option given
/// on the command line override it.
///
pub fn load_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_toml_file(path)
            .with_context(|| format!("Failed to load config from {}", path))?,
        None => Config::default(),
    };

    if let Some(window_size) = matches.get_one::<i64>("window-size") {
        config.window_size = *window_size;
    }
    if let Some(gap) = matches.get_one::<i64>("gap") {
        config.gap_windows = *gap;
    }
    if let Some(fragment_size) = matches.get_one::<i64>("fragment-size") {
        config.fragment_size = *fragment_size;
    }
    if let Some(fraction) = matches.get_one::<f64>("effective-fraction") {
        config.effective_genome_fraction = *fraction;
    }
    if let Some(size) = matches.get_one::<f64>("effective-genome-size") {
        config.effective_genome_size = Some(*size);
    }
    if let Some(threshold) = matches.get_one::<u32>("redundancy-threshold") {
        config.redundancy_threshold = *threshold;
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.threads = *threads;
    }
    if let Some(pvalue) = matches.get_one::<f64>("window-pvalue") {
        config.window_pvalue = Some(*pvalue);
    }

    if matches.get_flag("no-filter") {
        config.evalue = None;
        config.fdr = None;
    }
    if let Some(threshold) = matches.get_one::<f64>("evalue") {
        config.evalue = Some(*threshold);
    }
    if let Some(threshold) = matches.get_one::<f64>("fdr") {
        config.fdr = Some(*threshold);
    }

    let sentinel = matches.get_one::<f64>("sentinel-fold-change").copied();
    match matches.get_one::<String>("zero-control").map(String::as_str) {
        Some("background") => config.zero_control = ZeroControlPolicy::Background,
        Some(_) => {
            let fold_change = match (sentinel, config.zero_control) {
                (Some(fold_change), _) => fold_change,
                (None, ZeroControlPolicy::Sentinel { fold_change }) => fold_change,
                (None, ZeroControlPolicy::Background) => DEFAULT_SENTINEL_FOLD_CHANGE,
            };
            config.zero_control = ZeroControlPolicy::Sentinel { fold_change };
        }
        None => {
            if let Some(fold_change) = sentinel {
                config.zero_control = ZeroControlPolicy::Sentinel { fold_change };
            }
        }
    }

    if let Some(dispersion) = matches.get_one::<f64>("nb-dispersion") {
        config.enrichment_model = EnrichmentModel::NegativeBinomial {
            dispersion: *dispersion,
        };
    }

    Ok(config)
}

pub fn run_call(matches: &ArgMatches) -> Result<()> {
    let treatment_path = matches
        .get_one::<String>("treatment")
        .expect("--treatment is required");
    let control_path = matches.get_one::<String>("control");
    let output = matches
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or("-");
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("tsv");

    let config = load_config(matches)?;
    let genome = load_genome(matches)?;
    let pipeline = Pipeline::new(&config, genome)?;
    info!(
        "Calling islands over {} chromosomes, window size {}, gap {} windows",
        pipeline.genome().len(),
        pipeline.params().window_size,
        pipeline.params().gap_windows
    );

    let treatment = read_sample(treatment_path, "treatment")?;
    let control = match control_path {
        Some(path) => read_sample(path, "control")?,
        None => Vec::new(),
    };

    let calls = pipeline.filter_and_run(treatment, control)?;

    let writer = get_dynamic_writer(output)?;
    let written = match format {
        "json" => write_islands_json(&calls.islands, writer),
        _ => write_islands_tsv(&calls.islands, writer),
    };
    written.with_context(|| format!("Failed to write islands to {}", output))?;

    if let Some(path) = matches.get_one::<String>("windows-out") {
        write_windows_bedgraph(
            &calls.treatment_windows,
            pipeline.params().window_size,
            get_dynamic_writer(path)?,
        )
        .with_context(|| format!("Failed to write windows to {}", path))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::cli::create_call_cli;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs::read_to_string;
    use std::path::PathBuf;

    fn get_test_path(file_name: &str) -> String {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data")
            .join(file_name)
            .to_string_lossy()
            .to_string()
    }

    fn parse(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["call", "-t", "reads.bed", "-s", "hg38"];
        argv.extend_from_slice(args);
        create_call_cli().try_get_matches_from(argv).unwrap()
    }

    #[rstest]
    fn test_defaults_without_options() {
        let config = load_config(&parse(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[rstest]
    fn test_options_override_defaults() {
        let matches = parse(&[
            "-w",
            "100",
            "--gap",
            "2",
            "--fdr",
            "0.05",
            "--zero-control",
            "sentinel",
            "--nb-dispersion",
            "0.2",
            "--threads",
            "3",
        ]);
        let config = load_config(&matches).unwrap();

        assert_eq!(config.window_size, 100);
        assert_eq!(config.gap_windows, 2);
        assert_eq!(config.threads, 3);
        assert_eq!(config.evalue, Some(1000.0));
        assert_eq!(config.fdr, Some(0.05));
        assert_eq!(
            config.zero_control,
            ZeroControlPolicy::Sentinel {
                fold_change: DEFAULT_SENTINEL_FOLD_CHANGE
            }
        );
        assert_eq!(
            config.enrichment_model,
            EnrichmentModel::NegativeBinomial { dispersion: 0.2 }
        );
    }

    #[rstest]
    fn test_evalue_and_fdr_combine() {
        let config = load_config(&parse(&["--evalue", "10", "--fdr", "0.05"])).unwrap();
        assert_eq!(config.evalue, Some(10.0));
        assert_eq!(config.fdr, Some(0.05));
    }

    #[rstest]
    fn test_no_filter_clears_both_cutoffs() {
        let config = load_config(&parse(&["--no-filter"])).unwrap();
        assert_eq!(config.evalue, None);
        assert_eq!(config.fdr, None);
    }

    #[rstest]
    fn test_no_filter_excludes_cutoffs() {
        let result = create_call_cli().try_get_matches_from([
            "call", "-t", "reads.bed", "-s", "hg38", "--fdr", "0.1", "--no-filter",
        ]);
        assert!(result.is_err());
    }

    #[rstest]
    fn test_genome_is_required() {
        let result = create_call_cli().try_get_matches_from(["call", "-t", "reads.bed"]);
        assert!(result.is_err());
    }

    #[rstest]
    fn test_command_line_overrides_config_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let config_path = tempdir.path().join("isle.toml");
        std::fs::write(&config_path, "window_size = 500\ngap_windows = 1\n").unwrap();

        let matches = parse(&["--config", config_path.to_str().unwrap(), "--gap", "4"]);
        let config = load_config(&matches).unwrap();
        assert_eq!(config.window_size, 500);
        assert_eq!(config.gap_windows, 4);
    }

    #[rstest]
    fn test_run_call_writes_islands_and_windows() {
        let tempdir = tempfile::tempdir().unwrap();
        let output: PathBuf = tempdir.path().join("islands.tsv");
        let windows: PathBuf = tempdir.path().join("windows.bedgraph");

        let treatment = get_test_path("treatment.bed");
        let control = get_test_path("control.bed");
        let chrom_sizes = get_test_path("dummy.chrom.sizes");
        let matches = create_call_cli()
            .try_get_matches_from([
                "call",
                "-t",
                treatment.as_str(),
                "-c",
                control.as_str(),
                "-g",
                chrom_sizes.as_str(),
                "--no-filter",
                "--windows-out",
                windows.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
            ])
            .unwrap();

        run_call(&matches).unwrap();

        let islands = read_to_string(&output).unwrap();
        let mut lines = islands.lines();
        assert!(lines.next().unwrap().starts_with("#chr\tstart\tend"));
        let first: Vec<&str> = lines.next().unwrap().split('\t').collect();
        assert_eq!(&first[..5], &["chr1", "4800", "6000", "40", "4"]);

        let bedgraph = read_to_string(&windows).unwrap();
        let total: u64 = bedgraph
            .lines()
            .map(|l| l.split('\t').nth(3).unwrap().parse::<u64>().unwrap())
            .sum();
        assert_eq!(total, 62);
    }

    #[rstest]
    fn test_run_call_rejects_bad_window_size() {
        let treatment = get_test_path("treatment.bed");
        let chrom_sizes = get_test_path("dummy.chrom.sizes");
        let matches = create_call_cli()
            .try_get_matches_from([
                "call",
                "-t",
                treatment.as_str(),
                "-g",
                chrom_sizes.as_str(),
                "-w",
                "0",
            ])
            .unwrap();

        let err = run_call(&matches).unwrap_err();
        assert!(err.to_string().contains("Window size must be positive"));
    }
}
