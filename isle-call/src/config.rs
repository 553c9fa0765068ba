//! Run configuration.
//!
//! [Config] is what users write (TOML file and/or command line flags);
//! [Params] is the validated, typed form every stage is built from.
//!
//! # Example
//! ```toml
//! window_size = 200
//! gap_windows = 3
//! fragment_size = 150
//! effective_genome_fraction = 0.74
//! evalue = 1000
//! fdr = 0.01
//!
//! [enrichment_model]
//! model = "negative_binomial"
//! dispersion = 0.1
//! ```

use std::fs::read_to_string;
use std::path::Path;

use isle_core::models::GenomeTable;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// What to do with islands that have no control reads in their span.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum ZeroControlPolicy {
    /// Use the background expectation `λ × spanWindows` as the expected
    /// count; fold change is `treatment / expected`.
    Background,
    /// Report this fold change; the p-value still uses the background
    /// expectation.
    Sentinel { fold_change: f64 },
}

/// Null distribution of the control-anchored enrichment test.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum EnrichmentModel {
    Poisson,
    /// Variance `μ + dispersion × μ²`.
    NegativeBinomial { dispersion: f64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub window_size: i64,
    pub gap_windows: i64,
    pub fragment_size: i64,
    pub effective_genome_fraction: f64,
    pub effective_genome_size: Option<f64>,
    pub redundancy_threshold: u32,
    /// Island discovery cutoff on the background E-value, before control
    /// comparison.
    pub evalue: Option<f64>,
    /// Final cutoff on the BH q-value.
    pub fdr: Option<f64>,
    pub window_pvalue: Option<f64>,
    pub zero_control: ZeroControlPolicy,
    pub enrichment_model: EnrichmentModel,
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_size: 200,
            gap_windows: 3,
            fragment_size: 150,
            effective_genome_fraction: 0.74,
            effective_genome_size: None,
            redundancy_threshold: 0,
            evalue: Some(1000.0),
            fdr: None,
            window_pvalue: None,
            zero_control: ZeroControlPolicy::Background,
            enrichment_model: EnrichmentModel::Poisson,
            threads: 1,
        }
    }
}

/// Validated run parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    pub window_size: u64,
    pub gap_windows: u64,
    pub fragment_size: u32,
    pub effective_genome_size: f64,
    pub redundancy_threshold: u32,
    pub evalue: Option<f64>,
    pub fdr: Option<f64>,
    pub window_pvalue: Option<f64>,
    pub zero_control: ZeroControlPolicy,
    pub enrichment_model: EnrichmentModel,
    pub threads: usize,
}

impl Params {
    /// Number of windows tiling the effective genome.
    pub fn effective_window_count(&self) -> f64 {
        self.effective_genome_size / self.window_size as f64
    }
}

impl TryFrom<&Path> for Config {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}

impl Config {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::try_from(path.as_ref())
    }

    ///
    /// Check every option and resolve the effective genome size against the
    /// genome table.
    ///
    pub fn validate(&self, genome: &GenomeTable) -> Result<Params, ConfigError> {
        if genome.is_empty() {
            return Err(ConfigError::EmptyGenome);
        }
        if self.window_size <= 0 {
            return Err(ConfigError::WindowSize(self.window_size));
        }
        if self.gap_windows < 0 {
            return Err(ConfigError::GapSize(self.gap_windows));
        }
        if self.fragment_size < 0 || self.fragment_size > u32::MAX as i64 {
            return Err(ConfigError::FragmentSize(self.fragment_size));
        }
        if self.threads == 0 {
            return Err(ConfigError::Threads);
        }

        let effective_genome_size = match self.effective_genome_size {
            Some(size) => size,
            None => {
                let fraction = self.effective_genome_fraction;
                if !(fraction > 0.0 && fraction <= 1.0) {
                    return Err(ConfigError::EffectiveGenomeFraction(fraction));
                }
                genome.total_length() as f64 * fraction
            }
        };
        if !(effective_genome_size.is_finite() && effective_genome_size > 0.0) {
            return Err(ConfigError::EffectiveGenomeSize(effective_genome_size));
        }

        if let Some(threshold) = self.evalue {
            if !(threshold.is_finite() && threshold > 0.0) {
                return Err(ConfigError::Threshold {
                    name: "E-value",
                    domain: "positive",
                    value: threshold,
                });
            }
        }

        if let Some(threshold) = self.fdr {
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err(ConfigError::Threshold {
                    name: "FDR",
                    domain: "in (0, 1]",
                    value: threshold,
                });
            }
        }

        if let Some(pvalue) = self.window_pvalue {
            if !(pvalue > 0.0 && pvalue <= 1.0) {
                return Err(ConfigError::Threshold {
                    name: "Window p-value",
                    domain: "in (0, 1]",
                    value: pvalue,
                });
            }
        }

        if let ZeroControlPolicy::Sentinel { fold_change } = self.zero_control {
            if fold_change.is_nan() || fold_change < 0.0 {
                return Err(ConfigError::SentinelFoldChange(fold_change));
            }
        }

        if let EnrichmentModel::NegativeBinomial { dispersion } = self.enrichment_model {
            if !(dispersion.is_finite() && dispersion > 0.0) {
                return Err(ConfigError::Dispersion(dispersion));
            }
        }

        Ok(Params {
            window_size: self.window_size as u64,
            gap_windows: self.gap_windows as u64,
            fragment_size: self.fragment_size as u32,
            effective_genome_size,
            redundancy_threshold: self.redundancy_threshold,
            evalue: self.evalue,
            fdr: self.fdr,
            window_pvalue: self.window_pvalue,
            zero_control: self.zero_control,
            enrichment_model: self.enrichment_model,
            threads: self.threads,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;

    #[fixture]
    fn genome() -> GenomeTable {
        GenomeTable::new(vec![
            ("chr1".to_string(), 30_000),
            ("chr2".to_string(), 20_000),
        ])
        .unwrap()
    }

    #[rstest]
    fn test_default_validates(genome: GenomeTable) {
        let params = Config::default().validate(&genome).unwrap();
        assert_eq!(params.window_size, 200);
        assert_eq!(params.gap_windows, 3);
        assert_eq!(params.fragment_size, 150);
        assert!((params.effective_genome_size - 37_000.0).abs() < 1e-9);
        assert!((params.effective_window_count() - 185.0).abs() < 1e-9);
    }

    #[rstest]
    fn test_absolute_genome_size_overrides_fraction(genome: GenomeTable) {
        let config = Config {
            effective_genome_size: Some(10_000.0),
            effective_genome_fraction: 5.0,
            ..Config::default()
        };
        let params = config.validate(&genome).unwrap();
        assert_eq!(params.effective_genome_size, 10_000.0);
    }

    #[rstest]
    #[case(Config { window_size: 0, ..Config::default() })]
    #[case(Config { window_size: -200, ..Config::default() })]
    #[case(Config { gap_windows: -1, ..Config::default() })]
    #[case(Config { fragment_size: -1, ..Config::default() })]
    #[case(Config { effective_genome_fraction: 0.0, ..Config::default() })]
    #[case(Config { effective_genome_size: Some(-5.0), ..Config::default() })]
    #[case(Config { threads: 0, ..Config::default() })]
    #[case(Config { fdr: Some(1.5), ..Config::default() })]
    #[case(Config { evalue: Some(0.0), ..Config::default() })]
    #[case(Config { window_pvalue: Some(0.0), ..Config::default() })]
    #[case(Config { enrichment_model: EnrichmentModel::NegativeBinomial { dispersion: 0.0 }, ..Config::default() })]
    #[case(Config { zero_control: ZeroControlPolicy::Sentinel { fold_change: -1.0 }, ..Config::default() })]
    fn test_invalid_configs(genome: GenomeTable, #[case] config: Config) {
        assert!(config.validate(&genome).is_err());
    }

    #[rstest]
    fn test_evalue_and_fdr_combine(genome: GenomeTable) {
        let config = Config {
            fdr: Some(0.01),
            ..Config::default()
        };
        let params = config.validate(&genome).unwrap();
        assert_eq!(params.evalue, Some(1000.0));
        assert_eq!(params.fdr, Some(0.01));
    }

    #[rstest]
    fn test_window_size_error_message(genome: GenomeTable) {
        let config = Config {
            window_size: 0,
            ..Config::default()
        };
        let err = config.validate(&genome).unwrap_err();
        assert_eq!(err.to_string(), "Window size must be positive, got 0");
    }

    #[rstest]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
window_size = 100
gap_windows = 2
fdr = 0.05

[zero_control]
policy = "sentinel"
fold_change = 100.0

[enrichment_model]
model = "negative_binomial"
dispersion = 0.2
"#
        )
        .unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.window_size, 100);
        assert_eq!(config.gap_windows, 2);
        assert_eq!(config.fragment_size, 150);
        assert_eq!(config.evalue, Some(1000.0));
        assert_eq!(config.fdr, Some(0.05));
        assert_eq!(
            config.zero_control,
            ZeroControlPolicy::Sentinel { fold_change: 100.0 }
        );
        assert_eq!(
            config.enrichment_model,
            EnrichmentModel::NegativeBinomial { dispersion: 0.2 }
        );
    }

    #[rstest]
    fn test_toml_rejects_unknown_keys() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "windw_size = 100").unwrap();
        assert!(matches!(
            Config::from_toml_file(file.path()),
            Err(ConfigError::Toml(_))
        ));
    }
}
