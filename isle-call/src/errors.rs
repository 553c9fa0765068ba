use thiserror::Error;

use crate::pipeline::PipelineState;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Window size must be positive, got {0}")]
    WindowSize(i64),

    #[error("Gap size must not be negative, got {0} windows")]
    GapSize(i64),

    #[error("Fragment size must not be negative, got {0}")]
    FragmentSize(i64),

    #[error("Effective genome fraction must be in (0, 1], got {0}")]
    EffectiveGenomeFraction(f64),

    #[error("Effective genome size must be positive, got {0}")]
    EffectiveGenomeSize(f64),

    #[error("{name} threshold must be {domain}, got {value}")]
    Threshold {
        name: &'static str,
        domain: &'static str,
        value: f64,
    },

    #[error("Negative binomial dispersion must be positive, got {0}")]
    Dispersion(f64),

    #[error("Sentinel fold change must be non-negative, got {0}")]
    SentinelFoldChange(f64),

    #[error("Thread count must be positive")]
    Threads,

    #[error("Genome table has no chromosomes")]
    EmptyGenome,

    #[error("Can't read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum CallError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Numeric failure while {stage}: {message}")]
    Computation {
        stage: PipelineState,
        message: String,
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type CallResult<T> = std::result::Result<T, CallError>;

///
/// Reject probabilities and scores that left their domain. Tail
/// probabilities are computed in log space, so anything caught here is a
/// modelling bug, not an input problem.
///
pub(crate) fn check_probability(
    value: f64,
    stage: PipelineState,
    what: &str,
) -> CallResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CallError::Computation {
            stage,
            message: format!("{} out of [0, 1]: {}", what, value),
        })
    }
}

pub(crate) fn check_finite(value: f64, stage: PipelineState, what: &str) -> CallResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CallError::Computation {
            stage,
            message: format!("{} is not finite: {}", what, value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    #[rstest]
    #[case(0.0)]
    #[case(0.5)]
    #[case(1.0)]
    fn test_check_probability_accepts(#[case] value: f64) {
        assert!(check_probability(value, PipelineState::ScoringControl, "p-value").is_ok());
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(-0.1)]
    #[case(1.5)]
    fn test_check_probability_rejects(#[case] value: f64) {
        let err = check_probability(value, PipelineState::ScoringBackground, "p-value").unwrap_err();
        assert!(matches!(
            err,
            CallError::Computation {
                stage: PipelineState::ScoringBackground,
                ..
            }
        ));
        assert!(err.to_string().contains("scoring islands against background"));
    }
}
