use crate::entropy::EntropyCalculator;
use crate::propagator::ConstraintPropagator;
use crate::rules::ConstraintRule;
use crate::runner::{RunSummary, Runner};
use crate::WfcError;
use log::{debug, warn};

/// Builds and runs a fresh runner until one attempt finishes without a
/// contradiction.
///
/// `build` receives the seed for each attempt: `base_seed + attempt` when a
/// base seed is given, `None` otherwise. Contradictions raised while building
/// (e.g. during seeding) or while running start a new attempt; any other
/// error is returned immediately.
pub fn run_with_retry<R, E, P, F>(
    attempts: usize,
    base_seed: Option<u64>,
    mut build: F,
) -> Result<(Runner<R, E, P>, RunSummary), WfcError>
where
    R: ConstraintRule,
    E: EntropyCalculator,
    P: ConstraintPropagator,
    F: FnMut(Option<u64>) -> Result<Runner<R, E, P>, WfcError>,
{
    for attempt in 0..attempts {
        let seed = base_seed.map(|base| base.wrapping_add(attempt as u64));
        let outcome = build(seed).and_then(|mut runner| {
            let summary = runner.run()?;
            Ok((runner, summary))
        });
        match outcome {
            Ok(done) => {
                debug!("Attempt {} succeeded (seed {:?})", attempt + 1, seed);
                return Ok(done);
            }
            Err(err) if err.is_contradiction() => {
                warn!("Attempt {}/{} failed: {err}", attempt + 1, attempts);
            }
            Err(err) => return Err(err),
        }
    }
    Err(WfcError::RetriesExhausted(attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::WfcConfig;
    use wfc_rules::Tile;

    #[test]
    fn test_contradicting_builds_exhaust_attempts() {
        let mut seeds = Vec::new();
        let result = run_with_retry(3, Some(10), |seed| {
            seeds.push(seed);
            let mut runner = Runner::terrain(5, 5, WfcConfig::builder().maybe_seed(seed).build())?;
            runner.seed_frame(Tile::Water, Tile::Stone)?;
            Ok(runner)
        });
        assert_eq!(result.err(), Some(WfcError::RetriesExhausted(3)));
        assert_eq!(seeds, vec![Some(10), Some(11), Some(12)]);
    }

    #[test]
    fn test_other_errors_are_not_retried() {
        let mut calls = 0;
        let result = run_with_retry(5, None, |_| {
            calls += 1;
            Runner::terrain(0, 4, WfcConfig::default())
        });
        assert!(matches!(result, Err(WfcError::Grid(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_first_success_is_returned() {
        let (runner, summary) = run_with_retry(4, Some(1), |seed| {
            Runner::terrain(6, 3, WfcConfig::builder().maybe_seed(seed).build())
        })
        .unwrap();
        assert!(runner.grid().is_fully_resolved());
        assert_eq!(summary.iterations, runner.iterations());
    }
}
