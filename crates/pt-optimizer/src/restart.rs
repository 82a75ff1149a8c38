//! Random-restart driver: sample starts, climb from each, keep the best.

use std::time::Instant;

use chrono::Utc;
use pt_types::{ParameterVector, SearchError, SearchResult, State, TuneResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::climber::HillClimber;
use crate::config::{DegreeSampling, SearchConfig};
use crate::evaluator::{Evaluator, Objective};
use crate::status::{RestartSummary, SearchReport, SearchStatus};

/// Runs independent hill climbs from random starts and reports the best
/// local optimum.
///
/// The sampling RNG persists across calls to [`RandomRestart::run`], so two
/// rounds on the same driver draw different starts even with a fixed seed.
pub struct RandomRestart<O> {
    config: SearchConfig,
    climber: HillClimber,
    evaluator: Evaluator<O>,
    rng: ChaCha8Rng,
    status: Option<SearchStatus>,
}

impl<O: Objective> RandomRestart<O> {
    pub fn new(objective: O, config: SearchConfig) -> TuneResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            climber: HillClimber::new(config.bounds),
            evaluator: Evaluator::new(objective, config.failure_policy),
            config,
            rng,
            status: None,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Status of the most recent run, if any.
    pub fn status(&self) -> Option<&SearchStatus> {
        self.status.as_ref()
    }

    pub fn evaluator(&self) -> &Evaluator<O> {
        &self.evaluator
    }

    /// Draw an unscored start: `c` uniform over the bounds, `degree` uniform
    /// over the configured sampling range.
    pub fn sample_start(&mut self) -> State {
        let bounds = &self.config.bounds;
        let c = if bounds.c_min < bounds.c_max {
            self.rng.gen_range(bounds.c_min..bounds.c_max)
        } else {
            bounds.c_min
        };
        let degree = match self.config.degree_sampling {
            DegreeSampling::HalfOpen if bounds.degree_min < bounds.degree_max => {
                self.rng.gen_range(bounds.degree_min..bounds.degree_max)
            }
            DegreeSampling::HalfOpen => bounds.degree_min,
            DegreeSampling::Inclusive => self.rng.gen_range(bounds.degree_min..=bounds.degree_max),
        };
        State::new(ParameterVector::new(c, degree))
    }

    /// Run `num_restarts` climbs from random starts.
    pub fn run(&mut self, num_restarts: usize) -> TuneResult<SearchReport> {
        if num_restarts == 0 {
            return Err(SearchError::InvalidRestartCount {
                input: num_restarts.to_string(),
            }
            .into());
        }
        let starts: Vec<State> = (0..num_restarts).map(|_| self.sample_start()).collect();
        self.run_from(starts)
    }

    /// Run one climb per given start, in order.
    pub fn run_from(&mut self, starts: Vec<State>) -> TuneResult<SearchReport> {
        let total = starts.len();
        if total == 0 {
            return Err(SearchError::InvalidRestartCount {
                input: total.to_string(),
            }
            .into());
        }

        let mut status = SearchStatus::new(total);
        status.mark_running();
        let started_at = status.started_at.unwrap_or_else(Utc::now);
        let clock = Instant::now();
        let evaluations_before = self.evaluator.evaluations();
        let failures_before = self.evaluator.failures();

        info!("Starting search {} with {} restarts", status.id, total);

        let mut restarts = Vec::with_capacity(total);
        for (index, start) in starts.into_iter().enumerate() {
            let origin = *start.params();
            debug!("Restart {}/{} from {}", index + 1, total, origin);

            let outcome = match self.climber.climb(start, &mut self.evaluator) {
                Ok(outcome) => outcome,
                Err(e) => {
                    status.mark_failed(e.to_string());
                    self.status = Some(status);
                    return Err(e);
                }
            };

            let score = outcome.state.score().filter(|s| s.is_finite());
            let end = *outcome.state.params();
            match score {
                Some(score) => {
                    let candidate = SearchResult {
                        params: end,
                        score,
                        restart_index: index,
                    };
                    if status.update_best(&candidate) {
                        info!(
                            "Restart {}: new best {} with accuracy {}",
                            index + 1,
                            end,
                            candidate.accuracy_percent()
                        );
                    }
                }
                None => warn!("Restart {} found no evaluable parameters", index + 1),
            }

            restarts.push(RestartSummary {
                index,
                start: origin,
                end,
                score,
                moves: outcome.moves,
                evaluations: outcome.evaluations,
            });
            status.restarts_completed += 1;
        }

        let best = match status.best.clone() {
            Some(best) => best,
            None => {
                let err = SearchError::NoFeasibleResult { restarts: total };
                status.mark_failed(err.to_string());
                self.status = Some(status);
                return Err(err.into());
            }
        };

        status.mark_completed();
        let finished_at = status.finished_at.unwrap_or_else(Utc::now);
        let elapsed_seconds = clock.elapsed().as_secs_f64();
        let report = SearchReport {
            run_id: status.id,
            best,
            restarts,
            evaluations: self.evaluator.evaluations() - evaluations_before,
            failed_evaluations: self.evaluator.failures() - failures_before,
            started_at,
            finished_at,
            elapsed_seconds,
        };

        info!(
            "Search {} complete: {} ({}) in {:.2}s",
            report.run_id,
            report.best.params,
            report.best.accuracy_percent(),
            elapsed_seconds
        );
        self.status = Some(status);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::status::SearchState;
    use pt_types::{ModelError, TuneError};

    fn flat(_: &ParameterVector) -> TuneResult<f64> {
        Ok(0.5)
    }

    fn always_fails(p: &ParameterVector) -> TuneResult<f64> {
        Err(ModelError::NonFiniteKernel {
            degree: p.degree,
            gamma: 1.0,
        }
        .into())
    }

    /// Plateau per band of ten in `c`, independent of degree, so each climb
    /// stays where it starts.
    fn banded(p: &ParameterVector) -> TuneResult<f64> {
        let score = match (p.c / 10.0).round() as i64 {
            1 => 0.90,
            2 => 0.95,
            _ => 0.93,
        };
        Ok(score)
    }

    fn starts(points: &[(f64, u32)]) -> Vec<State> {
        points
            .iter()
            .map(|&(c, d)| State::new(ParameterVector::new(c, d)))
            .collect()
    }

    #[test]
    fn half_open_sampling_never_draws_top_degree() {
        let mut search = RandomRestart::new(flat, SearchConfig::new().with_seed(7)).unwrap();
        for _ in 0..2000 {
            let state = search.sample_start();
            let p = state.params();
            assert!(p.c >= 0.5 && p.c < 250.0);
            assert!((1..15).contains(&p.degree));
            assert!(!state.is_scored());
        }
    }

    #[test]
    fn inclusive_sampling_reaches_top_degree() {
        let config = SearchConfig::new()
            .with_seed(7)
            .with_degree_sampling(DegreeSampling::Inclusive);
        let mut search = RandomRestart::new(flat, config).unwrap();
        let degrees: Vec<u32> = (0..2000)
            .map(|_| search.sample_start().params().degree)
            .collect();
        assert!(degrees.iter().all(|d| (1..=15).contains(d)));
        assert!(degrees.contains(&15));
        assert!(degrees.contains(&1));
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let mut a = RandomRestart::new(flat, SearchConfig::new().with_seed(11)).unwrap();
        let mut b = RandomRestart::new(flat, SearchConfig::new().with_seed(11)).unwrap();
        for _ in 0..10 {
            assert_eq!(a.sample_start(), b.sample_start());
        }
    }

    #[test]
    fn best_is_kept_across_restarts() {
        let mut search = RandomRestart::new(banded, SearchConfig::new().with_seed(1)).unwrap();
        let report = search
            .run_from(starts(&[(10.0, 3), (20.0, 3), (30.0, 3)]))
            .unwrap();

        assert_eq!(report.best.score, 0.95);
        assert_eq!(report.best.restart_index, 1);
        assert_eq!(report.best.params, ParameterVector::new(20.0, 3));
        assert_eq!(report.restarts.len(), 3);
        assert_eq!(report.restarts[2].score, Some(0.93));
        assert!(report.restarts.iter().all(|r| r.moves == 0));
        // Each restart scores its start and four plateau neighbors.
        assert_eq!(report.evaluations, 15);
        assert_eq!(
            report.evaluations,
            report.restarts.iter().map(|r| r.evaluations).sum::<usize>()
        );

        let status = search.status().unwrap();
        assert_eq!(status.state, SearchState::Completed);
        assert_eq!(status.restarts_completed, 3);
    }

    #[test]
    fn equal_scores_keep_earliest_restart() {
        let mut search = RandomRestart::new(flat, SearchConfig::new().with_seed(1)).unwrap();
        let report = search
            .run_from(starts(&[(5.0, 2), (100.0, 9)]))
            .unwrap();
        assert_eq!(report.best.restart_index, 0);
        assert_eq!(report.best.params, ParameterVector::new(5.0, 2));
    }

    #[test]
    fn zero_restarts_rejected() {
        let mut search = RandomRestart::new(flat, SearchConfig::new().with_seed(1)).unwrap();
        let err = search.run(0).unwrap_err();
        assert!(matches!(
            err,
            TuneError::Search(SearchError::InvalidRestartCount { .. })
        ));
    }

    #[test]
    fn all_failures_yield_no_feasible_result() {
        let mut search =
            RandomRestart::new(always_fails, SearchConfig::new().with_seed(1)).unwrap();
        let err = search.run(2).unwrap_err();
        assert!(matches!(
            err,
            TuneError::Search(SearchError::NoFeasibleResult { restarts: 2 })
        ));
        assert_eq!(search.status().unwrap().state, SearchState::Failed);
    }

    #[test]
    fn abort_policy_stops_search() {
        let config = SearchConfig::new()
            .with_seed(1)
            .with_failure_policy(FailurePolicy::Abort);
        let mut search = RandomRestart::new(always_fails, config).unwrap();
        let err = search.run(3).unwrap_err();
        assert!(matches!(
            err,
            TuneError::Search(SearchError::EvaluationFailed { .. })
        ));
        let status = search.status().unwrap();
        assert_eq!(status.state, SearchState::Failed);
        assert_eq!(status.restarts_completed, 0);
    }

    #[test]
    fn rng_continues_between_runs() {
        let mut search = RandomRestart::new(flat, SearchConfig::new().with_seed(5)).unwrap();
        let first = search.run(1).unwrap();
        let second = search.run(1).unwrap();
        assert_ne!(first.restarts[0].start, second.restarts[0].start);
        assert_ne!(first.run_id, second.run_id);
    }

    #[test]
    fn invalid_config_rejected() {
        let mut config = SearchConfig::new();
        config.bounds.c_min = -1.0;
        assert!(RandomRestart::new(flat, config).is_err());
    }
}
