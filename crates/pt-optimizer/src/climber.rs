//! First-improvement hill climbing from a single start.

use pt_types::{ParameterBounds, State, TuneResult};

use crate::evaluator::{Evaluator, Objective};
use crate::neighbors::generate_neighbors;

/// Result of one climb to a local optimum.
#[derive(Debug, Clone, PartialEq)]
pub struct ClimbOutcome {
    /// The local optimum. Always scored.
    pub state: State,
    /// Number of accepted moves.
    pub moves: usize,
    /// Objective evaluations spent by this climb.
    pub evaluations: usize,
    /// Score of each adopted state in order, starting with the initial state.
    pub trajectory: Vec<f64>,
}

/// Greedy first-improvement ascent over the axis-aligned neighborhood.
#[derive(Debug, Clone, Copy, Default)]
pub struct HillClimber {
    bounds: ParameterBounds,
}

impl HillClimber {
    pub fn new(bounds: ParameterBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &ParameterBounds {
        &self.bounds
    }

    /// Climb from `initial` until no neighbor strictly improves.
    ///
    /// Neighbors are scored one at a time in generator order and the first
    /// strictly better one becomes the current state; the rest of that round
    /// is discarded. Every accepted move strictly increases the score, so the
    /// climb terminates for any deterministic, bounded objective.
    pub fn climb<O: Objective>(
        &self,
        initial: State,
        evaluator: &mut Evaluator<O>,
    ) -> TuneResult<ClimbOutcome> {
        let evaluations_before = evaluator.evaluations();

        let mut current = initial;
        if !current.is_scored() {
            evaluator.evaluate(&mut current)?;
        }
        let mut trajectory = vec![current.score().unwrap_or(f64::NEG_INFINITY)];
        let mut moves = 0;

        loop {
            let mut improved = None;
            for mut neighbor in generate_neighbors(&current, &self.bounds) {
                evaluator.evaluate(&mut neighbor)?;
                if neighbor.improves_on(&current) {
                    improved = Some(neighbor);
                    break;
                }
            }

            match improved {
                Some(next) => {
                    tracing::debug!(
                        "Move {}: {} -> {} ({:?})",
                        moves + 1,
                        current.params(),
                        next.params(),
                        next.score()
                    );
                    trajectory.push(next.score().unwrap_or(f64::NEG_INFINITY));
                    current = next;
                    moves += 1;
                }
                None => break,
            }
        }

        Ok(ClimbOutcome {
            state: current,
            moves,
            evaluations: evaluator.evaluations() - evaluations_before,
            trajectory,
        })
    }
}
