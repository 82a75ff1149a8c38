//! # pt-optimizer
//!
//! Hyperparameter search for the polynomial-kernel classifier.
//!
//! Provides the neighbor generator, the objective evaluator contract, the
//! first-improvement hill climber, and the random-restart driver that tracks
//! the best result across restarts.

mod climber;
mod config;
mod evaluator;
mod neighbors;
mod restart;
mod status;

pub use climber::{ClimbOutcome, HillClimber};
pub use config::{DegreeSampling, FailurePolicy, SearchConfig};
pub use evaluator::{Evaluator, Objective, SvmObjective};
pub use neighbors::generate_neighbors;
pub use restart::RandomRestart;
pub use status::{RestartSummary, SearchReport, SearchState, SearchStatus};
