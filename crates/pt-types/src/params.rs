//! Search-space points, their bounds, and evaluated search states.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config_error;
use crate::errors::TuneResult;

/// Lower bound of the regularization strength.
pub const C_MIN: f64 = 0.5;
/// Upper bound of the regularization strength.
pub const C_MAX: f64 = 250.0;
/// Lower bound of the polynomial kernel degree.
pub const DEGREE_MIN: u32 = 1;
/// Upper bound of the polynomial kernel degree.
pub const DEGREE_MAX: u32 = 15;
/// Perturbation applied to `c` when generating neighbors.
pub const C_STEP: f64 = 0.05;
/// Perturbation applied to `degree` when generating neighbors.
pub const DEGREE_STEP: u32 = 1;

/// One candidate model configuration: regularization strength and kernel degree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterVector {
    pub c: f64,
    pub degree: u32,
}

impl ParameterVector {
    pub fn new(c: f64, degree: u32) -> Self {
        Self { c, degree }
    }
}

impl fmt::Display for ParameterVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C={}, degree={}", self.c, self.degree)
    }
}

/// Closed intervals and step sizes that define the search space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterBounds {
    pub c_min: f64,
    pub c_max: f64,
    pub degree_min: u32,
    pub degree_max: u32,
    pub c_step: f64,
    pub degree_step: u32,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            c_min: C_MIN,
            c_max: C_MAX,
            degree_min: DEGREE_MIN,
            degree_max: DEGREE_MAX,
            c_step: C_STEP,
            degree_step: DEGREE_STEP,
        }
    }
}

impl ParameterBounds {
    pub fn contains_c(&self, c: f64) -> bool {
        self.c_min <= c && c <= self.c_max
    }

    pub fn contains_degree(&self, degree: u32) -> bool {
        self.degree_min <= degree && degree <= self.degree_max
    }

    /// Whether both coordinates lie inside their closed intervals.
    pub fn contains(&self, params: &ParameterVector) -> bool {
        self.contains_c(params.c) && self.contains_degree(params.degree)
    }

    pub fn validate(&self) -> TuneResult<()> {
        if !self.c_min.is_finite() || !self.c_max.is_finite() || self.c_min > self.c_max {
            return Err(config_error!(
                "invalid C interval [{}, {}]",
                self.c_min, self.c_max
            ));
        }
        if self.c_min <= 0.0 {
            return Err(config_error!(
                "C lower bound must be positive, got {}",
                self.c_min
            ));
        }
        if self.degree_min == 0 || self.degree_min > self.degree_max {
            return Err(config_error!(
                "invalid degree interval [{}, {}]",
                self.degree_min, self.degree_max
            ));
        }
        if !self.c_step.is_finite() || self.c_step <= 0.0 {
            return Err(config_error!(
                "C step must be positive, got {}",
                self.c_step
            ));
        }
        if self.degree_step == 0 {
            return Err(config_error!("degree step must be positive"));
        }
        Ok(())
    }
}

/// A parameter assignment paired with its (initially unknown) quality.
///
/// The score is attached once by evaluation. A state that fails to evaluate
/// carries `f64::NEG_INFINITY`, so it never compares as an improvement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    params: ParameterVector,
    score: Option<f64>,
}

impl State {
    pub fn new(params: ParameterVector) -> Self {
        Self { params, score: None }
    }

    pub fn params(&self) -> &ParameterVector {
        &self.params
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// Attach the evaluated score. Must only be called once per state.
    pub fn attach_score(&mut self, score: f64) {
        debug_assert!(
            self.score.is_none(),
            "state {} already scored",
            self.params
        );
        self.score = Some(score);
    }

    /// True when this state's score strictly exceeds `other`'s.
    /// Unscored states never improve on anything.
    pub fn improves_on(&self, other: &State) -> bool {
        match (self.score, other.score) {
            (Some(mine), Some(theirs)) => mine > theirs,
            _ => false,
        }
    }
}

/// Best parameter assignment found across all restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub params: ParameterVector,
    pub score: f64,
    /// Zero-based index of the restart that produced this result.
    pub restart_index: usize,
}

impl SearchResult {
    /// Score as a percentage with two decimals, e.g. `"95.32%"`.
    pub fn accuracy_percent(&self) -> String {
        format!("{:.2}%", self.score * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TuneError;

    #[test]
    fn default_bounds_match_domain() {
        let bounds = ParameterBounds::default();
        assert_eq!(bounds.c_min, 0.5);
        assert_eq!(bounds.c_max, 250.0);
        assert_eq!(bounds.degree_min, 1);
        assert_eq!(bounds.degree_max, 15);
        assert!(bounds.validate().is_ok());
    }

    #[test]
    fn bounds_are_closed_intervals() {
        let bounds = ParameterBounds::default();
        assert!(bounds.contains(&ParameterVector::new(0.5, 1)));
        assert!(bounds.contains(&ParameterVector::new(250.0, 15)));
        assert!(!bounds.contains(&ParameterVector::new(0.45, 1)));
        assert!(!bounds.contains(&ParameterVector::new(250.05, 3)));
        assert!(!bounds.contains(&ParameterVector::new(10.0, 0)));
        assert!(!bounds.contains(&ParameterVector::new(10.0, 16)));
    }

    #[test]
    fn invalid_bounds_rejected() {
        let inverted = ParameterBounds {
            c_min: 10.0,
            c_max: 1.0,
            ..Default::default()
        };
        assert!(matches!(inverted.validate(), Err(TuneError::Config(_))));

        let zero_step = ParameterBounds {
            c_step: 0.0,
            ..Default::default()
        };
        assert!(zero_step.validate().is_err());

        let zero_degree = ParameterBounds {
            degree_min: 0,
            ..Default::default()
        };
        assert!(zero_degree.validate().is_err());
    }

    #[test]
    fn state_starts_unscored() {
        let mut state = State::new(ParameterVector::new(1.0, 3));
        assert!(!state.is_scored());
        state.attach_score(0.9);
        assert_eq!(state.score(), Some(0.9));
    }

    #[test]
    fn improvement_is_strict() {
        let mut a = State::new(ParameterVector::new(1.0, 3));
        let mut b = State::new(ParameterVector::new(1.05, 3));
        a.attach_score(0.9);
        b.attach_score(0.9);
        assert!(!b.improves_on(&a));

        let mut c = State::new(ParameterVector::new(0.95, 3));
        c.attach_score(0.91);
        assert!(c.improves_on(&a));
    }

    #[test]
    fn rejected_state_never_improves() {
        let mut failed = State::new(ParameterVector::new(1.0, 3));
        failed.attach_score(f64::NEG_INFINITY);
        let mut other = State::new(ParameterVector::new(1.0, 4));
        other.attach_score(f64::NEG_INFINITY);
        assert!(!failed.improves_on(&other));

        let mut ok = State::new(ParameterVector::new(1.0, 2));
        ok.attach_score(0.0);
        assert!(ok.improves_on(&failed));
    }

    #[test]
    fn accuracy_percent_formatting() {
        let result = SearchResult {
            params: ParameterVector::new(3.2, 2),
            score: 0.953216,
            restart_index: 0,
        };
        assert_eq!(result.accuracy_percent(), "95.32%");
    }

    #[test]
    fn display_parameter_vector() {
        assert_eq!(ParameterVector::new(2.5, 4).to_string(), "C=2.5, degree=4");
    }
}
