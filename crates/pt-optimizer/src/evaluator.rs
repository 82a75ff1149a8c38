//! Objective evaluation: parameters in, held-out accuracy out.

use pt_data::TrainTestSplit;
use pt_model::{Svc, SvcConfig};
use pt_types::{ParameterVector, SearchError, State, TuneResult};

use crate::config::FailurePolicy;

/// A scalar quality function over parameter vectors. Higher is better.
pub trait Objective {
    fn evaluate(&self, params: &ParameterVector) -> TuneResult<f64>;
}

impl<F> Objective for F
where
    F: Fn(&ParameterVector) -> TuneResult<f64>,
{
    fn evaluate(&self, params: &ParameterVector) -> TuneResult<f64> {
        self(params)
    }
}

/// Test-set accuracy of a polynomial-kernel SVM fitted on the training set.
///
/// The split is bound once at construction and only read afterwards.
#[derive(Debug, Clone)]
pub struct SvmObjective {
    data: TrainTestSplit,
    template: SvcConfig,
}

impl SvmObjective {
    pub fn new(data: TrainTestSplit) -> Self {
        Self {
            data,
            template: SvcConfig::new(1.0, 3),
        }
    }

    /// Solver settings (gamma, coef0, tolerance, iteration cap) applied to
    /// every fit. `c` and `degree` are overridden per evaluation.
    pub fn with_template(mut self, template: SvcConfig) -> Self {
        self.template = template;
        self
    }

    pub fn data(&self) -> &TrainTestSplit {
        &self.data
    }
}

impl Objective for SvmObjective {
    fn evaluate(&self, params: &ParameterVector) -> TuneResult<f64> {
        let config = SvcConfig {
            c: params.c,
            degree: params.degree,
            ..self.template
        };
        let model = Svc::new(config).fit(&self.data.train)?;
        Ok(model.score(&self.data.test)?)
    }
}

/// Wraps an [`Objective`] with the failure policy and evaluation counters.
#[derive(Debug)]
pub struct Evaluator<O> {
    objective: O,
    policy: FailurePolicy,
    evaluations: usize,
    failures: usize,
}

impl<O: Objective> Evaluator<O> {
    pub fn new(objective: O, policy: FailurePolicy) -> Self {
        Self {
            objective,
            policy,
            evaluations: 0,
            failures: 0,
        }
    }

    /// Score `state` and attach the result.
    ///
    /// Under [`FailurePolicy::Reject`] a failing (or NaN) evaluation attaches
    /// `-inf`; under [`FailurePolicy::Abort`] it is returned as
    /// [`SearchError::EvaluationFailed`] and the state stays unscored.
    pub fn evaluate(&mut self, state: &mut State) -> TuneResult<()> {
        let params = *state.params();
        self.evaluations += 1;

        let outcome = match self.objective.evaluate(&params) {
            Ok(score) if score.is_nan() => Err("objective returned NaN".to_string()),
            Ok(score) => Ok(score),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(score) => {
                tracing::trace!("Evaluated {}: {:.4}", params, score);
                state.attach_score(score);
                Ok(())
            }
            Err(message) => {
                self.failures += 1;
                match self.policy {
                    FailurePolicy::Reject => {
                        tracing::warn!("Rejecting {} after failed evaluation: {}", params, message);
                        state.attach_score(f64::NEG_INFINITY);
                        Ok(())
                    }
                    FailurePolicy::Abort => Err(SearchError::EvaluationFailed {
                        c: params.c,
                        degree: params.degree,
                        message,
                    }
                    .into()),
                }
            }
        }
    }

    /// Total evaluations attempted, including failed ones.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }
}
