//! C-support vector classification with a polynomial kernel.
//!
//! The dual problem
//!
//! ```text
//! min  1/2 a'Qa - e'a    s.t.  0 <= a_i <= C,  y'a = 0,   Q_ij = y_i y_j K(x_i, x_j)
//! ```
//!
//! is solved by SMO with maximal-violating-pair working-set selection.
//! More than two classes are handled one-vs-one.

use pt_data::Dataset;
use pt_types::ModelError;
use serde::{Deserialize, Serialize};

use crate::kernel::{Gamma, PolynomialKernel};
use crate::metrics::accuracy;

/// Curvature floor for degenerate working pairs.
const TAU: f64 = 1e-12;

/// Hyperparameters of one classifier fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvcConfig {
    /// Regularization strength (box constraint on the dual variables).
    pub c: f64,
    pub degree: u32,
    pub gamma: Gamma,
    pub coef0: f64,
    /// Stopping tolerance on the maximal KKT violation.
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl SvcConfig {
    pub fn new(c: f64, degree: u32) -> Self {
        Self {
            c,
            degree,
            gamma: Gamma::Scale,
            coef0: 0.0,
            tolerance: 1e-3,
            max_iterations: 1_000_000,
        }
    }

    pub fn with_gamma(mut self, gamma: Gamma) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_coef0(mut self, coef0: f64) -> Self {
        self.coef0 = coef0;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn validate(&self) -> Result<(), ModelError> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(ModelError::InvalidHyperparameter {
                name: "C".to_string(),
                message: format!("must be positive and finite, got {}", self.c),
            });
        }
        if self.degree == 0 {
            return Err(ModelError::InvalidHyperparameter {
                name: "degree".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ModelError::InvalidHyperparameter {
                name: "tolerance".to_string(),
                message: format!("must be positive, got {}", self.tolerance),
            });
        }
        if let Gamma::Value(g) = self.gamma {
            if !(g.is_finite() && g > 0.0) {
                return Err(ModelError::InvalidHyperparameter {
                    name: "gamma".to_string(),
                    message: format!("must be positive, got {}", g),
                });
            }
        }
        Ok(())
    }
}

/// Unfitted classifier.
#[derive(Debug, Clone)]
pub struct Svc {
    config: SvcConfig,
}

impl Svc {
    pub fn new(config: SvcConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SvcConfig {
        &self.config
    }

    pub fn fit(&self, train: &Dataset) -> Result<FittedSvc, ModelError> {
        self.config.validate()?;
        if train.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let classes = train.classes();
        if classes.len() < 2 {
            return Err(ModelError::SingleClass { label: classes[0] });
        }

        let kernel = PolynomialKernel::new(
            self.config.gamma.resolve(train.features()),
            self.config.coef0,
            self.config.degree,
        );

        let mut machines = Vec::with_capacity(classes.len() * (classes.len() - 1) / 2);
        for (a, &positive) in classes.iter().enumerate() {
            for &negative in &classes[a + 1..] {
                machines.push(self.fit_pair(train, &kernel, positive, negative)?);
            }
        }

        Ok(FittedSvc {
            classes,
            machines,
            kernel,
            n_features: train.n_features(),
        })
    }

    fn fit_pair(
        &self,
        train: &Dataset,
        kernel: &PolynomialKernel,
        positive: i64,
        negative: i64,
    ) -> Result<BinaryMachine, ModelError> {
        let (rows, y): (Vec<&Vec<f64>>, Vec<f64>) = train
            .features()
            .iter()
            .zip(train.labels())
            .filter(|(_, &label)| label == positive || label == negative)
            .map(|(row, &label)| (row, if label == positive { 1.0 } else { -1.0 }))
            .unzip();

        let gram = GramMatrix::build(kernel, &rows)?;
        let solution = solve_dual(&gram, &y, &self.config);

        if solution.iterations >= self.config.max_iterations {
            tracing::warn!(
                "SMO reached the iteration cap ({}) for C={}, degree={}; using current solution",
                self.config.max_iterations,
                self.config.c,
                self.config.degree
            );
        }

        let mut support_vectors = Vec::new();
        let mut dual_coef = Vec::new();
        for (i, &alpha) in solution.alpha.iter().enumerate() {
            if alpha > 0.0 {
                support_vectors.push(rows[i].clone());
                dual_coef.push(alpha * y[i]);
            }
        }

        tracing::trace!(
            "Fitted {} vs {}: {} support vectors after {} iterations",
            positive,
            negative,
            support_vectors.len(),
            solution.iterations
        );

        Ok(BinaryMachine {
            positive,
            negative,
            support_vectors,
            dual_coef,
            rho: solution.rho,
        })
    }
}

/// One-vs-one sub-classifier for a pair of classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BinaryMachine {
    positive: i64,
    negative: i64,
    support_vectors: Vec<Vec<f64>>,
    /// `alpha_i * y_i` for every support vector.
    dual_coef: Vec<f64>,
    rho: f64,
}

impl BinaryMachine {
    fn decision(&self, kernel: &PolynomialKernel, x: &[f64]) -> f64 {
        self.support_vectors
            .iter()
            .zip(&self.dual_coef)
            .map(|(sv, coef)| coef * kernel.value(sv, x))
            .sum::<f64>()
            - self.rho
    }
}

/// A trained classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedSvc {
    classes: Vec<i64>,
    machines: Vec<BinaryMachine>,
    kernel: PolynomialKernel,
    n_features: usize,
}

impl FittedSvc {
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn kernel(&self) -> &PolynomialKernel {
        &self.kernel
    }

    /// Total support vectors across all pairwise machines.
    pub fn n_support(&self) -> usize {
        self.machines.iter().map(|m| m.support_vectors.len()).sum()
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<i64>, ModelError> {
        rows.iter().map(|row| self.predict_one(row)).collect()
    }

    /// Test-set accuracy of this model on `test`.
    pub fn score(&self, test: &Dataset) -> Result<f64, ModelError> {
        let predicted = self.predict(test.features())?;
        Ok(accuracy(test.labels(), &predicted))
    }

    fn predict_one(&self, row: &[f64]) -> Result<i64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let mut votes = vec![0usize; self.classes.len()];
        for machine in &self.machines {
            let decision = machine.decision(&self.kernel, row);
            if !decision.is_finite() {
                return Err(self.non_finite());
            }
            let winner = if decision > 0.0 {
                machine.positive
            } else {
                machine.negative
            };
            if let Ok(idx) = self.classes.binary_search(&winner) {
                votes[idx] += 1;
            }
        }

        // Ties go to the smaller class.
        let mut best = 0;
        for (idx, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = idx;
            }
        }
        Ok(self.classes[best])
    }

    fn non_finite(&self) -> ModelError {
        ModelError::NonFiniteKernel {
            degree: self.kernel.degree,
            gamma: self.kernel.gamma,
        }
    }
}

/// Dense kernel matrix over the training rows of one binary problem.
struct GramMatrix {
    n: usize,
    values: Vec<f64>,
}

impl GramMatrix {
    fn build(kernel: &PolynomialKernel, rows: &[&Vec<f64>]) -> Result<Self, ModelError> {
        let n = rows.len();
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in i..n {
                let k = kernel.value(rows[i], rows[j]);
                if !k.is_finite() {
                    return Err(ModelError::NonFiniteKernel {
                        degree: kernel.degree,
                        gamma: kernel.gamma,
                    });
                }
                values[i * n + j] = k;
                values[j * n + i] = k;
            }
        }
        Ok(Self { n, values })
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }
}

struct DualSolution {
    alpha: Vec<f64>,
    rho: f64,
    iterations: usize,
}

fn solve_dual(gram: &GramMatrix, y: &[f64], config: &SvcConfig) -> DualSolution {
    let n = y.len();
    let c = config.c;
    let q = |i: usize, j: usize| y[i] * y[j] * gram.get(i, j);

    let mut alpha = vec![0.0; n];
    // Gradient of the dual objective: Q a - e.
    let mut grad = vec![-1.0; n];
    let mut iterations = 0;

    while iterations < config.max_iterations {
        let Some((i, j)) = select_working_set(&alpha, &grad, y, c, config.tolerance) else {
            break;
        };
        iterations += 1;

        let (old_i, old_j) = (alpha[i], alpha[j]);
        let q_ij = q(i, j);

        if y[i] != y[j] {
            let mut quad = q(i, i) + q(j, j) + 2.0 * q_ij;
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (-grad[i] - grad[j]) / quad;
            let diff = alpha[i] - alpha[j];
            alpha[i] += delta;
            alpha[j] += delta;

            if diff > 0.0 {
                if alpha[j] < 0.0 {
                    alpha[j] = 0.0;
                    alpha[i] = diff;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = -diff;
            }
            if diff > 0.0 {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = c - diff;
                }
            } else if alpha[j] > c {
                alpha[j] = c;
                alpha[i] = c + diff;
            }
        } else {
            let mut quad = q(i, i) + q(j, j) - 2.0 * q_ij;
            if quad <= 0.0 {
                quad = TAU;
            }
            let delta = (grad[i] - grad[j]) / quad;
            let sum = alpha[i] + alpha[j];
            alpha[i] -= delta;
            alpha[j] += delta;

            if sum > c {
                if alpha[i] > c {
                    alpha[i] = c;
                    alpha[j] = sum - c;
                }
            } else if alpha[j] < 0.0 {
                alpha[j] = 0.0;
                alpha[i] = sum;
            }
            if sum > c {
                if alpha[j] > c {
                    alpha[j] = c;
                    alpha[i] = sum - c;
                }
            } else if alpha[i] < 0.0 {
                alpha[i] = 0.0;
                alpha[j] = sum;
            }
        }

        let d_i = alpha[i] - old_i;
        let d_j = alpha[j] - old_j;
        for t in 0..n {
            grad[t] += q(t, i) * d_i + q(t, j) * d_j;
        }
    }

    DualSolution {
        rho: compute_rho(&alpha, &grad, y, c),
        alpha,
        iterations,
    }
}

/// Maximal violating pair, or `None` once the KKT gap is below `tolerance`.
fn select_working_set(
    alpha: &[f64],
    grad: &[f64],
    y: &[f64],
    c: f64,
    tolerance: f64,
) -> Option<(usize, usize)> {
    let mut g_max = f64::NEG_INFINITY;
    let mut g_min = f64::INFINITY;
    let mut i_sel = None;
    let mut j_sel = None;

    for t in 0..y.len() {
        let v = -y[t] * grad[t];
        let in_up = (y[t] > 0.0 && alpha[t] < c) || (y[t] < 0.0 && alpha[t] > 0.0);
        let in_low = (y[t] > 0.0 && alpha[t] > 0.0) || (y[t] < 0.0 && alpha[t] < c);
        if in_up && v >= g_max {
            g_max = v;
            i_sel = Some(t);
        }
        if in_low && v <= g_min {
            g_min = v;
            j_sel = Some(t);
        }
    }

    match (i_sel, j_sel) {
        (Some(i), Some(j)) if i != j && g_max - g_min >= tolerance => Some((i, j)),
        _ => None,
    }
}

fn compute_rho(alpha: &[f64], grad: &[f64], y: &[f64], c: f64) -> f64 {
    let mut upper = f64::INFINITY;
    let mut lower = f64::NEG_INFINITY;
    let mut free_count = 0usize;
    let mut free_sum = 0.0;

    for t in 0..y.len() {
        let yg = y[t] * grad[t];
        if alpha[t] >= c {
            if y[t] < 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else if alpha[t] <= 0.0 {
            if y[t] > 0.0 {
                upper = upper.min(yg);
            } else {
                lower = lower.max(yg);
            }
        } else {
            free_count += 1;
            free_sum += yg;
        }
    }

    if free_count > 0 {
        free_sum / free_count as f64
    } else {
        (upper + lower) / 2.0
    }
}
