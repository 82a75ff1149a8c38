//! Polynomial kernel and its gamma heuristics.

use serde::{Deserialize, Serialize};

/// Kernel coefficient selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Gamma {
    /// `1 / (n_features * Var(X))` over every training value; `1.0` when the variance is zero.
    #[default]
    Scale,
    Value(f64),
}

impl Gamma {
    pub fn resolve(&self, rows: &[Vec<f64>]) -> f64 {
        match self {
            Self::Value(v) => *v,
            Self::Scale => {
                let n_features = rows.first().map(Vec::len).unwrap_or(0);
                let count = (rows.len() * n_features) as f64;
                if count == 0.0 {
                    return 1.0;
                }
                let (sum, sum_sq) = rows
                    .iter()
                    .flatten()
                    .fold((0.0, 0.0), |(s, sq), v| (s + v, sq + v * v));
                let mean = sum / count;
                let variance = (sum_sq / count - mean * mean).max(0.0);
                if variance > 0.0 {
                    1.0 / (n_features as f64 * variance)
                } else {
                    1.0
                }
            }
        }
    }
}

/// `K(x, y) = (gamma * <x, y> + coef0) ^ degree`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolynomialKernel {
    pub gamma: f64,
    pub coef0: f64,
    pub degree: u32,
}

impl PolynomialKernel {
    pub fn new(gamma: f64, coef0: f64, degree: u32) -> Self {
        Self {
            gamma,
            coef0,
            degree,
        }
    }

    pub fn value(&self, x: &[f64], y: &[f64]) -> f64 {
        let dot: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
        (self.gamma * dot + self.coef0).powi(self.degree as i32)
    }
}
