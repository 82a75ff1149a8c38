//! # pt-model
//!
//! The classification model scored by the search: a C-support vector
//! classifier with a polynomial kernel, trained by sequential minimal
//! optimization, plus the accuracy metric.

pub mod kernel;
pub mod metrics;
pub mod svm;

pub use kernel::{Gamma, PolynomialKernel};
pub use metrics::accuracy;
pub use svm::{FittedSvc, Svc, SvcConfig};
