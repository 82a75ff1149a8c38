//! In-memory labeled dataset.

use pt_types::{DataError, TuneResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A fixed table of feature rows with one integer class label per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<i64>,
}

impl Dataset {
    /// Build a dataset, checking that every row has one label and the same width.
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<i64>,
    ) -> TuneResult<Self> {
        if features.len() != labels.len() {
            return Err(DataError::LabelCountMismatch {
                features: features.len(),
                labels: labels.len(),
            }
            .into());
        }
        if features.is_empty() {
            return Err(DataError::Empty.into());
        }

        let width = feature_names.len();
        for (row, values) in features.iter().enumerate() {
            if values.len() != width {
                return Err(DataError::RaggedRow {
                    row,
                    expected: width,
                    actual: values.len(),
                }
                .into());
            }
        }

        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    /// Build a dataset with generated feature names (`x0`, `x1`, ...).
    pub fn from_rows(features: Vec<Vec<f64>>, labels: Vec<i64>) -> TuneResult<Self> {
        let width = features.first().map(Vec::len).unwrap_or(0);
        let names = (0..width).map(|i| format!("x{i}")).collect();
        Self::new(names, features, labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    /// Distinct labels in ascending order.
    pub fn classes(&self) -> Vec<i64> {
        self.class_counts().into_keys().collect()
    }

    pub fn class_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(*label).or_insert(0) += 1;
        }
        counts
    }

    /// Copy of the rows at `indices`, in the given order.
    ///
    /// Unlike [`Dataset::new`] this allows an empty result.
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_types::TuneError;

    fn tiny() -> Dataset {
        Dataset::from_rows(
            vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![2.0, 2.0]],
            vec![1, 0, 1],
        )
        .unwrap()
    }

    #[test]
    fn classes_sorted_and_counted() {
        let ds = tiny();
        assert_eq!(ds.classes(), vec![0, 1]);
        assert_eq!(ds.class_counts()[&1], 2);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.feature_names(), &["x0".to_string(), "x1".to_string()]);
    }

    #[test]
    fn subset_preserves_order() {
        let ds = tiny();
        let sub = ds.subset(&[2, 0]);
        assert_eq!(sub.labels(), &[1, 1]);
        assert_eq!(sub.features()[0], vec![2.0, 2.0]);
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = Dataset::from_rows(vec![vec![0.0, 1.0], vec![1.0]], vec![0, 1]).unwrap_err();
        assert!(matches!(
            err,
            TuneError::Data(DataError::RaggedRow { row: 1, .. })
        ));
    }

    #[test]
    fn label_mismatch_rejected() {
        let err = Dataset::from_rows(vec![vec![0.0]], vec![0, 1]).unwrap_err();
        assert!(matches!(
            err,
            TuneError::Data(DataError::LabelCountMismatch { .. })
        ));
    }

    #[test]
    fn empty_rejected() {
        let err = Dataset::from_rows(vec![], vec![]).unwrap_err();
        assert!(matches!(err, TuneError::Data(DataError::Empty)));
    }
}
