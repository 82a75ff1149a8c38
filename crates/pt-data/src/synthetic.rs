//! Seeded synthetic classification data.

use pt_types::{DataError, TuneResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Parameters for [`gaussian_blobs`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub n_samples: usize,
    pub n_features: usize,
    pub n_classes: usize,
    /// Standard deviation of every cluster.
    pub spread: f64,
    /// Cluster centres are drawn uniformly from `[-separation, separation]`.
    pub separation: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            n_samples: 300,
            n_features: 4,
            n_classes: 2,
            spread: 1.5,
            separation: 3.0,
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    /// Same shape as the Wisconsin diagnostic breast cancer table: 569 rows,
    /// 30 features, two classes.
    pub fn breast_cancer_shape() -> Self {
        Self {
            n_samples: 569,
            n_features: 30,
            n_classes: 2,
            ..Self::default()
        }
    }
}

/// Isotropic Gaussian clusters, one per class, with labels `0..n_classes`.
/// Samples are assigned to classes round-robin so class sizes differ by at most one.
pub fn gaussian_blobs(config: SyntheticConfig) -> TuneResult<Dataset> {
    if config.n_samples == 0 || config.n_features == 0 || config.n_classes == 0 {
        return Err(DataError::Empty.into());
    }
    let noise = Normal::new(0.0, config.spread).map_err(|e| DataError::InsufficientSamples {
        message: format!("invalid cluster spread {}: {}", config.spread, e),
    })?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let centres: Vec<Vec<f64>> = (0..config.n_classes)
        .map(|_| {
            (0..config.n_features)
                .map(|_| rng.gen_range(-config.separation..=config.separation))
                .collect()
        })
        .collect();

    let mut features = Vec::with_capacity(config.n_samples);
    let mut labels = Vec::with_capacity(config.n_samples);
    for i in 0..config.n_samples {
        let class = i % config.n_classes;
        let row = centres[class]
            .iter()
            .map(|c| c + noise.sample(&mut rng))
            .collect();
        features.push(row);
        labels.push(class as i64);
    }

    Dataset::from_rows(features, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_and_balance() {
        let ds = gaussian_blobs(SyntheticConfig {
            n_samples: 31,
            n_features: 3,
            n_classes: 3,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ds.len(), 31);
        assert_eq!(ds.n_features(), 3);
        let counts = ds.class_counts();
        assert_eq!(counts[&0], 11);
        assert_eq!(counts[&1], 10);
        assert_eq!(counts[&2], 10);
    }

    #[test]
    fn breast_cancer_shape_splits_like_the_real_table() {
        let ds = gaussian_blobs(SyntheticConfig::breast_cancer_shape()).unwrap();
        assert_eq!(ds.len(), 569);
        assert_eq!(ds.n_features(), 30);
        assert_eq!(ds.classes(), vec![0, 1]);

        let split = crate::split::train_test_split(&ds, crate::split::SplitConfig::default())
            .unwrap();
        assert_eq!(split.test.len(), 171);
        assert_eq!(split.train.len(), 398);
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = gaussian_blobs(SyntheticConfig::default()).unwrap();
        let b = gaussian_blobs(SyntheticConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_samples_rejected() {
        let result = gaussian_blobs(SyntheticConfig {
            n_samples: 0,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
