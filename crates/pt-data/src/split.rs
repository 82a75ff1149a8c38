//! Seeded, optionally stratified train/test partitioning.

use pt_types::{DataError, TuneResult};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dataset::Dataset;

/// How to partition a dataset into fitting and evaluation sets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of samples held out for evaluation, strictly inside (0, 1).
    pub test_fraction: f64,
    pub seed: u64,
    /// Preserve class proportions on both sides.
    pub stratify: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.3,
            seed: 1,
            stratify: true,
        }
    }
}

impl SplitConfig {
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_stratify(mut self, stratify: bool) -> Self {
        self.stratify = stratify;
        self
    }
}

/// The fixed pair of labeled example sets the objective is evaluated on.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
}

/// Split `dataset` into train and test sets. Deterministic for a fixed seed.
pub fn train_test_split(dataset: &Dataset, config: SplitConfig) -> TuneResult<TrainTestSplit> {
    let fraction = config.test_fraction;
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(DataError::InvalidSplitFraction { fraction }.into());
    }

    let n = dataset.len();
    let n_test = (fraction * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(DataError::InsufficientSamples {
            message: format!(
                "{} samples cannot be split with test fraction {}",
                n, fraction
            ),
        }
        .into());
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let (mut train_idx, mut test_idx) = if config.stratify {
        stratified_indices(dataset, n_test, &mut rng)?
    } else {
        let mut all: Vec<usize> = (0..n).collect();
        all.shuffle(&mut rng);
        let train = all.split_off(n_test);
        (train, all)
    };

    train_idx.shuffle(&mut rng);
    test_idx.shuffle(&mut rng);

    tracing::debug!(
        "Split {} samples into {} train / {} test (stratified: {})",
        n,
        train_idx.len(),
        test_idx.len(),
        config.stratify
    );

    Ok(TrainTestSplit {
        train: dataset.subset(&train_idx),
        test: dataset.subset(&test_idx),
    })
}

fn stratified_indices(
    dataset: &Dataset,
    n_test: usize,
    rng: &mut ChaCha8Rng,
) -> TuneResult<(Vec<usize>, Vec<usize>)> {
    let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, label) in dataset.labels().iter().enumerate() {
        by_class.entry(*label).or_default().push(i);
    }

    let n = dataset.len();
    let n_classes = by_class.len();
    if let Some((label, members)) = by_class.iter().find(|(_, m)| m.len() < 2) {
        return Err(DataError::InsufficientSamples {
            message: format!(
                "class {} has {} member(s); stratification needs at least 2",
                label,
                members.len()
            ),
        }
        .into());
    }
    if n_test < n_classes || n - n_test < n_classes {
        return Err(DataError::InsufficientSamples {
            message: format!(
                "both sides of the split need at least {} samples (one per class)",
                n_classes
            ),
        }
        .into());
    }

    let counts: Vec<usize> = by_class.values().map(Vec::len).collect();
    let alloc = allocate_test_counts(&counts, n_test);

    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (members, take) in by_class.into_values().zip(alloc) {
        let mut members = members;
        members.shuffle(rng);
        let rest = members.split_off(take);
        test.extend(members);
        train.extend(rest);
    }
    Ok((train, test))
}

/// Largest-remainder proportional allocation of `n_test` across classes,
/// keeping at least one sample of every class on each side.
fn allocate_test_counts(counts: &[usize], n_test: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| n_test as f64 * c as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.partial_cmp(&fa).unwrap_or(std::cmp::Ordering::Equal)
    });
    let assigned: usize = alloc.iter().sum();
    for &k in order.iter().take(n_test.saturating_sub(assigned)) {
        alloc[k] += 1;
    }

    // Clamp into [1, count - 1], moving the excess between classes.
    for k in 0..alloc.len() {
        while alloc[k] == 0 {
            if let Some(donor) = (0..alloc.len())
                .filter(|&j| j != k && alloc[j] > 1)
                .max_by_key(|&j| alloc[j])
            {
                alloc[donor] -= 1;
            }
            alloc[k] += 1;
        }
        while alloc[k] >= counts[k] {
            if let Some(taker) = (0..alloc.len())
                .filter(|&j| j != k && alloc[j] + 1 < counts[j])
                .max_by_key(|&j| counts[j] - alloc[j])
            {
                alloc[taker] += 1;
            }
            alloc[k] -= 1;
        }
    }
    alloc
}
