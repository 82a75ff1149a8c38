//! # pt-data
//!
//! Labeled datasets for polytune: the in-memory [`Dataset`] type, a CSV
//! loader, a seeded synthetic generator, and the stratified train/test split
//! the objective is evaluated on.

pub mod dataset;
pub mod loaders;
pub mod split;
pub mod synthetic;

pub use dataset::Dataset;
pub use loaders::CsvLoader;
pub use split::{train_test_split, SplitConfig, TrainTestSplit};
pub use synthetic::{gaussian_blobs, SyntheticConfig};
