use thiserror::Error;

/// Main error type for the polytune system
#[derive(Error, Debug)]
pub enum TuneError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Dataset loading and partitioning errors
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Data file not found: {path}")]
    FileNotFound { path: String },

    #[error("CSV parse error at row {row}, column '{column}': {message}")]
    ParseError {
        row: usize,
        column: String,
        message: String,
    },

    #[error("CSV read failed: {message}")]
    ReadFailed { message: String },

    #[error("Label column not found: {column}")]
    UnknownLabelColumn { column: String },

    #[error("Row {row} has {actual} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Dataset has {features} feature rows but {labels} labels")]
    LabelCountMismatch { features: usize, labels: usize },

    #[error("Dataset is empty")]
    Empty,

    #[error("Invalid split fraction {fraction}: must lie strictly between 0 and 1")]
    InvalidSplitFraction { fraction: f64 },

    #[error("Insufficient samples: {message}")]
    InsufficientSamples { message: String },
}

/// Classifier fitting and prediction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid hyperparameter {name}: {message}")]
    InvalidHyperparameter { name: String, message: String },

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Training set contains a single class ({label}); at least two are required")]
    SingleClass { label: i64 },

    #[error("Feature dimension mismatch: model expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Kernel produced a non-finite value (degree {degree}, gamma {gamma})")]
    NonFiniteKernel { degree: u32, gamma: f64 },
}

/// Search control errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid restart count '{input}': expected a positive integer")]
    InvalidRestartCount { input: String },

    #[error("Evaluation failed for C={c}, degree={degree}: {message}")]
    EvaluationFailed { c: f64, degree: u32, message: String },

    #[error("No feasible result: all {restarts} restarts failed to evaluate")]
    NoFeasibleResult { restarts: usize },
}

/// Result type alias for polytune operations
pub type TuneResult<T> = Result<T, TuneError>;

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::TuneError::Internal(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::TuneError::Config(format!($($arg)*))
    };
}
