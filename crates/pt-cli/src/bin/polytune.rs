use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pt_cli::{render_report, Shell};
use pt_data::{gaussian_blobs, train_test_split, CsvLoader, Dataset, SplitConfig, SyntheticConfig};
use pt_optimizer::{DegreeSampling, FailurePolicy, RandomRestart, SearchConfig, SvmObjective};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "polytune")]
#[command(about = "Random-restart hill climbing over polynomial-kernel SVM hyperparameters")]
#[command(version)]
struct Cli {
    /// CSV dataset with a header row, e.g. the Wisconsin diagnostic breast
    /// cancer table with `--label-column target`. When omitted, a synthetic
    /// two-class dataset of the same shape (569 x 30) is used.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Label column name (defaults to the last column)
    #[arg(long)]
    label_column: Option<String>,

    /// Fraction of samples held out for scoring
    #[arg(long, default_value_t = 0.3)]
    test_fraction: f64,

    /// Seed for the train/test split
    #[arg(long, default_value_t = 1)]
    split_seed: u64,

    /// Seed for restart sampling
    #[arg(short, long)]
    seed: Option<u64>,

    /// Search configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single search with this many restarts and exit
    #[arg(short, long)]
    restarts: Option<usize>,

    /// Draw starting degrees from the closed degree interval
    #[arg(long)]
    inclusive_degree: bool,

    /// Stop on the first failed classifier fit instead of skipping it
    #[arg(long)]
    abort_on_failure: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_dataset(cli: &Cli) -> anyhow::Result<Dataset> {
    match &cli.data {
        Some(path) => {
            let mut loader = CsvLoader::new();
            if let Some(column) = &cli.label_column {
                loader = loader.with_label_column(column.clone());
            }
            loader
                .load(path)
                .with_context(|| format!("loading {}", path.display()))
        }
        None => {
            info!("No dataset given, generating synthetic Gaussian blobs (569 x 30)");
            Ok(gaussian_blobs(SyntheticConfig::breast_cancer_shape())?)
        }
    }
}

fn search_config(cli: &Cli) -> anyhow::Result<SearchConfig> {
    let mut config = match &cli.config {
        Some(path) => SearchConfig::from_json_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => SearchConfig::new(),
    };
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if cli.inclusive_degree {
        config = config.with_degree_sampling(DegreeSampling::Inclusive);
    }
    if cli.abort_on_failure {
        config = config.with_failure_policy(FailurePolicy::Abort);
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let dataset = load_dataset(&cli)?;
    let split = train_test_split(
        &dataset,
        SplitConfig::default()
            .with_test_fraction(cli.test_fraction)
            .with_seed(cli.split_seed),
    )?;
    info!(
        "Dataset: {} samples, {} features, {} train / {} test",
        dataset.len(),
        dataset.n_features(),
        split.train.len(),
        split.test.len()
    );

    let config = search_config(&cli)?;
    let mut search = RandomRestart::new(SvmObjective::new(split), config)?;

    match cli.restarts {
        Some(count) => {
            let report = search.run(count)?;
            println!("{}", render_report(&report, cli.json)?);
        }
        None => Shell::new(search)?.with_json(cli.json).run()?,
    }

    Ok(())
}
