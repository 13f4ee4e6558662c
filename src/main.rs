//! HyperCircles CLI
//!
//! Train, persist and evaluate circle classifiers from the command line.
//!
//! Usage:
//!     hypercircles build train.csv --out ~/.hypercircles/model.hcs
//!     hypercircles test --circles model.hcs --train train.csv --test test.csv
//!     hypercircles kfold data.csv --folds 10
//!     hypercircles stats --circles model.hcs

use std::collections::hash_map::DefaultHasher;
use std::error::Error;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use hypercircles::adapters::eval::{
    compare_knn_strategies, compare_voting_modes, cross_validate, evaluate, EvalConfig, EvalReport,
    StrategyScore, DEFAULT_K_VALUES,
};
use hypercircles::{
    BuildConfig, CircleSet, CircleStore, Construction, CsvSource, Dataset, FileStore,
    LabeledPoint, MetricKind, Point, PointSource, Strategy, VotingMode,
};

type CliResult = Result<(), Box<dyn Error>>;

/// HyperCircles - class-pure ball classifier
#[derive(Parser)]
#[command(name = "hypercircles")]
#[command(version)]
#[command(about = "Summarize labeled points as class-pure circles and classify with them", long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build circles from a training CSV and save them
    Build {
        /// Training data (header row, label in the last column)
        train: String,

        /// Circle file to write
        #[arg(short, long, default_value = "~/.hypercircles/model.hcs")]
        out: String,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Evaluate saved circles on a test CSV
    Test {
        #[command(flatten)]
        data: ModelData,

        #[command(flatten)]
        eval: EvalArgs,
    },

    /// Stratified k-fold cross validation on one CSV
    Kfold {
        /// Labeled data to split
        data: String,

        /// Number of folds
        #[arg(short, long, default_value = "10")]
        folds: usize,

        #[command(flatten)]
        build: BuildArgs,

        #[command(flatten)]
        eval: EvalArgs,
    },

    /// Accuracy of every containment voting mode
    CompareVoting {
        #[command(flatten)]
        data: ModelData,

        #[command(flatten)]
        eval: EvalArgs,
    },

    /// Accuracy of each nearest-neighbor strategy on points the circles miss
    CompareKnn {
        #[command(flatten)]
        data: ModelData,

        /// k values to sweep (comma separated)
        #[arg(long, value_delimiter = ',')]
        k_values: Vec<usize>,

        #[command(flatten)]
        eval: EvalArgs,
    },

    /// Show circle file statistics
    Stats {
        /// Circle file
        #[arg(long, default_value = "~/.hypercircles/model.hcs")]
        circles: String,
    },

    /// Benchmark build and classification on synthetic data
    Bench {
        /// Number of training points
        #[arg(short, long, default_value = "5000")]
        points: usize,

        /// Point dimensions
        #[arg(short, long, default_value = "8")]
        dims: usize,

        /// Number of classes
        #[arg(short, long, default_value = "3")]
        classes: usize,

        /// Queries to time
        #[arg(short, long, default_value = "1000")]
        queries: usize,
    },
}

/// Saved circles plus the data they are evaluated against
#[derive(Args)]
struct ModelData {
    /// Circle file
    #[arg(long, default_value = "~/.hypercircles/model.hcs")]
    circles: String,

    /// Training CSV the circles were built from (read by KNN strategies)
    #[arg(long)]
    train: String,

    /// Test CSV
    #[arg(long)]
    test: String,
}

#[derive(Args)]
struct BuildArgs {
    /// JSON build config; flags below override it
    #[arg(long)]
    config: Option<String>,

    /// Distance metric (euclidean, manhattan, cubic)
    #[arg(short, long)]
    metric: Option<MetricKind>,

    /// Max-pure-distance construction instead of nearest neighbor + merge
    #[arg(long)]
    max_pure: bool,

    /// Skip merging
    #[arg(long)]
    no_merge: bool,

    /// Skip pruning
    #[arg(long)]
    no_prune: bool,
}

impl BuildArgs {
    fn resolve(&self) -> Result<BuildConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => BuildConfig::from_json(&std::fs::read_to_string(expand_path(path))?)?,
            None => BuildConfig::default(),
        };
        if let Some(metric) = self.metric {
            config = config.with_metric(metric);
        }
        if self.max_pure {
            config = config.with_construction(Construction::MaxPureDistance);
        }
        if self.no_merge {
            config = config.with_merge(false);
        }
        if self.no_prune {
            config = config.with_prune(false);
        }
        Ok(config)
    }
}

#[derive(Args)]
struct EvalArgs {
    /// JSON evaluation config; flags below override it
    #[arg(long)]
    eval_config: Option<String>,

    /// Neighbors for the fallback strategy
    #[arg(short, long)]
    k: Option<usize>,

    /// Containment voting mode
    #[arg(long)]
    voting: Option<VotingMode>,

    /// Strategy used when no circle contains a query
    #[arg(long)]
    fallback: Option<Strategy>,
}

impl EvalArgs {
    fn resolve(&self) -> Result<EvalConfig, Box<dyn Error>> {
        let mut config = match &self.eval_config {
            Some(path) => EvalConfig::from_json(&std::fs::read_to_string(expand_path(path))?)?,
            None => EvalConfig::default(),
        };
        if let Some(k) = self.k {
            config = config.with_k(k);
        }
        if let Some(voting) = self.voting {
            config = config.with_voting(voting);
        }
        if let Some(fallback) = self.fallback {
            config = config.with_fallback(fallback);
        }
        Ok(config)
    }
}

fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load the model and both datasets, test labels sharing the training ids
fn load_model_data(data: &ModelData) -> Result<(CircleSet, Dataset, Dataset), Box<dyn Error>> {
    let model = FileStore::new(expand_path(&data.circles)).load()?;
    let train = CsvSource::new(expand_path(&data.train)).load()?;
    let test = CsvSource::new(expand_path(&data.test)).load_with_labels(&train)?;
    Ok((model, train, test))
}

fn cmd_build(train_path: &str, out: &str, args: &BuildArgs, json: bool) -> CliResult {
    let config = args.resolve()?;
    let train = CsvSource::new(expand_path(train_path)).load()?;

    let start = Instant::now();
    let model = CircleSet::build(train.points(), train.num_classes(), &config)?;
    let elapsed = start.elapsed();

    let path = expand_path(out);
    FileStore::new(&path).save(&model)?;
    info!(path = ?path, "circle file written");

    if json {
        return print_json(&ModelSummary::new(&model, Some(&train)));
    }

    let stats = model.stats();
    println!("Built {} circles from {} points in {:.2?}", model.len(), stats.points, elapsed);
    println!("  Constructed: {}", stats.constructed);
    println!("  After merge: {}", stats.merged);
    println!("  After prune: {}", stats.pruned);
    println!("  Saved to:    {:?}", path);
    Ok(())
}

fn cmd_test(data: &ModelData, args: &EvalArgs, json: bool) -> CliResult {
    let config = args.resolve()?;
    let (model, train, test) = load_model_data(data)?;
    let report = evaluate(&model, &train, &test, &config)?;

    if json {
        return print_json(&report);
    }
    print_report(&report, &test, &config);
    Ok(())
}

fn print_report(report: &EvalReport, test: &Dataset, config: &EvalConfig) {
    println!("=== CONFUSION MATRIX ({}, fallback {}) ===", config.voting, config.fallback);
    for (class, row) in report.confusion.rows().iter().enumerate() {
        let name = test.class_name(class).unwrap_or("?");
        let cells: Vec<String> = row.iter().map(|c| format!("{:>6}", c)).collect();
        println!("{:>12} |{}", name, cells.join(""));
    }
    println!();
    println!("Accuracy:                 {:.4}", report.accuracy);
    println!("Unclassified by circles:  {} of {}", report.unclassified, report.test_points);
    if report.undecided > 0 {
        println!("Undecided after fallback: {}", report.undecided);
    }
}

fn cmd_kfold(data_path: &str, folds: usize, build: &BuildArgs, eval: &EvalArgs, json: bool) -> CliResult {
    let build = build.resolve()?;
    let eval = eval.resolve()?;
    let data = CsvSource::new(expand_path(data_path)).load()?;

    let cv = cross_validate(&data, folds, &build, &eval)?;

    if json {
        return print_json(&cv);
    }
    for fold in &cv.folds {
        println!(
            "Fold {:>3}: accuracy {:.4}, {} circles, {} unclassified",
            fold.fold, fold.accuracy, fold.circles, fold.unclassified
        );
    }
    println!();
    println!("{} FOLD CROSS VALIDATION ACCURACY: {:.3}", folds, cv.mean_accuracy);
    println!("Average circles: {:.1}", cv.mean_circles);
    Ok(())
}

fn print_scores(title: &str, scores: &[StrategyScore]) {
    println!("=== {} ===", title);
    for score in scores {
        let name = score.strategy.to_string();
        match score.k {
            Some(k) => println!("{:<20} k={:<3} {:.4}", name, k, score.accuracy),
            None => println!("{:<20}       {:.4}", name, score.accuracy),
        }
    }
    if let Some(first) = scores.first() {
        println!();
        println!("Unclassified by circles: {}", first.unclassified);
    }
}

fn cmd_compare_voting(data: &ModelData, args: &EvalArgs, json: bool) -> CliResult {
    let config = args.resolve()?;
    let (model, train, test) = load_model_data(data)?;
    let scores = compare_voting_modes(&model, &train, &test, &config)?;

    if json {
        return print_json(&scores);
    }
    print_scores("Voting Mode Accuracies", &scores);
    Ok(())
}

fn cmd_compare_knn(data: &ModelData, k_values: &[usize], args: &EvalArgs, json: bool) -> CliResult {
    let config = args.resolve()?;
    let (model, train, test) = load_model_data(data)?;
    let k_values = if k_values.is_empty() {
        &DEFAULT_K_VALUES[..]
    } else {
        k_values
    };
    let scores = compare_knn_strategies(&model, &train, &test, &config, k_values)?;

    if json {
        return print_json(&scores);
    }
    print_scores("Nearest-Neighbor Strategy Accuracies", &scores);
    Ok(())
}

/// Circle file summary
#[derive(Serialize)]
struct ModelSummary {
    circles: usize,
    dimensionality: usize,
    num_classes: usize,
    metric: MetricKind,
    circles_per_class: Vec<u32>,
    class_names: Vec<String>,
    mean_radius: f32,
    mean_points_per_circle: f32,
}

impl ModelSummary {
    fn new(model: &CircleSet, labels: Option<&Dataset>) -> Self {
        let n = model.len().max(1) as f32;
        Self {
            circles: model.len(),
            dimensionality: model.dimensionality(),
            num_classes: model.num_classes(),
            metric: model.metric(),
            circles_per_class: model.circles_per_class().to_vec(),
            class_names: labels.map(|d| d.class_names().to_vec()).unwrap_or_default(),
            mean_radius: model.circles().iter().map(|c| c.radius).sum::<f32>() / n,
            mean_points_per_circle: model.circles().iter().map(|c| c.point_count as f32).sum::<f32>() / n,
        }
    }
}

fn cmd_stats(circles: &str, json: bool) -> CliResult {
    let path = expand_path(circles);

    if !path.exists() {
        println!("No circle file found at: {:?}", path);
        println!("Build one with: hypercircles build <train.csv>");
        return Ok(());
    }

    let model = FileStore::new(&path).load()?;
    let summary = ModelSummary::new(&model, None);
    if json {
        return print_json(&summary);
    }

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    println!("File:            {:?}", path);
    println!("Size:            {:.2} KB", file_size as f64 / 1024.0);
    println!("Metric:          {}", summary.metric);
    println!("Dimensions:      {}", summary.dimensionality);
    println!("Classes:         {}", summary.num_classes);
    println!("Circles:         {}", summary.circles);
    for class in 0..model.num_classes() {
        println!("  class {:<3}      {}", class, model.class_circle_count(class));
    }
    println!("Mean radius:     {:.4}", summary.mean_radius);
    println!("Mean points:     {:.2}", summary.mean_points_per_circle);
    Ok(())
}

/// Deterministic pseudo-random value in [-1, 1]
fn noise(seed: impl Hash) -> f32 {
    let mut h = DefaultHasher::new();
    seed.hash(&mut h);
    (h.finish() as f64 / u64::MAX as f64 * 2.0 - 1.0) as f32
}

/// Gaussian-ish blobs, one per class, centers spread along the diagonal
fn synthetic_points(count: usize, dims: usize, classes: usize, salt: u64) -> Vec<LabeledPoint> {
    (0..count)
        .map(|i| {
            let class = i % classes;
            let center = class as f32 * 2.5;
            let dims: Vec<f32> = (0..dims)
                .map(|j| center + noise((salt, i, j)) + noise((salt, i, j, 1u8)))
                .collect();
            LabeledPoint::new(Point::new(dims), class)
        })
        .collect()
}

fn cmd_bench(points: usize, dims: usize, classes: usize, queries: usize, json: bool) -> CliResult {
    let classes = classes.max(1);
    let train = synthetic_points(points, dims, classes, 0);
    let test = synthetic_points(queries, dims, classes, 1);

    let start = Instant::now();
    let model = CircleSet::build(&train, classes, &BuildConfig::default())?;
    let build_time = start.elapsed();

    let start = Instant::now();
    let mut correct = 0usize;
    let mut unclassified = 0usize;
    for p in &test {
        let (prediction, fell_back) = model.classify_with_fallback(
            &train,
            &p.point,
            VotingMode::SimpleMajority,
            Strategy::RegularKnn,
            5,
        )?;
        if fell_back {
            unclassified += 1;
        }
        if prediction.class() == Some(p.class) {
            correct += 1;
        }
    }
    let query_time = start.elapsed();
    let avg_query_ms = query_time.as_secs_f64() * 1000.0 / queries.max(1) as f64;
    let accuracy = correct as f64 / queries.max(1) as f64;

    #[derive(Serialize)]
    struct BenchResult {
        points: usize,
        dims: usize,
        classes: usize,
        circles: usize,
        build_ms: f64,
        avg_query_ms: f64,
        accuracy: f64,
        unclassified: usize,
    }

    let result = BenchResult {
        points,
        dims,
        classes,
        circles: model.len(),
        build_ms: build_time.as_secs_f64() * 1000.0,
        avg_query_ms,
        accuracy,
        unclassified,
    };

    if json {
        return print_json(&result);
    }

    let stats = model.stats();
    println!("Points: {}  Dimensions: {}  Classes: {}", points, dims, classes);
    println!();
    println!("  Circles:          {} -> {} -> {}", stats.constructed, stats.merged, stats.pruned);
    println!("  Build time:       {:.2?}", build_time);
    println!("  Avg query time:   {:.4} ms", avg_query_ms);
    println!("  Accuracy:         {:.4}", accuracy);
    println!("  Unclassified:     {} of {}", unclassified, queries);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    let result = match &cli.command {
        Commands::Build { train, out, build } => cmd_build(train, out, build, json),
        Commands::Test { data, eval } => cmd_test(data, eval, json),
        Commands::Kfold { data, folds, build, eval } => cmd_kfold(data, *folds, build, eval, json),
        Commands::CompareVoting { data, eval } => cmd_compare_voting(data, eval, json),
        Commands::CompareKnn { data, k_values, eval } => cmd_compare_knn(data, k_values, eval, json),
        Commands::Stats { circles } => cmd_stats(circles, json),
        Commands::Bench { points, dims, classes, queries } => {
            cmd_bench(*points, *dims, *classes, *queries, json)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
