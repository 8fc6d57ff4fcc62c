//! rlogreg Command Line Interface
//!
//! A command-line interface for training, evaluating, and using logistic
//! regression digit classifiers with CSV and MNIST IDX data.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use rlogreg::api::{quick, EvaluationMetrics, LogisticRegression, TrainedModel};
use rlogreg::core::{LogRegError, Method, MinimizerKind, Result, DEFAULT_N_CLASS};
use rlogreg::data::{idx, preprocess, CsvDigits, LabeledMatrix, PreprocessConfig};
use rlogreg::persistence::{default_file_name, WeightArtifact};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "rlogreg")]
#[command(about = "One-vs-all and multinomial logistic regression for digit classification")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "rlogreg contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Preprocess, train and save a model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Evaluate a model on labeled data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
    /// Quick operations without model saving
    Quick(QuickArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum DataFormat {
    /// Pick from the file name
    Auto,
    /// Comma separated, label in the last column
    Csv,
    /// MNIST IDX image file plus a separate label file
    Idx,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliMethod {
    #[value(name = "one-vs-all")]
    OneVsAll,
    #[value(name = "multinomial")]
    Multinomial,
}

impl From<CliMethod> for Method {
    fn from(method: CliMethod) -> Self {
        match method {
            CliMethod::OneVsAll => Method::OneVsAll,
            CliMethod::Multinomial => Method::Multinomial,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliOptimizer {
    /// Nonlinear conjugate gradient (default)
    #[value(name = "cg")]
    ConjugateGradient,
    /// Limited-memory BFGS
    #[value(name = "lbfgs")]
    Lbfgs,
    /// Steepest descent
    #[value(name = "sd")]
    SteepestDescent,
}

impl From<CliOptimizer> for MinimizerKind {
    fn from(optimizer: CliOptimizer) -> Self {
        match optimizer {
            CliOptimizer::ConjugateGradient => MinimizerKind::ConjugateGradient,
            CliOptimizer::Lbfgs => MinimizerKind::Lbfgs,
            CliOptimizer::SteepestDescent => MinimizerKind::SteepestDescent,
        }
    }
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file
    #[arg(long)]
    train: PathBuf,

    /// Test data file
    #[arg(long)]
    test: PathBuf,

    /// Training label file (IDX format only)
    #[arg(long)]
    train_labels: Option<PathBuf>,

    /// Test label file (IDX format only)
    #[arg(long)]
    test_labels: Option<PathBuf>,

    /// Data format
    #[arg(short, long, value_enum, default_value = "auto")]
    format: DataFormat,

    /// Classifier family
    #[arg(long, value_enum, default_value = "one-vs-all")]
    method: CliMethod,

    /// Number of classes
    #[arg(long, default_value_t = DEFAULT_N_CLASS)]
    n_class: usize,

    /// Maximum iterations per optimizer run
    #[arg(short, long, default_value = "100")]
    max_iterations: usize,

    /// Gradient infinity-norm tolerance
    #[arg(short, long, default_value = "1e-5")]
    tolerance: f64,

    /// Optimizer backend
    #[arg(long, value_enum, default_value = "cg")]
    optimizer: CliOptimizer,

    /// Rows per class held out for validation
    #[arg(long, default_value = "1000")]
    validation_per_class: usize,

    /// Features with training std at or below this are dropped
    #[arg(long, default_value = "0.001")]
    variance_threshold: f64,

    /// Divisor applied to every kept feature
    #[arg(long, default_value = "255")]
    pixel_scale: f64,

    /// Output model file (defaults to params.json or params_bonus.json)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file (a CSV label column is ignored)
    #[arg(long)]
    data: PathBuf,

    /// Data format
    #[arg(short, long, value_enum, default_value = "auto")]
    format: DataFormat,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Labeled data file
    #[arg(long)]
    data: PathBuf,

    /// Label file (IDX format only)
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Data format
    #[arg(short, long, value_enum, default_value = "auto")]
    format: DataFormat,

    /// Show the confusion matrix
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

#[derive(Args)]
struct QuickArgs {
    #[command(subcommand)]
    operation: QuickOperation,
}

#[derive(Subcommand)]
enum QuickOperation {
    /// Train both families on synthetic Gaussian blobs
    Blobs {
        /// Number of classes
        #[arg(long, default_value = "3")]
        classes: usize,
        /// Samples per class
        #[arg(long, default_value = "100")]
        per_class: usize,
        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
        Commands::Quick(args) => quick_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn train_command(args: TrainArgs) -> Result<()> {
    let method = Method::from(args.method);
    let minimizer = MinimizerKind::from(args.optimizer);
    info!("Training {method} model");
    info!(
        "Parameters: max_iter={}, tolerance={}, optimizer={}",
        args.max_iterations, args.tolerance, minimizer
    );

    let train_pool = load_labeled(&args.train, args.train_labels.as_deref(), args.format)?;
    let test = load_labeled(&args.test, args.test_labels.as_deref(), args.format)?;
    info!(
        "Loaded {} training and {} test samples with {} features",
        train_pool.len(),
        test.len(),
        train_pool.n_features()
    );

    let config = PreprocessConfig {
        n_class: args.n_class,
        n_validation_per_class: args.validation_per_class,
        variance_threshold: args.variance_threshold,
        pixel_scale: args.pixel_scale,
    };
    let partitions = preprocess(&train_pool, &test, &config)?;

    let model = LogisticRegression::new(method)
        .with_n_class(args.n_class)
        .with_max_iterations(args.max_iterations)
        .with_tolerance(args.tolerance)
        .with_minimizer(minimizer)
        .train_dataset(&partitions.train)?;

    if let Some(report) = model.report() {
        info!(
            "Training completed: {} runs, {} iterations, mean loss {:.6}",
            report.runs.len(),
            report.total_iterations(),
            report.mean_loss()
        );
        if !report.all_converged() {
            warn!("Not every optimizer run converged; the best iterate was kept");
        }
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(default_file_name(method)));
    model
        .to_artifact()
        .with_pipeline(partitions.pipeline.clone())
        .save_to_file(&output)?;
    info!("Model saved to: {output:?}");

    println!("=== {method} Training Results ===");
    print_accuracy("Training set", &model, &partitions.train)?;
    if !partitions.validation.is_empty() {
        print_accuracy("Validation set", &model, &partitions.validation)?;
    }
    print_accuracy("Test set", &model, &partitions.test)?;
    println!("Model saved to: {}", output.display());

    Ok(())
}

fn print_accuracy(name: &str, model: &TrainedModel, data: &LabeledMatrix) -> Result<()> {
    let metrics = model.evaluate_dataset(data)?;
    println!("{name} Accuracy: {:.2}%", metrics.accuracy() * 100.0);
    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let artifact = WeightArtifact::load_from_file(&args.model)?;
    let model = TrainedModel::from_artifact(&artifact)?;

    info!("Loading prediction data from: {:?}", args.data);
    let raw = match resolve_format(&args.data, args.format) {
        DataFormat::Idx => idx::read_images(BufReader::new(File::open(&args.data)?))?,
        _ => CsvDigits::from_file(&args.data)?.features,
    };
    let features = artifact.prepare_features(&raw)?;
    let predictions = model.predict(&features)?;

    if let Some(output_path) = args.output {
        let file = File::create(&output_path)?;
        let mut writer = BufWriter::new(file);
        for label in predictions.iter() {
            writeln!(writer, "{label}")?;
        }
        writer.flush()?;
        info!("Predictions saved to: {output_path:?}");
    } else {
        for label in predictions.iter() {
            println!("{label}");
        }
    }

    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let artifact = WeightArtifact::load_from_file(&args.model)?;
    let model = TrainedModel::from_artifact(&artifact)?;

    info!("Loading test data from: {:?}", args.data);
    let data = load_labeled(&args.data, args.labels.as_deref(), args.format)?;
    let features = artifact.prepare_features(&data.features)?;
    let metrics = model.evaluate(&features, &data.labels)?;

    println!("=== Model Evaluation ===");
    artifact.print_summary();

    println!("\nTest Results:");
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);
    print_class_table(&metrics);

    if args.detailed {
        println!("\nConfusion Matrix (rows: true class, columns: predicted):");
        for row in metrics.confusion.rows() {
            let cells: Vec<String> = row.iter().map(|c| format!("{c:>6}")).collect();
            println!("  {}", cells.join(""));
        }
    }

    Ok(())
}

fn print_class_table(metrics: &EvaluationMetrics) {
    println!("\nPer-Class Accuracy:");
    for class in 0..metrics.n_class() {
        match metrics.class_accuracy(class) {
            Some(acc) => println!(
                "  {class:>3}: {:>7.2}% ({}/{})",
                acc * 100.0,
                metrics.per_class_correct[class],
                metrics.per_class_total[class]
            ),
            None => println!("  {class:>3}:       - (0/0)"),
        }
    }
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let artifact = WeightArtifact::load_from_file(&args.model)?;

    artifact.print_summary();

    println!("\nWeight Matrix: {} x {}", artifact.weights.nrows(), artifact.weights.ncols());
    println!("Bias Row:");
    for (class, bias) in artifact.weights.row(0).iter().enumerate() {
        println!("  class {class}: {bias:.6}");
    }

    Ok(())
}

fn quick_command(args: QuickArgs) -> Result<()> {
    match args.operation {
        QuickOperation::Blobs {
            classes,
            per_class,
            seed,
        } => {
            info!("Synthetic blobs: {classes} classes x {per_class} samples, seed {seed}");
            let results = quick::blobs_accuracy(classes, per_class, seed)?;

            println!("=== Synthetic Blob Results ===");
            println!("Classes: {classes}");
            println!("Samples per class: {per_class}");
            for (method, accuracy) in results {
                println!("{method} training accuracy: {:.2}%", accuracy * 100.0);
            }

            Ok(())
        }
    }
}

fn load_labeled(path: &Path, labels: Option<&Path>, format: DataFormat) -> Result<LabeledMatrix> {
    match resolve_format(path, format) {
        DataFormat::Idx => {
            let labels = labels.ok_or_else(|| {
                LogRegError::InvalidParameter(format!(
                    "IDX images {} need a matching label file",
                    path.display()
                ))
            })?;
            idx::load_idx_pair(path, labels)
        }
        _ => {
            if labels.is_some() {
                warn!("Label file ignored for CSV data; labels come from the last column");
            }
            CsvDigits::from_file(path)
        }
    }
}

fn resolve_format(path: &Path, format: DataFormat) -> DataFormat {
    if format == DataFormat::Auto {
        detect_format(path)
    } else {
        format
    }
}

fn detect_format(path: &Path) -> DataFormat {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if name.ends_with(".csv") {
        DataFormat::Csv
    } else if name.ends_with(".idx") || name.contains("ubyte") {
        DataFormat::Idx
    } else {
        warn!("Unknown file extension, assuming CSV format");
        DataFormat::Csv
    }
}
