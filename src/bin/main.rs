//! rsrecall Command Line Interface
//!
//! A command-line interface for evaluating recommenders on rating files with
//! cross-validated sampled recall.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use rsrecall::core::{RecError, Result};
use rsrecall::utils::{stats, validation};
use rsrecall::{
    cross_validate_recall, PureSvd, RandomScores, RatingsDataset, RecallConfig, RecallReport,
    Recommender, ScoringStrategy,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "rsrecall")]
#[command(about = "Cross-validated hit-rate evaluation of recommenders")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "rsrecall contributors")]
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
    /// Evaluate a recommender with k-fold sampled recall
    Evaluate(EvaluateArgs),
    /// Display ratings file statistics
    Info(InfoArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliRecommender {
    /// PureSVD latent factor model
    #[value(name = "svd")]
    Svd,
    /// Standard normal random scores (baseline)
    #[value(name = "random")]
    Random,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Ratings file (user, product, rating triplets)
    #[arg(long)]
    data: PathBuf,

    /// Recommender to evaluate
    #[arg(short, long, default_value = "svd")]
    recommender: CliRecommender,

    /// Number of latent factors (svd only)
    #[arg(long, default_value = "10")]
    factors: usize,

    /// Minimum rating for a product to be used as a test target
    #[arg(short, long, default_value = "4")]
    threshold: u32,

    /// Unrated products ranked alongside each test target
    #[arg(short, long, default_value = "100")]
    negatives: usize,

    /// Length of the recommendation list
    #[arg(long, default_value = "10")]
    top_n: usize,

    /// Number of cross-validation folds
    #[arg(short, long, default_value = "10")]
    folds: usize,

    /// Random seed
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Maximum hit tests per user
    #[arg(long, default_value = "50")]
    max_tests_per_user: usize,

    /// Comma-separated user labels to test (default: all users)
    #[arg(long, value_delimiter = ',')]
    users: Option<Vec<String>>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Ratings file
    #[arg(long)]
    data: PathBuf,

    /// Print the statistics as JSON
    #[arg(long)]
    json: bool,
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
        Commands::Evaluate(args) => evaluate_command(args, cli.verbose),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn evaluate_command(args: EvaluateArgs, verbose: bool) -> Result<()> {
    info!("Loading ratings from: {:?}", args.data);
    let dataset = RatingsDataset::from_file(&args.data)?;
    let ratings = dataset.matrix();
    info!(
        "Loaded {} ratings from {} users over {} products",
        ratings.nnz(),
        ratings.n_users(),
        ratings.n_products()
    );

    let users = match &args.users {
        Some(labels) => Some(resolve_users(&dataset, labels)?),
        None => None,
    };

    let tested: Vec<usize> = users
        .clone()
        .unwrap_or_else(|| (0..ratings.n_users()).collect());
    if let Some(min) = validation::min_unrated(ratings, &tested) {
        if min < args.negatives {
            warn!(
                "Some users have only {min} unrated products but {} negatives are requested; \
                 hit tests on their ratings will fail",
                args.negatives
            );
        }
    }
    if validation::users_with_targets(ratings, args.threshold) == 0 {
        warn!(
            "No user has a rating of at least {}, every fold will report zero recall",
            args.threshold
        );
    }
    if args.top_n > args.negatives {
        warn!(
            "top-n ({}) covers every candidate ({}), recall will be 1.0",
            args.top_n,
            args.negatives + 1
        );
    }

    let config = RecallConfig::new(args.threshold, args.negatives, args.top_n)
        .with_folds(args.folds)
        .with_seed(args.seed)
        .with_verbose(verbose)
        .with_max_tests_per_user(args.max_tests_per_user);

    let report = match args.recommender {
        CliRecommender::Svd => {
            info!("Evaluating PureSVD with {} factors", args.factors);
            evaluate_with(PureSvd::new(args.factors), &dataset, &config, users.as_deref())?
        }
        CliRecommender::Random => {
            info!("Evaluating random baseline");
            evaluate_with(RandomScores::new(), &dataset, &config, users.as_deref())?
        }
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| RecError::SerializationError(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    println!("=== Cross-Validated Recall ===");
    println!("Data file: {:?}", args.data);
    println!("Recommender: {}", report.recommender);
    if let CliRecommender::Svd = args.recommender {
        println!("Factors: {}", args.factors);
    }
    println!(
        "Threshold: {}  Negatives: {}  Top-N: {}  Folds: {}  Seed: {}",
        args.threshold, args.negatives, args.top_n, args.folds, args.seed
    );
    println!();
    println!("{:>6} {:>10} {:>8} {:>8} {:>8}", "fold", "test users", "tests", "hits", "recall");
    for fold in &report.folds {
        println!(
            "{:>6} {:>10} {:>8} {:>8} {:>8.4}",
            fold.fold, fold.test_users, fold.tests, fold.hits, fold.recall
        );
    }
    println!();
    println!(
        "Total: {}/{} hits",
        report.total_hits(),
        report.total_tests()
    );
    println!("Average recall: {:.4}", report.mean_recall);

    Ok(())
}

fn evaluate_with<S: ScoringStrategy>(
    strategy: S,
    dataset: &RatingsDataset,
    config: &RecallConfig,
    users: Option<&[usize]>,
) -> Result<RecallReport> {
    let mut recommender = Recommender::new(strategy);
    cross_validate_recall(&mut recommender, dataset.matrix(), config, users)
}

fn resolve_users(dataset: &RatingsDataset, labels: &[String]) -> Result<Vec<usize>> {
    labels
        .iter()
        .map(|label| {
            dataset.user_index(label.trim()).ok_or_else(|| {
                RecError::InvalidParameter(format!("Unknown user: {label}"))
            })
        })
        .collect()
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading ratings from: {:?}", args.data);
    let dataset = RatingsDataset::from_file(&args.data)?;
    let summary = stats::ratings_stats(dataset.matrix());

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| RecError::SerializationError(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    println!("=== Ratings Summary ===");
    println!("Users:    {}", summary.n_users);
    println!("Products: {}", summary.n_products);
    println!("Ratings:  {}", summary.n_ratings);
    println!("Density:  {:.6}", summary.density);
    println!("\nRatings per user:");
    println!("  Mean:     {:.2}", summary.mean_ratings_per_user);
    println!("  Min:      {}", summary.min_ratings_per_user);
    println!("  Max:      {}", summary.max_ratings_per_user);
    println!("  Variance: {:.2}", summary.variance_ratings_per_user);
    println!("\nRating values:");
    for (rating, count) in &summary.rating_histogram {
        println!("  {rating}: {count}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_resolve_users() {
        let data = "a,x,1\nb,y,2\nc,x,3\n";
        let dataset = RatingsDataset::from_reader(Cursor::new(data)).unwrap();

        let users = resolve_users(&dataset, &["c".to_string(), " a".to_string()]).unwrap();
        assert_eq!(users, vec![2, 0]);
        assert!(resolve_users(&dataset, &["z".to_string()]).is_err());
    }

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::try_parse_from(["rsrecall", "evaluate", "--data", "ratings.csv"]).unwrap();
        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.factors, 10);
                assert_eq!(args.threshold, 4);
                assert_eq!(args.negatives, 100);
                assert_eq!(args.top_n, 10);
                assert_eq!(args.folds, 10);
                assert_eq!(args.seed, 0);
                assert_eq!(args.max_tests_per_user, 50);
                assert!(args.users.is_none());
                assert!(!args.json);
            }
            Commands::Info(_) => panic!("expected evaluate"),
        }
    }
}
