use anyhow::Result;
use clap::Parser;

use movie_recommender::{
    bootstrap,
    config::Config,
    services::{EvaluationSettings, Evaluator},
};

/// Offline evaluation of the hybrid recommender against the ratings index
#[derive(Debug, Parser)]
#[command(name = "evaluate", version)]
struct Args {
    /// Recommendations requested per user
    #[arg(long, default_value_t = 10)]
    k: usize,

    /// Maximum number of test users
    #[arg(long = "test-users", default_value_t = 100)]
    test_users: usize,

    /// Weight of the user-based side; defaults to HYBRID_ALPHA
    #[arg(long)]
    alpha: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing("warn");

    let args = Args::parse();
    let config = Config::from_env()?;
    let alpha = args.alpha.unwrap_or(config.hybrid_alpha);

    let engine = bootstrap::search_engine(&config)?;
    let (catalog, recommender) = bootstrap::build_recommender(engine.clone(), &config).await;
    let evaluator = Evaluator::new(
        engine,
        catalog,
        recommender,
        EvaluationSettings::from_config(&config),
    );

    let report = evaluator.run(args.k, args.test_users, alpha).await?;

    println!();
    println!("Hybrid Recommender Evaluation Results:");
    println!("-------------------------------------");
    for (metric, value) in report.metrics() {
        println!("{}: {:.4}", metric, value);
    }
    println!("Evaluated users: {}", report.evaluated_users);

    Ok(())
}
