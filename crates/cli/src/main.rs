use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::UserId;
use rand::Rng;
use server::{build_service, AlsArgs, DataArgs, HttpArgs, Recommendation, RecommendationService};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Largest matrix `inspect` will print densely
const MAX_DENSE_CELLS: usize = 400;

/// Recs - implicit-feedback recommendation engine
#[derive(Parser)]
#[command(name = "recs")]
#[command(about = "Top-N recommendations from purchase and like signals using ALS", long_about = None)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    #[command(flatten)]
    als: AlsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the model and serve recommendations over HTTP
    Serve {
        #[command(flatten)]
        http: HttpArgs,
    },

    /// Get item recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return
        #[arg(long, default_value = "3", allow_negative_numbers = true)]
        top_n: i64,

        /// Also show the user's interaction history
        #[arg(long)]
        explain: bool,
    },

    /// Show a user's interaction history
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Show dataset and model statistics
    Inspect,

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// top_n per request
        #[arg(long, default_value = "10")]
        top_n: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load data and train (this may take a moment)
    println!("Training model from {} source...", cli.data.data_source);
    let start = Instant::now();
    let service = Arc::new(
        build_service(&cli.data, &cli.als).context("Failed to build recommendation service")?,
    );
    println!("{} Trained model in {:?}", "✓".green(), start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Serve { http } => server::http::serve(service, &http).await?,
        Commands::Recommend {
            user_id,
            top_n,
            explain,
        } => handle_recommend(&service, user_id, top_n, explain)?,
        Commands::User { user_id } => handle_user(&service, user_id)?,
        Commands::Inspect => handle_inspect(&service),
        Commands::Benchmark {
            requests,
            concurrent,
            top_n,
        } => handle_benchmark(service, requests, concurrent, top_n).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    service: &RecommendationService,
    user_id: UserId,
    top_n: i64,
    explain: bool,
) -> Result<()> {
    let recommendations = service.recommend(user_id, top_n)?;

    print_recommendations(user_id, &recommendations);

    if explain {
        println!();
        handle_user(service, user_id)?;
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(service: &RecommendationService, user_id: UserId) -> Result<()> {
    let history = service.history(user_id)?;

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    println!("{}Items interacted with: {}", "• ".green(), history.len());
    let total: f32 = history.iter().map(|(_, weight)| weight).sum();
    println!("{}Total interaction weight: {:.2}", "• ".cyan(), total);

    let mut by_weight = history.clone();
    by_weight.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    println!("History:");
    for (item_id, weight) in by_weight {
        println!("  - item {} (weight: {})", item_id, weight);
    }
    Ok(())
}

/// Handle the 'inspect' command
fn handle_inspect(service: &RecommendationService) {
    let stats = service.stats();
    let config = service.config();
    let data = service.data();

    println!("{}", "Dataset".bold().blue());
    println!("{}Users: {}", "• ".green(), stats.users);
    println!("{}Items: {}", "• ".green(), stats.items);
    println!("{}Non-zero interactions: {}", "• ".green(), stats.interactions);
    let density = stats.interactions as f64 / (stats.users * stats.items).max(1) as f64;
    println!("{}Density: {:.4}%", "• ".green(), density * 100.0);

    println!("{}", "Model".bold().blue());
    println!("{}Factors: {}", "• ".cyan(), config.factors);
    println!("{}Iterations: {}", "• ".cyan(), config.iterations);
    println!("{}Regularization: {}", "• ".cyan(), config.regularization);
    println!("{}Alpha: {}", "• ".cyan(), config.alpha);
    println!("{}Seed: {}", "• ".cyan(), config.seed);

    if stats.users * stats.items <= MAX_DENSE_CELLS {
        println!("{}", "Interaction matrix".bold().blue());
        let header = data
            .items
            .ids()
            .iter()
            .map(|id| format!("{:>6}", id))
            .collect::<String>();
        println!("{:>8}{}", "user", header);
        for (user_id, row) in data.users.ids().iter().zip(data.matrix.to_dense()) {
            let cells = row.iter().map(|w| format!("{:>6}", w)).collect::<String>();
            println!("{:>8}{}", user_id, cells);
        }
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: Arc<RecommendationService>,
    requests: usize,
    concurrent: usize,
    top_n: i64,
) -> Result<()> {
    let targets: Vec<UserId> = {
        let user_ids = service.user_ids();
        let mut rng = rand::rng();
        (0..requests)
            .map(|_| user_ids[rng.random_range(0..user_ids.len())])
            .collect()
    };

    let wall_clock = Instant::now();
    let mut timings: Vec<Duration> = Vec::with_capacity(requests);

    // Run in waves of `concurrent` blocking tasks
    for wave in targets.chunks(concurrent.max(1)) {
        let mut handles = Vec::with_capacity(wave.len());
        for &user_id in wave {
            let service = Arc::clone(&service);
            handles.push(tokio::task::spawn_blocking(move || {
                let start = Instant::now();
                service.recommend(user_id, top_n)?;
                Ok::<_, anyhow::Error>(start.elapsed())
            }));
        }
        for handle in handles {
            timings.push(handle.await??);
        }
    }
    let total_time = wall_clock.elapsed();

    if timings.is_empty() {
        println!("No requests made");
        return Ok(());
    }

    let avg_latency = timings.iter().sum::<Duration>() / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(user_id: UserId, recommendations: &[Recommendation]) {
    println!("{}", format!("Recommendations for user {}:", user_id).bold().blue());
    if recommendations.is_empty() {
        println!("  (user has interacted with every item)");
    }
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. item {} - Score: {:.2}",
            (rank + 1).to_string().green(),
            rec.id,
            rec.score
        );
    }
}
