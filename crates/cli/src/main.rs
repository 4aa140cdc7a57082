use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use recommender::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_RECOMMENDATIONS, Recommendation, RecommendError,
};
use server::{RecommendationService, ServerConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// ReelRecs - Movie Recommendation Engine
#[derive(Parser)]
#[command(name = "reel-recs")]
#[command(
    about = "Content-based movie recommendations from a precomputed similarity matrix",
    long_about = None
)]
struct Cli {
    /// Directory containing movie_list.dat and similarity.dat
    #[arg(short, long, env = "REEL_RECS_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Interface to bind
        #[arg(long, env = "REEL_RECS_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to bind
        #[arg(long, env = "REEL_RECS_PORT", default_value_t = 8000)]
        port: u16,

        /// Maximum number of cached (title, count) results
        #[arg(long, env = "REEL_RECS_CACHE_CAPACITY", default_value_t = DEFAULT_CACHE_CAPACITY)]
        cache_capacity: usize,
    },

    /// Get movies similar to a title
    Recommend {
        /// Exact movie title
        #[arg(long)]
        title: String,

        /// Number of recommendations to return
        #[arg(long, default_value_t = DEFAULT_RECOMMENDATIONS, value_parser = parse_count)]
        count: usize,
    },

    /// List movie titles
    Movies {
        /// Only show titles containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10", value_parser = parse_count)]
        concurrent: usize,

        /// Recommendations per request
        #[arg(long, default_value_t = DEFAULT_RECOMMENDATIONS, value_parser = parse_count)]
        count: usize,
    },
}

/// Positive integer argument
fn parse_count(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
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

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Serve {
            host,
            port,
            cache_capacity,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: cli.data_dir,
                cache_capacity,
                ..ServerConfig::default()
            };
            server::serve(config).await?
        }
        Commands::Recommend { title, count } => {
            let service = load_service(&cli.data_dir, DEFAULT_CACHE_CAPACITY)?;
            handle_recommend(&service, &title, count)?
        }
        Commands::Movies { search } => {
            let service = load_service(&cli.data_dir, DEFAULT_CACHE_CAPACITY)?;
            handle_movies(&service, search.as_deref())
        }
        Commands::Benchmark {
            requests,
            concurrent,
            count,
        } => {
            let service = Arc::new(load_service(&cli.data_dir, DEFAULT_CACHE_CAPACITY)?);
            handle_benchmark(service, requests, concurrent, count).await?
        }
    }

    Ok(())
}

/// Load the dataset, timing it for the user
fn load_service(data_dir: &Path, cache_capacity: usize) -> Result<RecommendationService> {
    println!("Loading dataset from {}...", data_dir.display());
    let start = Instant::now();
    let service = RecommendationService::load(data_dir, cache_capacity)
        .context("Failed to load recommendation dataset")?;
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        service.movie_count(),
        start.elapsed()
    );
    Ok(service)
}

/// Handle the 'recommend' command
fn handle_recommend(service: &RecommendationService, title: &str, count: usize) -> Result<()> {
    let recommendations = service.recommend_cached(title, count).map_err(|e| match e {
        RecommendError::NotFound(title) => {
            anyhow!("Movie '{}' not found (try `reel-recs movies --search ...`)", title)
        }
        other => anyhow!(other),
    })?;

    print_recommendations(title, &recommendations);
    Ok(())
}

/// Handle the 'movies' command
fn handle_movies(service: &RecommendationService, search: Option<&str>) {
    let needle = search.map(str::to_lowercase);
    let matches: Vec<&String> = service
        .list_titles()
        .iter()
        .filter(|title| match &needle {
            Some(needle) => title.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .collect();

    match search {
        Some(text) => println!("{}", format!("Titles matching '{}':", text).bold().blue()),
        None => println!("{}", "All titles:".bold().blue()),
    }
    for title in &matches {
        println!("  {}", title);
    }
    println!("{} {} titles", "•".cyan(), matches.len());
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: Arc<RecommendationService>,
    requests: usize,
    concurrent: usize,
    count: usize,
) -> Result<()> {
    let titles = service.list_titles();
    if titles.is_empty() || requests == 0 {
        bail!("Nothing to benchmark");
    }

    // Random titles, drawn with replacement so repeats exercise the cache
    let picks: Vec<String> = (0..requests)
        .map(|_| titles[rand::random::<u32>() as usize % titles.len()].clone())
        .collect();

    let limiter = Arc::new(Semaphore::new(concurrent));
    let wall = Instant::now();

    let mut handles = vec![];
    for title in picks {
        let service = service.clone();
        let limiter = limiter.clone();
        handles.push(tokio::spawn(async move {
            let _permit = limiter.acquire_owned().await?;
            let start = Instant::now();
            tokio::task::spawn_blocking(move || service.recommend_cached(&title, count)).await??;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    // Wait for all tasks to complete and collect timings
    let mut timings: Vec<Duration> = Vec::with_capacity(handles.len());
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall.elapsed();

    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();
    let stats = service.cache_stats();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);
    println!(
        "Cache: {} hits, {} misses, {} entries ({:.1}% hit rate)",
        stats.hits,
        stats.misses,
        stats.size,
        stats.hit_rate() * 100.0
    );

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(title: &str, recommendations: &[Recommendation]) {
    println!("{}", format!("Movies similar to {}:", title).bold().blue());
    if recommendations.is_empty() {
        println!("  (no other movies in the catalog)");
    }
    for (rank, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} - {:.1}% similar",
            (rank + 1).to_string().green(),
            rec.title,
            rec.similarity_score
        );
    }
}
