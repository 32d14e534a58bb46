//! HTTP load generator for the benchmark service
//!
//! Runs a fixed number of virtual users against one route for a fixed
//! duration, then prints throughput and latency percentiles.
//!
//! Usage:
//!   1. Start the server: cargo run --release
//!   2. Run the load: cargo run --release --bin mongobench-load -- --route async-motor --vus 30

use clap::{Parser, ValueEnum};
use rand::Rng;
use reqwest::Client;
use serde_json::json;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Route {
    AsyncMotor,
    AsyncPymongo,
    SyncPymongo,
}

impl Route {
    fn path(&self) -> &'static str {
        match self {
            Route::AsyncMotor => "/async/motor",
            Route::AsyncPymongo => "/async/pymongo",
            Route::SyncPymongo => "/sync/pymongo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HttpMethod {
    Post,
    Get,
}

#[derive(Parser, Debug)]
#[command(name = "mongobench-load")]
#[command(about = "Drive concurrent traffic at a mongobench route", long_about = None)]
struct Args {
    /// Base URL of the service
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    url: String,

    /// Route under test
    #[arg(long, value_enum, default_value_t = Route::AsyncMotor)]
    route: Route,

    /// POST random records or GET the whole table
    #[arg(long, value_enum, default_value_t = HttpMethod::Post)]
    method: HttpMethod,

    /// Concurrent virtual users
    #[arg(long, default_value_t = 30)]
    vus: usize,

    /// Test duration in seconds
    #[arg(long, default_value_t = 10)]
    duration: u64,

    /// Smallest user_id sent
    #[arg(long, default_value_t = 1)]
    min_user_id: i64,

    /// Largest user_id sent
    #[arg(long, default_value_t = 5000)]
    max_user_id: i64,
}

#[derive(Debug, Default)]
struct WorkerStats {
    latencies: Vec<Duration>,
    failures: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.min_user_id > args.max_user_id {
        anyhow::bail!(
            "--min-user-id ({}) must not exceed --max-user-id ({})",
            args.min_user_id,
            args.max_user_id
        );
    }

    let client = Client::builder()
        .pool_max_idle_per_host(args.vus)
        .tcp_keepalive(Duration::from_secs(60))
        .build()?;

    let base = args.url.trim_end_matches('/').to_string();
    if client.get(format!("{}/", base)).send().await.is_err() {
        eprintln!("❌ Error: Server is not running at {}", base);
        std::process::exit(1);
    }

    let target = format!("{}{}", base, args.route.path());
    println!(
        "🚀 {:?} {} with {} VUs for {}s",
        args.method, target, args.vus, args.duration
    );

    let deadline = Instant::now() + Duration::from_secs(args.duration);
    let start = Instant::now();
    let mut set = JoinSet::new();

    for _ in 0..args.vus {
        let client = client.clone();
        let target = target.clone();
        let (method, min_id, max_id) = (args.method, args.min_user_id, args.max_user_id);

        set.spawn(run_worker(client, target, method, min_id..=max_id, deadline));
    }

    let mut latencies = Vec::new();
    let mut failures = 0;
    while let Some(result) = set.join_next().await {
        let stats = result?;
        latencies.extend(stats.latencies);
        failures += stats.failures;
    }
    let elapsed = start.elapsed();

    print_report(&mut latencies, failures, elapsed);
    Ok(())
}

/// One virtual user: send requests back to back until `deadline`.
async fn run_worker(
    client: Client,
    target: String,
    method: HttpMethod,
    user_ids: RangeInclusive<i64>,
    deadline: Instant,
) -> WorkerStats {
    let mut stats = WorkerStats::default();
    while Instant::now() < deadline {
        let request = match method {
            HttpMethod::Post => {
                let user_id = rand::thread_rng().gen_range(user_ids.clone());
                client.post(&target).json(&json!({ "user_id": user_id }))
            }
            HttpMethod::Get => client.get(&target),
        };

        let sent = Instant::now();
        match request.send().await {
            // The body is drained so the connection goes back to the pool
            Ok(resp) if resp.status().is_success() => match resp.bytes().await {
                Ok(_) => stats.latencies.push(sent.elapsed()),
                Err(_) => stats.failures += 1,
            },
            _ => stats.failures += 1,
        }
    }
    stats
}

fn print_report(latencies: &mut [Duration], failures: usize, elapsed: Duration) {
    latencies.sort_unstable();
    let ok = latencies.len();

    println!("{}", "-".repeat(60));
    println!("  {:.<30} {:>10}", "requests ok", ok);
    println!("  {:.<30} {:>10}", "requests failed", failures);
    println!("  {:.<30} {:>10}", "elapsed", format_duration(elapsed));
    println!("  {:.<30} {:>10}", "throughput", format_ops_per_sec(ok, elapsed));
    for (label, p) in [("p50", 50.0), ("p95", 95.0), ("p99", 99.0)] {
        let value = percentile(latencies, p).map(format_duration).unwrap_or_else(|| "-".into());
        println!("  {:.<30} {:>10}", label, value);
    }
    let max = latencies.last().copied().map(format_duration).unwrap_or_else(|| "-".into());
    println!("  {:.<30} {:>10}", "max", max);
}

/// Nearest-rank percentile over an ascending slice.
fn percentile(sorted: &[Duration], p: f64) -> Option<Duration> {
    if sorted.is_empty() {
        return None;
    }
    let rank = ((p / 100.0) * sorted.len() as f64).ceil() as usize;
    let index = rank.clamp(1, sorted.len()) - 1;
    Some(sorted[index])
}

fn format_duration(d: Duration) -> String {
    if d.as_secs() > 0 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() > 0 {
        format!("{:.2}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.2}µs", d.as_secs_f64() * 1_000_000.0)
    }
}

fn format_ops_per_sec(count: usize, d: Duration) -> String {
    let ops = count as f64 / d.as_secs_f64();
    if ops >= 1_000.0 {
        format!("{:.2}K req/s", ops / 1_000.0)
    } else {
        format!("{:.2} req/s", ops)
    }
}
