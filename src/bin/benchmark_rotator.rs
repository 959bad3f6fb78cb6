//! Benchmark suite for `Rotator` performance.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release --bin benchmark_rotator                 # Run all benchmarks
//! cargo run --release --bin benchmark_rotator -- --json       # JSON output
//! cargo run --release --bin benchmark_rotator -- --filter Threads  # Filter by pattern
//! cargo run --release --bin benchmark_rotator -- --list-tests # List available tests
//! ```
//!
//! Set `RUST_LOG=ring_rotator=debug` to see per-rotation logs.
//!
//! # Benchmark Categories
//!
//! - **Sequential**: size scaling from 256x256 to 4096x4096 on one thread
//! - **Threaded**: the same sizes with the default threaded executor
//! - **Threads**: 2048x2048 with 1, 2, 4 and 8 eager workers
//!
//! # Metrics
//!
//! - **Timing**: mean, median, std dev, min, max, p95 (in milliseconds)
//! - **Throughput**: million cells per second

use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use ring_rotator::{
    Matrix, RingExecutor, Rotator, SequentialExecutor, ThreadedExecutor, bench_utils,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const DEFAULT_ITERATIONS: usize = 20;
const WARMUPS: usize = 2;
const THREAD_SCALING_SIZE: usize = 2048;

/// Results from a single benchmark run.
#[derive(Clone, Debug, Serialize)]
struct BenchmarkResult {
    test_name: String,
    executor: String,
    side: usize,
    rings: usize,
    iterations: usize,

    mean_time_ms: f64,
    median_time_ms: f64,
    standard_deviation: f64,
    min_time_ms: f64,
    max_time_ms: f64,
    p95_time_ms: f64,

    cells_per_second: f64,
    megacells_per_second: f64,
}

/// Per-iteration timings of one benchmark, kept sorted ascending.
struct Timings {
    sorted_ms: Vec<f64>,
}

impl Timings {
    fn new(mut samples_ms: Vec<f64>) -> Self {
        samples_ms.sort_by(f64::total_cmp);
        Self {
            sorted_ms: samples_ms,
        }
    }

    fn mean(&self) -> f64 {
        match self.sorted_ms.len() {
            0 => 0.0,
            n => self.sorted_ms.iter().sum::<f64>() / n as f64,
        }
    }

    /// Sample standard deviation (Bessel-corrected).
    fn std_dev(&self) -> f64 {
        let n = self.sorted_ms.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let squares: f64 = self.sorted_ms.iter().map(|t| (t - mean).powi(2)).sum();
        (squares / (n - 1) as f64).sqrt()
    }

    fn min(&self) -> f64 {
        self.sorted_ms.first().copied().unwrap_or(0.0)
    }

    fn max(&self) -> f64 {
        self.sorted_ms.last().copied().unwrap_or(0.0)
    }

    /// Linearly interpolated quantile, `q` clamped to `[0, 1]`.
    /// `quantile(0.5)` is the median.
    fn quantile(&self, q: f64) -> f64 {
        let Some(last) = self.sorted_ms.len().checked_sub(1) else {
            return 0.0;
        };
        let rank = q.clamp(0.0, 1.0) * last as f64;
        let lower = rank.floor() as usize;
        let upper = (lower + 1).min(last);
        let weight = rank - lower as f64;
        self.sorted_ms[lower] + (self.sorted_ms[upper] - self.sorted_ms[lower]) * weight
    }
}

/// Orchestrates the benchmark suite with filtering and output formatting.
struct BenchmarkSuite {
    results: Vec<BenchmarkResult>,
    filter: String,
    iterations: usize,
}

impl BenchmarkSuite {
    fn new(iterations: usize) -> Self {
        Self {
            results: Vec::new(),
            filter: String::new(),
            iterations,
        }
    }

    fn set_filter(&mut self, filter: String) {
        self.filter = filter;
    }

    fn should_run_test(&self, test_name: &str) -> bool {
        if self.filter.is_empty() {
            return true;
        }
        test_name == self.filter || test_name.contains(&self.filter)
    }

    fn run_all(&mut self, json_output: bool, output_file: Option<String>) -> io::Result<()> {
        if !json_output {
            println!("=== Rotator Benchmark Suite ===\n");
        }

        self.benchmark_sequential(json_output)?;
        self.benchmark_threaded(json_output)?;
        self.benchmark_thread_count(json_output)?;

        if json_output {
            let json = serde_json::to_string_pretty(&self.results).map_err(io::Error::other)?;
            if let Some(path) = output_file {
                let mut file = File::create(path)?;
                file.write_all(json.as_bytes())?;
            } else {
                println!("{json}");
            }
        } else {
            self.print_report();
        }

        Ok(())
    }

    fn list_tests(&self) {
        let mut names = Vec::new();
        names.extend(test_names_sequential());
        names.extend(test_names_threaded());
        names.extend(test_names_thread_count());
        names.sort();
        for name in names {
            println!("{name}");
        }
    }

    /// Runs one benchmark: warmup rotations, then timed rotations of the same
    /// matrix in place.
    fn run_rotation_benchmark<E: RingExecutor>(
        &self,
        test_name: &str,
        matrix: Matrix<u32>,
        executor: E,
    ) -> io::Result<BenchmarkResult> {
        let side = matrix.rows();
        let executor_name = executor.name().to_string();
        let mut rotator = Rotator::with_executor(matrix, executor).map_err(io::Error::other)?;

        for _ in 0..WARMUPS {
            rotator.rotate().map_err(io::Error::other)?;
        }

        let mut times = Vec::with_capacity(self.iterations);
        for _ in 0..self.iterations {
            let start = Instant::now();
            rotator.rotate().map_err(io::Error::other)?;
            times.push(duration_to_ms(start.elapsed()));
        }

        let timings = Timings::new(times);
        let mean_time_ms = timings.mean();
        let cells = (side * side) as f64;
        let cells_per_second = if mean_time_ms > 0.0 {
            cells / (mean_time_ms / 1000.0)
        } else {
            0.0
        };

        Ok(BenchmarkResult {
            test_name: test_name.to_string(),
            executor: executor_name,
            side,
            rings: side / 2,
            iterations: self.iterations,
            mean_time_ms,
            median_time_ms: timings.quantile(0.5),
            standard_deviation: timings.std_dev(),
            min_time_ms: timings.min(),
            max_time_ms: timings.max(),
            p95_time_ms: timings.quantile(0.95),
            cells_per_second,
            megacells_per_second: cells_per_second / 1_000_000.0,
        })
    }

    fn record(&mut self, result: BenchmarkResult, silent: bool) {
        if !silent {
            println!(
                "  {}: {:.2} ms - {:.1} Mcells/s",
                result.test_name, result.mean_time_ms, result.megacells_per_second
            );
        }
        self.results.push(result);
    }

    /// Measures scaling from 256x256 to 4096x4096 on the calling thread.
    fn benchmark_sequential(&mut self, silent: bool) -> io::Result<()> {
        if !silent {
            println!("--- Benchmark: Size Scaling (sequential) ---");
        }
        for size in bench_utils::BENCH_SIZES {
            let test_name = format!("Sequential_{size}x{size}");
            if !self.should_run_test(&test_name) {
                continue;
            }
            let matrix = bench_utils::create_test_matrix(size);
            let result = self.run_rotation_benchmark(&test_name, matrix, SequentialExecutor)?;
            self.record(result, silent);
        }
        if !silent {
            println!();
        }
        Ok(())
    }

    /// Measures the same sizes with the default threaded executor.
    fn benchmark_threaded(&mut self, silent: bool) -> io::Result<()> {
        if !silent {
            println!("--- Benchmark: Size Scaling (threaded) ---");
        }
        for size in bench_utils::BENCH_SIZES {
            let test_name = format!("Threaded_{size}x{size}");
            if !self.should_run_test(&test_name) {
                continue;
            }
            let matrix = bench_utils::create_test_matrix(size);
            let result =
                self.run_rotation_benchmark(&test_name, matrix, ThreadedExecutor::default())?;
            self.record(result, silent);
        }
        if !silent {
            println!();
        }
        Ok(())
    }

    /// Measures worker-count scaling at a fixed size.
    fn benchmark_thread_count(&mut self, silent: bool) -> io::Result<()> {
        if !silent {
            println!("--- Benchmark: Thread Count ({THREAD_SCALING_SIZE}x{THREAD_SCALING_SIZE}) ---");
        }
        for threads in bench_utils::BENCH_THREADS {
            let test_name = format!("Threads_{threads}_{THREAD_SCALING_SIZE}");
            if !self.should_run_test(&test_name) {
                continue;
            }
            let matrix = bench_utils::create_test_matrix(THREAD_SCALING_SIZE);
            let executor = bench_utils::eager_executor(threads);
            let result = self.run_rotation_benchmark(&test_name, matrix, executor)?;
            self.record(result, silent);
        }
        if !silent {
            println!();
        }
        Ok(())
    }

    fn print_report(&self) {
        println!("=== Summary ===");
        println!(
            "{:<24} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12}",
            "test", "mean ms", "median ms", "stddev", "min ms", "p95 ms", "Mcells/s"
        );
        for r in &self.results {
            println!(
                "{:<24} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>12.1}",
                r.test_name,
                r.mean_time_ms,
                r.median_time_ms,
                r.standard_deviation,
                r.min_time_ms,
                r.p95_time_ms,
                r.megacells_per_second
            );
        }
    }
}

fn test_names_sequential() -> Vec<String> {
    bench_utils::BENCH_SIZES
        .iter()
        .map(|s| format!("Sequential_{s}x{s}"))
        .collect()
}

fn test_names_threaded() -> Vec<String> {
    bench_utils::BENCH_SIZES
        .iter()
        .map(|s| format!("Threaded_{s}x{s}"))
        .collect()
}

fn test_names_thread_count() -> Vec<String> {
    bench_utils::BENCH_THREADS
        .iter()
        .map(|t| format!("Threads_{t}_{THREAD_SCALING_SIZE}"))
        .collect()
}

fn duration_to_ms(dur: Duration) -> f64 {
    dur.as_secs_f64() * 1000.0
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [options]");
    eprintln!("Options:");
    eprintln!("  --json              Output results in JSON format");
    eprintln!("  --output <file>     Write results to file (default: stdout)");
    eprintln!("  --filter <pattern>  Run only tests matching pattern");
    eprintln!("  --iterations <n>    Timed rotations per test (default: {DEFAULT_ITERATIONS})");
    eprintln!("  --list-tests        List all available tests");
    eprintln!("  --help, -h          Show this help");
}

fn option_value(args: &[String], i: usize, what: &str) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires {what} argument", args[i]);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut json_output = false;
    let mut output_file: Option<String> = None;
    let mut filter_pattern: Option<String> = None;
    let mut list_tests = false;
    let mut iterations = DEFAULT_ITERATIONS;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => {
                json_output = true;
                i += 1;
            }
            "--output" => {
                output_file = Some(option_value(&args, i, "a filename"));
                i += 2;
            }
            "--filter" => {
                filter_pattern = Some(option_value(&args, i, "a pattern"));
                i += 2;
            }
            "--iterations" => {
                let value = option_value(&args, i, "a count");
                iterations = match value.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        eprintln!("Error: --iterations expects a positive integer, got {value}");
                        std::process::exit(1);
                    }
                };
                i += 2;
            }
            "--list-tests" => {
                list_tests = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                return Ok(());
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage(&args[0]);
                std::process::exit(1);
            }
        }
    }

    let mut suite = BenchmarkSuite::new(iterations);

    if list_tests {
        suite.list_tests();
        return Ok(());
    }

    if let Some(filter) = filter_pattern {
        suite.set_filter(filter);
    }

    suite.run_all(json_output, output_file)
}
