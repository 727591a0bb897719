//! End-to-end reference run.
//!
//! Demonstrates: build config → run one worker per thread → write a text
//! snapshot every 10 iterations → report per-worker metrics.
//!
//! Usage: `cargo run --example reference_run -- [output_dir] [workers]`

use ember_bench::reference_profile;
use ember_engine::run_cluster;
use ember_snapshot::TextFileWriter;

fn main() {
    let mut args = std::env::args().skip(1);
    let dir = args.next().unwrap_or_else(|| "snapshots".into());
    let workers = args.next().and_then(|w| w.parse().ok()).unwrap_or(4);

    println!("=== Ember reference run ===\n");
    let config = reference_profile(workers);
    let writer = match TextFileWriter::create(&dir) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("cannot use {dir}: {e}");
            std::process::exit(1);
        }
    };

    match run_cluster(&config, |_| writer.clone()) {
        Ok(outcome) => {
            for report in outcome.reports() {
                let m = &report.metrics;
                println!(
                    "worker {}: {} iterations, exchange {} us, sweep {} us, {} snapshots ({} failed)",
                    report.worker,
                    report.iterations,
                    m.exchange_us,
                    m.sweep_us,
                    m.snapshots_written,
                    m.snapshots_failed,
                );
            }
            println!("\nsnapshots written to {dir}/");
        }
        Err(e) => {
            eprintln!("run failed: {e}");
            std::process::exit(1);
        }
    }
}
