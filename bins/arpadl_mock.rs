//! Writes a synthetic chains export so the pipeline can run without feed access
//!
//! Usage:
//!   arpadl_mock --output data/chains/mock.csv
//!   arpadl_mock --output data/chains/mock.parquet --matches 4 --seed 7

use anyhow::Result;
use arpadl::config::MockConfig;
use arpadl::ingest::write_chains;
use arpadl::mock::generate_mock_chains;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arpadl_mock")]
#[command(about = "Generate mock match chains")]
struct Cli {
    #[arg(long, default_value = "data/chains/mock.csv")]
    output: PathBuf,
    #[arg(long, default_value = "1")]
    matches: u64,
    #[arg(long, default_value = "42")]
    seed: u64,
    #[arg(long, default_value = "120")]
    events_per_period: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut events = Vec::new();
    for i in 0..cli.matches {
        let config = MockConfig {
            enabled: true,
            seed: cli.seed + i,
            events_per_period: cli.events_per_period,
        };
        events.extend(generate_mock_chains(&format!("AFL_MOCK_{}", i + 1), &config));
    }

    write_chains(&cli.output, &events)?;
    println!("Wrote {} chain rows for {} matches to {:?}", events.len(), cli.matches, cli.output);
    Ok(())
}
