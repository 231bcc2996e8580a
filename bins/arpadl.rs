//! Chains → ARPADL action log → atomic log / features / labels CLI
//!
//! Usage:
//!   arpadl convert --input data/chains/2022.csv
//!   arpadl convert --mock --json
//!   arpadl atomic --match-id AFL_2022_F4_Geelong_Sydney
//!   arpadl features --match-id AFL_2022_F4_Geelong_Sydney
//!   arpadl labels --match-id AFL_2022_F4_Geelong_Sydney
//!   arpadl run-all --input data/chains
//!   arpadl run-all --mock

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};

use arpadl::{
    atomic::convert_to_atomic,
    config::Config,
    convert::convert_to_actions,
    ingest::{find_chain_files, group_by_match, load_chains, RawEvent},
    mock::generate_mock_chains,
    outputs::{
        fingerprint, match_dir, read_actions_parquet, write_actions_json, write_actions_parquet,
        write_atomic_parquet, write_features_parquet, write_labels_parquet, write_vocabulary,
        ACTIONS_FILE,
    },
    schema::Action,
    vaep::{features_for, labels_for},
};

const MOCK_MATCH_ID: &str = "AFL_MOCK_Home_Away";

#[derive(Parser)]
#[command(name = "arpadl")]
#[command(about = "Convert match chains into ARPADL action logs and model inputs")]
struct Cli {
    #[arg(long, default_value = "config/arpadl.toml", global = true)]
    config: String,
    /// Overrides data_dir from the config file
    #[arg(long, global = true)]
    data_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert raw chains into canonical action logs, one per match
    Convert {
        /// Chains file (.csv/.parquet) or a directory of them
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        mock: bool,
        /// Also write the log as JSON records
        #[arg(long)]
        json: bool,
    },
    /// Flatten a converted match into atomic actions
    Atomic {
        #[arg(long)]
        match_id: String,
    },
    /// Compute game-state features for a converted match
    Features {
        #[arg(long)]
        match_id: String,
    },
    /// Compute look-ahead labels for a converted match
    Labels {
        #[arg(long)]
        match_id: String,
    },
    /// Convert every match and derive all tables
    RunAll {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        mock: bool,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(&cli.config)?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    Ok(config)
}

fn load_matches(input: Option<&Path>, mock: bool, config: &Config) -> Result<Vec<(String, Vec<RawEvent>)>> {
    if mock || config.mock.enabled {
        tracing::info!("Generating mock chains (seed={})", config.mock.seed);
        return Ok(vec![(
            MOCK_MATCH_ID.to_string(),
            generate_mock_chains(MOCK_MATCH_ID, &config.mock),
        )]);
    }

    let input = input.context("--input is required unless --mock is set")?;
    let files = if input.is_dir() {
        find_chain_files(input)
    } else {
        vec![input.to_path_buf()]
    };
    if files.is_empty() {
        anyhow::bail!("No chain files found under {:?}", input);
    }

    let mut events = Vec::new();
    for file in &files {
        events.extend(load_chains(file)?);
    }
    Ok(group_by_match(events))
}

fn load_match_actions(config: &Config, match_id: &str) -> Result<Vec<Action>> {
    let path = match_dir(&config.data_dir, match_id).join(ACTIONS_FILE);
    if !path.exists() {
        anyhow::bail!("Action log not found: {:?}. Run 'convert' first.", path);
    }
    read_actions_parquet(&path)
}

fn run_convert_command(config: &Config, match_id: &str, chains: &[RawEvent], json: bool) -> Result<Vec<Action>> {
    tracing::info!("Converting match {} ({} chain rows)", match_id, chains.len());
    let actions = convert_to_actions(chains, &config.synthesis)
        .with_context(|| format!("Conversion failed for match {}", match_id))?;

    write_actions_parquet(&config.data_dir, match_id, &actions)?;
    if json {
        write_actions_json(&config.data_dir, match_id, &actions)?;
    }
    tracing::info!("Match {} fingerprint {}", match_id, fingerprint(&actions)?);
    Ok(actions)
}

fn run_atomic_command(config: &Config, match_id: &str, actions: &[Action]) -> Result<usize> {
    let atomic = convert_to_atomic(actions, &config.synthesis)
        .with_context(|| format!("Atomic conversion failed for match {}", match_id))?;
    write_atomic_parquet(&config.data_dir, match_id, &atomic)?;
    Ok(atomic.len())
}

fn run_features_command(config: &Config, match_id: &str, actions: &[Action]) -> Result<usize> {
    let mut features = features_for(actions, &config.vaep)?;
    write_features_parquet(&config.data_dir, match_id, &mut features)?;
    Ok(features.width())
}

fn run_labels_command(config: &Config, match_id: &str, actions: &[Action]) -> Result<usize> {
    let mut labels = labels_for(actions, &config.vaep)?;
    write_labels_parquet(&config.data_dir, match_id, &mut labels)?;
    Ok(labels.height())
}

struct MatchSummary {
    match_id: String,
    actions: usize,
    atomic: usize,
    features: usize,
}

fn run_match_pipeline(config: &Config, match_id: &str, chains: &[RawEvent]) -> Result<MatchSummary> {
    let actions = run_convert_command(config, match_id, chains, false)?;
    let atomic = run_atomic_command(config, match_id, &actions)?;
    let features = run_features_command(config, match_id, &actions)?;
    run_labels_command(config, match_id, &actions)?;
    Ok(MatchSummary {
        match_id: match_id.to_string(),
        actions: actions.len(),
        atomic,
        features,
    })
}

async fn run_all_command(config: Config, matches: Vec<(String, Vec<RawEvent>)>) -> Result<()> {
    tracing::info!("Running full pipeline for {} matches", matches.len());
    write_vocabulary(&config.data_dir)?;
    let progress = ProgressBar::new(matches.len() as u64);

    let mut handles = Vec::with_capacity(matches.len());
    for (match_id, chains) in matches {
        let config = config.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            run_match_pipeline(&config, &match_id, &chains)
        }));
    }

    let mut summaries = Vec::with_capacity(handles.len());
    for handle in handles {
        summaries.push(handle.await??);
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!("\n=== Pipeline Summary ===");
    println!("Data dir: {}", config.data_dir);
    for s in &summaries {
        println!(
            "{}: {} actions, {} atomic actions, {} feature columns",
            s.match_id, s.actions, s.atomic, s.features
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Convert { input, mock, json } => {
            for (match_id, chains) in load_matches(input.as_deref(), mock, &config)? {
                let actions = run_convert_command(&config, &match_id, &chains, json)?;
                println!("{}: {} actions", match_id, actions.len());
            }
        }
        Commands::Atomic { match_id } => {
            let actions = load_match_actions(&config, &match_id)?;
            let count = run_atomic_command(&config, &match_id, &actions)?;
            println!("{}: {} atomic actions", match_id, count);
        }
        Commands::Features { match_id } => {
            let actions = load_match_actions(&config, &match_id)?;
            let width = run_features_command(&config, &match_id, &actions)?;
            println!("{}: {} feature columns", match_id, width);
        }
        Commands::Labels { match_id } => {
            let actions = load_match_actions(&config, &match_id)?;
            let rows = run_labels_command(&config, &match_id, &actions)?;
            println!("{}: {} label rows", match_id, rows);
        }
        Commands::RunAll { input, mock } => {
            let matches = load_matches(input.as_deref(), mock, &config)?;
            run_all_command(config, matches).await?;
        }
    }

    Ok(())
}
