//! Raw match-chain ingestion from CSV / Parquet exports of the feed

use crate::error::{ArpadlError, SchemaError};
use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One row of a match chain as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub match_id: String,
    pub period_number: u8,
    pub team: Option<String>,
    pub team_chain: Option<String>,
    pub player: Option<String>,
    pub period_duration: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub description: Option<String>,
    pub disposal: Option<String>,
    pub shot_at_goal: bool,
    pub final_state: Option<String>,
    pub home_team_direction_q1: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
}

pub const CHAIN_COLUMNS: &[&str] = &[
    "Match_ID",
    "Period_Number",
    "Team",
    "Team_Chain",
    "Player",
    "Period_Duration",
    "x",
    "y",
    "Description",
    "Disposal",
    "Shot_At_Goal",
    "Final_State",
    "Home_Team_Direction_Q1",
    "Home_Team",
    "Away_Team",
];

/// Reads raw events out of a chains frame. Columns beyond [`CHAIN_COLUMNS`]
/// are ignored; the feed ships many more than the converter needs.
pub fn chains_from_frame(df: &DataFrame) -> Result<Vec<RawEvent>, ArpadlError> {
    let present = df.get_column_names();
    if let Some(missing) = CHAIN_COLUMNS.iter().find(|c| !present.contains(*c)) {
        return Err(SchemaError::MissingColumn(missing.to_string()).into());
    }

    let match_id = optional_strings(df, "Match_ID")?;
    let period = optional_ints(df, "Period_Number")?;
    let team = optional_strings(df, "Team")?;
    let team_chain = optional_strings(df, "Team_Chain")?;
    let player = optional_strings(df, "Player")?;
    let period_duration = optional_floats(df, "Period_Duration")?;
    let x = optional_floats(df, "x")?;
    let y = optional_floats(df, "y")?;
    let description = optional_strings(df, "Description")?;
    let disposal = optional_strings(df, "Disposal")?;
    let shot_at_goal = optional_strings(df, "Shot_At_Goal")?;
    let final_state = optional_strings(df, "Final_State")?;
    let direction = optional_strings(df, "Home_Team_Direction_Q1")?;
    let home_team = optional_strings(df, "Home_Team")?;
    let away_team = optional_strings(df, "Away_Team")?;

    let mut events = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let match_id = match_id[row].clone().ok_or_else(|| SchemaError::NullValue {
            column: "Match_ID".to_string(),
            row,
        })?;
        let period_number = period[row]
            .ok_or_else(|| SchemaError::NullValue {
                column: "Period_Number".to_string(),
                row,
            })
            .and_then(|p| {
                u8::try_from(p).map_err(|_| SchemaError::InvalidValue {
                    column: "Period_Number".to_string(),
                    row,
                    value: p.to_string(),
                })
            })?;

        events.push(RawEvent {
            match_id,
            period_number,
            team: team[row].clone(),
            team_chain: team_chain[row].clone(),
            player: player[row].clone(),
            period_duration: period_duration[row],
            x: x[row],
            y: y[row],
            description: description[row].clone(),
            disposal: disposal[row].clone(),
            shot_at_goal: shot_at_goal[row]
                .as_deref()
                .map(|s| s.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            final_state: final_state[row].clone(),
            home_team_direction_q1: direction[row].clone(),
            home_team: home_team[row].clone(),
            away_team: away_team[row].clone(),
        });
    }

    Ok(events)
}

fn optional_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, ArpadlError> {
    let series = df.column(name)?.cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

fn optional_floats(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, ArpadlError> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|f| !f.is_nan()))
        .collect())
}

fn optional_ints(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, ArpadlError> {
    let series = df.column(name)?.cast(&DataType::Int64)?;
    Ok(series.i64()?.into_iter().collect())
}

/// The inverse of [`chains_from_frame`], used to export generated chains.
pub fn chains_to_frame(events: &[RawEvent]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new("Match_ID", events.iter().map(|e| e.match_id.as_str()).collect::<Vec<_>>()),
        Series::new("Period_Number", events.iter().map(|e| e.period_number as i64).collect::<Vec<_>>()),
        Series::new("Team", events.iter().map(|e| e.team.as_deref()).collect::<Vec<_>>()),
        Series::new("Team_Chain", events.iter().map(|e| e.team_chain.as_deref()).collect::<Vec<_>>()),
        Series::new("Player", events.iter().map(|e| e.player.as_deref()).collect::<Vec<_>>()),
        Series::new("Period_Duration", events.iter().map(|e| e.period_duration).collect::<Vec<_>>()),
        Series::new("x", events.iter().map(|e| e.x).collect::<Vec<_>>()),
        Series::new("y", events.iter().map(|e| e.y).collect::<Vec<_>>()),
        Series::new("Description", events.iter().map(|e| e.description.as_deref()).collect::<Vec<_>>()),
        Series::new("Disposal", events.iter().map(|e| e.disposal.as_deref()).collect::<Vec<_>>()),
        Series::new("Shot_At_Goal", events.iter().map(|e| e.shot_at_goal).collect::<Vec<_>>()),
        Series::new("Final_State", events.iter().map(|e| e.final_state.as_deref()).collect::<Vec<_>>()),
        Series::new(
            "Home_Team_Direction_Q1",
            events.iter().map(|e| e.home_team_direction_q1.as_deref()).collect::<Vec<_>>(),
        ),
        Series::new("Home_Team", events.iter().map(|e| e.home_team.as_deref()).collect::<Vec<_>>()),
        Series::new("Away_Team", events.iter().map(|e| e.away_team.as_deref()).collect::<Vec<_>>()),
    ])
}

/// Writes chains as `.csv` or `.parquet` depending on the extension.
pub fn write_chains(path: &Path, events: &[RawEvent]) -> Result<()> {
    let mut df = chains_to_frame(events)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    match path.extension().and_then(|s| s.to_str()) {
        Some("parquet") => ParquetWriter::new(file).finish(&mut df).map(|_| ())?,
        Some("csv") => CsvWriter::new(file).finish(&mut df)?,
        _ => anyhow::bail!("Unsupported chains file (expected .csv or .parquet): {:?}", path),
    }
    tracing::info!("Wrote {} chain rows to {:?}", events.len(), path);
    Ok(())
}

/// Loads a chains export (`.csv` or `.parquet`).
pub fn load_chains(path: &Path) -> Result<Vec<RawEvent>> {
    let ext = path.extension().and_then(|s| s.to_str());
    let df = match ext {
        Some("parquet") => {
            // Read Parquet file directly (avoid Hive partition schema conflicts)
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open parquet: {:?}", path))?;
            ParquetReader::new(file)
                .finish()
                .with_context(|| format!("Failed to read parquet: {:?}", path))?
        }
        Some("csv") => LazyCsvReader::new(path)
            .finish()
            .and_then(|lf| lf.collect())
            .with_context(|| format!("Failed to read CSV: {:?}", path))?,
        _ => anyhow::bail!("Unsupported chains file (expected .csv or .parquet): {:?}", path),
    };

    let events = chains_from_frame(&df)
        .with_context(|| format!("Invalid chains file: {:?}", path))?;
    tracing::info!("Loaded {} chain rows from {:?}", events.len(), path);
    Ok(events)
}

/// Finds every chains export below `dir`, sorted by path.
pub fn find_chain_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "csv" || ext == "parquet")
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Splits a multi-match batch into per-match batches, in order of first
/// appearance. Row order inside a match is preserved.
pub fn group_by_match(events: Vec<RawEvent>) -> Vec<(String, Vec<RawEvent>)> {
    let mut groups: Vec<(String, Vec<RawEvent>)> = Vec::new();
    for event in events {
        match groups.iter_mut().find(|(id, _)| *id == event.match_id) {
            Some((_, rows)) => rows.push(event),
            None => groups.push((event.match_id.clone(), vec![event])),
        }
    }
    groups
}
