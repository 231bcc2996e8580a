//! Output writing for the action-log pipeline (Parquet and JSON records)

use crate::schema::{
    actions_from_frame, actions_to_frame, atomic_actions_from_frame, atomic_actions_to_frame,
    Action, AtomicAction,
};
use crate::vocab::{actiontypes_frame, atomic_actiontypes_frame, bodyparts_frame, results_frame};
use anyhow::{Context, Result};
use polars::prelude::*;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

pub const ACTIONS_FILE: &str = "actions.parquet";
pub const ATOMIC_FILE: &str = "atomic_actions.parquet";
pub const FEATURES_FILE: &str = "features.parquet";
pub const LABELS_FILE: &str = "labels.parquet";
pub const ACTIONS_JSON_FILE: &str = "actions.json";

/// `<data_dir>/arpadl/match=<id>`
pub fn match_dir(data_dir: &str, match_id: &str) -> PathBuf {
    Path::new(data_dir)
        .join("arpadl")
        .join(format!("match={}", match_id))
}

fn write_frame(data_dir: &str, match_id: &str, file_name: &str, df: &mut DataFrame) -> Result<PathBuf> {
    let dir = match_dir(data_dir, match_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output dir {:?}", dir))?;

    let path = dir.join(file_name);
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {:?}", path))?;
    ParquetWriter::new(file).finish(df)?;

    tracing::info!("Wrote {} rows to {:?}", df.height(), path);
    Ok(path)
}

fn read_frame(path: &Path) -> Result<DataFrame> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open parquet: {:?}", path))?;
    ParquetReader::new(file)
        .finish()
        .with_context(|| format!("Failed to read parquet: {:?}", path))
}

pub fn write_actions_parquet(data_dir: &str, match_id: &str, actions: &[Action]) -> Result<PathBuf> {
    let mut df = actions_to_frame(actions)?;
    write_frame(data_dir, match_id, ACTIONS_FILE, &mut df)
}

pub fn write_atomic_parquet(data_dir: &str, match_id: &str, actions: &[AtomicAction]) -> Result<PathBuf> {
    let mut df = atomic_actions_to_frame(actions)?;
    write_frame(data_dir, match_id, ATOMIC_FILE, &mut df)
}

pub fn write_features_parquet(data_dir: &str, match_id: &str, features: &mut DataFrame) -> Result<PathBuf> {
    write_frame(data_dir, match_id, FEATURES_FILE, features)
}

pub fn write_labels_parquet(data_dir: &str, match_id: &str, labels: &mut DataFrame) -> Result<PathBuf> {
    write_frame(data_dir, match_id, LABELS_FILE, labels)
}

/// Id/name tables of the closed vocabularies, written once per data dir.
pub fn write_vocabulary(data_dir: &str) -> Result<()> {
    let dir = Path::new(data_dir).join("arpadl");
    std::fs::create_dir_all(&dir)?;
    let tables = [
        ("actiontypes.parquet", actiontypes_frame()?),
        ("atomic_actiontypes.parquet", atomic_actiontypes_frame()?),
        ("bodyparts.parquet", bodyparts_frame()?),
        ("results.parquet", results_frame()?),
    ];
    for (name, mut df) in tables {
        let path = dir.join(name);
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {:?}", path))?;
        ParquetWriter::new(file).finish(&mut df)?;
    }
    tracing::info!("Wrote vocabulary tables to {:?}", dir);
    Ok(())
}

/// Reads and re-validates a canonical log written by [`write_actions_parquet`].
pub fn read_actions_parquet(path: &Path) -> Result<Vec<Action>> {
    let df = read_frame(path)?;
    actions_from_frame(&df).with_context(|| format!("Invalid action table: {:?}", path))
}

pub fn read_atomic_parquet(path: &Path) -> Result<Vec<AtomicAction>> {
    let df = read_frame(path)?;
    atomic_actions_from_frame(&df).with_context(|| format!("Invalid atomic table: {:?}", path))
}

/// The log as a JSON array with one object per action.
pub fn actions_to_json_records(actions: &[Action]) -> serde_json::Result<String> {
    serde_json::to_string(actions)
}

pub fn write_actions_json(data_dir: &str, match_id: &str, actions: &[Action]) -> Result<PathBuf> {
    let dir = match_dir(data_dir, match_id);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(ACTIONS_JSON_FILE);
    std::fs::write(&path, actions_to_json_records(actions)?)
        .with_context(|| format!("Failed to write {:?}", path))?;
    tracing::info!("Wrote {} action records to {:?}", actions.len(), path);
    Ok(path)
}

/// SHA256 of the JSON records; equal logs give equal fingerprints.
pub fn fingerprint(actions: &[Action]) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(actions_to_json_records(actions)?.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::synth::tests::action;
    use crate::vocab::ActionType;
    use tempfile::TempDir;

    fn actions() -> Vec<Action> {
        vec![
            action(1, 1.0, "Geelong", ActionType::Gather, (0.0, 0.0), (0.0, 0.0)),
            action(1, 4.0, "Geelong", ActionType::Kick, (10.0, 0.0), (40.0, 0.0)),
        ]
    }

    #[test]
    fn test_write_and_read_actions() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().to_str().unwrap();

        let path = write_actions_parquet(data_dir, "m1", &actions()).unwrap();
        assert_eq!(path, temp_dir.path().join("arpadl/match=m1/actions.parquet"));
        assert_eq!(read_actions_parquet(&path).unwrap(), actions());
    }

    #[test]
    fn test_write_and_read_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().to_str().unwrap();

        let atomic: Vec<AtomicAction> = actions().iter().map(AtomicAction::from).collect();
        let path = write_atomic_parquet(data_dir, "m1", &atomic).unwrap();
        assert_eq!(read_atomic_parquet(&path).unwrap(), atomic);
    }

    #[test]
    fn test_write_vocabulary() {
        let temp_dir = TempDir::new().unwrap();
        write_vocabulary(temp_dir.path().to_str().unwrap()).unwrap();
        let path = temp_dir.path().join("arpadl/atomic_actiontypes.parquet");
        let df = read_frame(&path).unwrap();
        assert_eq!(df.height(), 30);
        assert_eq!(df.get_column_names(), vec!["type_id", "type_name"]);
    }

    #[test]
    fn test_json_records() {
        let json = actions_to_json_records(&actions()).unwrap();
        let records: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["action_type"], "kick");
        assert_eq!(records[1]["bodypart"], "hand");
        assert_eq!(records[1]["end_x"], 40.0);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint(&actions()).unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, fingerprint(&actions()).unwrap());

        let mut changed = actions();
        changed[1].end_x = 41.0;
        assert_ne!(a, fingerprint(&changed).unwrap());
    }
}
