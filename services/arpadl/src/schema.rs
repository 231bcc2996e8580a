//! Row types of the action logs and their table contract
//!
//! Conversion from a DataFrame is strict: the column set must match exactly,
//! values are coerced to the declared types and every row is validated.

use crate::error::{ArpadlError, SchemaError};
use crate::vocab::{ActionResult, ActionType, BodyPart};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

pub const ACTION_COLUMNS: &[&str] = &[
    "match_id",
    "period_id",
    "time_seconds",
    "team",
    "player",
    "start_x",
    "start_y",
    "end_x",
    "end_y",
    "action_type",
    "bodypart",
    "result",
];

pub const ATOMIC_ACTION_COLUMNS: &[&str] = &[
    "match_id",
    "period_id",
    "time_seconds",
    "team",
    "player",
    "x",
    "y",
    "dx",
    "dy",
    "action_type",
    "bodypart",
];

/// One row of the canonical action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub match_id: String,
    pub period_id: u8,
    pub time_seconds: f64,
    pub team: String,
    pub player: String,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub action_type: ActionType,
    pub bodypart: BodyPart,
    pub result: ActionResult,
}

impl Action {
    /// Squared distance from this action's end to `next`'s start.
    pub fn gap_sq_to(&self, next: &Action) -> f64 {
        let dx = self.end_x - next.start_x;
        let dy = self.end_y - next.start_y;
        dx * dx + dy * dy
    }

    pub fn is_shot_goal(&self) -> bool {
        self.action_type == ActionType::Shot && self.result == ActionResult::Goal
    }

    pub fn is_shot_behind(&self) -> bool {
        self.action_type == ActionType::Shot && self.result == ActionResult::Behind
    }
}

/// One row of the atomic action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicAction {
    pub match_id: String,
    pub period_id: u8,
    pub time_seconds: f64,
    pub team: String,
    pub player: String,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub action_type: ActionType,
    pub bodypart: BodyPart,
}

impl From<&Action> for AtomicAction {
    fn from(action: &Action) -> Self {
        Self {
            match_id: action.match_id.clone(),
            period_id: action.period_id,
            time_seconds: action.time_seconds,
            team: action.team.clone(),
            player: action.player.clone(),
            x: action.start_x,
            y: action.start_y,
            dx: action.end_x - action.start_x,
            dy: action.end_y - action.start_y,
            action_type: action.action_type,
            bodypart: action.bodypart,
        }
    }
}

/// Fields shared by canonical and atomic rows; enough to group, order and
/// window either log.
pub trait ActionRecord: Clone {
    fn match_id(&self) -> &str;
    fn period_id(&self) -> u8;
    fn time_seconds(&self) -> f64;
    fn team(&self) -> &str;
    fn action_type(&self) -> ActionType;
    fn bodypart(&self) -> BodyPart;
}

impl ActionRecord for Action {
    fn match_id(&self) -> &str {
        &self.match_id
    }
    fn period_id(&self) -> u8 {
        self.period_id
    }
    fn time_seconds(&self) -> f64 {
        self.time_seconds
    }
    fn team(&self) -> &str {
        &self.team
    }
    fn action_type(&self) -> ActionType {
        self.action_type
    }
    fn bodypart(&self) -> BodyPart {
        self.bodypart
    }
}

impl ActionRecord for AtomicAction {
    fn match_id(&self) -> &str {
        &self.match_id
    }
    fn period_id(&self) -> u8 {
        self.period_id
    }
    fn time_seconds(&self) -> f64 {
        self.time_seconds
    }
    fn team(&self) -> &str {
        &self.team
    }
    fn action_type(&self) -> ActionType {
        self.action_type
    }
    fn bodypart(&self) -> BodyPart {
        self.bodypart
    }
}

fn order_key<T: ActionRecord>(a: &T, b: &T) -> Ordering {
    a.match_id()
        .cmp(b.match_id())
        .then(a.period_id().cmp(&b.period_id()))
        .then(a.time_seconds().total_cmp(&b.time_seconds()))
}

/// Stable sort by (match, period, time). Ties keep their current order, which
/// is how synthesized rows spliced in after their source stay there.
pub fn sort_actions<T: ActionRecord>(rows: &mut [T]) {
    rows.sort_by(order_key);
}

pub fn is_sorted<T: ActionRecord>(rows: &[T]) -> bool {
    rows.windows(2)
        .all(|w| order_key(&w[0], &w[1]) != Ordering::Greater)
}

fn check_common(row: usize, period_id: u8, time_seconds: f64) -> Result<(), SchemaError> {
    if !(1..=4).contains(&period_id) {
        return Err(SchemaError::PeriodOutOfRange {
            row,
            period: period_id as i64,
        });
    }
    if !time_seconds.is_finite() || time_seconds < 0.0 {
        return Err(SchemaError::InvalidTime {
            row,
            time: time_seconds,
        });
    }
    Ok(())
}

fn check_coordinates(row: usize, values: [(&str, f64); 4]) -> Result<(), SchemaError> {
    for (column, value) in values {
        if value.is_nan() {
            return Err(SchemaError::InvalidValue {
                column: column.to_string(),
                row,
                value: "NaN".to_string(),
            });
        }
    }
    Ok(())
}

/// Validates a canonical action log, returning it unchanged when it conforms.
pub fn validate_actions(actions: Vec<Action>) -> Result<Vec<Action>, SchemaError> {
    for (row, a) in actions.iter().enumerate() {
        check_common(row, a.period_id, a.time_seconds)?;
        check_coordinates(
            row,
            [
                ("start_x", a.start_x),
                ("start_y", a.start_y),
                ("end_x", a.end_x),
                ("end_y", a.end_y),
            ],
        )?;
        if !a.action_type.is_standard() {
            return Err(SchemaError::ActionTypeNotAllowed {
                row,
                action_type: a.action_type.to_string(),
                vocabulary: "canonical",
            });
        }
    }
    Ok(actions)
}

/// Validates an atomic action log, returning it unchanged when it conforms.
pub fn validate_atomic_actions(actions: Vec<AtomicAction>) -> Result<Vec<AtomicAction>, SchemaError> {
    for (row, a) in actions.iter().enumerate() {
        check_common(row, a.period_id, a.time_seconds)?;
        check_coordinates(row, [("x", a.x), ("y", a.y), ("dx", a.dx), ("dy", a.dy)])?;
    }
    Ok(actions)
}

pub fn actions_to_frame(actions: &[Action]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new("match_id", actions.iter().map(|a| a.match_id.as_str()).collect::<Vec<_>>()),
        Series::new("period_id", actions.iter().map(|a| a.period_id as i64).collect::<Vec<_>>()),
        Series::new("time_seconds", actions.iter().map(|a| a.time_seconds).collect::<Vec<_>>()),
        Series::new("team", actions.iter().map(|a| a.team.as_str()).collect::<Vec<_>>()),
        Series::new("player", actions.iter().map(|a| a.player.as_str()).collect::<Vec<_>>()),
        Series::new("start_x", actions.iter().map(|a| a.start_x).collect::<Vec<_>>()),
        Series::new("start_y", actions.iter().map(|a| a.start_y).collect::<Vec<_>>()),
        Series::new("end_x", actions.iter().map(|a| a.end_x).collect::<Vec<_>>()),
        Series::new("end_y", actions.iter().map(|a| a.end_y).collect::<Vec<_>>()),
        Series::new("action_type", actions.iter().map(|a| a.action_type.as_str()).collect::<Vec<_>>()),
        Series::new("bodypart", actions.iter().map(|a| a.bodypart.as_str()).collect::<Vec<_>>()),
        Series::new("result", actions.iter().map(|a| a.result.as_str()).collect::<Vec<_>>()),
    ])
}

pub fn atomic_actions_to_frame(actions: &[AtomicAction]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new("match_id", actions.iter().map(|a| a.match_id.as_str()).collect::<Vec<_>>()),
        Series::new("period_id", actions.iter().map(|a| a.period_id as i64).collect::<Vec<_>>()),
        Series::new("time_seconds", actions.iter().map(|a| a.time_seconds).collect::<Vec<_>>()),
        Series::new("team", actions.iter().map(|a| a.team.as_str()).collect::<Vec<_>>()),
        Series::new("player", actions.iter().map(|a| a.player.as_str()).collect::<Vec<_>>()),
        Series::new("x", actions.iter().map(|a| a.x).collect::<Vec<_>>()),
        Series::new("y", actions.iter().map(|a| a.y).collect::<Vec<_>>()),
        Series::new("dx", actions.iter().map(|a| a.dx).collect::<Vec<_>>()),
        Series::new("dy", actions.iter().map(|a| a.dy).collect::<Vec<_>>()),
        Series::new("action_type", actions.iter().map(|a| a.action_type.as_str()).collect::<Vec<_>>()),
        Series::new("bodypart", actions.iter().map(|a| a.bodypart.as_str()).collect::<Vec<_>>()),
    ])
}

/// Reads a canonical action log back from a frame, rejecting extra or missing
/// columns and any row that breaks the contract.
pub fn actions_from_frame(df: &DataFrame) -> Result<Vec<Action>, ArpadlError> {
    check_columns(df, ACTION_COLUMNS)?;

    let match_id = string_values(df, "match_id")?;
    let period_id = period_values(df)?;
    let time_seconds = float_values(df, "time_seconds")?;
    let team = string_values(df, "team")?;
    let player = string_values(df, "player")?;
    let start_x = float_values(df, "start_x")?;
    let start_y = float_values(df, "start_y")?;
    let end_x = float_values(df, "end_x")?;
    let end_y = float_values(df, "end_y")?;
    let action_type: Vec<ActionType> = parse_values(df, "action_type")?;
    let bodypart: Vec<BodyPart> = parse_values(df, "bodypart")?;
    let result: Vec<ActionResult> = parse_values(df, "result")?;

    let actions = (0..df.height())
        .map(|i| Action {
            match_id: match_id[i].clone(),
            period_id: period_id[i],
            time_seconds: time_seconds[i],
            team: team[i].clone(),
            player: player[i].clone(),
            start_x: start_x[i],
            start_y: start_y[i],
            end_x: end_x[i],
            end_y: end_y[i],
            action_type: action_type[i],
            bodypart: bodypart[i],
            result: result[i],
        })
        .collect();

    Ok(validate_actions(actions)?)
}

pub fn atomic_actions_from_frame(df: &DataFrame) -> Result<Vec<AtomicAction>, ArpadlError> {
    check_columns(df, ATOMIC_ACTION_COLUMNS)?;

    let match_id = string_values(df, "match_id")?;
    let period_id = period_values(df)?;
    let time_seconds = float_values(df, "time_seconds")?;
    let team = string_values(df, "team")?;
    let player = string_values(df, "player")?;
    let x = float_values(df, "x")?;
    let y = float_values(df, "y")?;
    let dx = float_values(df, "dx")?;
    let dy = float_values(df, "dy")?;
    let action_type: Vec<ActionType> = parse_values(df, "action_type")?;
    let bodypart: Vec<BodyPart> = parse_values(df, "bodypart")?;

    let actions = (0..df.height())
        .map(|i| AtomicAction {
            match_id: match_id[i].clone(),
            period_id: period_id[i],
            time_seconds: time_seconds[i],
            team: team[i].clone(),
            player: player[i].clone(),
            x: x[i],
            y: y[i],
            dx: dx[i],
            dy: dy[i],
            action_type: action_type[i],
            bodypart: bodypart[i],
        })
        .collect();

    Ok(validate_atomic_actions(actions)?)
}

fn check_columns(df: &DataFrame, expected: &[&str]) -> Result<(), SchemaError> {
    let present = df.get_column_names();
    if let Some(extra) = present.iter().find(|c| !expected.contains(*c)) {
        return Err(SchemaError::UnknownColumn(extra.to_string()));
    }
    if let Some(missing) = expected.iter().find(|c| !present.contains(*c)) {
        return Err(SchemaError::MissingColumn(missing.to_string()));
    }
    Ok(())
}

pub(crate) fn string_values(df: &DataFrame, name: &str) -> Result<Vec<String>, ArpadlError> {
    let series = df.column(name)?.cast(&DataType::String)?;
    let values = series.str()?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(str::to_string).ok_or_else(|| {
                SchemaError::NullValue {
                    column: name.to_string(),
                    row,
                }
                .into()
            })
        })
        .collect()
}

pub(crate) fn float_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, ArpadlError> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    let values = series.f64()?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                SchemaError::NullValue {
                    column: name.to_string(),
                    row,
                }
                .into()
            })
        })
        .collect()
}

fn period_values(df: &DataFrame) -> Result<Vec<u8>, ArpadlError> {
    let series = df.column("period_id")?.cast(&DataType::Int64)?;
    let values = series.i64()?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| -> Result<u8, ArpadlError> {
            let period = v.ok_or_else(|| SchemaError::NullValue {
                column: "period_id".to_string(),
                row,
            })?;
            if !(1..=4).contains(&period) {
                return Err(SchemaError::PeriodOutOfRange { row, period }.into());
            }
            Ok(period as u8)
        })
        .collect()
}

fn parse_values<T: FromStr>(df: &DataFrame, name: &str) -> Result<Vec<T>, ArpadlError> {
    string_values(df, name)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.parse::<T>().map_err(|_| {
                SchemaError::InvalidValue {
                    column: name.to_string(),
                    row,
                    value: v.clone(),
                }
                .into()
            })
        })
        .collect()
}
