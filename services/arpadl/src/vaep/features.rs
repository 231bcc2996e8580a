//! Feature transformers for action-value models
//!
//! A simple transformer looks at one action table and is lifted over a game
//! state with [`simple`], which suffixes its columns with the table offset
//! (`_a0`, `_a1`, ...). A state transformer sees the whole game state and
//! compares the focal action with its predecessors.

use crate::groups::GroupedView;
use crate::schema::Action;
use crate::vocab::{ActionResult, ActionType, BodyPart, FIELD_LENGTH};
use polars::prelude::*;
use std::collections::HashMap;

pub type FeatureTransformer = Box<dyn Fn(&[Vec<Action>]) -> PolarsResult<DataFrame> + Send + Sync>;

/// Lifts a per-table feature function over every table of a game state.
pub fn simple(transformer: fn(&[Action]) -> PolarsResult<DataFrame>) -> FeatureTransformer {
    Box::new(move |states: &[Vec<Action>]| {
        let mut columns = Vec::new();
        for (i, actions) in states.iter().enumerate() {
            for series in transformer(actions)?.get_columns() {
                let mut series = series.clone();
                let name = format!("{}_a{}", series.name(), i);
                series.rename(&name);
                columns.push(series);
            }
        }
        DataFrame::new(columns)
    })
}

fn state(transformer: fn(&[Vec<Action>]) -> PolarsResult<DataFrame>) -> FeatureTransformer {
    Box::new(transformer)
}

pub fn actiontype_onehot(actions: &[Action]) -> PolarsResult<DataFrame> {
    DataFrame::new(
        ActionType::STANDARD
            .iter()
            .map(|t| {
                Series::new(
                    &format!("actiontype_{}", t),
                    actions.iter().map(|a| a.action_type == *t).collect::<Vec<bool>>(),
                )
            })
            .collect(),
    )
}

pub fn result_onehot(actions: &[Action]) -> PolarsResult<DataFrame> {
    DataFrame::new(
        ActionResult::ALL
            .iter()
            .map(|r| {
                Series::new(
                    &format!("result_{}", r),
                    actions.iter().map(|a| a.result == *r).collect::<Vec<bool>>(),
                )
            })
            .collect(),
    )
}

pub fn actiontype_result_onehot(actions: &[Action]) -> PolarsResult<DataFrame> {
    let mut columns = Vec::with_capacity(ActionType::STANDARD.len() * ActionResult::ALL.len());
    for t in ActionType::STANDARD {
        for r in ActionResult::ALL {
            columns.push(Series::new(
                &format!("actiontype_{}_result_{}", t, r),
                actions
                    .iter()
                    .map(|a| a.action_type == *t && a.result == *r)
                    .collect::<Vec<bool>>(),
            ));
        }
    }
    DataFrame::new(columns)
}

pub fn bodypart_onehot(actions: &[Action]) -> PolarsResult<DataFrame> {
    DataFrame::new(
        BodyPart::ALL
            .iter()
            .map(|b| {
                Series::new(
                    &format!("bodypart_{}", b),
                    actions.iter().map(|a| a.bodypart == *b).collect::<Vec<bool>>(),
                )
            })
            .collect(),
    )
}

pub fn startlocation(actions: &[Action]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new("start_x", actions.iter().map(|a| a.start_x).collect::<Vec<_>>()),
        Series::new("start_y", actions.iter().map(|a| a.start_y).collect::<Vec<_>>()),
    ])
}

pub fn endlocation(actions: &[Action]) -> PolarsResult<DataFrame> {
    DataFrame::new(vec![
        Series::new("end_x", actions.iter().map(|a| a.end_x).collect::<Vec<_>>()),
        Series::new("end_y", actions.iter().map(|a| a.end_y).collect::<Vec<_>>()),
    ])
}

/// Distance and angle to the centre of the attacked goal.
fn polar(x: f64, y: f64) -> (f64, f64) {
    let dx = (FIELD_LENGTH / 2.0 - x).abs();
    let dy = y.abs();
    let angle = if dx == 0.0 { 0.0 } else { (dy / dx).atan() };
    (dx.hypot(dy), angle)
}

fn polar_frame(prefix: &str, points: impl Iterator<Item = (f64, f64)>) -> PolarsResult<DataFrame> {
    let (dist, angle): (Vec<f64>, Vec<f64>) = points.map(|(x, y)| polar(x, y)).unzip();
    DataFrame::new(vec![
        Series::new(&format!("{}_dist_to_goal", prefix), dist),
        Series::new(&format!("{}_angle_to_goal", prefix), angle),
    ])
}

pub fn startpolar(actions: &[Action]) -> PolarsResult<DataFrame> {
    polar_frame("start", actions.iter().map(|a| (a.start_x, a.start_y)))
}

pub fn endpolar(actions: &[Action]) -> PolarsResult<DataFrame> {
    polar_frame("end", actions.iter().map(|a| (a.end_x, a.end_y)))
}

pub fn movement(actions: &[Action]) -> PolarsResult<DataFrame> {
    let dx: Vec<f64> = actions.iter().map(|a| a.end_x - a.start_x).collect();
    let dy: Vec<f64> = actions.iter().map(|a| a.end_y - a.start_y).collect();
    let mov: Vec<f64> = dx.iter().zip(&dy).map(|(x, y)| x.hypot(*y)).collect();
    DataFrame::new(vec![
        Series::new("dx", dx),
        Series::new("dy", dy),
        Series::new("movement", mov),
    ])
}

/// Seconds the player has held the ball: the length of their own carry right
/// before the action, zero otherwise.
pub fn player_possession_time(actions: &[Action]) -> PolarsResult<DataFrame> {
    let view = GroupedView::by_period(actions);
    let values: Vec<f64> = (0..actions.len())
        .map(|i| match view.prev(i, 1) {
            Some(p)
                if actions[p].action_type == ActionType::Carry
                    && actions[p].player == actions[i].player =>
            {
                actions[i].time_seconds - actions[p].time_seconds
            }
            _ => 0.0,
        })
        .collect();
    DataFrame::new(vec![Series::new("player_possession_time", values)])
}

/// Whether each predecessor was made by the focal action's team.
pub fn team(states: &[Vec<Action>]) -> PolarsResult<DataFrame> {
    let Some((a0, rest)) = states.split_first() else {
        return Ok(DataFrame::empty());
    };
    DataFrame::new(
        rest.iter()
            .enumerate()
            .map(|(k, ai)| {
                Series::new(
                    &format!("team_{}", k + 1),
                    a0.iter().zip(ai).map(|(x, y)| x.team == y.team).collect::<Vec<bool>>(),
                )
            })
            .collect(),
    )
}

pub fn time_delta(states: &[Vec<Action>]) -> PolarsResult<DataFrame> {
    let Some((a0, rest)) = states.split_first() else {
        return Ok(DataFrame::empty());
    };
    DataFrame::new(
        rest.iter()
            .enumerate()
            .map(|(k, ai)| {
                Series::new(
                    &format!("time_delta_{}", k + 1),
                    a0.iter()
                        .zip(ai)
                        .map(|(x, y)| x.time_seconds - y.time_seconds)
                        .collect::<Vec<f64>>(),
                )
            })
            .collect(),
    )
}

/// Displacement from where each predecessor ended to where the focal
/// action starts.
pub fn space_delta(states: &[Vec<Action>]) -> PolarsResult<DataFrame> {
    let Some((a0, rest)) = states.split_first() else {
        return Ok(DataFrame::empty());
    };
    let mut columns = Vec::with_capacity(rest.len() * 3);
    for (k, ai) in rest.iter().enumerate() {
        let dx: Vec<f64> = a0.iter().zip(ai).map(|(x, y)| y.end_x - x.start_x).collect();
        let dy: Vec<f64> = a0.iter().zip(ai).map(|(x, y)| y.end_y - x.start_y).collect();
        let mov: Vec<f64> = dx.iter().zip(&dy).map(|(x, y)| x.hypot(*y)).collect();
        columns.push(Series::new(&format!("dx_a0{}", k + 1), dx));
        columns.push(Series::new(&format!("dy_a0{}", k + 1), dy));
        columns.push(Series::new(&format!("mov_a0{}", k + 1), mov));
    }
    DataFrame::new(columns)
}

const MIN_TIME_DELTA: f64 = 1e-6;

/// Ball speed between each predecessor's end and the focal action's start.
pub fn speed(states: &[Vec<Action>]) -> PolarsResult<DataFrame> {
    let Some((a0, rest)) = states.split_first() else {
        return Ok(DataFrame::empty());
    };
    let mut columns = Vec::with_capacity(rest.len() * 3);
    for (k, ai) in rest.iter().enumerate() {
        let mut speedx = Vec::with_capacity(a0.len());
        let mut speedy = Vec::with_capacity(a0.len());
        let mut speed = Vec::with_capacity(a0.len());
        for (x, y) in a0.iter().zip(ai) {
            let dt = (x.time_seconds - y.time_seconds).max(MIN_TIME_DELTA);
            let dx = x.start_x - y.end_x;
            let dy = x.start_y - y.end_y;
            speedx.push(dx.abs() / dt);
            speedy.push(dy.abs() / dt);
            speed.push(dx.hypot(dy) / dt);
        }
        columns.push(Series::new(&format!("speedx_a0{}", k + 1), speedx));
        columns.push(Series::new(&format!("speedy_a0{}", k + 1), speedy));
        columns.push(Series::new(&format!("speed_a0{}", k + 1), speed));
    }
    DataFrame::new(columns)
}

/// Goals kicked so far in the match by the focal team and its opponent,
/// not counting the focal action itself.
pub fn goalscore(states: &[Vec<Action>]) -> PolarsResult<DataFrame> {
    let Some(actions) = states.first() else {
        return Ok(DataFrame::empty());
    };
    let mut own = vec![0i64; actions.len()];
    let mut opponent = vec![0i64; actions.len()];

    let view = GroupedView::by_match(actions);
    for rows in view.groups() {
        let mut by_team: HashMap<&str, i64> = HashMap::new();
        let mut total = 0i64;
        for &row in rows {
            let team = actions[row].team.as_str();
            let team_goals = by_team.get(team).copied().unwrap_or(0);
            own[row] = team_goals;
            opponent[row] = total - team_goals;
            if actions[row].is_shot_goal() {
                *by_team.entry(team).or_insert(0) += 1;
                total += 1;
            }
        }
    }

    let diff: Vec<i64> = own.iter().zip(&opponent).map(|(a, b)| a - b).collect();
    DataFrame::new(vec![
        Series::new("goalscore_team", own),
        Series::new("goalscore_opponent", opponent),
        Series::new("goalscore_diff", diff),
    ])
}

pub fn default_transformers() -> Vec<FeatureTransformer> {
    vec![
        simple(actiontype_onehot),
        simple(result_onehot),
        simple(actiontype_result_onehot),
        simple(bodypart_onehot),
        simple(startlocation),
        simple(endlocation),
        simple(startpolar),
        simple(endpolar),
        simple(movement),
        simple(player_possession_time),
        state(team),
        state(time_delta),
        state(space_delta),
        state(speed),
        state(goalscore),
    ]
}

/// Runs every transformer over the game state and joins the results side by
/// side, one row per focal action.
pub fn compute_features(
    states: &[Vec<Action>],
    transformers: &[FeatureTransformer],
) -> PolarsResult<DataFrame> {
    let mut columns = Vec::new();
    for transformer in transformers {
        columns.extend(transformer(states)?.get_columns().iter().cloned());
    }
    DataFrame::new(columns)
}

/// Column names the transformers produce for a game state of the given
/// length, derived by running them on a one-row placeholder state.
pub fn feature_column_names(
    transformers: &[FeatureTransformer],
    nb_prev_actions: usize,
) -> PolarsResult<Vec<String>> {
    let placeholder = Action {
        match_id: String::new(),
        period_id: 1,
        time_seconds: 0.0,
        team: String::new(),
        player: String::new(),
        start_x: 0.0,
        start_y: 0.0,
        end_x: 0.0,
        end_y: 0.0,
        action_type: ActionType::Kick,
        bodypart: BodyPart::Foot,
        result: ActionResult::Success,
    };
    let states = vec![vec![placeholder]; nb_prev_actions];
    let df = compute_features(&states, transformers)?;
    Ok(df
        .get_column_names()
        .into_iter()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::synth::tests::action;
    use crate::vaep::gamestates::gamestates;

    fn log() -> Vec<Action> {
        let mut shot = action(1, 30.0, "Geelong", ActionType::Shot, (60.0, 0.0), (82.5, 0.0));
        shot.result = ActionResult::Goal;
        shot.bodypart = BodyPart::Foot;
        vec![
            action(1, 10.0, "Geelong", ActionType::Gather, (0.0, 0.0), (0.0, 0.0)),
            action(1, 12.0, "Geelong", ActionType::Kick, (3.0, 4.0), (40.0, 0.0)),
            shot,
            action(1, 60.0, "Sydney", ActionType::Kickin, (-82.5, 0.0), (-40.0, 0.0)),
        ]
    }

    #[test]
    fn test_onehot_columns_cover_whole_vocabulary() {
        let df = actiontype_onehot(&log()[..1]).unwrap();
        assert_eq!(df.width(), ActionType::STANDARD.len());
        assert!(df.column("actiontype_carry").is_ok());
        let gathers = df.column("actiontype_gather").unwrap().bool().unwrap().get(0);
        assert_eq!(gathers, Some(true));

        assert_eq!(result_onehot(&[]).unwrap().width(), 5);
        assert_eq!(bodypart_onehot(&[]).unwrap().width(), 2);
        assert_eq!(
            actiontype_result_onehot(&[]).unwrap().width(),
            ActionType::STANDARD.len() * 5
        );
    }

    #[test]
    fn test_simple_suffixes_each_offset() {
        let states = gamestates(&log(), 3).unwrap();
        let df = simple(startlocation)(&states).unwrap();
        assert_eq!(
            df.get_column_names(),
            vec!["start_x_a0", "start_y_a0", "start_x_a1", "start_y_a1", "start_x_a2", "start_y_a2"]
        );
        assert_eq!(df.column("start_x_a1").unwrap().f64().unwrap().get(2), Some(3.0));
    }

    #[test]
    fn test_polar_at_goal_and_on_axis() {
        let (dist, angle) = polar(FIELD_LENGTH / 2.0, 0.0);
        assert_eq!((dist, angle), (0.0, 0.0));
        let (dist, angle) = polar(FIELD_LENGTH / 2.0 - 30.0, 30.0);
        assert!((dist - 30.0 * 2f64.sqrt()).abs() < 1e-9);
        assert!((angle - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn test_speed_floors_zero_time_gap() {
        let states = gamestates(&log(), 2).unwrap();
        let df = speed(&states).unwrap();
        // first row backfills itself: zero distance over the floor
        assert_eq!(df.column("speed_a01").unwrap().f64().unwrap().get(0), Some(0.0));
        // kick at (3,4) two seconds after the gather ended at (0,0)
        assert_eq!(df.column("speed_a01").unwrap().f64().unwrap().get(1), Some(2.5));
    }

    #[test]
    fn test_goalscore_excludes_current_row() {
        let states = gamestates(&log(), 1).unwrap();
        let df = goalscore(&states).unwrap();
        let own: Vec<_> = df.column("goalscore_team").unwrap().i64().unwrap().into_no_null_iter().collect();
        let opp: Vec<_> = df.column("goalscore_opponent").unwrap().i64().unwrap().into_no_null_iter().collect();
        assert_eq!(own, vec![0, 0, 0, 0]);
        assert_eq!(opp, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_player_possession_time() {
        let rows = vec![
            action(1, 10.0, "Geelong", ActionType::Gather, (0.0, 0.0), (0.0, 0.0)),
            action(1, 11.0, "Geelong", ActionType::Carry, (0.0, 0.0), (3.0, 4.0)),
            action(1, 12.5, "Geelong", ActionType::Kick, (3.0, 4.0), (40.0, 0.0)),
            action(1, 14.0, "Geelong", ActionType::MarkUncontested, (40.0, 0.0), (40.0, 0.0)),
            action(2, 1815.0, "Geelong", ActionType::Kick, (40.0, 0.0), (60.0, 0.0)),
        ];
        let df = player_possession_time(&rows).unwrap();
        let values: Vec<_> = df
            .column("player_possession_time")
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        // only the kick straight after the carry counts
        assert_eq!(values, vec![0.0, 0.0, 1.5, 0.0, 0.0]);
    }

    #[test]
    fn test_compute_features_matches_column_names() {
        let transformers = default_transformers();
        let states = gamestates(&log(), 3).unwrap();
        let df = compute_features(&states, &transformers).unwrap();
        assert_eq!(df.height(), 4);
        let names = feature_column_names(&transformers, 3).unwrap();
        let actual: Vec<String> = df.get_column_names().into_iter().map(str::to_string).collect();
        assert_eq!(names, actual);
        assert!(names.contains(&"team_2".to_string()));
        assert!(names.contains(&"mov_a02".to_string()));
    }
}
