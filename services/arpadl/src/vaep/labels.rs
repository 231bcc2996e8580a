//! Look-ahead outcome labels

use crate::error::ArpadlError;
use crate::groups::GroupedView;
use crate::schema::Action;
use polars::prelude::*;

/// For every row, whether a goal is kicked within the next `nr_actions`
/// actions of the match (the row itself included) by a team for which
/// `same_side(row_team, scorer_team)` holds. Offsets past the end of the
/// match clamp to its last row.
fn goal_within_horizon<F>(
    actions: &[Action],
    nr_actions: usize,
    same_side: F,
) -> Result<Vec<bool>, ArpadlError>
where
    F: Fn(&str, &str) -> bool,
{
    if nr_actions < 1 {
        return Err(ArpadlError::Config(
            "label horizon must be at least 1".to_string(),
        ));
    }
    let view = GroupedView::by_match(actions);
    Ok((0..actions.len())
        .map(|i| {
            (0..nr_actions).any(|k| {
                let j = view.ahead_or_last(i, k);
                actions[j].is_shot_goal() && same_side(&actions[i].team, &actions[j].team)
            })
        })
        .collect())
}

/// Whether the team of each action kicks a goal within the horizon.
pub fn scores(actions: &[Action], nr_actions: usize) -> Result<DataFrame, ArpadlError> {
    let values = goal_within_horizon(actions, nr_actions, |team, scorer| team == scorer)?;
    Ok(DataFrame::new(vec![Series::new("scores", values)])?)
}

/// Whether the opponent of each action's team kicks a goal within the
/// horizon.
pub fn concedes(actions: &[Action], nr_actions: usize) -> Result<DataFrame, ArpadlError> {
    let values = goal_within_horizon(actions, nr_actions, |team, scorer| team != scorer)?;
    Ok(DataFrame::new(vec![Series::new("concedes", values)])?)
}

/// Outcome of each row when it is a shot: goal and behind flags and the
/// points it was worth.
pub fn goal_from_shot(actions: &[Action]) -> PolarsResult<DataFrame> {
    let goals: Vec<bool> = actions.iter().map(Action::is_shot_goal).collect();
    let behinds: Vec<bool> = actions.iter().map(Action::is_shot_behind).collect();
    let points: Vec<i64> = goals
        .iter()
        .zip(&behinds)
        .map(|(g, b)| 6 * (*g as i64) + *b as i64)
        .collect();
    DataFrame::new(vec![
        Series::new("goal_from_shot", goals),
        Series::new("behind_from_shot", behinds),
        Series::new("score_from_shot", points),
    ])
}
