//! Fixed-length lookback windows over an action log

use crate::error::ArpadlError;
use crate::groups::GroupedView;
use crate::schema::{Action, ActionRecord};

/// Builds `nb_prev_actions` aligned tables. Table `i` holds, for every row,
/// the action `i` places earlier in the same match+period; rows too close to
/// the start of their period repeat the period's first action instead.
pub fn gamestates<T: ActionRecord>(
    actions: &[T],
    nb_prev_actions: usize,
) -> Result<Vec<Vec<T>>, ArpadlError> {
    if nb_prev_actions < 1 {
        return Err(ArpadlError::Config(
            "game state length must be at least 1".to_string(),
        ));
    }

    let view = GroupedView::by_period(actions);
    let mut states = Vec::with_capacity(nb_prev_actions);
    states.push(actions.to_vec());
    for i in 1..nb_prev_actions {
        states.push(
            (0..actions.len())
                .map(|row| actions[view.prev_or_first(row, i)].clone())
                .collect(),
        );
    }
    Ok(states)
}

/// Re-orients every table so the focal action's team attacks the nominal
/// direction: actions by the other team get both axes negated.
pub fn play_left_to_right(states: &[Vec<Action>]) -> Vec<Vec<Action>> {
    let Some(focal) = states.first() else {
        return Vec::new();
    };
    states
        .iter()
        .map(|table| {
            table
                .iter()
                .zip(focal)
                .map(|(a, a0)| {
                    let mut a = a.clone();
                    if a.team != a0.team {
                        a.start_x = -a.start_x;
                        a.start_y = -a.start_y;
                        a.end_x = -a.end_x;
                        a.end_y = -a.end_y;
                    }
                    a
                })
                .collect()
        })
        .collect()
}
