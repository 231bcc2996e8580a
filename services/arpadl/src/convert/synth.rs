//! Derived actions the feed never records explicitly
//!
//! Every pass reads a sorted log, looks one row ahead inside the same
//! match+period and splices each derived row in directly after its source.
//! A derived row never goes later than its source's next row, so the log
//! stays sorted even when the feed clock ties adjacent events.

use crate::config::SynthesisConfig;
use crate::groups::GroupedView;
use crate::schema::{sort_actions, Action};
use crate::vocab::{ActionResult, ActionType, BodyPart};
use tracing::debug;

/// Inserts each `(source, row)` right after `actions[source]`. `extras` must
/// be in ascending source order.
fn splice_after_sources(actions: Vec<Action>, extras: Vec<(usize, Action)>) -> Vec<Action> {
    if extras.is_empty() {
        return actions;
    }
    let mut out = Vec::with_capacity(actions.len() + extras.len());
    let mut extras = extras.into_iter().peekable();
    for (i, row) in actions.into_iter().enumerate() {
        out.push(row);
        while let Some((_, extra)) = extras.next_if(|(source, _)| *source == i) {
            out.push(extra);
        }
    }
    // a no-op for sorted input
    sort_actions(&mut out);
    out
}

fn pair_pass<F>(actions: Vec<Action>, name: &str, derive: F) -> Vec<Action>
where
    F: Fn(&Action, &Action) -> Option<Action>,
{
    let view = GroupedView::by_period(&actions);
    let extras: Vec<(usize, Action)> = (0..actions.len())
        .filter_map(|i| {
            let j = view.next(i)?;
            derive(&actions[i], &actions[j]).map(|row| (i, row))
        })
        .collect();

    debug!("{} pass added {} rows", name, extras.len());
    splice_after_sources(actions, extras)
}

/// Connecting action from `from`'s end to `to`'s start, credited to the team
/// and player of `to`.
fn bridge(from: &Action, to: &Action, action_type: ActionType, time_seconds: f64) -> Action {
    Action {
        match_id: from.match_id.clone(),
        period_id: from.period_id,
        time_seconds,
        team: to.team.clone(),
        player: to.player.clone(),
        start_x: from.end_x,
        start_y: from.end_y,
        end_x: to.start_x,
        end_y: to.start_y,
        action_type,
        bodypart: BodyPart::Hand,
        result: ActionResult::Success,
    }
}

/// A successful handball taken by a teammate gets a receival at the receiver.
pub fn add_handball_receivals(actions: Vec<Action>) -> Vec<Action> {
    pair_pass(actions, "handball receival", |a, next| {
        (a.action_type == ActionType::Handball
            && a.result == ActionResult::Success
            && next.team == a.team)
            .then(|| bridge(a, next, ActionType::HandballReceive, a.time_seconds))
    })
}

/// Every shot gets a point action for its outcome at the shot's end location.
pub fn add_shot_outcomes(actions: Vec<Action>) -> Vec<Action> {
    let extras: Vec<(usize, Action)> = actions
        .iter()
        .enumerate()
        .filter(|(_, a)| a.action_type == ActionType::Shot)
        .filter_map(|(i, shot)| {
            let outcome = match shot.result {
                ActionResult::Goal => ActionType::Goal,
                ActionResult::Behind => ActionType::Behind,
                ActionResult::Miss => ActionType::Miss,
                _ => return None,
            };
            let row = Action {
                start_x: shot.end_x,
                start_y: shot.end_y,
                action_type: outcome,
                bodypart: BodyPart::Foot,
                ..shot.clone()
            };
            Some((i, row))
        })
        .collect();

    debug!("shot outcome pass added {} rows", extras.len());
    splice_after_sources(actions, extras)
}

/// A free kick whose team restarts at least `min_distance` further on was
/// marched by a 50 metre penalty.
pub fn add_fifty_metre_penalties(actions: Vec<Action>, min_distance: f64) -> Vec<Action> {
    let threshold = min_distance * min_distance;
    pair_pass(actions, "50m penalty", |a, next| {
        (a.action_type == ActionType::Free && next.team == a.team && a.gap_sq_to(next) >= threshold)
            .then(|| bridge(a, next, ActionType::FiftyMetrePenalty, a.time_seconds))
    })
}

/// A possession-winning action followed by the same team somewhere else,
/// some time later, implies the ball was carried in between.
pub fn add_carries(actions: Vec<Action>, config: &SynthesisConfig) -> Vec<Action> {
    let min_length_sq = config.min_carry_length * config.min_carry_length;
    pair_pass(actions, "carry", |a, next| {
        let dt = next.time_seconds - a.time_seconds;
        (a.action_type.starts_carry()
            && next.team == a.team
            && a.gap_sq_to(next) >= min_length_sq
            && dt >= config.min_carry_time)
            .then(|| {
                let mid = (a.time_seconds + next.time_seconds) / 2.0;
                bridge(a, next, ActionType::Carry, mid)
            })
    })
}
