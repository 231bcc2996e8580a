//! Removal of feed artifacts: non-actions, unusable rows, mirrored
//! re-entries and exact duplicates

use crate::convert::mapping::MappedEvent;
use crate::convert::Candidate;
use crate::schema::Action;
use crate::vocab::ActionType;
use std::collections::HashSet;
use tracing::debug;

/// Keeps rows that describe a real on-field action by a known player.
///
/// Rows without a clock, team or coordinates cannot be placed in the log and
/// go the same way as non-actions.
pub fn drop_noise(events: Vec<MappedEvent>) -> Vec<Candidate> {
    let total = events.len();
    let mut unusable = 0usize;

    let kept: Vec<Candidate> = events
        .into_iter()
        .filter_map(|e| {
            let action_type = e.action_type.filter(|t| *t != ActionType::NonAction)?;
            let player = e.player?;
            let (Some(time_seconds), Some(team), Some((x, y)), Some(bodypart), Some(result)) =
                (e.time_seconds, e.team, e.start, e.bodypart, e.result)
            else {
                unusable += 1;
                return None;
            };
            Some(Candidate {
                action: Action {
                    match_id: e.match_id,
                    period_id: e.period_id,
                    time_seconds,
                    team,
                    player,
                    start_x: x,
                    start_y: y,
                    end_x: x,
                    end_y: y,
                    action_type,
                    bodypart,
                    result,
                },
                team_chain: e.team_chain,
            })
        })
        .collect();

    debug!(
        "Noise filter kept {} of {} rows ({} without time/team/location)",
        kept.len(),
        total,
        unusable
    );
    kept
}

/// A broken-play restart shows up twice in the feed: once as the real action
/// and once mirrored into the other chain's direction.
pub fn is_mirror_reentry(candidate: &Candidate) -> bool {
    let a = &candidate.action;
    a.start_x == -a.end_x
        && a.start_y == -a.end_y
        && candidate.team_chain.as_deref() != Some(a.team.as_str())
}

pub fn drop_mirror_reentries(candidates: Vec<Candidate>) -> Vec<Action> {
    let total = candidates.len();
    let actions: Vec<Action> = candidates
        .into_iter()
        .filter(|c| !is_mirror_reentry(c))
        .map(|c| c.action)
        .collect();
    debug!("Dropped {} mirrored re-entries", total - actions.len());
    actions
}

#[derive(PartialEq, Eq, Hash)]
struct RowKey {
    match_id: String,
    period_id: u8,
    team: String,
    player: String,
    numbers: [u64; 5],
    action_type: ActionType,
    bodypart: crate::vocab::BodyPart,
    result: crate::vocab::ActionResult,
}

impl From<&Action> for RowKey {
    fn from(a: &Action) -> Self {
        Self {
            match_id: a.match_id.clone(),
            period_id: a.period_id,
            team: a.team.clone(),
            player: a.player.clone(),
            numbers: [
                a.time_seconds.to_bits(),
                a.start_x.to_bits(),
                a.start_y.to_bits(),
                a.end_x.to_bits(),
                a.end_y.to_bits(),
            ],
            action_type: a.action_type,
            bodypart: a.bodypart,
            result: a.result,
        }
    }
}

/// Collapses exact full-row duplicates, keeping the first occurrence.
pub fn drop_duplicates(actions: Vec<Action>) -> Vec<Action> {
    let total = actions.len();
    let mut seen: HashSet<RowKey> = HashSet::with_capacity(total);
    let unique: Vec<Action> = actions
        .into_iter()
        .filter(|a| seen.insert(RowKey::from(a)))
        .collect();
    debug!("Dropped {} duplicate rows", total - unique.len());
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{ActionResult, BodyPart};

    fn mapped(action_type: Option<ActionType>, player: Option<&str>) -> MappedEvent {
        MappedEvent {
            match_id: "m1".to_string(),
            period_id: 1,
            time_seconds: Some(1.0),
            team: Some("Sydney".to_string()),
            team_chain: Some("Sydney".to_string()),
            player: player.map(str::to_string),
            start: Some((3.0, 4.0)),
            action_type,
            bodypart: Some(BodyPart::Hand),
            result: Some(ActionResult::Success),
        }
    }

    #[test]
    fn test_drop_noise() {
        let mut no_time = mapped(Some(ActionType::Spoil), Some("p"));
        no_time.time_seconds = None;
        let rows = vec![
            mapped(Some(ActionType::Gather), Some("p")),
            mapped(Some(ActionType::NonAction), Some("p")),
            mapped(None, Some("p")),
            mapped(Some(ActionType::Kick), None),
            no_time,
        ];
        let kept = drop_noise(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].action.action_type, ActionType::Gather);
        assert_eq!((kept[0].action.end_x, kept[0].action.end_y), (3.0, 4.0));
    }

    #[test]
    fn test_mirror_reentry_requires_other_chain_owner() {
        let mut candidate = drop_noise(vec![mapped(Some(ActionType::Kick), Some("p"))]).remove(0);
        candidate.action.end_x = -3.0;
        candidate.action.end_y = -4.0;
        assert!(!is_mirror_reentry(&candidate));

        candidate.team_chain = Some("Geelong".to_string());
        assert!(is_mirror_reentry(&candidate));
        assert!(drop_mirror_reentries(vec![candidate]).is_empty());
    }

    #[test]
    fn test_drop_duplicates_keeps_first() {
        let kept = drop_noise(vec![
            mapped(Some(ActionType::Gather), Some("p")),
            mapped(Some(ActionType::Gather), Some("p")),
            mapped(Some(ActionType::Gather), Some("q")),
        ]);
        let actions: Vec<Action> = kept.into_iter().map(|c| c.action).collect();
        let unique = drop_duplicates(actions);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].player, "p");
        assert_eq!(unique[1].player, "q");
    }
}
