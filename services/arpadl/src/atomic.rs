//! Canonical actions → atomic point actions

use crate::config::SynthesisConfig;
use crate::convert::synth::{add_fifty_metre_penalties, add_handball_receivals, add_shot_outcomes};
use crate::error::SchemaError;
use crate::schema::{validate_atomic_actions, Action, AtomicAction};
use tracing::info;

/// Adds the receival, shot outcome and 50m penalty rows (in that order), then
/// projects every action onto its start point plus displacement.
pub fn convert_to_atomic(
    actions: &[Action],
    config: &SynthesisConfig,
) -> Result<Vec<AtomicAction>, SchemaError> {
    let actions = add_handball_receivals(actions.to_vec());
    let actions = add_shot_outcomes(actions);
    let actions = add_fifty_metre_penalties(actions, config.min_penalty_distance);

    let atomic: Vec<AtomicAction> = actions.iter().map(AtomicAction::from).collect();
    let atomic = validate_atomic_actions(atomic)?;
    info!("Flattened into {} atomic actions", atomic.len());
    Ok(atomic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::synth::tests::action;
    use crate::schema::is_sorted;
    use crate::vocab::{ActionResult, ActionType, BodyPart};

    #[test]
    fn test_goal_shot_gets_goal_point() {
        let mut shot = action(1, 100.0, "Geelong", ActionType::Shot, (50.0, 5.0), (82.5, 0.0));
        shot.result = ActionResult::Goal;
        shot.bodypart = BodyPart::Foot;

        let atomic = convert_to_atomic(&[shot], &SynthesisConfig::default()).unwrap();
        assert_eq!(atomic.len(), 2);
        assert_eq!(atomic[0].action_type, ActionType::Shot);
        assert_eq!((atomic[0].dx, atomic[0].dy), (32.5, -5.0));

        let goal = &atomic[1];
        assert_eq!(goal.action_type, ActionType::Goal);
        assert_eq!((goal.x, goal.y), (82.5, 0.0));
        assert_eq!((goal.dx, goal.dy), (0.0, 0.0));
        assert_eq!(goal.bodypart, BodyPart::Foot);
    }

    #[test]
    fn test_all_passes_run_and_stay_sorted() {
        let rows = vec![
            action(1, 0.0, "Geelong", ActionType::Handball, (0.0, 0.0), (5.0, 0.0)),
            action(1, 1.0, "Geelong", ActionType::Free, (5.0, 0.0), (5.0, 0.0)),
            action(1, 30.0, "Geelong", ActionType::Kick, (60.0, 0.0), (70.0, 0.0)),
            action(2, 1900.0, "Sydney", ActionType::Spoil, (0.0, 0.0), (0.0, 0.0)),
        ];
        let atomic = convert_to_atomic(&rows, &SynthesisConfig::default()).unwrap();
        let types: Vec<_> = atomic.iter().map(|a| a.action_type).collect();
        assert_eq!(
            types,
            vec![
                ActionType::Handball,
                ActionType::HandballReceive,
                ActionType::Free,
                ActionType::FiftyMetrePenalty,
                ActionType::Kick,
                ActionType::Spoil,
            ]
        );
        assert!(is_sorted(&atomic));
    }

    #[test]
    fn test_tied_clock_keeps_receival_before_kick() {
        let rows = vec![
            action(1, 5.0, "Geelong", ActionType::Handball, (0.0, 0.0), (5.0, 0.0)),
            action(1, 5.0, "Geelong", ActionType::Kick, (5.0, 0.0), (40.0, 0.0)),
            action(1, 9.0, "Geelong", ActionType::MarkContested, (40.0, 0.0), (40.0, 0.0)),
        ];
        let atomic = convert_to_atomic(&rows, &SynthesisConfig::default()).unwrap();
        let types: Vec<_> = atomic.iter().map(|a| a.action_type).collect();
        assert_eq!(
            types,
            vec![
                ActionType::Handball,
                ActionType::HandballReceive,
                ActionType::Kick,
                ActionType::MarkContested,
            ]
        );
    }
}
