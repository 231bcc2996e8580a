//! Attacking-direction normalization and end-location inference

use crate::convert::Candidate;
use crate::groups::GroupedView;
use crate::ingest::RawEvent;

/// Start location with both axes negated when the chain owner attacks the
/// other way, so every chain reads in the same nominal direction. Returns
/// `None` when the feed has no coordinates for the row.
pub fn normalize_location(event: &RawEvent) -> Option<(f64, f64)> {
    let (x, y) = (event.x?, event.y?);
    if needs_flip(event) {
        Some((-x, -y))
    } else {
        Some((x, y))
    }
}

fn needs_flip(event: &RawEvent) -> bool {
    let Some(chain) = event.team_chain.as_deref() else {
        return false;
    };
    match event.home_team_direction_q1.as_deref() {
        Some("right") => event.away_team.as_deref() == Some(chain),
        Some("left") => event.home_team.as_deref() == Some(chain),
        _ => false,
    }
}

/// Kicks and handballs end where the next row of the same match starts;
/// everything else (and a disposal with no next row) ends where it began.
pub fn resolve_end_locations(candidates: &mut [Candidate]) {
    let view = GroupedView::build(candidates.len(), |i| candidates[i].action.match_id.clone());

    let ends: Vec<(f64, f64)> = (0..candidates.len())
        .map(|i| {
            let action = &candidates[i].action;
            let own = (action.start_x, action.start_y);
            if !action.action_type.is_disposal() {
                return own;
            }
            view.next(i)
                .map(|j| (candidates[j].action.start_x, candidates[j].action.start_y))
                .unwrap_or(own)
        })
        .collect();

    for (candidate, (end_x, end_y)) in candidates.iter_mut().zip(ends) {
        candidate.action.end_x = end_x;
        candidate.action.end_y = end_y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::mapping::tests::raw;
    use crate::schema::Action;
    use crate::vocab::{ActionResult, ActionType, BodyPart};

    #[test]
    fn test_flip_when_home_attacks_right_and_away_owns_chain() {
        let mut event = raw("Kick");
        event.team_chain = Some("Sydney".to_string());
        assert_eq!(normalize_location(&event), Some((-10.0, -5.0)));
    }

    #[test]
    fn test_flip_when_home_attacks_left_and_home_owns_chain() {
        let mut event = raw("Kick");
        event.home_team_direction_q1 = Some("left".to_string());
        assert_eq!(normalize_location(&event), Some((-10.0, -5.0)));
    }

    #[test]
    fn test_other_combinations_pass_through() {
        let event = raw("Kick");
        assert_eq!(normalize_location(&event), Some((10.0, 5.0)));

        let mut event = raw("Kick");
        event.home_team_direction_q1 = Some("left".to_string());
        event.team_chain = Some("Sydney".to_string());
        assert_eq!(normalize_location(&event), Some((10.0, 5.0)));

        let mut event = raw("Kick");
        event.home_team_direction_q1 = None;
        assert_eq!(normalize_location(&event), Some((10.0, 5.0)));

        let mut event = raw("Kick");
        event.y = None;
        assert_eq!(normalize_location(&event), None);
    }

    fn candidate(match_id: &str, action_type: ActionType, x: f64) -> Candidate {
        Candidate {
            action: Action {
                match_id: match_id.to_string(),
                period_id: 1,
                time_seconds: 0.0,
                team: "Geelong".to_string(),
                player: "p".to_string(),
                start_x: x,
                start_y: x,
                end_x: x,
                end_y: x,
                action_type,
                bodypart: BodyPart::Hand,
                result: ActionResult::Success,
            },
            team_chain: Some("Geelong".to_string()),
        }
    }

    #[test]
    fn test_end_location_lookahead() {
        let mut rows = vec![
            candidate("m1", ActionType::Kick, 1.0),
            candidate("m1", ActionType::MarkContested, 2.0),
            candidate("m1", ActionType::Handball, 3.0),
            candidate("m2", ActionType::Kick, 4.0),
        ];
        resolve_end_locations(&mut rows);

        assert_eq!((rows[0].action.end_x, rows[0].action.end_y), (2.0, 2.0));
        // not a disposal
        assert_eq!(rows[1].action.end_x, 2.0);
        // last row of m1 does not borrow from m2
        assert_eq!(rows[2].action.end_x, 3.0);
        // no next row at all
        assert_eq!(rows[3].action.end_x, 4.0);
    }
}
