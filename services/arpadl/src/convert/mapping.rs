//! Raw event → provisional action (type, body part, result, time)

use crate::convert::location::normalize_location;
use crate::ingest::RawEvent;
use crate::vocab::{ActionResult, ActionType, BodyPart};
use std::collections::{BTreeMap, HashMap};

/// Feed descriptions and the action type each one becomes. Descriptions not
/// listed here map to nothing and the row is dropped later.
pub const DESCRIPTION_TO_ACTION: &[(&str, ActionType)] = &[
    ("Kick", ActionType::Kick),
    ("Handball", ActionType::Handball),
    ("Handball Received", ActionType::NonAction),
    ("Uncontested Mark", ActionType::MarkUncontested),
    ("Loose Ball Get", ActionType::LooseBallGet),
    ("Kick Into F50", ActionType::NonAction),
    ("Kick Inside 50 Result", ActionType::NonAction),
    ("Spoil", ActionType::Spoil),
    ("Hard Ball Get", ActionType::HardBallGet),
    ("Loose Ball Get Crumb", ActionType::LooseBallGet),
    ("Gather", ActionType::Gather),
    ("Out of Bounds", ActionType::NonAction),
    ("Free For", ActionType::Free),
    ("Contested Mark", ActionType::MarkContested),
    ("Contest Target", ActionType::NonAction),
    ("Ball Up Call", ActionType::NonAction),
    ("Centre Bounce", ActionType::NonAction),
    ("Goal", ActionType::NonAction),
    ("Gather From Hitout", ActionType::GatherFromHitout),
    ("Kickin play on", ActionType::KickinPlayOn),
    ("Behind", ActionType::NonAction),
    ("Contested Knock On", ActionType::KnockOn),
    ("Ground Kick", ActionType::KickGround),
    ("Mark On Lead", ActionType::MarkOnLead),
    ("Hard Ball Get Crumb", ActionType::HardBallGet),
    ("Gather from Opposition", ActionType::GatherFromOpposition),
    ("Bounce", ActionType::Bounce),
    // mostly the same event as a dropped mark
    ("Mark Fumbled", ActionType::NonAction),
    ("Mark Dropped", ActionType::MarkDropped),
    ("OOF Kick In", ActionType::KickinOof),
    ("Out On Full After Kick", ActionType::NonAction),
    ("Ruck Hard Ball Get", ActionType::HardBallGet),
    ("No Pressure Error", ActionType::Error),
    ("Free For: In Possession", ActionType::Free),
    ("Free Advantage", ActionType::NonAction),
    ("Kickin short", ActionType::Kickin),
    ("Knock On", ActionType::KnockOn),
    ("Free For: Off The Ball", ActionType::FreeOffBall),
];

/// A raw event after mapping, before any row is filtered out. Fields stay
/// optional until the noise filter decides which rows are usable.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedEvent {
    pub match_id: String,
    pub period_id: u8,
    pub time_seconds: Option<f64>,
    pub team: Option<String>,
    pub team_chain: Option<String>,
    pub player: Option<String>,
    pub start: Option<(f64, f64)>,
    pub action_type: Option<ActionType>,
    /// `None` for non-actions.
    pub bodypart: Option<BodyPart>,
    /// `None` for non-actions.
    pub result: Option<ActionResult>,
}

pub fn action_type_for(description: &str) -> Option<ActionType> {
    DESCRIPTION_TO_ACTION
        .iter()
        .find(|(d, _)| *d == description)
        .map(|(_, t)| *t)
}

/// Shot-flagged events are shots whatever their description says.
pub fn map_action_type(event: &RawEvent) -> Option<ActionType> {
    if event.shot_at_goal {
        return Some(ActionType::Shot);
    }
    event.description.as_deref().and_then(action_type_for)
}

pub fn map_bodypart(action_type: ActionType) -> Option<BodyPart> {
    match action_type {
        ActionType::NonAction => None,
        t if t.is_kick_family() => Some(BodyPart::Foot),
        _ => Some(BodyPart::Hand),
    }
}

/// Result rules, highest priority first: shot outcome, disposal outcome,
/// type-specific override, success.
pub fn map_result(action_type: ActionType, event: &RawEvent) -> Option<ActionResult> {
    if action_type == ActionType::NonAction {
        return None;
    }

    if action_type == ActionType::Shot {
        return Some(match event.final_state.as_deref() {
            Some("goal") => ActionResult::Goal,
            Some("behind") => ActionResult::Behind,
            _ => ActionResult::Miss,
        });
    }

    match event.disposal.as_deref() {
        Some("effective") => return Some(ActionResult::Success),
        Some("ineffective") | Some("clanger") => return Some(ActionResult::Fail),
        _ => {}
    }

    Some(match action_type {
        ActionType::Bounce => ActionResult::Success,
        ActionType::Error | ActionType::MarkDropped | ActionType::MarkFumbled => ActionResult::Fail,
        _ => ActionResult::Success,
    })
}

/// Cumulative clock offsets: for every match, the longest recorded duration
/// of each period.
#[derive(Debug, Clone, Default)]
pub struct PeriodOffsets {
    maxima: HashMap<String, BTreeMap<u8, f64>>,
}

impl PeriodOffsets {
    pub fn from_events(events: &[RawEvent]) -> Self {
        let mut maxima: HashMap<String, BTreeMap<u8, f64>> = HashMap::new();
        for event in events {
            let Some(duration) = event.period_duration else {
                continue;
            };
            let periods = maxima.entry(event.match_id.clone()).or_default();
            let max = periods.entry(event.period_number).or_insert(duration);
            if duration > *max {
                *max = duration;
            }
        }
        Self { maxima }
    }

    /// Seconds elapsed in the match before `period` starts. Periods with no
    /// recorded duration contribute nothing.
    pub fn offset(&self, match_id: &str, period: u8) -> f64 {
        let Some(periods) = self.maxima.get(match_id) else {
            return 0.0;
        };
        (1..period)
            .map(|p| periods.get(&p).copied().unwrap_or(0.0))
            .sum()
    }
}

pub fn map_event(event: &RawEvent, offsets: &PeriodOffsets) -> MappedEvent {
    let action_type = map_action_type(event);
    let time_seconds = event
        .period_duration
        .map(|d| d + offsets.offset(&event.match_id, event.period_number));

    MappedEvent {
        match_id: event.match_id.clone(),
        period_id: event.period_number,
        time_seconds,
        team: event.team.clone(),
        team_chain: event.team_chain.clone(),
        player: event.player.clone(),
        start: normalize_location(event),
        action_type,
        bodypart: action_type.and_then(map_bodypart),
        result: action_type.and_then(|t| map_result(t, event)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn raw(description: &str) -> RawEvent {
        RawEvent {
            match_id: "AFL_2022_F4_Geelong_Sydney".to_string(),
            period_number: 1,
            team: Some("Geelong".to_string()),
            team_chain: Some("Geelong".to_string()),
            player: Some("Patrick Dangerfield".to_string()),
            period_duration: Some(10.0),
            x: Some(10.0),
            y: Some(5.0),
            description: Some(description.to_string()),
            disposal: None,
            shot_at_goal: false,
            final_state: None,
            home_team_direction_q1: Some("right".to_string()),
            home_team: Some("Geelong".to_string()),
            away_team: Some("Sydney".to_string()),
        }
    }

    #[test]
    fn test_description_lookup() {
        assert_eq!(action_type_for("Loose Ball Get Crumb"), Some(ActionType::LooseBallGet));
        assert_eq!(action_type_for("Centre Bounce"), Some(ActionType::NonAction));
        assert_eq!(action_type_for("Rushed Behind"), None);
    }

    #[test]
    fn test_shot_flag_overrides_description() {
        let mut event = raw("Kick");
        event.shot_at_goal = true;
        event.final_state = Some("behind".to_string());
        let mapped = map_event(&event, &PeriodOffsets::default());
        assert_eq!(mapped.action_type, Some(ActionType::Shot));
        assert_eq!(mapped.bodypart, Some(BodyPart::Foot));
        assert_eq!(mapped.result, Some(ActionResult::Behind));
    }

    #[test]
    fn test_shot_without_score_is_a_miss() {
        let mut event = raw("Kick");
        event.shot_at_goal = true;
        event.final_state = Some("rushed".to_string());
        event.disposal = Some("effective".to_string());
        assert_eq!(map_result(ActionType::Shot, &event), Some(ActionResult::Miss));
    }

    #[test]
    fn test_result_priority() {
        let mut event = raw("Handball");
        event.disposal = Some("clanger".to_string());
        assert_eq!(map_result(ActionType::Handball, &event), Some(ActionResult::Fail));

        // disposal outcome beats the type override
        let mut event = raw("No Pressure Error");
        event.disposal = Some("effective".to_string());
        assert_eq!(map_result(ActionType::Error, &event), Some(ActionResult::Success));

        let event = raw("No Pressure Error");
        assert_eq!(map_result(ActionType::Error, &event), Some(ActionResult::Fail));
        assert_eq!(map_result(ActionType::MarkDropped, &event), Some(ActionResult::Fail));
        assert_eq!(map_result(ActionType::Gather, &event), Some(ActionResult::Success));
        assert_eq!(map_result(ActionType::NonAction, &event), None);
    }

    #[test]
    fn test_bodypart_mapping() {
        assert_eq!(map_bodypart(ActionType::Kick), Some(BodyPart::Foot));
        assert_eq!(map_bodypart(ActionType::Kickin), Some(BodyPart::Foot));
        assert_eq!(map_bodypart(ActionType::Handball), Some(BodyPart::Hand));
        assert_eq!(map_bodypart(ActionType::NonAction), None);
    }

    #[test]
    fn test_time_seconds_accumulates_period_maxima() {
        let mut events = Vec::new();
        for (period, duration) in [(1, 100.0), (1, 1800.0), (2, 1700.0), (3, 1900.0), (4, 5.0)] {
            let mut e = raw("Kick");
            e.period_number = period;
            e.period_duration = Some(duration);
            events.push(e);
        }
        let offsets = PeriodOffsets::from_events(&events);
        let times: Vec<f64> = events
            .iter()
            .map(|e| map_event(e, &offsets).time_seconds.unwrap())
            .collect();
        assert_eq!(times, vec![100.0, 1800.0, 3500.0, 5400.0, 5405.0]);
    }

    #[test]
    fn test_missing_period_contributes_zero() {
        let mut q1 = raw("Kick");
        q1.period_duration = Some(1800.0);
        let mut q3 = raw("Kick");
        q3.period_number = 3;
        q3.period_duration = Some(20.0);
        let offsets = PeriodOffsets::from_events(&[q1, q3.clone()]);
        assert_eq!(offsets.offset(&q3.match_id, 3), 1800.0);
        assert_eq!(map_event(&q3, &offsets).time_seconds, Some(1820.0));
    }
}
