//! Closed vocabularies of the ARPADL language
//!
//! The ordering of every `ALL`/`STANDARD`/`ATOMIC` slice is part of the
//! contract: ids exposed through the `*_frame` helpers and the one-hot feature
//! columns follow it.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pitch length in meters.
pub const FIELD_LENGTH: f64 = 165.0;
/// Pitch width in meters.
pub const FIELD_WIDTH: f64 = 135.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Bounce,
    Carry,
    Error,
    Free,
    FreeOffBall,
    Gather,
    GatherFromHitout,
    GatherFromOpposition,
    Handball,
    HardBallGet,
    Kick,
    KickGround,
    Kickin,
    KickinOof,
    KickinPlayOn,
    KnockOn,
    LooseBallGet,
    MarkContested,
    MarkDropped,
    MarkFumbled,
    MarkOnLead,
    MarkUncontested,
    NonAction,
    Shot,
    Spoil,
    // atomic-only
    HandballReceive,
    #[serde(rename = "50m_penalty")]
    FiftyMetrePenalty,
    Goal,
    Behind,
    Miss,
}

impl ActionType {
    /// Action types of the canonical action log.
    pub const STANDARD: &'static [ActionType] = &[
        ActionType::Bounce,
        ActionType::Carry,
        ActionType::Error,
        ActionType::Free,
        ActionType::FreeOffBall,
        ActionType::Gather,
        ActionType::GatherFromHitout,
        ActionType::GatherFromOpposition,
        ActionType::Handball,
        ActionType::HardBallGet,
        ActionType::Kick,
        ActionType::KickGround,
        ActionType::Kickin,
        ActionType::KickinOof,
        ActionType::KickinPlayOn,
        ActionType::KnockOn,
        ActionType::LooseBallGet,
        ActionType::MarkContested,
        ActionType::MarkDropped,
        ActionType::MarkFumbled,
        ActionType::MarkOnLead,
        ActionType::MarkUncontested,
        ActionType::NonAction,
        ActionType::Shot,
        ActionType::Spoil,
    ];

    /// Canonical types followed by the point types only the atomic log uses.
    pub const ATOMIC: &'static [ActionType] = &[
        ActionType::Bounce,
        ActionType::Carry,
        ActionType::Error,
        ActionType::Free,
        ActionType::FreeOffBall,
        ActionType::Gather,
        ActionType::GatherFromHitout,
        ActionType::GatherFromOpposition,
        ActionType::Handball,
        ActionType::HardBallGet,
        ActionType::Kick,
        ActionType::KickGround,
        ActionType::Kickin,
        ActionType::KickinOof,
        ActionType::KickinPlayOn,
        ActionType::KnockOn,
        ActionType::LooseBallGet,
        ActionType::MarkContested,
        ActionType::MarkDropped,
        ActionType::MarkFumbled,
        ActionType::MarkOnLead,
        ActionType::MarkUncontested,
        ActionType::NonAction,
        ActionType::Shot,
        ActionType::Spoil,
        ActionType::HandballReceive,
        ActionType::FiftyMetrePenalty,
        ActionType::Goal,
        ActionType::Behind,
        ActionType::Miss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Bounce => "bounce",
            ActionType::Carry => "carry",
            ActionType::Error => "error",
            ActionType::Free => "free",
            ActionType::FreeOffBall => "free_off_ball",
            ActionType::Gather => "gather",
            ActionType::GatherFromHitout => "gather_from_hitout",
            ActionType::GatherFromOpposition => "gather_from_opposition",
            ActionType::Handball => "handball",
            ActionType::HardBallGet => "hard_ball_get",
            ActionType::Kick => "kick",
            ActionType::KickGround => "kick_ground",
            ActionType::Kickin => "kickin",
            ActionType::KickinOof => "kickin_oof",
            ActionType::KickinPlayOn => "kickin_play_on",
            ActionType::KnockOn => "knock_on",
            ActionType::LooseBallGet => "loose_ball_get",
            ActionType::MarkContested => "mark_contested",
            ActionType::MarkDropped => "mark_dropped",
            ActionType::MarkFumbled => "mark_fumbled",
            ActionType::MarkOnLead => "mark_on_lead",
            ActionType::MarkUncontested => "mark_uncontested",
            ActionType::NonAction => "non_action",
            ActionType::Shot => "shot",
            ActionType::Spoil => "spoil",
            ActionType::HandballReceive => "handball_receive",
            ActionType::FiftyMetrePenalty => "50m_penalty",
            ActionType::Goal => "goal",
            ActionType::Behind => "behind",
            ActionType::Miss => "miss",
        }
    }

    pub fn is_standard(&self) -> bool {
        Self::STANDARD.contains(self)
    }

    /// Types that travel with the foot.
    pub fn is_kick_family(&self) -> bool {
        matches!(self, ActionType::Kick | ActionType::Kickin | ActionType::Shot)
    }

    /// Disposals whose end location is wherever the next action starts.
    pub fn is_disposal(&self) -> bool {
        matches!(self, ActionType::Kick | ActionType::Handball)
    }

    /// Possession-gaining types that can be followed by a carry.
    pub fn starts_carry(&self) -> bool {
        matches!(
            self,
            ActionType::Gather
                | ActionType::GatherFromHitout
                | ActionType::GatherFromOpposition
                | ActionType::LooseBallGet
                | ActionType::HardBallGet
                | ActionType::KickinPlayOn
        )
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionType::ATOMIC
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown action type: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Foot,
    Hand,
}

impl BodyPart {
    pub const ALL: &'static [BodyPart] = &[BodyPart::Foot, BodyPart::Hand];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Foot => "foot",
            BodyPart::Hand => "hand",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyPart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BodyPart::ALL
            .iter()
            .copied()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| format!("unknown bodypart: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionResult {
    Fail,
    Success,
    Goal,
    Behind,
    Miss,
}

impl ActionResult {
    pub const ALL: &'static [ActionResult] = &[
        ActionResult::Fail,
        ActionResult::Success,
        ActionResult::Goal,
        ActionResult::Behind,
        ActionResult::Miss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionResult::Fail => "fail",
            ActionResult::Success => "success",
            ActionResult::Goal => "goal",
            ActionResult::Behind => "behind",
            ActionResult::Miss => "miss",
        }
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionResult::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown result: {}", s))
    }
}

fn id_frame(id_col: &str, name_col: &str, names: Vec<&'static str>) -> PolarsResult<DataFrame> {
    let ids: Vec<u32> = (0..names.len() as u32).collect();
    DataFrame::new(vec![Series::new(id_col, ids), Series::new(name_col, names)])
}

/// `type_id`/`type_name` table for the canonical vocabulary.
pub fn actiontypes_frame() -> PolarsResult<DataFrame> {
    id_frame(
        "type_id",
        "type_name",
        ActionType::STANDARD.iter().map(|t| t.as_str()).collect(),
    )
}

/// `type_id`/`type_name` table for the atomic vocabulary.
pub fn atomic_actiontypes_frame() -> PolarsResult<DataFrame> {
    id_frame(
        "type_id",
        "type_name",
        ActionType::ATOMIC.iter().map(|t| t.as_str()).collect(),
    )
}

pub fn bodyparts_frame() -> PolarsResult<DataFrame> {
    id_frame(
        "bodypart_id",
        "bodypart_name",
        BodyPart::ALL.iter().map(|b| b.as_str()).collect(),
    )
}

pub fn results_frame() -> PolarsResult<DataFrame> {
    id_frame(
        "result_id",
        "result_name",
        ActionResult::ALL.iter().map(|r| r.as_str()).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_extends_standard_in_order() {
        assert_eq!(ActionType::STANDARD.len(), 25);
        assert_eq!(&ActionType::ATOMIC[..25], ActionType::STANDARD);
        assert!(!ActionType::FiftyMetrePenalty.is_standard());
        assert!(ActionType::Carry.is_standard());
    }

    #[test]
    fn test_names_round_trip_through_from_str() {
        for t in ActionType::ATOMIC {
            assert_eq!(t.as_str().parse::<ActionType>().unwrap(), *t);
        }
        assert!("handball_receival".parse::<ActionType>().is_err());
    }

    #[test]
    fn test_serde_names_match_as_str() {
        let json = serde_json::to_string(&ActionType::FiftyMetrePenalty).unwrap();
        assert_eq!(json, "\"50m_penalty\"");
        let json = serde_json::to_string(&ActionType::KickinPlayOn).unwrap();
        assert_eq!(json, "\"kickin_play_on\"");
    }

    #[test]
    fn test_vocabulary_frames() {
        let types = actiontypes_frame().unwrap();
        assert_eq!(types.height(), 25);
        let results = results_frame().unwrap();
        assert_eq!(results.height(), 5);
        assert_eq!(bodyparts_frame().unwrap().height(), 2);
        assert_eq!(atomic_actiontypes_frame().unwrap().height(), 30);
    }
}
