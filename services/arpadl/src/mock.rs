//! Deterministic synthetic match chains for running the pipeline offline

use crate::config::MockConfig;
use crate::ingest::RawEvent;
use crate::vocab::{FIELD_LENGTH, FIELD_WIDTH};

pub const MOCK_HOME: &str = "Mock Home";
pub const MOCK_AWAY: &str = "Mock Away";
const SQUAD_SIZE: usize = 22;

// (description, relative weight)
const DESCRIPTIONS: &[(&str, u32)] = &[
    ("Kick", 20),
    ("Handball", 14),
    ("Uncontested Mark", 8),
    ("Contested Mark", 3),
    ("Gather", 8),
    ("Loose Ball Get", 6),
    ("Hard Ball Get", 5),
    ("Gather From Hitout", 3),
    ("Spoil", 4),
    ("Free For", 3),
    ("Bounce", 2),
    ("Ground Kick", 2),
    ("Knock On", 1),
    ("Mark Dropped", 1),
    ("No Pressure Error", 1),
    ("Handball Received", 4),
    ("Out of Bounds", 1),
    ("Ball Up Call", 1),
];

const DISPOSALS: &[&str] = &["effective", "effective", "effective", "ineffective", "clanger"];

fn pick_description(rng: &mut fastrand::Rng) -> &'static str {
    let total: u32 = DESCRIPTIONS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.u32(0..total);
    for &(description, weight) in DESCRIPTIONS {
        if roll < weight {
            return description;
        }
        roll -= weight;
    }
    "Kick"
}

/// Generates four periods of chain rows for `match_id`. The same seed always
/// gives the same rows.
pub fn generate_mock_chains(match_id: &str, config: &MockConfig) -> Vec<RawEvent> {
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let direction = if rng.bool() { "right" } else { "left" };
    let mut events = Vec::with_capacity(4 * (config.events_per_period + 1));

    for period in 1..=4u8 {
        let mut clock = 0.0;
        let mut home_owns = period % 2 == 1;
        let bounce = MockRow {
            period,
            home_owns,
            clock,
            location: (0.0, 0.0),
            description: "Centre Bounce",
            player: None,
        };
        events.push(bounce.into_event(match_id, direction));

        for _ in 0..config.events_per_period {
            clock += 0.5 + rng.f64() * 8.0;
            if rng.u32(0..10) == 0 {
                home_owns = !home_owns;
            }
            let x = (rng.f64() - 0.5) * FIELD_LENGTH;
            let y = (rng.f64() - 0.5) * FIELD_WIDTH;
            let player = format!(
                "{} {}",
                if home_owns { MOCK_HOME } else { MOCK_AWAY },
                rng.usize(1..=SQUAD_SIZE)
            );

            let mut event = MockRow {
                period,
                home_owns,
                clock,
                location: (x, y),
                description: pick_description(&mut rng),
                player: Some(player),
            }
            .into_event(match_id, direction);
            if event.description.as_deref() == Some("Kick") && rng.u32(0..6) == 0 {
                event.shot_at_goal = true;
                event.final_state = Some(
                    match rng.u32(0..3) {
                        0 => "goal",
                        1 => "behind",
                        _ => "miss",
                    }
                    .to_string(),
                );
            } else if matches!(event.description.as_deref(), Some("Kick") | Some("Handball")) {
                event.disposal = Some(DISPOSALS[rng.usize(..DISPOSALS.len())].to_string());
            }
            events.push(event);
        }
    }

    tracing::debug!("Generated {} mock chain rows for {}", events.len(), match_id);
    events
}

/// The per-row part of a mock event; match-wide fields come from `into_event`.
struct MockRow {
    period: u8,
    home_owns: bool,
    clock: f64,
    location: (f64, f64),
    description: &'static str,
    player: Option<String>,
}

impl MockRow {
    fn into_event(self, match_id: &str, direction: &str) -> RawEvent {
        let team = if self.home_owns { MOCK_HOME } else { MOCK_AWAY };
        RawEvent {
            match_id: match_id.to_string(),
            period_number: self.period,
            team: Some(team.to_string()),
            team_chain: Some(team.to_string()),
            player: self.player,
            period_duration: Some(self.clock),
            x: Some(self.location.0),
            y: Some(self.location.1),
            description: Some(self.description.to_string()),
            disposal: None,
            shot_at_goal: false,
            final_state: None,
            home_team_direction_q1: Some(direction.to_string()),
            home_team: Some(MOCK_HOME.to_string()),
            away_team: Some(MOCK_AWAY.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic::convert_to_atomic;
    use crate::config::SynthesisConfig;
    use crate::convert::convert_to_actions;
    use crate::schema::is_sorted;
    use crate::vocab::ActionType;

    fn config() -> MockConfig {
        MockConfig {
            enabled: true,
            seed: 7,
            events_per_period: 50,
        }
    }

    #[test]
    fn test_mock_is_seeded() {
        let a = generate_mock_chains("AFL_MOCK_1", &config());
        let b = generate_mock_chains("AFL_MOCK_1", &config());
        assert_eq!(a, b);
        assert_eq!(a.len(), 4 * 51);
        assert!(a.iter().all(|e| (1..=4).contains(&e.period_number)));
    }

    #[test]
    fn test_mock_chains_convert() {
        let chains = generate_mock_chains("AFL_MOCK_1", &config());
        let actions = convert_to_actions(&chains, &SynthesisConfig::default()).unwrap();
        assert!(!actions.is_empty());
        assert!(is_sorted(&actions));
        assert!(actions.iter().all(|a| a.match_id == "AFL_MOCK_1"));
        assert!(actions.iter().all(|a| ActionType::STANDARD.contains(&a.action_type)));
    }

    #[test]
    fn test_mock_atomic_log_is_closed_sorted_and_repeatable() {
        let chains = generate_mock_chains("AFL_MOCK_1", &config());
        let synthesis = SynthesisConfig::default();
        let actions = convert_to_actions(&chains, &synthesis).unwrap();

        let atomic = convert_to_atomic(&actions, &synthesis).unwrap();
        assert!(atomic.len() > actions.len());
        assert!(is_sorted(&atomic));
        assert!(atomic.iter().all(|a| ActionType::ATOMIC.contains(&a.action_type)));
        assert_eq!(atomic, convert_to_atomic(&actions, &synthesis).unwrap());
    }
}
