//! Post-run mission debrief text
//!
//! The text source is pluggable. Whatever it is, a failure degrades to a
//! fixed fallback and never holds up the game-over screen.

use std::fmt;

use crate::sim::mission::MissionType;
use crate::sim::state::GameStats;

/// Shown whenever the provider fails or returns nothing
pub const FALLBACK_DEBRIEF: &str =
    "Transmission lost. Command acknowledges your sacrifice, pilot. Regroup and fly again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebriefError {
    /// Provider is not configured or not reachable
    Unavailable(String),
    /// Provider answered with something unusable
    Malformed(String),
}

impl fmt::Display for DebriefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "debrief unavailable: {reason}"),
            Self::Malformed(reason) => write!(f, "debrief malformed: {reason}"),
        }
    }
}

impl std::error::Error for DebriefError {}

pub trait DebriefProvider {
    fn debrief(&self, stats: &GameStats) -> Result<String, DebriefError>;
}

/// Provider output, or the fallback on error or blank output
pub fn debrief_or_fallback(provider: &dyn DebriefProvider, stats: &GameStats) -> String {
    match provider.debrief(stats) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            log::warn!("Debrief provider returned empty text, using fallback");
            FALLBACK_DEBRIEF.to_string()
        }
        Err(e) => {
            log::warn!("{e}, using fallback");
            FALLBACK_DEBRIEF.to_string()
        }
    }
}

/// Deterministic summary built from the run's stats
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateDebrief;

impl DebriefProvider for TemplateDebrief {
    fn debrief(&self, stats: &GameStats) -> Result<String, DebriefError> {
        let rank = match stats.wave {
            0..=2 => "Cadet",
            3..=5 => "Wingman",
            6..=9 => "Squadron Leader",
            _ => "Ace",
        };
        let accuracy = if stats.shots_fired == 0 {
            0
        } else {
            (stats.enemies_destroyed * 100 / stats.shots_fired).min(100)
        };
        let last_op = match stats.mission.kind {
            MissionType::Elimination => "an elimination sweep",
            MissionType::Survival => "a holdout",
            MissionType::Boss => "a capital ship engagement",
        };

        Ok(format!(
            "{rank}, you fell during {last_op} in sector {}. Final score {} with {} confirmed \
             kills ({}% of shots fired) and a best streak of {}.",
            stats.wave, stats.score, stats.enemies_destroyed, accuracy, stats.max_combo
        ))
    }
}
