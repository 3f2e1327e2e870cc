//! Run identity: which scenario and run an autosave belongs to.
//!
//! The simulation encodes the identity in the first zone's name as
//! `"<scenario> <run>"` (e.g. `"Control 3"`). The run number is kept as a
//! string and compared as a string, so `"007"` and `"7"` are distinct runs
//! rather than being silently unified by integer parsing.

use serde::{Deserialize, Serialize};

/// The identity of one simulation run: a scenario name plus a run number.
///
/// Parsed from a zone name by the run configuration reader and compared
/// against the configured target to decide whether an autosave belongs to
/// the run being tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The scenario token (first word of the zone name).
    pub scenario: String,
    /// The run number token (second word of the zone name), kept verbatim.
    pub run_number: String,
}

impl RunIdentity {
    /// Create an identity from its two tokens.
    pub fn new(scenario: impl Into<String>, run_number: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            run_number: run_number.into(),
        }
    }

    /// Split a zone name into an identity.
    ///
    /// Returns `None` unless the name contains at least a scenario token and
    /// a run token separated by a single space. Extra tokens beyond the
    /// second are ignored.
    pub fn from_zone_name(name: &str) -> Option<Self> {
        let mut tokens = name.split(' ');
        let scenario = tokens.next().filter(|t| !t.is_empty())?;
        let run_number = tokens.next().filter(|t| !t.is_empty())?;
        Some(Self::new(scenario, run_number))
    }
}

impl std::fmt::Display for RunIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.scenario, self.run_number)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn splits_scenario_and_run() {
        let id = RunIdentity::from_zone_name("Control 3").unwrap();
        assert_eq!(id.scenario, "Control");
        assert_eq!(id.run_number, "3");
    }

    #[test]
    fn extra_tokens_are_ignored() {
        let id = RunIdentity::from_zone_name("Predation 12 trial").unwrap();
        assert_eq!(id.scenario, "Predation");
        assert_eq!(id.run_number, "12");
    }

    #[test]
    fn single_token_is_rejected() {
        assert!(RunIdentity::from_zone_name("Control").is_none());
        assert!(RunIdentity::from_zone_name("").is_none());
    }

    #[test]
    fn run_numbers_compare_as_strings() {
        let padded = RunIdentity::new("Control", "007");
        let bare = RunIdentity::new("Control", "7");
        assert_ne!(padded, bare);
    }

    #[test]
    fn display_round_trips_the_zone_name() {
        let id = RunIdentity::from_zone_name("Control 3").unwrap();
        assert_eq!(id.to_string(), "Control 3");
    }
}
