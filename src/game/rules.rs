//! Immutable ruleset threaded through move generation and exploration

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// What happens when a tap pushes a hand past the finger limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Counts wrap modulo `fingers + 1`; landing exactly on `fingers + 1` kills the hand
    #[default]
    Rollover,
    /// Any count above `fingers` kills the hand
    Cutoff,
}

impl fmt::Display for Overflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Overflow::Rollover => write!(f, "rollover"),
            Overflow::Cutoff => write!(f, "cutoff"),
        }
    }
}

impl FromStr for Overflow {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rollover" | "mod" => Ok(Overflow::Rollover),
            "cutoff" | "kill" => Ok(Overflow::Cutoff),
            _ => Err(crate::Error::InvalidOverflow {
                value: s.to_string(),
            }),
        }
    }
}

/// The variant of chopsticks being played.
///
/// `fingers` is the highest count a single hand can hold. The 3-finger
/// variant uses counts `0..=3`; the traditional game is `fingers = 4`.
///
/// # Examples
///
/// ```
/// use chopsticks::game::{Overflow, Ruleset};
///
/// let rules = Ruleset::new(3).unwrap();
/// assert_eq!(rules.combine(2, 3), 1);
/// assert_eq!(rules.with_overflow(Overflow::Cutoff).combine(2, 3), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ruleset {
    pub fingers: u8,
    pub overflow: Overflow,
}

impl Ruleset {
    /// Create a rollover ruleset with the given finger limit.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidRuleset`] if `fingers` is zero.
    pub fn new(fingers: u8) -> Result<Self, crate::Error> {
        if fingers == 0 {
            return Err(crate::Error::InvalidRuleset { fingers });
        }
        Ok(Self {
            fingers,
            overflow: Overflow::default(),
        })
    }

    /// The traditional game: four live fingers per hand, rollover on overflow.
    pub const fn traditional() -> Self {
        Self {
            fingers: 4,
            overflow: Overflow::Rollover,
        }
    }

    /// Set the overflow rule.
    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    /// Count of a hand holding `target` fingers after being tapped by a hand holding `attacker`.
    pub fn combine(&self, attacker: u8, target: u8) -> u8 {
        let sum = u16::from(attacker) + u16::from(target);
        let limit = u16::from(self.fingers);
        let result = match self.overflow {
            Overflow::Rollover => sum % (limit + 1),
            Overflow::Cutoff if sum > limit => 0,
            Overflow::Cutoff => sum,
        };
        // result <= fingers, so it always fits
        result as u8
    }
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::traditional()
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-finger {}", self.fingers, self.overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fingers_rejected() {
        assert!(matches!(
            Ruleset::new(0),
            Err(crate::Error::InvalidRuleset { fingers: 0 })
        ));
    }

    #[test]
    fn rollover_wraps_past_elimination() {
        let rules = Ruleset::new(4).unwrap();
        assert_eq!(rules.combine(1, 1), 2);
        assert_eq!(rules.combine(2, 3), 0);
        assert_eq!(rules.combine(4, 4), 3);
    }

    #[test]
    fn cutoff_kills_any_overflow() {
        let rules = Ruleset::new(4).unwrap().with_overflow(Overflow::Cutoff);
        assert_eq!(rules.combine(1, 3), 4);
        assert_eq!(rules.combine(2, 3), 0);
        assert_eq!(rules.combine(4, 4), 0);
    }

    #[test]
    fn overflow_parses_case_insensitively() {
        assert_eq!("Rollover".parse::<Overflow>().unwrap(), Overflow::Rollover);
        assert_eq!("cutoff".parse::<Overflow>().unwrap(), Overflow::Cutoff);
        let err = "wrap".parse::<Overflow>().unwrap_err();
        assert!(matches!(err, crate::Error::InvalidOverflow { ref value } if value == "wrap"));
        assert_eq!(
            err.to_string(),
            "unknown overflow rule 'wrap' (expected 'rollover' or 'cutoff')"
        );
    }
}
