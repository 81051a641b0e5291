//! Position representation and normalization

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{moves::Hand, rules::Ruleset};

const LABEL_FORMAT: &str = "a,b|c,d|p";

/// A player in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Get the opponent player
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Factor that turns a score stored from player one's side into this player's side.
    pub fn sign(self) -> f64 {
        match self {
            Player::One => 1.0,
            Player::Two => -1.0,
        }
    }

    fn to_char(self) -> char {
        match self {
            Player::One => '1',
            Player::Two => '2',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player one"),
            Player::Two => write!(f, "player two"),
        }
    }
}

/// Finger counts on one player's two hands
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct PlayerHands {
    pub first: u8,
    pub second: u8,
}

impl PlayerHands {
    pub const fn new(first: u8, second: u8) -> Self {
        Self { first, second }
    }

    /// Count held by the given hand
    pub fn count(&self, hand: Hand) -> u8 {
        match hand {
            Hand::First => self.first,
            Hand::Second => self.second,
        }
    }

    /// Return a copy with one hand's count replaced
    #[must_use = "with_count returns new hands; the original is unchanged"]
    pub fn with_count(mut self, hand: Hand, count: u8) -> Self {
        match hand {
            Hand::First => self.first = count,
            Hand::Second => self.second = count,
        }
        self
    }

    /// Both hands are out
    pub fn is_eliminated(&self) -> bool {
        self.first == 0 && self.second == 0
    }

    /// Number of hands still holding fingers
    pub fn live_hands(&self) -> usize {
        usize::from(self.first > 0) + usize::from(self.second > 0)
    }

    pub fn is_symmetric(&self) -> bool {
        self.first == self.second
    }

    /// Smaller count listed first
    pub fn is_normalized(&self) -> bool {
        self.first <= self.second
    }

    #[must_use]
    pub fn normalized(&self) -> Self {
        if self.is_normalized() {
            *self
        } else {
            Self::new(self.second, self.first)
        }
    }

    /// Live hands worth distinguishing: equal counts collapse onto [`Hand::First`].
    pub fn playable(&self) -> Vec<Hand> {
        if self.is_symmetric() {
            return if self.first > 0 {
                vec![Hand::First]
            } else {
                Vec::new()
            };
        }
        Hand::BOTH
            .into_iter()
            .filter(|&hand| self.count(hand) > 0)
            .collect()
    }
}

impl fmt::Display for PlayerHands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.first, self.second)
    }
}

/// Complete position: both players' hands and whose turn it is.
///
/// Positions compare by value. Two positions share a node in the solved
/// graph iff their [`normalize`](GameState::normalize)d forms are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameState {
    pub one: PlayerHands,
    pub two: PlayerHands,
    pub to_move: Player,
}

impl GameState {
    pub const fn new(one: PlayerHands, two: PlayerHands, to_move: Player) -> Self {
        Self { one, two, to_move }
    }

    /// One finger on every hand, player one to move
    pub const fn opening() -> Self {
        Self::new(PlayerHands::new(1, 1), PlayerHands::new(1, 1), Player::One)
    }

    pub fn hands(&self, player: Player) -> PlayerHands {
        match player {
            Player::One => self.one,
            Player::Two => self.two,
        }
    }

    pub(crate) fn hands_mut(&mut self, player: Player) -> &mut PlayerHands {
        match player {
            Player::One => &mut self.one,
            Player::Two => &mut self.two,
        }
    }

    /// Hands of the player to move
    pub fn mover(&self) -> PlayerHands {
        self.hands(self.to_move)
    }

    /// Hands of the player waiting
    pub fn waiting(&self) -> PlayerHands {
        self.hands(self.to_move.opponent())
    }

    /// Check if either player has been eliminated
    pub fn is_terminal(&self) -> bool {
        self.one.is_eliminated() || self.two.is_eliminated()
    }

    /// The surviving player, if exactly one player is eliminated
    pub fn winner(&self) -> Option<Player> {
        match (self.one.is_eliminated(), self.two.is_eliminated()) {
            (false, true) => Some(Player::One),
            (true, false) => Some(Player::Two),
            _ => None,
        }
    }

    /// Canonical form: each player's smaller count listed first.
    ///
    /// Normalizing is idempotent.
    ///
    /// ```
    /// use chopsticks::game::{GameState, Player, PlayerHands};
    ///
    /// let state = GameState::new(PlayerHands::new(3, 1), PlayerHands::new(0, 2), Player::Two);
    /// let normalized = state.normalize();
    /// assert_eq!(normalized.one, PlayerHands::new(1, 3));
    /// assert_eq!(normalized.normalize(), normalized);
    /// ```
    #[must_use = "normalize returns a new state; the original is unchanged"]
    pub fn normalize(&self) -> Self {
        Self::new(self.one.normalized(), self.two.normalized(), self.to_move)
    }

    pub fn is_normalized(&self) -> bool {
        self.one.is_normalized() && self.two.is_normalized()
    }

    /// Check every hand count against the ruleset's finger limit.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidHandCount`] for the first hand above the limit.
    pub fn check(&self, rules: &Ruleset) -> Result<(), crate::Error> {
        let counts = [
            self.one.first,
            self.one.second,
            self.two.first,
            self.two.second,
        ];
        match counts.into_iter().find(|&count| count > rules.fingers) {
            Some(count) => Err(crate::Error::InvalidHandCount {
                count,
                fingers: rules.fingers,
                state: self.encode(),
            }),
            None => Ok(()),
        }
    }

    /// Text label `"a,b|c,d|p"`: player one's hands, player two's hands, player to move.
    pub fn encode(&self) -> String {
        format!("{}|{}|{}", self.one, self.two, self.to_move.to_char())
    }

    /// Parse a position from its text label. Whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns error if the label does not have three `|`-separated parts,
    /// a hand part is not two comma-separated counts, or the player is not
    /// `1`/`2`.
    pub fn from_label(label: &str) -> Result<Self, crate::Error> {
        let cleaned: String = label.chars().filter(|c| !c.is_whitespace()).collect();
        let parts: Vec<&str> = cleaned.split('|').collect();
        let [one, two, player] = parts.as_slice() else {
            return Err(Self::label_error(label));
        };

        Ok(Self::new(
            Self::parse_hands(one, label)?,
            Self::parse_hands(two, label)?,
            Self::parse_player(player, label)?,
        ))
    }

    fn parse_hands(part: &str, label: &str) -> Result<PlayerHands, crate::Error> {
        let (first, second) = part
            .split_once(',')
            .ok_or_else(|| Self::label_error(label))?;
        let parse = |count: &str| count.parse::<u8>().map_err(|_| Self::label_error(label));
        Ok(PlayerHands::new(parse(first)?, parse(second)?))
    }

    fn parse_player(part: &str, label: &str) -> Result<Player, crate::Error> {
        match part.to_ascii_lowercase().as_str() {
            "1" | "one" => Ok(Player::One),
            "2" | "two" => Ok(Player::Two),
            _ => Err(crate::Error::InvalidPlayerString {
                player: part.to_string(),
                label: label.to_string(),
            }),
        }
    }

    fn label_error(label: &str) -> crate::Error {
        crate::Error::InvalidLabelFormat {
            label: label.to_string(),
            expected: LABEL_FORMAT.to_string(),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::opening()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for GameState {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}
