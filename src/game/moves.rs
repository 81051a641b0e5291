//! Moves, move generation and the normalized/concrete move translation

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    rules::Ruleset,
    state::{GameState, PlayerHands},
};

/// One of a player's two hands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    First,
    Second,
}

impl Hand {
    pub const BOTH: [Hand; 2] = [Hand::First, Hand::Second];

    pub fn other(self) -> Hand {
        match self {
            Hand::First => Hand::Second,
            Hand::Second => Hand::First,
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hand::First => write!(f, "first"),
            Hand::Second => write!(f, "second"),
        }
    }
}

/// A tap: the mover's `acting` hand adds its count to the opponent's `target` hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Move {
    pub acting: Hand,
    pub target: Hand,
}

impl Move {
    pub const fn new(acting: Hand, target: Hand) -> Self {
        Self { acting, target }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.acting, self.target)
    }
}

impl GameState {
    /// Moves worth exploring from this position.
    ///
    /// Cross product of the mover's and the opponent's playable hands: dead
    /// hands are skipped, and a pair of equal hands only offers
    /// [`Hand::First`]. Empty for terminal positions.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_terminal() {
            return Vec::new();
        }
        let targets = self.waiting().playable();
        self.mover()
            .playable()
            .into_iter()
            .flat_map(|acting| {
                targets
                    .iter()
                    .map(move |&target| Move::new(acting, target))
            })
            .collect()
    }

    /// Why a concrete move cannot be played here. Either hand of an equal pair is accepted.
    fn illegal_reason(&self, mv: Move) -> Option<&'static str> {
        if self.is_terminal() {
            Some("the game is over")
        } else if self.mover().count(mv.acting) == 0 {
            Some("the acting hand is empty")
        } else if self.waiting().count(mv.target) == 0 {
            Some("the target hand is already out")
        } else {
            None
        }
    }

    /// Apply a move and return the resulting (unnormalized) position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IllegalMove`] if the position is terminal or
    /// either hand involved is empty.
    #[must_use = "apply_move returns a new state; the original is unchanged"]
    pub fn apply_move(&self, mv: Move, rules: &Ruleset) -> Result<GameState, crate::Error> {
        if let Some(reason) = self.illegal_reason(mv) {
            return Err(crate::Error::IllegalMove {
                mv: mv.to_string(),
                state: self.encode(),
                reason: reason.to_string(),
            });
        }

        let attacker = self.mover().count(mv.acting);
        let defender = self.to_move.opponent();
        let target = self.hands(defender).count(mv.target);

        let mut next = *self;
        let hands = next.hands_mut(defender);
        *hands = hands.with_count(mv.target, rules.combine(attacker, target));
        next.to_move = defender;
        Ok(next)
    }

    /// Normalize and remember which players' hands were swapped.
    ///
    /// # Example
    ///
    /// ```
    /// use chopsticks::game::{GameState, Hand, Move};
    ///
    /// let concrete: GameState = "3,1|1,2|1".parse().unwrap();
    /// let ctx = concrete.normalized_context();
    /// let normalized = ctx.map_move_to_normalized(Move::new(Hand::First, Hand::First));
    /// assert_eq!(normalized, Move::new(Hand::Second, Hand::First));
    /// assert_eq!(ctx.map_normalized_to_original(normalized), Move::new(Hand::First, Hand::First));
    /// ```
    pub fn normalized_context(&self) -> NormalizedContext {
        NormalizedContext {
            original: *self,
            state: self.normalize(),
        }
    }
}

/// A concrete position paired with its normalized form.
///
/// Moves are stored in the solved graph relative to normalized positions;
/// this context re-expresses them against the concrete hands a player sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedContext {
    /// The concrete, possibly unnormalized position
    pub original: GameState,
    /// Its normalized form
    pub state: GameState,
}

impl NormalizedContext {
    /// Map a move on the concrete hands onto the normalized position
    pub fn map_move_to_normalized(&self, mv: Move) -> Move {
        self.translate(mv)
    }

    /// Map a move on the normalized position back onto the concrete hands
    pub fn map_normalized_to_original(&self, mv: Move) -> Move {
        self.translate(mv)
    }

    // Normalization only ever swaps a pair, so the same relabelling works both ways.
    fn translate(&self, mv: Move) -> Move {
        Move::new(
            Self::translate_hand(self.original.mover(), mv.acting),
            Self::translate_hand(self.original.waiting(), mv.target),
        )
    }

    fn translate_hand(hands: PlayerHands, hand: Hand) -> Hand {
        if hands.is_symmetric() {
            Hand::First
        } else if hands.is_normalized() {
            hand
        } else {
            hand.other()
        }
    }
}
