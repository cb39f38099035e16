//! Bracket node: one single-elimination match slot.

use crate::models::player::Player;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match (bracket node or active match).
pub type MatchId = Uuid;

/// Lifecycle of a bracket node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting to be played (one or both slots may still be empty in later rounds).
    Pending,
    /// Odd roster: the lone player advances without an opponent.
    Bye,
    /// Winner recorded.
    Completed,
}

/// A single bracket match. Round, number, and players are fixed at creation;
/// only `winner` and `status` mutate.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketMatch {
    pub id: MatchId,
    /// 1-based round.
    pub round: u32,
    /// 1-based, unique within its round.
    pub match_number: u32,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
    pub winner: Option<Player>,
    pub status: MatchStatus,
}

impl BracketMatch {
    pub fn pending(round: u32, match_number: u32, player1: Option<Player>, player2: Option<Player>) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            match_number,
            player1,
            player2,
            winner: None,
            status: MatchStatus::Pending,
        }
    }

    /// A bye carries its winner from the start.
    pub fn bye(round: u32, match_number: u32, player: Player) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            match_number,
            player1: Some(player.clone()),
            player2: None,
            winner: Some(player),
            status: MatchStatus::Bye,
        }
    }

    /// Whether `user_id` occupies one of the two slots.
    pub fn has_player(&self, user_id: &str) -> bool {
        self.player1.as_ref().is_some_and(|p| p.user_id == user_id)
            || self.player2.as_ref().is_some_and(|p| p.user_id == user_id)
    }
}
