//! Tournament runtime: status, roster, bracket, active matches.

use crate::models::active_match::ActiveMatch;
use crate::models::bracket::{BracketMatch, MatchId};
use crate::models::player::{Player, Principal, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default lobby capacity; overridable via [`Tournament::with_capacity`].
pub const MAX_PLAYERS: usize = 16;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, PartialEq)]
pub enum TournamentError {
    /// Caller lacks the role or identity required for this operation.
    NotAuthorized,
    /// Operation not legal in the current tournament status.
    InvalidStatus,
    /// Fewer than 2 players in the lobby at draw time.
    NotEnoughPlayers,
    /// Lobby is at capacity.
    TournamentFull,
    /// This user is already in the lobby.
    AlreadyJoined,
    /// Referenced player is not a known participant.
    PlayerNotFound,
    /// Referenced match does not exist.
    MatchNotFound,
    /// Referenced theme does not exist in the catalog.
    ThemeNotFound,
    /// Caller is neither side of the match.
    NotAParticipant,
    /// Match duration is zero or exceeds the allowed maximum.
    InvalidDuration,
    /// The match clock has run out; list edits are closed.
    MatchExpired,
    /// Polling budget exceeded.
    RateLimited,
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::NotAuthorized => write!(f, "Not authorized"),
            TournamentError::InvalidStatus => write!(f, "Invalid tournament status for this action"),
            TournamentError::NotEnoughPlayers => write!(f, "Need at least 2 players to draw"),
            TournamentError::TournamentFull => write!(f, "Tournament is full"),
            TournamentError::AlreadyJoined => write!(f, "Already in the tournament"),
            TournamentError::PlayerNotFound => write!(f, "Player not found"),
            TournamentError::MatchNotFound => write!(f, "Match not found"),
            TournamentError::ThemeNotFound => write!(f, "Theme not found"),
            TournamentError::NotAParticipant => write!(f, "Not a participant of this match"),
            TournamentError::InvalidDuration => write!(f, "Invalid match duration"),
            TournamentError::MatchExpired => write!(f, "Match time is up"),
            TournamentError::RateLimited => write!(f, "Too many requests"),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Top-level tournament phase. Gates which operations are legal.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    /// Players join, leave, and mark readiness.
    #[default]
    Lobby,
    /// Bracket drawn; reveal animation in progress. Mutation frozen.
    Drawing,
    /// Matches being played.
    Running,
    /// Champion decided; only reset remains.
    Finished,
}

/// Roster summary for the polling snapshot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentStats {
    pub total: usize,
    pub ready: usize,
    pub max_players: usize,
    pub status: TournamentStatus,
}

/// The single in-process owner of all live tournament state. Constructed
/// explicitly and handed to the transport layer; intentionally not persisted,
/// a restart clears everything.
#[derive(Debug)]
pub struct Tournament {
    /// Lobby roster keyed by user id; ordering comes from `joined_at` at read time.
    players: HashMap<UserId, Player>,
    /// All bracket nodes, round 1 created at draw, later rounds as winners land.
    matches: Vec<BracketMatch>,
    /// Rounds a full single-elimination needs; 0 until drawn.
    total_rounds: u32,
    /// Live timed matches keyed by match id.
    active: HashMap<MatchId, ActiveMatch>,
    status: TournamentStatus,
    max_players: usize,
    champion: Option<Player>,
}

impl Tournament {
    /// New empty tournament in Lobby with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(MAX_PLAYERS)
    }

    pub fn with_capacity(max_players: usize) -> Self {
        Self {
            players: HashMap::new(),
            matches: Vec::new(),
            total_rounds: 0,
            active: HashMap::new(),
            status: TournamentStatus::Lobby,
            max_players,
            champion: None,
        }
    }

    pub fn status(&self) -> TournamentStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: TournamentStatus) {
        log::info!("Status changed: {:?} -> {:?}", self.status, status);
        self.status = status;
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn champion(&self) -> Option<&Player> {
        self.champion.as_ref()
    }

    pub(crate) fn set_champion(&mut self, player: Player) {
        log::info!("Champion decided: {}", player.username);
        self.champion = Some(player);
        self.status = TournamentStatus::Finished;
    }

    // --- roster ---

    /// All players ordered by join time (stable for the draw).
    pub fn roster(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.values().cloned().collect();
        players.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.user_id.cmp(&b.user_id)));
        players
    }

    pub fn player(&self, user_id: &str) -> Option<&Player> {
        self.players.get(user_id)
    }

    pub fn stats(&self) -> TournamentStats {
        TournamentStats {
            total: self.players.len(),
            ready: self.players.values().filter(|p| p.is_ready).count(),
            max_players: self.max_players,
            status: self.status,
        }
    }

    /// Insert a lobby entry. Status, duplicate, and capacity checks live here;
    /// the admin check lives in the calling operation.
    pub(crate) fn insert_player(&mut self, player: Player) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::Lobby {
            return Err(TournamentError::InvalidStatus);
        }
        if self.players.contains_key(&player.user_id) {
            return Err(TournamentError::AlreadyJoined);
        }
        if self.players.len() >= self.max_players {
            return Err(TournamentError::TournamentFull);
        }
        log::info!("Player {} joined ({}/{})", player.username, self.players.len() + 1, self.max_players);
        self.players.insert(player.user_id.clone(), player);
        Ok(())
    }

    pub(crate) fn set_ready(&mut self, user_id: &str, ready: bool) -> Result<(), TournamentError> {
        let player = self
            .players
            .get_mut(user_id)
            .ok_or(TournamentError::PlayerNotFound)?;
        player.is_ready = ready;
        Ok(())
    }

    /// Remove a lobby entry. Fails outside Lobby: once the draw has happened
    /// the bracket must stay consistent with the drawn roster.
    pub(crate) fn remove_player(&mut self, user_id: &str) -> Result<Player, TournamentError> {
        if self.status != TournamentStatus::Lobby {
            return Err(TournamentError::InvalidStatus);
        }
        let removed = self
            .players
            .remove(user_id)
            .ok_or(TournamentError::PlayerNotFound)?;
        log::info!("Player {} removed ({} left)", removed.username, self.players.len());
        Ok(removed)
    }

    /// Whether `user_id` was part of the drawn bracket (any round-1 slot).
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.matches.iter().any(|m| m.has_player(user_id))
    }

    // --- bracket ---

    pub fn bracket(&self) -> &[BracketMatch] {
        &self.matches
    }

    pub(crate) fn bracket_mut(&mut self) -> &mut Vec<BracketMatch> {
        &mut self.matches
    }

    pub(crate) fn set_bracket(&mut self, matches: Vec<BracketMatch>, total_rounds: u32) {
        log::info!("Bracket set: {} matches, {} rounds", matches.len(), total_rounds);
        self.matches = matches;
        self.total_rounds = total_rounds;
    }

    // --- active matches ---

    pub fn active_match(&self, id: &MatchId) -> Option<&ActiveMatch> {
        self.active.get(id)
    }

    pub(crate) fn active_match_mut(&mut self, id: &MatchId) -> Option<&mut ActiveMatch> {
        self.active.get_mut(id)
    }

    pub fn active_matches(&self) -> Vec<ActiveMatch> {
        self.active.values().cloned().collect()
    }

    pub(crate) fn insert_active_match(&mut self, m: ActiveMatch) {
        log::info!("Active match {} created ({} vs {})", m.id, m.player1.username, m.player2.username);
        self.active.insert(m.id, m);
    }

    // --- reset ---

    /// Back to an empty Lobby. Used between tournaments; clears everything.
    pub fn reset(&mut self, caller: &Principal) -> Result<(), TournamentError> {
        if !caller.is_admin() {
            return Err(TournamentError::NotAuthorized);
        }
        log::info!(
            "Reset: clearing {} players, {} matches, {} active",
            self.players.len(),
            self.matches.len(),
            self.active.len()
        );
        self.players.clear();
        self.matches.clear();
        self.active.clear();
        self.total_rounds = 0;
        self.champion = None;
        self.status = TournamentStatus::Lobby;
        Ok(())
    }
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new()
    }
}
