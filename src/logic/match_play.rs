//! Active match runtime: timed head-to-head play and bracket winner recording.

use crate::logic::draw::advance_winner;
use crate::models::{
    ActiveMatch, ActiveMatchStatus, MatchId, MatchSide, MatchStatus, Principal, ThemeCatalog,
    Tournament, TournamentError, TournamentStatus,
};
use serde::Serialize;
use uuid::Uuid;

/// Upper bound on a match duration. Anything longer is a typo or an attack,
/// and bounding it keeps the deadline arithmetic safely inside i64 range.
pub const MAX_MATCH_MINUTES: u64 = 24 * 60;

/// Parameters for starting an active match from a bracket pairing.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMatchRequest {
    pub player1_id: String,
    pub player2_id: String,
    pub theme_id: String,
    /// Minutes of play time.
    pub duration: u64,
}

/// What a participant (or the admin) sees when polling a match.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStateView {
    #[serde(rename = "match")]
    pub data: ActiveMatch,
    pub is_player1: bool,
    /// Seconds left, clamped at zero.
    pub remaining_time: u64,
}

/// Start a timed match between two drawn players (admin only, Running only).
///
/// The theme is snapshotted from the catalog at creation; the deadline is
/// fixed here and does not move when the countdown starts later.
pub fn start_match(
    tournament: &mut Tournament,
    caller: &Principal,
    themes: &dyn ThemeCatalog,
    req: &StartMatchRequest,
    now_ms: i64,
) -> Result<MatchId, TournamentError> {
    if !caller.is_admin() {
        return Err(TournamentError::NotAuthorized);
    }
    if tournament.status() != TournamentStatus::Running {
        return Err(TournamentError::InvalidStatus);
    }
    if req.duration == 0 || req.duration > MAX_MATCH_MINUTES {
        return Err(TournamentError::InvalidDuration);
    }
    let theme = themes
        .find_theme(&req.theme_id)
        .ok_or(TournamentError::ThemeNotFound)?;
    // Only players seated somewhere in the drawn bracket can be matched up.
    if !tournament.is_participant(&req.player1_id) || !tournament.is_participant(&req.player2_id) {
        return Err(TournamentError::PlayerNotFound);
    }
    let player1 = tournament
        .player(&req.player1_id)
        .cloned()
        .ok_or(TournamentError::PlayerNotFound)?;
    let player2 = tournament
        .player(&req.player2_id)
        .cloned()
        .ok_or(TournamentError::PlayerNotFound)?;

    let duration_secs = req.duration * 60;
    let id = Uuid::new_v4();
    tournament.insert_active_match(ActiveMatch {
        id,
        theme_id: req.theme_id.clone(),
        theme,
        duration: duration_secs,
        started_at: now_ms,
        ends_at: now_ms + duration_secs as i64 * 1000,
        player1: side_for(&player1),
        player2: side_for(&player2),
        status: ActiveMatchStatus::Pending,
    });
    Ok(id)
}

fn side_for(player: &crate::models::Player) -> MatchSide {
    MatchSide {
        user_id: player.user_id.clone(),
        username: player.username.clone(),
        image_url: player.image_url.clone(),
        list: String::new(),
    }
}

/// Start the visible countdown: Pending -> Running. The deadline stays where
/// creation put it, so admin delay before this call eats into play time.
pub fn start_countdown(
    tournament: &mut Tournament,
    caller: &Principal,
    match_id: &MatchId,
) -> Result<(), TournamentError> {
    if !caller.is_admin() {
        return Err(TournamentError::NotAuthorized);
    }
    let m = tournament
        .active_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound)?;
    if m.status != ActiveMatchStatus::Pending {
        return Err(TournamentError::InvalidStatus);
    }
    m.status = ActiveMatchStatus::Running;
    log::info!("Match {} countdown started", match_id);
    Ok(())
}

/// Overwrite the caller's list text (last write wins). Only the two
/// participants may write, and only while the clock is running.
pub fn update_player_list(
    tournament: &mut Tournament,
    caller: &Principal,
    match_id: &MatchId,
    text: String,
    now_ms: i64,
) -> Result<(), TournamentError> {
    let m = tournament
        .active_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound)?;
    let is_player1 = m.side_of(&caller.user_id).ok_or(TournamentError::NotAParticipant)?;
    if m.is_expired_at(now_ms) {
        return Err(TournamentError::MatchExpired);
    }
    if is_player1 {
        m.player1.list = text;
    } else {
        m.player2.list = text;
    }
    Ok(())
}

/// Read a match with the remaining clock. Admin or either participant only.
///
/// Expiry is observed here rather than scheduled: a Running match past its
/// deadline flips to Completed on read, so no background timer is needed.
pub fn get_match_state(
    tournament: &mut Tournament,
    caller: &Principal,
    match_id: &MatchId,
    now_ms: i64,
) -> Result<MatchStateView, TournamentError> {
    let m = tournament
        .active_match_mut(match_id)
        .ok_or(TournamentError::MatchNotFound)?;
    let side = m.side_of(&caller.user_id);
    if side.is_none() && !caller.is_admin() {
        return Err(TournamentError::NotAuthorized);
    }
    if m.status == ActiveMatchStatus::Running && m.is_expired_at(now_ms) {
        log::info!("Match {} expired, marking completed", match_id);
        m.status = ActiveMatchStatus::Completed;
    }
    Ok(MatchStateView {
        remaining_time: m.remaining_time_at(now_ms),
        is_player1: side.unwrap_or(false),
        data: m.clone(),
    })
}

/// All active matches, for the admin dashboard.
pub fn active_matches(
    tournament: &Tournament,
    caller: &Principal,
) -> Result<Vec<ActiveMatch>, TournamentError> {
    if !caller.is_admin() {
        return Err(TournamentError::NotAuthorized);
    }
    Ok(tournament.active_matches())
}

/// Record the winner of a bracket match (admin only, Running only) and
/// advance them into the next round. A second record on the same match is
/// rejected rather than overwritten: the first winner already advanced.
pub fn record_winner(
    tournament: &mut Tournament,
    caller: &Principal,
    match_id: &MatchId,
    winner_id: &str,
) -> Result<(), TournamentError> {
    if !caller.is_admin() {
        return Err(TournamentError::NotAuthorized);
    }
    if tournament.status() != TournamentStatus::Running {
        return Err(TournamentError::InvalidStatus);
    }
    let m = tournament
        .bracket()
        .iter()
        .find(|m| m.id == *match_id)
        .ok_or(TournamentError::MatchNotFound)?;
    if m.status != MatchStatus::Pending {
        return Err(TournamentError::InvalidStatus);
    }
    if m.player1.is_none() || m.player2.is_none() {
        // Later-round match still waiting on a feeder; deciding it now would
        // strand the sibling winner when it arrives.
        return Err(TournamentError::InvalidStatus);
    }
    let winner = [&m.player1, &m.player2]
        .into_iter()
        .flatten()
        .find(|p| p.user_id == winner_id)
        .cloned()
        .ok_or(TournamentError::PlayerNotFound)?;
    let (round, number) = (m.round, m.match_number);

    let bracket = tournament.bracket_mut();
    let idx = bracket
        .iter()
        .position(|m| m.id == *match_id)
        .ok_or(TournamentError::MatchNotFound)?;
    bracket[idx].winner = Some(winner.clone());
    bracket[idx].status = MatchStatus::Completed;
    log::info!("Match r{round} #{number} won by {}", winner.username);

    advance_winner(tournament, round, number, winner);
    Ok(())
}
