//! Lobby phase: joining, readiness, leaving, kicking. All Lobby-only.

use crate::models::{Player, Principal, Tournament, TournamentError};

/// Join the lobby as the calling user. Admins are spectators and are rejected
/// here, before the roster is touched.
pub fn join(tournament: &mut Tournament, caller: &Principal, now_ms: i64) -> Result<(), TournamentError> {
    if caller.is_admin() {
        return Err(TournamentError::NotAuthorized);
    }
    tournament.insert_player(Player::from_principal(caller, now_ms))
}

/// Flip the caller's ready flag; returns the new value.
pub fn toggle_ready(tournament: &mut Tournament, caller: &Principal) -> Result<bool, TournamentError> {
    let ready = !tournament
        .player(&caller.user_id)
        .ok_or(TournamentError::PlayerNotFound)?
        .is_ready;
    tournament.set_ready(&caller.user_id, ready)?;
    Ok(ready)
}

/// Leave the lobby voluntarily.
pub fn leave(tournament: &mut Tournament, caller: &Principal) -> Result<(), TournamentError> {
    tournament.remove_player(&caller.user_id)?;
    Ok(())
}

/// Remove another player (admin only). Fails once the draw has happened, even
/// for an admin: the bracket must match the drawn roster.
pub fn kick(tournament: &mut Tournament, caller: &Principal, user_id: &str) -> Result<(), TournamentError> {
    if !caller.is_admin() {
        return Err(TournamentError::NotAuthorized);
    }
    let kicked = tournament.remove_player(user_id)?;
    log::info!("Admin {} kicked {}", caller.username, kicked.username);
    Ok(())
}
