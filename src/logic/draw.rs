//! The draw: shuffle the lobby roster into round-1 matches and compute the
//! bracket depth. Also owns winner advancement into later rounds, since byes
//! created here must cascade the same way recorded winners do.

use crate::models::{
    BracketMatch, MatchStatus, Player, Principal, Tournament, TournamentError, TournamentStatus,
};
use rand::seq::SliceRandom;
use serde::Serialize;

/// What the admin gets back from the draw (and what a double-invocation
/// returns unchanged).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    pub matches: Vec<BracketMatch>,
    pub total_rounds: u32,
}

/// Rounds a single-elimination bracket needs for `player_count` players:
/// ceil(log2(n)).
pub fn total_rounds_for(player_count: usize) -> u32 {
    debug_assert!(player_count >= 2);
    usize::BITS - (player_count - 1).leading_zeros()
}

/// Draw the bracket (admin only, Lobby only, >= 2 players).
///
/// 1. Idempotency guard: an existing bracket is returned as-is, never reshuffled.
/// 2. Fisher-Yates shuffle of the join-ordered roster.
/// 3. Consecutive pairs become round-1 matches numbered 1..; an odd trailing
///    player gets a bye and auto-advances.
/// 4. Status flips Lobby -> Drawing.
pub fn draw_bracket(tournament: &mut Tournament, caller: &Principal) -> Result<DrawResult, TournamentError> {
    if !caller.is_admin() {
        return Err(TournamentError::NotAuthorized);
    }

    // Double-click / concurrent re-invocation: hand back the existing bracket.
    if !tournament.bracket().is_empty() {
        log::info!("Draw requested but bracket already exists, returning it unchanged");
        return Ok(DrawResult {
            matches: tournament.bracket().to_vec(),
            total_rounds: tournament.total_rounds(),
        });
    }

    if tournament.status() != TournamentStatus::Lobby {
        return Err(TournamentError::InvalidStatus);
    }
    let mut players = tournament.roster();
    if players.len() < 2 {
        return Err(TournamentError::NotEnoughPlayers);
    }
    // Readiness is deliberately not checked here; the admin confirms at the
    // call site if someone is still unready.

    players.shuffle(&mut rand::thread_rng());

    let total_rounds = total_rounds_for(players.len());
    let mut matches = Vec::with_capacity(players.len().div_ceil(2));
    let mut byes = Vec::new();
    for (i, chunk) in players.chunks(2).enumerate() {
        let number = i as u32 + 1;
        match chunk {
            [a, b] => matches.push(BracketMatch::pending(1, number, Some(a.clone()), Some(b.clone()))),
            [lone] => {
                let m = BracketMatch::bye(1, number, lone.clone());
                byes.push((number, lone.clone()));
                matches.push(m);
            }
            _ => unreachable!(),
        }
    }

    log::info!("Drew {} round-1 matches for {} players", matches.len(), players.len());
    tournament.set_bracket(matches, total_rounds);
    tournament.set_status(TournamentStatus::Drawing);

    // Bye winners cascade into round 2 immediately.
    for (number, player) in byes {
        advance_winner(tournament, 1, number, player);
    }

    Ok(DrawResult {
        matches: tournament.bracket().to_vec(),
        total_rounds: tournament.total_rounds(),
    })
}

/// End the reveal: Drawing -> Running (admin only). Pure status flip; the
/// reveal itself is entirely cosmetic and lives in the client.
pub fn finish_drawing(tournament: &mut Tournament, caller: &Principal) -> Result<(), TournamentError> {
    if !caller.is_admin() {
        return Err(TournamentError::NotAuthorized);
    }
    if tournament.status() != TournamentStatus::Drawing {
        return Err(TournamentError::InvalidStatus);
    }
    tournament.set_status(TournamentStatus::Running);
    Ok(())
}

/// Place the winner of round `round`, match `match_number` into its slot in
/// the next round, creating that match lazily. Match k feeds match ceil(k/2)
/// of the next round: slot 1 when k is odd, slot 2 when k is even. A
/// next-round match whose sibling feeder does not exist becomes a bye and
/// cascades. A winner in the final round is the champion.
pub(crate) fn advance_winner(tournament: &mut Tournament, round: u32, match_number: u32, winner: Player) {
    if round >= tournament.total_rounds() {
        tournament.set_champion(winner);
        return;
    }

    let target_round = round + 1;
    let target_number = match_number.div_ceil(2);
    let first_slot = match_number % 2 == 1;
    // Sibling feeder of an odd match is k+1, of an even match k-1. Later-round
    // matches are created lazily, so existence is judged against the bracket
    // shape implied by the roster size: round r holds ceil(n / 2^r) matches.
    let sibling = if first_slot { match_number + 1 } else { match_number - 1 };
    let matches_in_feeding_round =
        (tournament.roster().len() as u64).div_ceil(1u64 << round) as u32;
    let sibling_exists = sibling <= matches_in_feeding_round;

    let bracket = tournament.bracket_mut();
    let idx = match bracket
        .iter()
        .position(|m| m.round == target_round && m.match_number == target_number)
    {
        Some(i) => i,
        None => {
            bracket.push(BracketMatch::pending(target_round, target_number, None, None));
            bracket.len() - 1
        }
    };
    if first_slot {
        bracket[idx].player1 = Some(winner.clone());
    } else {
        bracket[idx].player2 = Some(winner.clone());
    }

    if !sibling_exists {
        // No opponent can ever arrive: this node is a bye.
        bracket[idx].status = MatchStatus::Bye;
        bracket[idx].winner = Some(winner.clone());
        advance_winner(tournament, target_round, target_number, winner);
    }
}
