//! Integration tests for active matches and bracket winner advancement.

use list_clash_web::{
    draw_bracket, finish_drawing, get_match_state, join, record_winner, start_countdown,
    start_match, update_player_list, ActiveMatchStatus, MatchStatus, Principal, Role,
    StartMatchRequest, ThemeCatalog, ThemeSnapshot, Tournament, TournamentError, TournamentStatus,
    MAX_MATCH_MINUTES,
};

const T0: i64 = 1_700_000_000_000;

fn admin() -> Principal {
    Principal {
        user_id: "admin".into(),
        username: "Admin".into(),
        image_url: String::new(),
        role: Role::Admin,
    }
}

fn user(i: usize) -> Principal {
    Principal {
        user_id: format!("user-{i}"),
        username: format!("U{i}"),
        image_url: String::new(),
        role: Role::User,
    }
}

struct Themes;

impl ThemeCatalog for Themes {
    fn find_theme(&self, theme_id: &str) -> Option<ThemeSnapshot> {
        (theme_id == "theme-1").then(|| ThemeSnapshot {
            title: "Grillabend".into(),
            shop: Some("Supermarkt".into()),
            budget: Some(25.0),
            preferences: None,
        })
    }
}

/// Lobby with n players, drawn and running.
fn running_with(n: usize) -> Tournament {
    let mut t = Tournament::new();
    for i in 0..n {
        join(&mut t, &user(i), 1_000 + i as i64).unwrap();
    }
    draw_bracket(&mut t, &admin()).unwrap();
    finish_drawing(&mut t, &admin()).unwrap();
    t
}

fn start_request(p1: usize, p2: usize, minutes: u64) -> StartMatchRequest {
    StartMatchRequest {
        player1_id: format!("user-{p1}"),
        player2_id: format!("user-{p2}"),
        theme_id: "theme-1".into(),
        duration: minutes,
    }
}

#[test]
fn start_match_snapshots_theme_and_fixes_deadline() {
    let mut t = running_with(2);
    let id = start_match(&mut t, &admin(), &Themes, &start_request(0, 1, 5), T0).unwrap();

    let m = t.active_match(&id).unwrap();
    assert_eq!(m.theme.title, "Grillabend");
    assert_eq!(m.status, ActiveMatchStatus::Pending);
    assert_eq!(m.started_at, T0);
    assert_eq!(m.ends_at, T0 + 300_000);
    assert_eq!(m.duration, 300);
    assert!(m.player1.list.is_empty() && m.player2.list.is_empty());
}

#[test]
fn start_match_rejects_bad_input() {
    let mut t = running_with(2);
    assert_eq!(
        start_match(&mut t, &user(0), &Themes, &start_request(0, 1, 5), T0),
        Err(TournamentError::NotAuthorized)
    );
    let mut bad_theme = start_request(0, 1, 5);
    bad_theme.theme_id = "nope".into();
    assert_eq!(
        start_match(&mut t, &admin(), &Themes, &bad_theme, T0),
        Err(TournamentError::ThemeNotFound)
    );
    assert_eq!(
        start_match(&mut t, &admin(), &Themes, &start_request(0, 7, 5), T0),
        Err(TournamentError::PlayerNotFound)
    );
}

#[test]
fn absurd_durations_are_rejected_before_the_clock_is_set() {
    let mut t = running_with(2);

    // Overflow-sized and zero durations never reach the deadline arithmetic
    let mut req = start_request(0, 1, 5);
    req.duration = u64::MAX;
    assert_eq!(
        start_match(&mut t, &admin(), &Themes, &req, T0),
        Err(TournamentError::InvalidDuration)
    );
    req.duration = 0;
    assert_eq!(
        start_match(&mut t, &admin(), &Themes, &req, T0),
        Err(TournamentError::InvalidDuration)
    );
    req.duration = MAX_MATCH_MINUTES + 1;
    assert_eq!(
        start_match(&mut t, &admin(), &Themes, &req, T0),
        Err(TournamentError::InvalidDuration)
    );
    assert!(t.active_matches().is_empty());

    req.duration = MAX_MATCH_MINUTES;
    let id = start_match(&mut t, &admin(), &Themes, &req, T0).unwrap();
    assert_eq!(
        t.active_match(&id).unwrap().ends_at,
        T0 + MAX_MATCH_MINUTES as i64 * 60_000
    );
}

#[test]
fn start_match_requires_running_status() {
    let mut t = Tournament::new();
    join(&mut t, &user(0), 1).unwrap();
    join(&mut t, &user(1), 2).unwrap();
    draw_bracket(&mut t, &admin()).unwrap();
    // Still Drawing: the reveal has not finished
    assert_eq!(
        start_match(&mut t, &admin(), &Themes, &start_request(0, 1, 5), T0),
        Err(TournamentError::InvalidStatus)
    );
}

#[test]
fn countdown_flips_pending_to_running_without_moving_deadline() {
    let mut t = running_with(2);
    let id = start_match(&mut t, &admin(), &Themes, &start_request(0, 1, 5), T0).unwrap();
    let ends_at = t.active_match(&id).unwrap().ends_at;

    assert_eq!(start_countdown(&mut t, &user(0), &id), Err(TournamentError::NotAuthorized));
    start_countdown(&mut t, &admin(), &id).unwrap();

    let m = t.active_match(&id).unwrap();
    assert_eq!(m.status, ActiveMatchStatus::Running);
    // Admin delay before countdown eats play time; the deadline never moves.
    assert_eq!(m.ends_at, ends_at);

    assert_eq!(start_countdown(&mut t, &admin(), &id), Err(TournamentError::InvalidStatus));
}

#[test]
fn list_updates_are_last_write_wins_per_participant() {
    let mut t = running_with(2);
    let id = start_match(&mut t, &admin(), &Themes, &start_request(0, 1, 5), T0).unwrap();

    update_player_list(&mut t, &user(0), &id, "bread".into(), T0 + 1_000).unwrap();
    update_player_list(&mut t, &user(0), &id, "bread, cheese".into(), T0 + 2_000).unwrap();
    update_player_list(&mut t, &user(1), &id, "apples".into(), T0 + 2_000).unwrap();

    let m = t.active_match(&id).unwrap();
    assert_eq!(m.player1.list, "bread, cheese");
    assert_eq!(m.player2.list, "apples");
}

#[test]
fn non_participants_cannot_write() {
    let mut t = running_with(4);
    let id = start_match(&mut t, &admin(), &Themes, &start_request(0, 1, 5), T0).unwrap();
    update_player_list(&mut t, &user(0), &id, "bread".into(), T0).unwrap();

    assert_eq!(
        update_player_list(&mut t, &user(2), &id, "haxx".into(), T0),
        Err(TournamentError::NotAParticipant)
    );
    // Admins watch, they don't write either
    assert_eq!(
        update_player_list(&mut t, &admin(), &id, "haxx".into(), T0),
        Err(TournamentError::NotAParticipant)
    );
    assert_eq!(t.active_match(&id).unwrap().player1.list, "bread");
}

#[test]
fn writes_are_rejected_after_the_deadline() {
    let mut t = running_with(2);
    let id = start_match(&mut t, &admin(), &Themes, &start_request(0, 1, 5), T0).unwrap();
    assert_eq!(
        update_player_list(&mut t, &user(0), &id, "late".into(), T0 + 300_000),
        Err(TournamentError::MatchExpired)
    );
}

#[test]
fn remaining_time_counts_down_and_clamps_at_zero() {
    let mut t = running_with(2);
    let id = start_match(&mut t, &admin(), &Themes, &start_request(0, 1, 5), T0).unwrap();

    let mut last = u64::MAX;
    for offset in [0, 1_000, 150_000, 299_999, 300_000, 301_000] {
        let view = get_match_state(&mut t, &user(0), &id, T0 + offset).unwrap();
        assert!(view.remaining_time <= last, "monotone non-increasing");
        last = view.remaining_time;
    }
    assert_eq!(get_match_state(&mut t, &user(0), &id, T0).unwrap().remaining_time, 300);
    assert_eq!(
        get_match_state(&mut t, &user(0), &id, T0 + 301_000).unwrap().remaining_time,
        0
    );
}

#[test]
fn match_state_is_for_admin_and_participants_only() {
    let mut t = running_with(4);
    let id = start_match(&mut t, &admin(), &Themes, &start_request(0, 1, 5), T0).unwrap();

    assert!(get_match_state(&mut t, &user(0), &id, T0).unwrap().is_player1);
    assert!(!get_match_state(&mut t, &user(1), &id, T0).unwrap().is_player1);
    assert!(!get_match_state(&mut t, &admin(), &id, T0).unwrap().is_player1);
    assert_eq!(
        get_match_state(&mut t, &user(2), &id, T0),
        Err(TournamentError::NotAuthorized)
    );
}

#[test]
fn running_match_past_deadline_completes_on_read() {
    let mut t = running_with(2);
    let id = start_match(&mut t, &admin(), &Themes, &start_request(0, 1, 5), T0).unwrap();
    start_countdown(&mut t, &admin(), &id).unwrap();

    let view = get_match_state(&mut t, &admin(), &id, T0 + 300_001).unwrap();
    assert_eq!(view.data.status, ActiveMatchStatus::Completed);
    assert_eq!(t.active_match(&id).unwrap().status, ActiveMatchStatus::Completed);
}

#[test]
fn record_winner_validates_caller_and_players() {
    let mut t = running_with(2);
    let bracket_match = t.bracket()[0].clone();
    let winner_id = bracket_match.player1.clone().unwrap().user_id;

    assert_eq!(
        record_winner(&mut t, &user(0), &bracket_match.id, &winner_id),
        Err(TournamentError::NotAuthorized)
    );
    assert_eq!(
        record_winner(&mut t, &admin(), &bracket_match.id, "stranger"),
        Err(TournamentError::PlayerNotFound)
    );
    record_winner(&mut t, &admin(), &bracket_match.id, &winner_id).unwrap();

    let m = t.bracket().iter().find(|m| m.id == bracket_match.id).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner.as_ref().unwrap().user_id, winner_id);

    // Second record is refused: the first winner already advanced.
    assert_eq!(
        record_winner(&mut t, &admin(), &bracket_match.id, &winner_id),
        Err(TournamentError::InvalidStatus)
    );
}

#[test]
fn half_seated_matches_cannot_be_decided() {
    let mut t = running_with(8);
    let mut round1: Vec<_> = t.bracket().iter().filter(|m| m.round == 1).cloned().collect();
    round1.sort_by_key(|m| m.match_number);
    assert_eq!(round1.len(), 4);

    // Feed only one side of the round-2 match
    let w1 = round1[0].player1.clone().unwrap().user_id;
    record_winner(&mut t, &admin(), &round1[0].id, &w1).unwrap();

    let semi = t
        .bracket()
        .iter()
        .find(|m| m.round == 2 && m.match_number == 1)
        .cloned()
        .unwrap();
    assert!(semi.player2.is_none());

    // The lone seated player cannot be declared winner while the sibling
    // feeder is still undecided
    assert_eq!(
        record_winner(&mut t, &admin(), &semi.id, &w1),
        Err(TournamentError::InvalidStatus)
    );

    // Once the sibling completes, its winner is seated and the match is
    // decidable as usual
    let w2 = round1[1].player1.clone().unwrap().user_id;
    record_winner(&mut t, &admin(), &round1[1].id, &w2).unwrap();

    let semi = t.bracket().iter().find(|m| m.id == semi.id).cloned().unwrap();
    assert_eq!(semi.status, MatchStatus::Pending);
    assert_eq!(semi.player2.as_ref().unwrap().user_id, w2);
    record_winner(&mut t, &admin(), &semi.id, &w2).unwrap();
}

#[test]
fn four_player_bracket_runs_to_a_champion() {
    let mut t = running_with(4);
    let round1: Vec<_> = t.bracket().iter().filter(|m| m.round == 1).cloned().collect();
    assert_eq!(round1.len(), 2);

    for m in &round1 {
        let winner_id = m.player1.clone().unwrap().user_id;
        record_winner(&mut t, &admin(), &m.id, &winner_id).unwrap();
    }

    // Both winners landed in the round-2 match
    let final_match = t.bracket().iter().find(|m| m.round == 2).cloned().unwrap();
    assert!(final_match.player1.is_some() && final_match.player2.is_some());
    assert_eq!(final_match.status, MatchStatus::Pending);

    let champ_id = final_match.player2.clone().unwrap().user_id;
    record_winner(&mut t, &admin(), &final_match.id, &champ_id).unwrap();

    assert_eq!(t.status(), TournamentStatus::Finished);
    assert_eq!(t.champion().unwrap().user_id, champ_id);

    // Finished: no further bracket mutation
    let other = final_match.player1.unwrap().user_id;
    assert_eq!(
        record_winner(&mut t, &admin(), &final_match.id, &other),
        Err(TournamentError::InvalidStatus)
    );
}

#[test]
fn three_player_bracket_with_bye_runs_to_a_champion() {
    let mut t = running_with(3);
    let playable = t
        .bracket()
        .iter()
        .find(|m| m.round == 1 && m.status == MatchStatus::Pending)
        .cloned()
        .unwrap();
    let winner_id = playable.player2.clone().unwrap().user_id;
    record_winner(&mut t, &admin(), &playable.id, &winner_id).unwrap();

    let final_match = t.bracket().iter().find(|m| m.round == 2).cloned().unwrap();
    assert_eq!(final_match.player1.as_ref().unwrap().user_id, winner_id);
    assert!(final_match.player2.is_some(), "bye winner was already seated");

    let champ_id = final_match.player2.clone().unwrap().user_id;
    record_winner(&mut t, &admin(), &final_match.id, &champ_id).unwrap();
    assert_eq!(t.status(), TournamentStatus::Finished);
    assert_eq!(t.champion().unwrap().user_id, champ_id);
}

#[test]
fn five_player_bye_cascades_to_the_final_round() {
    let mut t = running_with(5);
    // ceil(5/2)=3 round-1 matches, ceil(5/4)=2 in round 2, 1 final
    assert_eq!(t.total_rounds(), 3);

    // The trailing bye cascades: round-2 match 2 has no sibling feeder and
    // becomes a bye itself, seating its player straight into the final.
    let r2_bye = t
        .bracket()
        .iter()
        .find(|m| m.round == 2 && m.status == MatchStatus::Bye)
        .unwrap();
    assert_eq!(r2_bye.match_number, 2);
    let final_match = t.bracket().iter().find(|m| m.round == 3).unwrap();
    assert_eq!(
        final_match.player2.as_ref().unwrap().user_id,
        r2_bye.winner.as_ref().unwrap().user_id
    );
}
