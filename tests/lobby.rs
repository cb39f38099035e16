//! Integration tests for the lobby: join, readiness, leave, kick, reset.

use list_clash_web::{
    draw_bracket, join, kick, leave, toggle_ready, Principal, Role, Tournament, TournamentError,
    TournamentStatus,
};

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

fn lobby_with(n: usize) -> Tournament {
    let mut t = Tournament::new();
    for i in 0..n {
        join(&mut t, &user(i), 1_000 + i as i64).unwrap();
    }
    t
}

#[test]
fn join_preserves_join_order() {
    let t = lobby_with(5);
    let roster = t.roster();
    assert_eq!(roster.len(), 5);
    let ids: Vec<_> = roster.iter().map(|p| p.user_id.as_str()).collect();
    assert_eq!(ids, vec!["user-0", "user-1", "user-2", "user-3", "user-4"]);
}

#[test]
fn admins_cannot_join() {
    let mut t = Tournament::new();
    assert_eq!(join(&mut t, &admin(), 1), Err(TournamentError::NotAuthorized));
    assert!(t.roster().is_empty());
}

#[test]
fn duplicate_join_fails_and_leaves_one_entry() {
    let mut t = lobby_with(1);
    assert_eq!(join(&mut t, &user(0), 2_000), Err(TournamentError::AlreadyJoined));
    assert_eq!(t.roster().len(), 1);
}

#[test]
fn seventeenth_join_fails_with_capacity_error() {
    let mut t = lobby_with(16);
    assert_eq!(join(&mut t, &user(16), 9_999), Err(TournamentError::TournamentFull));
    assert_eq!(t.roster().len(), 16);
}

#[test]
fn custom_capacity_is_respected() {
    let mut t = Tournament::with_capacity(2);
    join(&mut t, &user(0), 1).unwrap();
    join(&mut t, &user(1), 2).unwrap();
    assert_eq!(join(&mut t, &user(2), 3), Err(TournamentError::TournamentFull));
}

#[test]
fn toggle_ready_flips_and_updates_stats() {
    let mut t = lobby_with(2);
    assert_eq!(toggle_ready(&mut t, &user(0)).unwrap(), true);
    assert_eq!(t.stats().ready, 1);
    assert_eq!(toggle_ready(&mut t, &user(0)).unwrap(), false);
    assert_eq!(t.stats().ready, 0);
}

#[test]
fn toggle_ready_for_unknown_player_fails() {
    let mut t = lobby_with(1);
    assert_eq!(toggle_ready(&mut t, &user(5)), Err(TournamentError::PlayerNotFound));
}

#[test]
fn leave_removes_the_caller() {
    let mut t = lobby_with(3);
    leave(&mut t, &user(1)).unwrap();
    assert!(t.player("user-1").is_none());
    assert_eq!(t.roster().len(), 2);
}

#[test]
fn kick_requires_admin() {
    let mut t = lobby_with(3);
    assert_eq!(kick(&mut t, &user(0), "user-1"), Err(TournamentError::NotAuthorized));
    kick(&mut t, &admin(), "user-1").unwrap();
    assert!(t.player("user-1").is_none());
}

#[test]
fn membership_changes_fail_once_drawn() {
    let mut t = lobby_with(4);
    draw_bracket(&mut t, &admin()).unwrap();
    assert_eq!(t.status(), TournamentStatus::Drawing);

    assert_eq!(leave(&mut t, &user(0)), Err(TournamentError::InvalidStatus));
    assert_eq!(kick(&mut t, &admin(), "user-1"), Err(TournamentError::InvalidStatus));
    assert_eq!(join(&mut t, &user(9), 5_000), Err(TournamentError::InvalidStatus));
    assert_eq!(t.roster().len(), 4);
}

#[test]
fn reset_clears_everything_back_to_lobby() {
    let mut t = lobby_with(4);
    draw_bracket(&mut t, &admin()).unwrap();

    assert_eq!(t.reset(&user(0)), Err(TournamentError::NotAuthorized));
    t.reset(&admin()).unwrap();
    assert_eq!(t.status(), TournamentStatus::Lobby);
    assert!(t.roster().is_empty());
    assert!(t.bracket().is_empty());
    assert_eq!(t.total_rounds(), 0);

    // Lobby usable again after reset
    join(&mut t, &user(0), 1).unwrap();
}

#[test]
fn stats_report_roster_and_capacity() {
    let mut t = lobby_with(3);
    toggle_ready(&mut t, &user(2)).unwrap();
    let stats = t.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.ready, 1);
    assert_eq!(stats.max_players, 16);
    assert_eq!(stats.status, TournamentStatus::Lobby);
}
