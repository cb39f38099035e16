//! Polling snapshot and the client-side reconciliation state machine.
//!
//! Clients poll the stream endpoint every second or so and feed each snapshot
//! into a [`PollWatcher`]; the watcher diffs it against the previous view and
//! says what the UI must do. It is pure state: no clocks, no transport.

use crate::models::{Player, TournamentStats, TournamentStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What the polling endpoint returns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub stats: TournamentStats,
    /// Server epoch ms at snapshot time.
    pub timestamp: i64,
}

/// UI transition derived from one snapshot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClientAction {
    /// Nothing changed that needs navigation; re-render from the snapshot.
    Stay,
    /// The watching user was removed from the lobby (kicked). A full page
    /// reload, not a soft update: no orphaned session may keep interacting
    /// with a lobby it was expelled from.
    HardReload,
    /// The tournament left the lobby; navigate to the bracket view.
    GoToBracket,
}

/// Snapshot differ for one browsing user (or an anonymous spectator view when
/// `user_id` is None).
#[derive(Debug, Default)]
pub struct PollWatcher {
    user_id: Option<String>,
    previous: Option<(HashSet<String>, TournamentStatus)>,
}

impl PollWatcher {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            user_id,
            previous: None,
        }
    }

    /// Feed one snapshot; returns the required UI transition. The first
    /// snapshot only establishes the baseline and never triggers an action.
    pub fn observe(&mut self, snapshot: &Snapshot) -> ClientAction {
        let ids: HashSet<String> = snapshot.players.iter().map(|p| p.user_id.clone()).collect();
        let status = snapshot.stats.status;

        let action = match &self.previous {
            None => ClientAction::Stay,
            Some((prev_ids, prev_status)) => {
                // Kick detection runs before navigation: a kicked user must
                // reload even if the status moved in the same tick.
                let kicked = self.user_id.as_ref().is_some_and(|uid| {
                    prev_ids.contains(uid) && !ids.contains(uid) && status == TournamentStatus::Lobby
                });
                if kicked {
                    ClientAction::HardReload
                } else if *prev_status == TournamentStatus::Lobby && status != TournamentStatus::Lobby {
                    ClientAction::GoToBracket
                } else {
                    ClientAction::Stay
                }
            }
        };

        self.previous = Some((ids, status));
        action
    }
}
