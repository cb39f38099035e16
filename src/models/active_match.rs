//! Live timed match runtime data, separate from the bracket node it was started from.

use crate::models::bracket::MatchId;
use crate::models::player::UserId;
use serde::{Deserialize, Serialize};

/// Theme payload read once from the catalog collaborator when a match starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeSnapshot {
    pub title: String,
    pub shop: Option<String>,
    pub budget: Option<f64>,
    pub preferences: Option<String>,
}

/// Catalog collaborator: the only fact the core reads from persistent storage.
pub trait ThemeCatalog: Send + Sync {
    fn find_theme(&self, theme_id: &str) -> Option<ThemeSnapshot>;
}

/// One side of an active match. `list` is the player's working text,
/// overwritten whole on every edit (last write wins).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSide {
    pub user_id: UserId,
    pub username: String,
    pub image_url: String,
    pub list: String,
}

/// Runtime status of an active match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActiveMatchStatus {
    /// Created; visible timer not yet started.
    Pending,
    /// Countdown started, players writing.
    Running,
    Completed,
}

/// A live head-to-head list-writing match. The clock is computed, not
/// scheduled: `ends_at` is fixed at creation and readers derive the
/// remaining time from wall-clock time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMatch {
    pub id: MatchId,
    pub theme_id: String,
    pub theme: ThemeSnapshot,
    /// Seconds of play time.
    pub duration: u64,
    /// Epoch ms.
    pub started_at: i64,
    /// Epoch ms; never moves after creation, not even on countdown start.
    pub ends_at: i64,
    pub player1: MatchSide,
    pub player2: MatchSide,
    pub status: ActiveMatchStatus,
}

impl ActiveMatch {
    /// Seconds left on the clock at `now_ms`, clamped at zero.
    pub fn remaining_time_at(&self, now_ms: i64) -> u64 {
        ((self.ends_at - now_ms).max(0) / 1000) as u64
    }

    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.ends_at
    }

    /// Which side a user occupies, if any.
    pub fn side_of(&self, user_id: &str) -> Option<bool> {
        if self.player1.user_id == user_id {
            Some(true)
        } else if self.player2.user_id == user_id {
            Some(false)
        } else {
            None
        }
    }
}
