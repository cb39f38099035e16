//! Data structures for the list-clash tournament: players, bracket, active matches, runtime.

mod active_match;
mod bracket;
mod player;
mod tournament;

pub use active_match::{ActiveMatch, ActiveMatchStatus, MatchSide, ThemeCatalog, ThemeSnapshot};
pub use bracket::{BracketMatch, MatchId, MatchStatus};
pub use player::{IdentityProvider, Player, Principal, Role, UserId};
pub use tournament::{Tournament, TournamentError, TournamentStats, TournamentStatus, MAX_PLAYERS};
