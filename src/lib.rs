//! List-clash tournament web app: library with models, business logic, and the
//! polling gateway pieces.

pub mod gateway;
pub mod logic;
pub mod models;

pub use gateway::{ClientAction, PollWatcher, RateLimiter, Snapshot};
pub use logic::{
    active_matches, draw_bracket, finish_drawing, get_match_state, join, kick, leave,
    record_winner, start_countdown, start_match, toggle_ready, total_rounds_for,
    update_player_list, DrawResult, MatchStateView, StartMatchRequest, MAX_MATCH_MINUTES,
};
pub use models::{
    ActiveMatch, ActiveMatchStatus, BracketMatch, IdentityProvider, MatchId, MatchSide,
    MatchStatus, Player, Principal, Role, ThemeCatalog, ThemeSnapshot, Tournament,
    TournamentError, TournamentStats, TournamentStatus, UserId, MAX_PLAYERS,
};
