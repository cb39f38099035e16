//! Tournament business logic: lobby, draw, match play.

mod draw;
mod lobby;
mod match_play;

pub use draw::{draw_bracket, finish_drawing, total_rounds_for, DrawResult};
pub use lobby::{join, kick, leave, toggle_ready};
pub use match_play::{
    active_matches, get_match_state, record_winner, start_countdown, start_match,
    update_player_list, MatchStateView, StartMatchRequest, MAX_MATCH_MINUTES,
};
