pub use self::{game_state::*, game_stats::*, piece_source::*};

mod game_state;
mod game_stats;
mod piece_source;
