pub mod board;
pub mod common;
pub mod nhl;
pub mod pattern;
pub mod play;
pub mod sport_event;
pub mod square;
