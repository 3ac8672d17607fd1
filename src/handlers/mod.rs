pub mod admin_handler;
pub mod backend_health_handler;
pub mod board_handler;
pub mod game_handler;
pub mod sport_event_handler;
