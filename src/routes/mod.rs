use actix_web::web;

pub mod admin;
pub mod backend_health;
pub mod board;
pub mod games;
pub mod sport_events;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(backend_health::backend_health)
        .service(sport_events::register_sport_event)
        .service(sport_events::list_sport_events)
        .service(sport_events::possible_sport_events);

    cfg.service(
        web::scope("/games")
            .service(games::create_game)
            .service(games::list_recent_games)
            .service(games::get_game)
            .service(games::get_game_overview)
            .service(board::generate_board)
            .service(board::get_board)
            .service(board::reroll_square)
            .service(board::leave_game)
    );
    cfg.service(
        web::scope("/admin")
            .service(admin::run_update_cycle)
    );
}
