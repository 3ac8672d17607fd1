use actix_web::{get, post, web, HttpResponse, Result};
use uuid::Uuid;

use crate::handlers::game_handler;
use crate::services::{GameService, NewGame};

#[post("")]
async fn create_game(
    request: web::Json<NewGame>,
    games: web::Data<GameService>,
) -> Result<HttpResponse> {
    game_handler::create_game(request, games).await
}

#[get("/{game_id}")]
async fn get_game(path: web::Path<Uuid>, games: web::Data<GameService>) -> Result<HttpResponse> {
    game_handler::get_game(path.into_inner(), games).await
}

#[get("")]
async fn list_recent_games(games: web::Data<GameService>) -> Result<HttpResponse> {
    game_handler::list_recent_games(games).await
}

/// Players ranked by active squares
#[get("/{game_id}/overview")]
async fn get_game_overview(path: web::Path<Uuid>, games: web::Data<GameService>) -> Result<HttpResponse> {
    game_handler::get_game_overview(path.into_inner(), games).await
}
