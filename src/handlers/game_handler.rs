use actix_web::{web, HttpResponse, Result};
use uuid::Uuid;

use crate::models::common::ApiResponse;
use crate::services::{GameService, NewGame};

#[tracing::instrument(name = "Create game handler", skip(request, games), fields(title = %request.title))]
pub async fn create_game(
    request: web::Json<NewGame>,
    games: web::Data<GameService>,
) -> Result<HttpResponse> {
    let game = games.create_game(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success("Game created", game)))
}

pub async fn get_game(game_id: Uuid, games: web::Data<GameService>) -> Result<HttpResponse> {
    let game = games.get_game(game_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Game retrieved", game)))
}

pub async fn list_recent_games(games: web::Data<GameService>) -> Result<HttpResponse> {
    let recent = games.list_recent_games().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("{} recent games", recent.len()),
        recent,
    )))
}

pub async fn get_game_overview(game_id: Uuid, games: web::Data<GameService>) -> Result<HttpResponse> {
    let overview = games.get_game_overview(game_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Game overview retrieved", overview)))
}
