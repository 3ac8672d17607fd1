use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::common::ApiResponse;
use crate::services::BoardService;

#[derive(Debug, Deserialize)]
pub struct RerollRequest {
    pub category_id: Uuid,
    pub square_index: usize,
}

#[tracing::instrument(name = "Generate board handler", skip(boards))]
pub async fn generate_board(
    game_id: Uuid,
    player_id: Uuid,
    boards: web::Data<BoardService>,
) -> Result<HttpResponse> {
    boards.generate_board(player_id, game_id).await?;
    let view = boards.get_board_view(player_id, game_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Board ready", view)))
}

pub async fn get_board(
    game_id: Uuid,
    player_id: Uuid,
    boards: web::Data<BoardService>,
) -> Result<HttpResponse> {
    let view = boards.get_board_view(player_id, game_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Board retrieved", view)))
}

#[tracing::instrument(name = "Reroll handler", skip(boards))]
pub async fn reroll_square(
    game_id: Uuid,
    player_id: Uuid,
    request: web::Json<RerollRequest>,
    boards: web::Data<BoardService>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    let square = boards
        .reroll_square(player_id, game_id, request.category_id, request.square_index)
        .await?;
    let view = boards.get_board_view(player_id, game_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("Rerolled into '{}', {} rerolls left", square.description, view.rerolls_left),
        view,
    )))
}

#[tracing::instrument(name = "Leave game handler", skip(boards))]
pub async fn leave_game(
    game_id: Uuid,
    player_id: Uuid,
    boards: web::Data<BoardService>,
) -> Result<HttpResponse> {
    boards.leave_game(player_id, game_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Left the game", ())))
}
