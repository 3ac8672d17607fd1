use actix_web::{delete, get, post, web, HttpResponse, Result};
use uuid::Uuid;

use crate::handlers::board_handler::{self, RerollRequest};
use crate::services::BoardService;

/// Generate the player's board, or return the existing one
#[post("/{game_id}/players/{player_id}/board")]
async fn generate_board(
    path: web::Path<(Uuid, Uuid)>,
    boards: web::Data<BoardService>,
) -> Result<HttpResponse> {
    let (game_id, player_id) = path.into_inner();
    board_handler::generate_board(game_id, player_id, boards).await
}

#[get("/{game_id}/players/{player_id}/board")]
async fn get_board(
    path: web::Path<(Uuid, Uuid)>,
    boards: web::Data<BoardService>,
) -> Result<HttpResponse> {
    let (game_id, player_id) = path.into_inner();
    board_handler::get_board(game_id, player_id, boards).await
}

/// Swap one square for a new one, spending a reroll
#[post("/{game_id}/players/{player_id}/reroll")]
async fn reroll_square(
    path: web::Path<(Uuid, Uuid)>,
    request: web::Json<RerollRequest>,
    boards: web::Data<BoardService>,
) -> Result<HttpResponse> {
    let (game_id, player_id) = path.into_inner();
    board_handler::reroll_square(game_id, player_id, request, boards).await
}

/// Leave the game, dropping the player's board
#[delete("/{game_id}/players/{player_id}/board")]
async fn leave_game(
    path: web::Path<(Uuid, Uuid)>,
    boards: web::Data<BoardService>,
) -> Result<HttpResponse> {
    let (game_id, player_id) = path.into_inner();
    board_handler::leave_game(game_id, player_id, boards).await
}
