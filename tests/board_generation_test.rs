use reqwest::Client;
use uuid::Uuid;

mod common;
use common::bingo_helpers::{assert_no_duplicates, create_game, register_event, roster, tiny_catalog};
use common::utils::{spawn_app, spawn_app_with_catalog};

use hockey_bingo_backend::db::BingoStore;
use hockey_bingo_backend::error::BingoError;
use hockey_bingo_backend::models::board::{BoardView, SQUARES_PER_BOARD};

fn square_contents(view: &BoardView) -> Vec<(usize, usize, String, f64)> {
    view.cells
        .iter()
        .map(|c| (c.x, c.y, c.square.description.clone(), c.square.target_value))
        .collect()
}

#[tokio::test]
async fn generated_board_fills_every_slot_without_duplicates() {
    let app = spawn_app().await;
    let first = register_event(&app, "2024020500").await;
    let second = register_event(&app, "2024020501").await;
    let game = create_game(&app, vec![first.id, second.id], 3).await;
    let player_id = Uuid::new_v4();

    app.services.boards.generate_board(player_id, game.id).await.unwrap();
    let view = app.services.boards.get_board_view(player_id, game.id).await.unwrap();

    assert_eq!(view.cells.len(), SQUARES_PER_BOARD);
    assert_eq!(view.rerolls_left, 3);
    assert!(view.won_pattern_id.is_none());
    assert_no_duplicates(&view);
    for cell in &view.cells {
        assert_eq!(cell.square.target_value.fract(), 0.5);
        assert_eq!(cell.square.current_value, 0.0);
        assert!(!cell.square.description.contains("{value}"));
    }
}

#[tokio::test]
async fn same_player_and_game_produce_the_same_board() {
    let player_id = Uuid::new_v4();
    let mut boards = Vec::new();

    // Two isolated installs sharing the catalog, rosters and ids
    let (game, event) = {
        let app = spawn_app().await;
        let event = register_event(&app, "2024020502").await;
        let game = create_game(&app, vec![event.id], 3).await;
        app.services.boards.generate_board(player_id, game.id).await.unwrap();
        boards.push(app.services.boards.get_board_view(player_id, game.id).await.unwrap());
        (game, event)
    };
    let app = spawn_app().await;
    app.data_source.set_roster(&event.api_identifier, roster());
    app.store.insert_sport_event(&event).await.unwrap();
    app.store.create_game(&game).await.unwrap();
    app.services.boards.generate_board(player_id, game.id).await.unwrap();
    boards.push(app.services.boards.get_board_view(player_id, game.id).await.unwrap());

    assert_eq!(square_contents(&boards[0]), square_contents(&boards[1]));
}

#[tokio::test]
async fn generating_twice_returns_the_stored_board() {
    let app = spawn_app().await;
    let event = register_event(&app, "2024020503").await;
    let game = create_game(&app, vec![event.id], 3).await;
    let player_id = Uuid::new_v4();

    let first = app.services.boards.generate_board(player_id, game.id).await.unwrap();
    let squares_after_first = app.store.square_count();
    let second = app.services.boards.generate_board(player_id, game.id).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(app.store.square_count(), squares_after_first);
}

#[tokio::test]
async fn different_players_get_different_boards() {
    let app = spawn_app().await;
    let event = register_event(&app, "2024020504").await;
    let game = create_game(&app, vec![event.id], 3).await;

    let mut views = Vec::new();
    for _ in 0..2 {
        let player_id = Uuid::new_v4();
        app.services.boards.generate_board(player_id, game.id).await.unwrap();
        views.push(app.services.boards.get_board_view(player_id, game.id).await.unwrap());
    }

    assert_ne!(square_contents(&views[0]), square_contents(&views[1]));
}

#[tokio::test]
async fn too_small_catalog_is_exhausted() {
    let app = spawn_app_with_catalog(tiny_catalog()).await;
    let event = register_event(&app, "2024020505").await;
    let game = create_game(&app, vec![event.id], 3).await;

    let result = app.services.boards.generate_board(Uuid::new_v4(), game.id).await;

    assert!(matches!(result, Err(BingoError::CatalogExhausted { .. })));
}

#[tokio::test]
async fn upstream_failure_fails_generation() {
    let app = spawn_app().await;
    let event = register_event(&app, "2024020506").await;
    let game = create_game(&app, vec![event.id], 3).await;
    app.data_source.fail(&event.api_identifier);

    let result = app.services.boards.generate_board(Uuid::new_v4(), game.id).await;

    assert!(matches!(result, Err(BingoError::UpstreamFetchFailed { .. })));
}

#[tokio::test]
async fn board_routes_generate_and_show_the_board() {
    let app = spawn_app().await;
    let event = register_event(&app, "2024020507").await;
    let game = create_game(&app, vec![event.id], 2).await;
    let player_id = Uuid::new_v4();
    let client = Client::new();
    let board_url = format!("{}/games/{}/players/{}/board", app.address, game.id, player_id);

    let response = client.get(&board_url).send().await.expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 404);

    let response = client.post(&board_url).send().await.expect("Failed to execute request.");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Cannot turn into a json.");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["cells"].as_array().unwrap().len(), SQUARES_PER_BOARD);
    assert_eq!(body["data"]["rerolls_left"], 2);

    let response = client.get(&board_url).send().await.expect("Failed to execute request.");
    assert!(response.status().is_success());
    let fetched: serde_json::Value = response.json().await.unwrap();
    assert_eq!(fetched["data"]["cells"], body["data"]["cells"]);
}

#[tokio::test]
async fn unknown_game_is_not_found() {
    let app = spawn_app().await;

    let result = app.services.boards.generate_board(Uuid::new_v4(), Uuid::new_v4()).await;

    assert!(matches!(result, Err(BingoError::NotFound(_))));
}

#[tokio::test]
async fn leaving_drops_the_board_but_keeps_its_squares() {
    let app = spawn_app().await;
    let event = register_event(&app, "2024020508").await;
    let game = create_game(&app, vec![event.id], 2).await;
    let player_id = Uuid::new_v4();
    let board_url = format!("{}/games/{}/players/{}/board", app.address, game.id, player_id);
    let client = Client::new();

    let response = client.delete(&board_url).send().await.expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 404);

    app.services.boards.generate_board(player_id, game.id).await.unwrap();
    let response = client.delete(&board_url).send().await.expect("Failed to execute request.");
    assert!(response.status().is_success());

    let result = app.services.boards.get_board_view(player_id, game.id).await;
    assert!(matches!(result, Err(BingoError::NotFound(_))));
    assert_eq!(app.store.square_count(), SQUARES_PER_BOARD);
    let overview = app.services.games.get_game_overview(game.id).await.unwrap();
    assert!(overview.players.is_empty());

    // Joining again deals a fresh board
    app.services.boards.generate_board(player_id, game.id).await.unwrap();
    let view = app.services.boards.get_board_view(player_id, game.id).await.unwrap();
    assert_eq!(view.rerolls_left, 2);
    assert_eq!(app.store.square_count(), 2 * SQUARES_PER_BOARD);
}
