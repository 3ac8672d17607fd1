use reqwest::Client;
use serde_json::json;
use uuid::Uuid;

mod common;
use common::bingo_helpers::register_event;
use common::utils::spawn_app;

use hockey_bingo_backend::error::BingoError;
use hockey_bingo_backend::services::NewGame;

fn new_game(category_ids: Vec<Uuid>, sport_event_ids: Vec<Uuid>) -> NewGame {
    NewGame {
        title: "Original Six Night".to_string(),
        category_ids,
        sport_event_ids,
        pattern_ids: None,
        reroll_allowance: None,
    }
}

#[tokio::test]
async fn new_game_gets_catalog_patterns_and_default_allowance() {
    let app = spawn_app().await;
    let event = register_event(&app, "2024020900").await;
    let category_ids: Vec<Uuid> = app.catalog.categories.iter().skip(2).take(5).map(|c| c.id).collect();

    let game = app
        .services
        .games
        .create_game(new_game(category_ids.clone(), vec![event.id]))
        .await
        .unwrap();

    assert_eq!(game.reroll_allowance, 3);
    let expected: Vec<Uuid> = app.catalog.patterns.iter().map(|p| p.id).collect();
    assert_eq!(game.pattern_ids, expected);
    for (index, category_id) in category_ids.iter().enumerate() {
        assert_eq!(game.category_index(*category_id), Some(index));
    }
    assert_eq!(app.services.games.get_game(game.id).await.unwrap(), game);
}

#[tokio::test]
async fn game_needs_five_distinct_known_categories() {
    let app = spawn_app().await;
    let event = register_event(&app, "2024020901").await;
    let ids: Vec<Uuid> = app.catalog.categories.iter().map(|c| c.id).collect();

    let result = app.services.games.create_game(new_game(ids[..4].to_vec(), vec![event.id])).await;
    assert!(matches!(result, Err(BingoError::InvalidData(_))));

    let repeated = vec![ids[0], ids[0], ids[1], ids[2], ids[3]];
    let result = app.services.games.create_game(new_game(repeated, vec![event.id])).await;
    assert!(matches!(result, Err(BingoError::InvalidData(_))));

    let unknown = vec![ids[0], ids[1], ids[2], ids[3], Uuid::new_v4()];
    let result = app.services.games.create_game(new_game(unknown, vec![event.id])).await;
    assert!(matches!(result, Err(BingoError::InvalidData(_))));
}

#[tokio::test]
async fn game_needs_registered_sport_events() {
    let app = spawn_app().await;
    let ids: Vec<Uuid> = app.catalog.categories.iter().take(5).map(|c| c.id).collect();

    let result = app.services.games.create_game(new_game(ids.clone(), vec![Uuid::new_v4()])).await;
    assert!(matches!(result, Err(BingoError::NotFound(_))));

    let result = app.services.games.create_game(new_game(ids, vec![])).await;
    assert!(matches!(result, Err(BingoError::InvalidData(_))));
}

#[tokio::test]
async fn game_routes_create_and_fetch() {
    let app = spawn_app().await;
    let event = register_event(&app, "2024020902").await;
    let category_ids: Vec<Uuid> = app.catalog.categories.iter().take(5).map(|c| c.id).collect();
    let client = Client::new();

    let response = client
        .post(&format!("{}/games", app.address))
        .json(&json!({
            "title": "Rivalry Night",
            "category_ids": category_ids,
            "sport_event_ids": [event.id],
            "reroll_allowance": 1
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["reroll_allowance"], 1);
    let game_id = body["data"]["id"].as_str().unwrap().to_string();

    let response = client
        .get(&format!("{}/games/{}", app.address, game_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Rivalry Night");

    let response = client
        .post(&format!("{}/games", app.address))
        .json(&json!({
            "title": "",
            "category_ids": category_ids,
            "sport_event_ids": [event.id]
        }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn repeated_sport_events_or_patterns_are_invalid() {
    let app = spawn_app().await;
    let event = register_event(&app, "2024020903").await;
    let category_ids: Vec<Uuid> = app.catalog.categories.iter().take(5).map(|c| c.id).collect();

    let result = app
        .services
        .games
        .create_game(new_game(category_ids.clone(), vec![event.id, event.id]))
        .await;
    assert!(matches!(result, Err(BingoError::InvalidData(_))));

    let pattern_id = app.catalog.patterns[0].id;
    let mut request = new_game(category_ids, vec![event.id]);
    request.pattern_ids = Some(vec![pattern_id, pattern_id]);
    let result = app.services.games.create_game(request).await;
    assert!(matches!(result, Err(BingoError::InvalidData(_))));
}

#[tokio::test]
async fn recent_games_count_their_players() {
    let app = spawn_app().await;
    let event = register_event(&app, "2024020904").await;
    let category_ids: Vec<Uuid> = app.catalog.categories.iter().take(5).map(|c| c.id).collect();
    let quiet = app
        .services
        .games
        .create_game(new_game(category_ids.clone(), vec![event.id]))
        .await
        .unwrap();
    let busy = app
        .services
        .games
        .create_game(new_game(category_ids, vec![event.id]))
        .await
        .unwrap();
    for _ in 0..2 {
        app.services.boards.generate_board(Uuid::new_v4(), busy.id).await.unwrap();
    }

    let games = app.services.games.list_recent_games().await.unwrap();
    assert_eq!(games.len(), 2);
    let count = |id: Uuid| games.iter().find(|g| g.id == id).unwrap().player_count;
    assert_eq!(count(busy.id), 2);
    assert_eq!(count(quiet.id), 0);

    let response = Client::new()
        .get(&format!("{}/games", app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}
