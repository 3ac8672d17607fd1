use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{http, web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub mod config;
pub mod db;
pub mod error;
pub mod game;
mod handlers;
pub mod models;
mod routes;
pub mod services;
pub mod telemetry;

use crate::routes::init_routes;
use crate::services::AppServices;

pub fn run(
    listener: TcpListener,
    services: AppServices,
    allowed_origins: Vec<String>,
) -> Result<Server, std::io::Error> {
    // web::Data is an Arc; reuse the services' own Arcs
    let boards = web::Data::from(services.boards);
    let updates = web::Data::from(services.updates);
    let sport_events = web::Data::from(services.sport_events);
    let games = web::Data::from(services.games);

    let server = HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![http::header::ACCEPT, http::header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(boards.clone())
            .app_data(updates.clone())
            .app_data(sport_events.clone())
            .app_data(games.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
