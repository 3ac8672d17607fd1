use actix_web::{get, post, web, HttpResponse, Result};

use crate::handlers::sport_event_handler::{self, DayQuery, RegisterSportEventRequest};
use crate::services::SportEventService;

#[post("/sport_events")]
async fn register_sport_event(
    request: web::Json<RegisterSportEventRequest>,
    sport_events: web::Data<SportEventService>,
) -> Result<HttpResponse> {
    sport_event_handler::register_sport_event(request, sport_events).await
}

#[get("/sport_events")]
async fn list_sport_events(
    query: web::Query<DayQuery>,
    sport_events: web::Data<SportEventService>,
) -> Result<HttpResponse> {
    sport_event_handler::list_sport_events(query, sport_events).await
}

/// NHL games scheduled for a day, ready to register
#[get("/sport_events/schedule")]
async fn possible_sport_events(
    query: web::Query<DayQuery>,
    sport_events: web::Data<SportEventService>,
) -> Result<HttpResponse> {
    sport_event_handler::possible_sport_events(query, sport_events).await
}
