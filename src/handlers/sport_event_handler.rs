use actix_web::{web, HttpResponse, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::common::ApiResponse;
use crate::services::SportEventService;

#[derive(Debug, Deserialize)]
pub struct RegisterSportEventRequest {
    pub api_identifier: String,
}

#[tracing::instrument(name = "Register sport event handler", skip(sport_events))]
pub async fn register_sport_event(
    request: web::Json<RegisterSportEventRequest>,
    sport_events: web::Data<SportEventService>,
) -> Result<HttpResponse> {
    let event = sport_events
        .register_sport_event(&request.api_identifier)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success("Sport event registered", event)))
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    /// `YYYY-MM-DD`
    pub date: Option<NaiveDate>,
}

pub async fn list_sport_events(
    query: web::Query<DayQuery>,
    sport_events: web::Data<SportEventService>,
) -> Result<HttpResponse> {
    let events = sport_events.list_sport_events(query.date).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("{} sport events", events.len()),
        events,
    )))
}

#[tracing::instrument(name = "Schedule handler", skip(sport_events))]
pub async fn possible_sport_events(
    query: web::Query<DayQuery>,
    sport_events: web::Data<SportEventService>,
) -> Result<HttpResponse> {
    let games = sport_events.possible_sport_events(query.date).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!("{} scheduled games", games.len()),
        games,
    )))
}
