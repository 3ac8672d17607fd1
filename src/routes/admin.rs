use actix_web::{post, web, HttpResponse, Result};

use crate::handlers::admin_handler;
use crate::services::SquareUpdateService;

#[post("/update_cycle")]
async fn run_update_cycle(updates: web::Data<SquareUpdateService>) -> Result<HttpResponse> {
    admin_handler::run_update_cycle(updates).await
}
