use actix_web::{web, HttpResponse, Result};

use crate::models::common::ApiResponse;
use crate::services::SquareUpdateService;

/// Manually trigger one square update cycle
pub async fn run_update_cycle(updates: web::Data<SquareUpdateService>) -> Result<HttpResponse> {
    tracing::info!("📋 Admin requested a square update cycle");

    let summary = updates.run_update_cycle().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        format!(
            "Processed {} sport events, {} new bingos",
            summary.events_processed, summary.new_bingos
        ),
        summary,
    )))
}
