// src/handlers/health.rs

use axum::extract::State;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    pub status: &'static str,
    pub database: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Serviço e banco disponíveis", body = Health),
        (status = 500, description = "Banco indisponível")
    )
)]
pub async fn health(State(app_state): State<AppState>) -> Result<ApiResponse<Health>, AppError> {
    sqlx::query("SELECT 1").execute(&app_state.db_pool).await?;
    Ok(ApiResponse::success(Health { status: "ok", database: "ok" }))
}
