// src/handlers/admin.rs

use axum::extract::State;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::job::{ResultadoJob, StatusJob},
};

#[utoipa::path(
    post,
    path = "/api/admin/atualizar-flags",
    tag = "Admin",
    params(("x-admin-password" = String, Header, description = "Senha administrativa")),
    responses(
        (status = 200, description = "Reconciliação executada", body = ResultadoJob),
        (status = 403, description = "Senha inválida ou rotas desabilitadas"),
        (status = 409, description = "Job já em execução")
    )
)]
pub async fn executar_job(State(app_state): State<AppState>) -> Result<ApiResponse<ResultadoJob>, AppError> {
    tracing::info!("[JOB] Execução manual solicitada");
    let resultado = app_state.job.executar_job().await?;
    Ok(ApiResponse::success(resultado))
}

#[utoipa::path(
    get,
    path = "/api/admin/status",
    tag = "Admin",
    params(("x-admin-password" = String, Header, description = "Senha administrativa")),
    responses((status = 200, description = "Agendamento e última execução", body = StatusJob))
)]
pub async fn status_job(State(app_state): State<AppState>) -> ApiResponse<StatusJob> {
    ApiResponse::success(app_state.job.status().await)
}
