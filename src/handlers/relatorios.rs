// src/handlers/relatorios.rs

use axum::extract::{Query, State};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::{
        pagamento::AnoQuery,
        relatorio::{
            Dashboard, DesempenhoMensal, IntervaloQuery, PeriodoQuery, RelatorioAgenda, RelatorioFinanceiro,
            RelatorioUsuarios,
        },
    },
};

#[utoipa::path(
    get,
    path = "/api/relatorios/dashboard",
    tag = "Relatorios",
    params(PeriodoQuery),
    responses(
        (status = 200, description = "KPIs do período (padrão: mês corrente)", body = Dashboard),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    Query(periodo): Query<PeriodoQuery>,
) -> Result<ApiResponse<Dashboard>, AppError> {
    Ok(ApiResponse::success(app_state.relatorio_service.dashboard(&periodo).await?))
}

#[utoipa::path(
    get,
    path = "/api/relatorios/financeiro",
    tag = "Relatorios",
    params(IntervaloQuery),
    responses(
        (status = 200, description = "Resumo e totais por mês, conta e método", body = RelatorioFinanceiro),
        (status = 400, description = "Intervalo inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn financeiro(
    State(app_state): State<AppState>,
    Query(intervalo): Query<IntervaloQuery>,
) -> Result<ApiResponse<RelatorioFinanceiro>, AppError> {
    Ok(ApiResponse::success(app_state.relatorio_service.financeiro(&intervalo).await?))
}

#[utoipa::path(
    get,
    path = "/api/relatorios/usuarios",
    tag = "Relatorios",
    responses((status = 200, description = "Usuários por status, indicador e ciclo", body = RelatorioUsuarios)),
    security(("api_jwt" = []))
)]
pub async fn usuarios(State(app_state): State<AppState>) -> Result<ApiResponse<RelatorioUsuarios>, AppError> {
    Ok(ApiResponse::success(app_state.relatorio_service.usuarios().await?))
}

#[utoipa::path(
    get,
    path = "/api/relatorios/desempenho-mensal",
    tag = "Relatorios",
    params(AnoQuery),
    responses((status = 200, description = "Os 12 meses do ano", body = DesempenhoMensal)),
    security(("api_jwt" = []))
)]
pub async fn desempenho_mensal(
    State(app_state): State<AppState>,
    Query(query): Query<AnoQuery>,
) -> Result<ApiResponse<DesempenhoMensal>, AppError> {
    Ok(ApiResponse::success(app_state.relatorio_service.desempenho_mensal(query.ano).await?))
}

#[utoipa::path(
    get,
    path = "/api/relatorios/agenda",
    tag = "Relatorios",
    responses((status = 200, description = "Vencidos e próximos vencimentos", body = RelatorioAgenda)),
    security(("api_jwt" = []))
)]
pub async fn agenda(State(app_state): State<AppState>) -> Result<ApiResponse<RelatorioAgenda>, AppError> {
    Ok(ApiResponse::success(app_state.relatorio_service.agenda().await?))
}
