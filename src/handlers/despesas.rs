// src/handlers/despesas.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        response::{ApiResponse, PageQuery},
    },
    config::AppState,
    models::{
        despesa::{
            CreateDespesaPayload, Despesa, DespesaFiltros, DespesaMensal, DespesaPorCategoria, DespesaStats,
            StatusDespesa, UpdateDespesaPayload,
        },
        pagamento::AnoQuery,
    },
};

#[utoipa::path(
    get,
    path = "/api/despesas",
    tag = "Despesas",
    params(DespesaFiltros),
    responses(
        (status = 200, description = "Despesas", body = Vec<Despesa>),
        (status = 400, description = "Competência inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_despesas(
    State(app_state): State<AppState>,
    Query(filtros): Query<DespesaFiltros>,
) -> Result<ApiResponse<Vec<Despesa>>, AppError> {
    let page = PageQuery { page: filtros.page, limit: filtros.limit };
    let (despesas, total) = app_state
        .despesa_service
        .find_all(&filtros, page.limit(), page.offset())
        .await?;

    Ok(ApiResponse::paginated(despesas, page.pagination(total)))
}

#[utoipa::path(
    get,
    path = "/api/despesas/stats",
    tag = "Despesas",
    responses((status = 200, description = "Totais pagos e pendentes", body = DespesaStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(State(app_state): State<AppState>) -> Result<ApiResponse<DespesaStats>, AppError> {
    Ok(ApiResponse::success(app_state.despesa_service.get_stats().await?))
}

#[utoipa::path(
    get,
    path = "/api/despesas/relatorio/categoria",
    tag = "Despesas",
    params(AnoQuery),
    responses((status = 200, description = "Totais por categoria", body = Vec<DespesaPorCategoria>)),
    security(("api_jwt" = []))
)]
pub async fn relatorio_por_categoria(
    State(app_state): State<AppState>,
    Query(query): Query<AnoQuery>,
) -> Result<ApiResponse<Vec<DespesaPorCategoria>>, AppError> {
    Ok(ApiResponse::success(app_state.despesa_service.relatorio_por_categoria(query.ano).await?))
}

#[utoipa::path(
    get,
    path = "/api/despesas/relatorio/mensal",
    tag = "Despesas",
    params(AnoQuery),
    responses((status = 200, description = "Totais por competência", body = Vec<DespesaMensal>)),
    security(("api_jwt" = []))
)]
pub async fn relatorio_mensal(
    State(app_state): State<AppState>,
    Query(query): Query<AnoQuery>,
) -> Result<ApiResponse<Vec<DespesaMensal>>, AppError> {
    Ok(ApiResponse::success(app_state.despesa_service.relatorio_mensal(query.ano).await?))
}

#[utoipa::path(
    get,
    path = "/api/despesas/{id}",
    tag = "Despesas",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 200, description = "Despesa", body = Despesa),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_despesa(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<Despesa>, AppError> {
    Ok(ApiResponse::success(app_state.despesa_service.find_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/despesas",
    tag = "Despesas",
    request_body = CreateDespesaPayload,
    responses((status = 201, description = "Despesa criada", body = Despesa)),
    security(("api_jwt" = []))
)]
pub async fn create_despesa(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateDespesaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let despesa = app_state.despesa_service.create(&app_state.db_pool, &payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(despesa)))
}

#[utoipa::path(
    put,
    path = "/api/despesas/{id}",
    tag = "Despesas",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    request_body = UpdateDespesaPayload,
    responses((status = 200, description = "Despesa atualizada", body = Despesa)),
    security(("api_jwt" = []))
)]
pub async fn update_despesa(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDespesaPayload>,
) -> Result<ApiResponse<Despesa>, AppError> {
    payload.validate()?;

    let despesa = app_state.despesa_service.update(&app_state.db_pool, id, &payload).await?;
    Ok(ApiResponse::success(despesa))
}

#[utoipa::path(
    put,
    path = "/api/despesas/{id}/pagar",
    tag = "Despesas",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses((status = 200, description = "Despesa marcada como paga", body = Despesa)),
    security(("api_jwt" = []))
)]
pub async fn marcar_paga(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<Despesa>, AppError> {
    let despesa = app_state
        .despesa_service
        .marcar_status(&app_state.db_pool, id, StatusDespesa::Pago)
        .await?;
    Ok(ApiResponse::success(despesa))
}

#[utoipa::path(
    put,
    path = "/api/despesas/{id}/pendente",
    tag = "Despesas",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses((status = 200, description = "Despesa marcada como pendente", body = Despesa)),
    security(("api_jwt" = []))
)]
pub async fn marcar_pendente(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Despesa>, AppError> {
    let despesa = app_state
        .despesa_service
        .marcar_status(&app_state.db_pool, id, StatusDespesa::Pendente)
        .await?;
    Ok(ApiResponse::success(despesa))
}

#[utoipa::path(
    delete,
    path = "/api/despesas/{id}",
    tag = "Despesas",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses((status = 200, description = "Despesa removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_despesa(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<()>, AppError> {
    app_state.despesa_service.delete(&app_state.db_pool, id).await?;
    Ok(ApiResponse::with_message((), "Despesa removida com sucesso"))
}
