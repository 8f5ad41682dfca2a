// src/handlers/pagamentos.rs

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
    middleware::auth::AuthenticatedAdmin,
    models::pagamento::{
        AnoQuery, CreatePagamentoPayload, MesQuery, Pagamento, PagamentoComUsuario, PagamentoFiltros,
        PagamentoMensal, PagamentoStats, UpdatePagamentoPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/pagamentos",
    tag = "Pagamentos",
    params(PagamentoFiltros),
    responses((status = 200, description = "Pagamentos com dados do usuário", body = Vec<PagamentoComUsuario>)),
    security(("api_jwt" = []))
)]
pub async fn list_pagamentos(
    State(app_state): State<AppState>,
    Query(filtros): Query<PagamentoFiltros>,
) -> Result<ApiResponse<Vec<PagamentoComUsuario>>, AppError> {
    let page = PageQuery { page: filtros.page, limit: filtros.limit };
    let (pagamentos, total) = app_state
        .pagamento_service
        .find_all(&filtros, page.limit(), page.offset())
        .await?;

    Ok(ApiResponse::paginated(pagamentos, page.pagination(total)))
}

#[utoipa::path(
    get,
    path = "/api/pagamentos/stats",
    tag = "Pagamentos",
    params(MesQuery),
    responses((status = 200, description = "Totais do mês (padrão: mês corrente)", body = PagamentoStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    Query(query): Query<MesQuery>,
) -> Result<ApiResponse<PagamentoStats>, AppError> {
    Ok(ApiResponse::success(app_state.pagamento_service.get_stats(query.mes.as_deref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/pagamentos/relatorio/mensal",
    tag = "Pagamentos",
    params(AnoQuery),
    responses((status = 200, description = "Totais por mês", body = Vec<PagamentoMensal>)),
    security(("api_jwt" = []))
)]
pub async fn relatorio_mensal(
    State(app_state): State<AppState>,
    Query(query): Query<AnoQuery>,
) -> Result<ApiResponse<Vec<PagamentoMensal>>, AppError> {
    Ok(ApiResponse::success(app_state.pagamento_service.relatorio_mensal(query.ano).await?))
}

#[utoipa::path(
    get,
    path = "/api/pagamentos/{id}",
    tag = "Pagamentos",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento", body = Pagamento),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_pagamento(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Pagamento>, AppError> {
    Ok(ApiResponse::success(app_state.pagamento_service.find_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/pagamentos",
    tag = "Pagamentos",
    request_body = CreatePagamentoPayload,
    responses(
        (status = 201, description = "Pagamento registrado e usuário atualizado", body = Pagamento),
        (status = 400, description = "RECORRENTE sem item pendente na agenda"),
        (status = 409, description = "Mais de um item pendente na agenda")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_pagamento(
    State(app_state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Json(payload): Json<CreatePagamentoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let pagamento = app_state
        .pagamento_service
        .create(&app_state.db_pool, &payload, Some(admin.id))
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::success(pagamento)))
}

#[utoipa::path(
    put,
    path = "/api/pagamentos/{id}",
    tag = "Pagamentos",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    request_body = UpdatePagamentoPayload,
    responses((status = 200, description = "Pagamento atualizado", body = Pagamento)),
    security(("api_jwt" = []))
)]
pub async fn update_pagamento(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePagamentoPayload>,
) -> Result<ApiResponse<Pagamento>, AppError> {
    payload.validate()?;

    let pagamento = app_state.pagamento_service.update(&app_state.db_pool, id, &payload).await?;
    Ok(ApiResponse::success(pagamento))
}

#[utoipa::path(
    delete,
    path = "/api/pagamentos/{id}",
    tag = "Pagamentos",
    params(("id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento removido e efeitos desfeitos"),
        (status = 404, description = "Pagamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_pagamento(
    State(app_state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    app_state.pagamento_service.delete(&app_state.db_pool, id, Some(admin.id)).await?;
    Ok(ApiResponse::with_message((), "Pagamento removido com sucesso"))
}
