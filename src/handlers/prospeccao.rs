// src/handlers/prospeccao.rs

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
    models::prospeccao::{
        ConversaoResultado, CreateProspeccaoPayload, Prospeccao, ProspeccaoFiltros, ProspeccaoStats,
        UpdateProspeccaoPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/prospeccao",
    tag = "Prospeccao",
    params(ProspeccaoFiltros),
    responses((status = 200, description = "Prospecções", body = Vec<Prospeccao>)),
    security(("api_jwt" = []))
)]
pub async fn list_prospeccoes(
    State(app_state): State<AppState>,
    Query(filtros): Query<ProspeccaoFiltros>,
) -> Result<ApiResponse<Vec<Prospeccao>>, AppError> {
    let page = PageQuery { page: filtros.page, limit: filtros.limit };
    let (prospeccoes, total) = app_state
        .prospeccao_service
        .find_all(&filtros, page.limit(), page.offset())
        .await?;

    Ok(ApiResponse::paginated(prospeccoes, page.pagination(total)))
}

#[utoipa::path(
    get,
    path = "/api/prospeccao/stats",
    tag = "Prospeccao",
    responses((status = 200, description = "Taxa de conversão por origem e indicador", body = ProspeccaoStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(State(app_state): State<AppState>) -> Result<ApiResponse<ProspeccaoStats>, AppError> {
    Ok(ApiResponse::success(app_state.prospeccao_service.get_stats().await?))
}

#[utoipa::path(
    get,
    path = "/api/prospeccao/nao-convertidas",
    tag = "Prospeccao",
    responses((status = 200, description = "Prospecções ainda não convertidas", body = Vec<Prospeccao>)),
    security(("api_jwt" = []))
)]
pub async fn nao_convertidas(State(app_state): State<AppState>) -> Result<ApiResponse<Vec<Prospeccao>>, AppError> {
    Ok(ApiResponse::success(app_state.prospeccao_service.find_nao_convertidas().await?))
}

#[utoipa::path(
    get,
    path = "/api/prospeccao/{id}",
    tag = "Prospeccao",
    params(("id" = Uuid, Path, description = "ID da prospecção")),
    responses(
        (status = 200, description = "Prospecção", body = Prospeccao),
        (status = 404, description = "Prospecção não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_prospeccao(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Prospeccao>, AppError> {
    Ok(ApiResponse::success(app_state.prospeccao_service.find_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/prospeccao",
    tag = "Prospeccao",
    request_body = CreateProspeccaoPayload,
    responses(
        (status = 201, description = "Prospecção criada", body = Prospeccao),
        (status = 409, description = "Email já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_prospeccao(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProspeccaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let prospeccao = app_state.prospeccao_service.create(&app_state.db_pool, &payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(prospeccao)))
}

#[utoipa::path(
    put,
    path = "/api/prospeccao/{id}",
    tag = "Prospeccao",
    params(("id" = Uuid, Path, description = "ID da prospecção")),
    request_body = UpdateProspeccaoPayload,
    responses((status = 200, description = "Prospecção atualizada", body = Prospeccao)),
    security(("api_jwt" = []))
)]
pub async fn update_prospeccao(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProspeccaoPayload>,
) -> Result<ApiResponse<Prospeccao>, AppError> {
    payload.validate()?;

    let prospeccao = app_state.prospeccao_service.update(&app_state.db_pool, id, &payload).await?;
    Ok(ApiResponse::success(prospeccao))
}

#[utoipa::path(
    delete,
    path = "/api/prospeccao/{id}",
    tag = "Prospeccao",
    params(("id" = Uuid, Path, description = "ID da prospecção")),
    responses(
        (status = 200, description = "Prospecção removida"),
        (status = 400, description = "Prospecção já convertida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_prospeccao(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<()>, AppError> {
    app_state.prospeccao_service.delete(&app_state.db_pool, id).await?;
    Ok(ApiResponse::with_message((), "Prospecção removida com sucesso"))
}

#[utoipa::path(
    post,
    path = "/api/prospeccao/{id}/converter",
    tag = "Prospeccao",
    params(("id" = Uuid, Path, description = "ID da prospecção")),
    responses(
        (status = 200, description = "Usuário criado a partir da prospecção", body = ConversaoResultado),
        (status = 400, description = "Prospecção já convertida"),
        (status = 409, description = "Já existe usuário com este email")
    ),
    security(("api_jwt" = []))
)]
pub async fn converter(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<ConversaoResultado>, AppError> {
    let resultado = app_state
        .prospeccao_service
        .converter_para_usuario(&app_state.db_pool, id)
        .await?;
    Ok(ApiResponse::success(resultado))
}
