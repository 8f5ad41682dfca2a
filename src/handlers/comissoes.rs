// src/handlers/comissoes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        response::{ApiResponse, PageQuery},
    },
    config::AppState,
    models::{
        comissao::{
            Comissao, ComissaoFiltros, ComissaoMensal, ComissaoStats, ConsolidacaoIndicador, CreateComissaoPayload,
            ExtratoIndicador, UpdateComissaoPayload,
        },
        pagamento::AnoQuery,
    },
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MesRefQuery {
    /// Mês de referência no formato MM/YYYY
    pub mes_ref: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/comissoes",
    tag = "Comissoes",
    params(ComissaoFiltros),
    responses((status = 200, description = "Comissões", body = Vec<Comissao>)),
    security(("api_jwt" = []))
)]
pub async fn list_comissoes(
    State(app_state): State<AppState>,
    Query(filtros): Query<ComissaoFiltros>,
) -> Result<ApiResponse<Vec<Comissao>>, AppError> {
    let page = PageQuery { page: filtros.page, limit: filtros.limit };
    let (comissoes, total) = app_state
        .comissao_service
        .find_all(&filtros, page.limit(), page.offset())
        .await?;

    Ok(ApiResponse::paginated(comissoes, page.pagination(total)))
}

#[utoipa::path(
    get,
    path = "/api/comissoes/stats",
    tag = "Comissoes",
    params(MesRefQuery),
    responses((status = 200, description = "Totais de comissão", body = ComissaoStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    Query(query): Query<MesRefQuery>,
) -> Result<ApiResponse<ComissaoStats>, AppError> {
    Ok(ApiResponse::success(app_state.comissao_service.get_stats(query.mes_ref.as_deref()).await?))
}

#[utoipa::path(
    get,
    path = "/api/comissoes/consolidacao/indicador",
    tag = "Comissoes",
    params(MesRefQuery),
    responses((status = 200, description = "Totais por indicador", body = Vec<ConsolidacaoIndicador>)),
    security(("api_jwt" = []))
)]
pub async fn consolidacao_por_indicador(
    State(app_state): State<AppState>,
    Query(query): Query<MesRefQuery>,
) -> Result<ApiResponse<Vec<ConsolidacaoIndicador>>, AppError> {
    let consolidado = app_state
        .comissao_service
        .consolidacao_por_indicador(query.mes_ref.as_deref())
        .await?;
    Ok(ApiResponse::success(consolidado))
}

#[utoipa::path(
    get,
    path = "/api/comissoes/relatorio/mensal",
    tag = "Comissoes",
    params(AnoQuery),
    responses((status = 200, description = "Totais por mês", body = Vec<ComissaoMensal>)),
    security(("api_jwt" = []))
)]
pub async fn relatorio_mensal(
    State(app_state): State<AppState>,
    Query(query): Query<AnoQuery>,
) -> Result<ApiResponse<Vec<ComissaoMensal>>, AppError> {
    Ok(ApiResponse::success(app_state.comissao_service.relatorio_mensal(query.ano).await?))
}

#[utoipa::path(
    get,
    path = "/api/comissoes/extrato/{indicador}",
    tag = "Comissoes",
    params(("indicador" = String, Path, description = "Nome do indicador"), MesRefQuery),
    responses((status = 200, description = "Extrato do indicador", body = ExtratoIndicador)),
    security(("api_jwt" = []))
)]
pub async fn extrato(
    State(app_state): State<AppState>,
    Path(indicador): Path<String>,
    Query(query): Query<MesRefQuery>,
) -> Result<ApiResponse<ExtratoIndicador>, AppError> {
    let extrato = app_state
        .comissao_service
        .extrato(&indicador, query.mes_ref.as_deref())
        .await?;
    Ok(ApiResponse::success(extrato))
}

#[utoipa::path(
    get,
    path = "/api/comissoes/{id}",
    tag = "Comissoes",
    params(("id" = Uuid, Path, description = "ID da comissão")),
    responses(
        (status = 200, description = "Comissão", body = Comissao),
        (status = 404, description = "Comissão não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_comissao(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Comissao>, AppError> {
    Ok(ApiResponse::success(app_state.comissao_service.find_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/comissoes",
    tag = "Comissoes",
    request_body = CreateComissaoPayload,
    responses(
        (status = 201, description = "Comissão criada", body = Comissao),
        (status = 409, description = "Pagamento já possui comissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_comissao(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateComissaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let comissao = app_state.comissao_service.create(&app_state.db_pool, &payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(comissao)))
}

#[utoipa::path(
    put,
    path = "/api/comissoes/{id}",
    tag = "Comissoes",
    params(("id" = Uuid, Path, description = "ID da comissão")),
    request_body = UpdateComissaoPayload,
    responses((status = 200, description = "Comissão atualizada", body = Comissao)),
    security(("api_jwt" = []))
)]
pub async fn update_comissao(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateComissaoPayload>,
) -> Result<ApiResponse<Comissao>, AppError> {
    payload.validate()?;

    let comissao = app_state.comissao_service.update(&app_state.db_pool, id, &payload).await?;
    Ok(ApiResponse::success(comissao))
}

#[utoipa::path(
    delete,
    path = "/api/comissoes/{id}",
    tag = "Comissoes",
    params(("id" = Uuid, Path, description = "ID da comissão")),
    responses((status = 200, description = "Comissão removida")),
    security(("api_jwt" = []))
)]
pub async fn delete_comissao(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<()>, AppError> {
    app_state.comissao_service.delete(&app_state.db_pool, id).await?;
    Ok(ApiResponse::with_message((), "Comissão removida com sucesso"))
}
