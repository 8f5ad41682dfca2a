// src/handlers/listas.rs

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
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::lista::{CreateListaPayload, ListaAuxiliar, ListasAgrupadas, TipoLista, UpdateListaPayload},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TipoQuery {
    /// Inclui itens desativados
    pub incluir_inativos: Option<bool>,
}

#[utoipa::path(
    get,
    path = "/api/listas",
    tag = "Listas",
    responses((status = 200, description = "Valores ativos agrupados por tipo", body = ListasAgrupadas)),
    security(("api_jwt" = []))
)]
pub async fn list_agrupadas(State(app_state): State<AppState>) -> Result<ApiResponse<ListasAgrupadas>, AppError> {
    Ok(ApiResponse::success(app_state.lista_service.find_agrupadas().await?))
}

#[utoipa::path(
    get,
    path = "/api/listas/tipo/{tipo}",
    tag = "Listas",
    params(("tipo" = TipoLista, Path, description = "CONTA, METODO, CATEGORIA ou INDICADOR"), TipoQuery),
    responses((status = 200, description = "Valores do tipo", body = Vec<ListaAuxiliar>)),
    security(("api_jwt" = []))
)]
pub async fn list_by_tipo(
    State(app_state): State<AppState>,
    Path(tipo): Path<TipoLista>,
    Query(query): Query<TipoQuery>,
) -> Result<ApiResponse<Vec<ListaAuxiliar>>, AppError> {
    let itens = app_state
        .lista_service
        .find_by_tipo(tipo, query.incluir_inativos.unwrap_or(false))
        .await?;
    Ok(ApiResponse::success(itens))
}

#[utoipa::path(
    get,
    path = "/api/listas/{id}",
    tag = "Listas",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item", body = ListaAuxiliar),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<ListaAuxiliar>, AppError> {
    Ok(ApiResponse::success(app_state.lista_service.find_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/listas",
    tag = "Listas",
    request_body = CreateListaPayload,
    responses(
        (status = 201, description = "Item criado", body = ListaAuxiliar),
        (status = 409, description = "Valor já existe para o tipo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateListaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state.lista_service.create(&app_state.db_pool, &payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(item)))
}

#[utoipa::path(
    put,
    path = "/api/listas/{id}",
    tag = "Listas",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateListaPayload,
    responses((status = 200, description = "Item atualizado", body = ListaAuxiliar)),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateListaPayload>,
) -> Result<ApiResponse<ListaAuxiliar>, AppError> {
    payload.validate()?;

    let item = app_state.lista_service.update(&app_state.db_pool, id, &payload).await?;
    Ok(ApiResponse::success(item))
}

#[utoipa::path(
    delete,
    path = "/api/listas/{id}",
    tag = "Listas",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses((status = 200, description = "Item removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_item(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<()>, AppError> {
    app_state.lista_service.delete(&app_state.db_pool, id).await?;
    Ok(ApiResponse::with_message((), "Item removido com sucesso"))
}
