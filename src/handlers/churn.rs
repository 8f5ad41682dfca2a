// src/handlers/churn.rs

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
    models::{
        churn::{
            Churn, ChurnComUsuario, ChurnFiltros, ChurnMensal, ChurnStats, CreateChurnPayload, ReversaoChurn,
            UpdateChurnPayload, UsuarioEmChurn,
        },
        pagamento::AnoQuery,
    },
};

#[utoipa::path(
    get,
    path = "/api/churn",
    tag = "Churn",
    params(ChurnFiltros),
    responses((status = 200, description = "Churns com dados do usuário", body = Vec<ChurnComUsuario>)),
    security(("api_jwt" = []))
)]
pub async fn list_churns(
    State(app_state): State<AppState>,
    Query(filtros): Query<ChurnFiltros>,
) -> Result<ApiResponse<Vec<ChurnComUsuario>>, AppError> {
    let page = PageQuery { page: filtros.page, limit: filtros.limit };
    let (churns, total) = app_state
        .churn_service
        .find_all(&filtros, page.limit(), page.offset())
        .await?;

    Ok(ApiResponse::paginated(churns, page.pagination(total)))
}

#[utoipa::path(
    get,
    path = "/api/churn/stats",
    tag = "Churn",
    responses((status = 200, description = "Totais, taxa de reversão e motivos", body = ChurnStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(State(app_state): State<AppState>) -> Result<ApiResponse<ChurnStats>, AppError> {
    Ok(ApiResponse::success(app_state.churn_service.get_stats().await?))
}

#[utoipa::path(
    get,
    path = "/api/churn/relatorio/mensal",
    tag = "Churn",
    params(AnoQuery),
    responses((status = 200, description = "Churns por mês", body = Vec<ChurnMensal>)),
    security(("api_jwt" = []))
)]
pub async fn relatorio_mensal(
    State(app_state): State<AppState>,
    Query(query): Query<AnoQuery>,
) -> Result<ApiResponse<Vec<ChurnMensal>>, AppError> {
    Ok(ApiResponse::success(app_state.churn_service.relatorio_mensal(query.ano).await?))
}

#[utoipa::path(
    get,
    path = "/api/churn/usuarios-em-churn",
    tag = "Churn",
    responses((status = 200, description = "Usuários com churn ativo", body = Vec<UsuarioEmChurn>)),
    security(("api_jwt" = []))
)]
pub async fn usuarios_em_churn(State(app_state): State<AppState>) -> Result<ApiResponse<Vec<UsuarioEmChurn>>, AppError> {
    Ok(ApiResponse::success(app_state.churn_service.usuarios_em_churn().await?))
}

#[utoipa::path(
    get,
    path = "/api/churn/{id}",
    tag = "Churn",
    params(("id" = Uuid, Path, description = "ID do churn")),
    responses(
        (status = 200, description = "Churn", body = Churn),
        (status = 404, description = "Churn não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_churn(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<Churn>, AppError> {
    Ok(ApiResponse::success(app_state.churn_service.find_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/churn",
    tag = "Churn",
    request_body = CreateChurnPayload,
    responses((status = 201, description = "Churn registrado e usuário inativado", body = Churn)),
    security(("api_jwt" = []))
)]
pub async fn create_churn(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateChurnPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let churn = app_state.churn_service.create(&app_state.db_pool, &payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(churn)))
}

#[utoipa::path(
    put,
    path = "/api/churn/{id}",
    tag = "Churn",
    params(("id" = Uuid, Path, description = "ID do churn")),
    request_body = UpdateChurnPayload,
    responses((status = 200, description = "Churn atualizado", body = Churn)),
    security(("api_jwt" = []))
)]
pub async fn update_churn(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateChurnPayload>,
) -> Result<ApiResponse<Churn>, AppError> {
    payload.validate()?;

    let churn = app_state.churn_service.update(&app_state.db_pool, id, &payload).await?;
    Ok(ApiResponse::success(churn))
}

#[utoipa::path(
    delete,
    path = "/api/churn/{id}",
    tag = "Churn",
    params(("id" = Uuid, Path, description = "ID do churn")),
    responses((status = 200, description = "Churn removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_churn(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<()>, AppError> {
    app_state.churn_service.delete(&app_state.db_pool, id).await?;
    Ok(ApiResponse::with_message((), "Churn removido com sucesso"))
}

#[utoipa::path(
    put,
    path = "/api/churn/{id}/reverter",
    tag = "Churn",
    params(("id" = Uuid, Path, description = "ID do churn")),
    responses(
        (status = 200, description = "Churn revertido", body = ReversaoChurn),
        (status = 400, description = "Churn já revertido")
    ),
    security(("api_jwt" = []))
)]
pub async fn reverter_churn(
    State(app_state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<ReversaoChurn>, AppError> {
    let resultado = app_state
        .churn_service
        .reverter_churn(&app_state.db_pool, id, Some(admin.id))
        .await?;
    Ok(ApiResponse::success(resultado))
}
