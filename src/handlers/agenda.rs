// src/handlers/agenda.rs

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
        agenda::{
            Agenda, AgendaComUsuario, AgendaFiltros, AgendaStats, CancelamentoResultado, CreateAgendaPayload,
            MarcarCancelouPayload, MarcarRenovouPayload, RenovacaoResultado, SincronizacaoResultado,
            UpdateAgendaPayload,
        },
        job::ResultadoEtapa,
    },
};

#[utoipa::path(
    get,
    path = "/api/agenda",
    tag = "Agenda",
    params(AgendaFiltros),
    responses((status = 200, description = "Itens da agenda com dados do usuário", body = Vec<AgendaComUsuario>)),
    security(("api_jwt" = []))
)]
pub async fn list_agenda(
    State(app_state): State<AppState>,
    Query(filtros): Query<AgendaFiltros>,
) -> Result<ApiResponse<Vec<AgendaComUsuario>>, AppError> {
    let page = PageQuery { page: filtros.page, limit: filtros.limit };
    let (itens, total) = app_state
        .agenda_service
        .find_all(&filtros, page.limit(), page.offset())
        .await?;

    Ok(ApiResponse::paginated(itens, page.pagination(total)))
}

#[utoipa::path(
    get,
    path = "/api/agenda/stats",
    tag = "Agenda",
    responses((status = 200, description = "Contagens por janela de vencimento", body = AgendaStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(State(app_state): State<AppState>) -> Result<ApiResponse<AgendaStats>, AppError> {
    Ok(ApiResponse::success(app_state.agenda_service.get_stats().await?))
}

#[utoipa::path(
    get,
    path = "/api/agenda/{id}",
    tag = "Agenda",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Item da agenda", body = Agenda),
        (status = 404, description = "Item não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_item(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<Agenda>, AppError> {
    Ok(ApiResponse::success(app_state.agenda_service.find_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/agenda",
    tag = "Agenda",
    request_body = CreateAgendaPayload,
    responses(
        (status = 201, description = "Item criado", body = Agenda),
        (status = 409, description = "Usuário já possui item pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateAgendaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state.agenda_service.create(&app_state.db_pool, &payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(item)))
}

#[utoipa::path(
    put,
    path = "/api/agenda/{id}",
    tag = "Agenda",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = UpdateAgendaPayload,
    responses((status = 200, description = "Item atualizado", body = Agenda)),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAgendaPayload>,
) -> Result<ApiResponse<Agenda>, AppError> {
    payload.validate()?;

    let item = app_state.agenda_service.update(&app_state.db_pool, id, &payload).await?;
    Ok(ApiResponse::success(item))
}

#[utoipa::path(
    delete,
    path = "/api/agenda/{id}",
    tag = "Agenda",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses((status = 200, description = "Item removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_item(State(app_state): State<AppState>, Path(id): Path<Uuid>) -> Result<ApiResponse<()>, AppError> {
    app_state.agenda_service.delete(&app_state.db_pool, id).await?;
    Ok(ApiResponse::with_message((), "Item removido com sucesso"))
}

#[utoipa::path(
    put,
    path = "/api/agenda/{id}/renovou",
    tag = "Agenda",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = MarcarRenovouPayload,
    responses(
        (status = 200, description = "Renovação registrada com o pagamento", body = RenovacaoResultado),
        (status = 400, description = "Item já processado ou inativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn marcar_renovou(
    State(app_state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarcarRenovouPayload>,
) -> Result<ApiResponse<RenovacaoResultado>, AppError> {
    payload.validate()?;

    let resultado = app_state
        .agenda_service
        .marcar_renovou(&app_state.db_pool, id, &payload, Some(admin.id))
        .await?;
    Ok(ApiResponse::success(resultado))
}

#[utoipa::path(
    put,
    path = "/api/agenda/{id}/cancelou",
    tag = "Agenda",
    params(("id" = Uuid, Path, description = "ID do item")),
    request_body = MarcarCancelouPayload,
    responses(
        (status = 200, description = "Cancelamento registrado com churn", body = CancelamentoResultado),
        (status = 400, description = "Item já cancelado")
    ),
    security(("api_jwt" = []))
)]
pub async fn marcar_cancelou(
    State(app_state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    payload: Option<Json<MarcarCancelouPayload>>,
) -> Result<ApiResponse<CancelamentoResultado>, AppError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let resultado = app_state
        .agenda_service
        .marcar_cancelou(&app_state.db_pool, id, payload.motivo.as_deref(), Some(admin.id))
        .await?;
    Ok(ApiResponse::success(resultado))
}

#[utoipa::path(
    put,
    path = "/api/agenda/{id}/reverter-renovou",
    tag = "Agenda",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses((status = 200, description = "Marcação de renovação desfeita", body = Agenda)),
    security(("api_jwt" = []))
)]
pub async fn reverter_renovou(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Agenda>, AppError> {
    let item = app_state.agenda_service.reverter_renovou(&app_state.db_pool, id).await?;
    Ok(ApiResponse::success(item))
}

#[utoipa::path(
    put,
    path = "/api/agenda/{id}/reverter-cancelou",
    tag = "Agenda",
    params(("id" = Uuid, Path, description = "ID do item")),
    responses(
        (status = 200, description = "Marcação de cancelamento desfeita", body = Agenda),
        (status = 409, description = "Usuário já possui outro item pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn reverter_cancelou(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Agenda>, AppError> {
    let item = app_state.agenda_service.reverter_cancelou(&app_state.db_pool, id).await?;
    Ok(ApiResponse::success(item))
}

#[utoipa::path(
    put,
    path = "/api/agenda/atualizar-dias",
    tag = "Agenda",
    responses((status = 200, description = "Dias para vencer recalculados", body = ResultadoEtapa)),
    security(("api_jwt" = []))
)]
pub async fn atualizar_dias(State(app_state): State<AppState>) -> Result<ApiResponse<ResultadoEtapa>, AppError> {
    let resultado = app_state.agenda_service.atualizar_dias_para_vencer(false).await?;
    Ok(ApiResponse::success(resultado))
}

#[utoipa::path(
    post,
    path = "/api/agenda/sincronizar",
    tag = "Agenda",
    responses((status = 200, description = "Agenda alinhada aos vencimentos dos usuários", body = SincronizacaoResultado)),
    security(("api_jwt" = []))
)]
pub async fn sincronizar(State(app_state): State<AppState>) -> Result<ApiResponse<SincronizacaoResultado>, AppError> {
    let resultado = app_state.agenda_service.sincronizar_agenda().await?;
    Ok(ApiResponse::success(resultado))
}
