// src/handlers/usuarios.rs

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
    models::usuario::{
        CreateUsuarioPayload, ImportResultado, ImportUsuariosPayload, UpdateUsuarioPayload, Usuario, UsuarioDetalhe,
        UsuarioFiltros, UsuarioStats,
    },
};

#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Usuarios",
    params(UsuarioFiltros),
    responses((status = 200, description = "Lista paginada de usuários", body = Vec<Usuario>)),
    security(("api_jwt" = []))
)]
pub async fn list_usuarios(
    State(app_state): State<AppState>,
    Query(filtros): Query<UsuarioFiltros>,
) -> Result<ApiResponse<Vec<Usuario>>, AppError> {
    let page = PageQuery { page: filtros.page, limit: filtros.limit };
    let (usuarios, total) = app_state
        .usuario_service
        .find_all(&filtros, page.limit(), page.offset())
        .await?;

    Ok(ApiResponse::paginated(usuarios, page.pagination(total)))
}

#[utoipa::path(
    get,
    path = "/api/usuarios/stats",
    tag = "Usuarios",
    responses((status = 200, description = "Contagens por status e flags", body = UsuarioStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(State(app_state): State<AppState>) -> Result<ApiResponse<UsuarioStats>, AppError> {
    Ok(ApiResponse::success(app_state.usuario_service.get_stats().await?))
}

#[utoipa::path(
    get,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário com pagamentos, agenda e churns", body = UsuarioDetalhe),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_usuario(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<UsuarioDetalhe>, AppError> {
    Ok(ApiResponse::success(app_state.usuario_service.find_by_id(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/usuarios",
    tag = "Usuarios",
    request_body = CreateUsuarioPayload,
    responses(
        (status = 201, description = "Usuário criado como INATIVO", body = Usuario),
        (status = 409, description = "Email já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_usuario(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateUsuarioPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let usuario = app_state.usuario_service.create(&app_state.db_pool, &payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(usuario)))
}

#[utoipa::path(
    put,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = UpdateUsuarioPayload,
    responses((status = 200, description = "Usuário atualizado", body = Usuario)),
    security(("api_jwt" = []))
)]
pub async fn update_usuario(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUsuarioPayload>,
) -> Result<ApiResponse<Usuario>, AppError> {
    payload.validate()?;

    let usuario = app_state.usuario_service.update(&app_state.db_pool, id, &payload).await?;
    Ok(ApiResponse::success(usuario))
}

#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário e histórico removidos"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_usuario(
    State(app_state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    app_state.usuario_service.delete(&app_state.db_pool, id, Some(admin.id)).await?;
    Ok(ApiResponse::with_message((), "Usuário removido com sucesso"))
}

#[utoipa::path(
    put,
    path = "/api/usuarios/{id}/atualizar-flags",
    tag = "Usuarios",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses((status = 200, description = "Flags recalculadas a partir do vencimento", body = Usuario)),
    security(("api_jwt" = []))
)]
pub async fn atualizar_flags(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Usuario>, AppError> {
    let usuario = app_state.usuario_service.atualizar_flags(&app_state.db_pool, id).await?;
    Ok(ApiResponse::success(usuario))
}

#[utoipa::path(
    post,
    path = "/api/usuarios/import",
    tag = "Usuarios",
    request_body = ImportUsuariosPayload,
    responses((status = 200, description = "Resultado linha a linha da importação", body = ImportResultado)),
    security(("api_jwt" = []))
)]
pub async fn import_usuarios(
    State(app_state): State<AppState>,
    Json(payload): Json<ImportUsuariosPayload>,
) -> Result<ApiResponse<ImportResultado>, AppError> {
    if payload.usuarios.is_empty() {
        return Err(AppError::bad_request("Nenhum usuário para importar"));
    }

    let resultado = app_state.usuario_service.import_bulk(&payload.usuarios).await?;
    tracing::info!(
        "📥 Importação: {} criados, {} ignorados, {} com erro",
        resultado.success,
        resultado.skipped,
        resultado.errors
    );
    Ok(ApiResponse::success(resultado))
}
