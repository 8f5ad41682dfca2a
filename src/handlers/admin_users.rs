// src/handlers/admin_users.rs

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::{
        auth::AuthenticatedAdmin,
        rbac::{RequireRole, RoleAdmin},
    },
    models::auth::{Admin, UpdateRolePayload},
};

#[utoipa::path(
    get,
    path = "/api/admin-users",
    tag = "Operadores",
    responses(
        (status = 200, description = "Operadores cadastrados", body = Vec<Admin>),
        (status = 403, description = "Apenas ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_admins(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
) -> Result<ApiResponse<Vec<Admin>>, AppError> {
    Ok(ApiResponse::success(app_state.auth_service.listar_admins().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin-users/{id}/aprovar",
    tag = "Operadores",
    params(("id" = Uuid, Path, description = "ID do operador")),
    responses((status = 200, description = "Cadastro aprovado", body = Admin)),
    security(("api_jwt" = []))
)]
pub async fn aprovar(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Admin>, AppError> {
    let admin = app_state.auth_service.aprovar(id).await?;
    tracing::info!("✅ Cadastro de {} aprovado", admin.login);
    Ok(ApiResponse::success(admin))
}

#[utoipa::path(
    delete,
    path = "/api/admin-users/{id}/rejeitar",
    tag = "Operadores",
    params(("id" = Uuid, Path, description = "ID do operador")),
    responses(
        (status = 200, description = "Cadastro pendente removido"),
        (status = 400, description = "Cadastro já aprovado")
    ),
    security(("api_jwt" = []))
)]
pub async fn rejeitar(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    app_state.auth_service.rejeitar(id).await?;
    Ok(ApiResponse::with_message((), "Cadastro rejeitado"))
}

#[utoipa::path(
    put,
    path = "/api/admin-users/{id}/role",
    tag = "Operadores",
    params(("id" = Uuid, Path, description = "ID do operador")),
    request_body = UpdateRolePayload,
    responses((status = 200, description = "Perfil alterado", body = Admin)),
    security(("api_jwt" = []))
)]
pub async fn alterar_role(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    AuthenticatedAdmin(solicitante): AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<ApiResponse<Admin>, AppError> {
    let admin = app_state.auth_service.alterar_role(solicitante.id, id, payload.role).await?;
    Ok(ApiResponse::success(admin))
}

#[utoipa::path(
    put,
    path = "/api/admin-users/{id}/toggle-ativo",
    tag = "Operadores",
    params(("id" = Uuid, Path, description = "ID do operador")),
    responses((status = 200, description = "Operador ativado ou desativado", body = Admin)),
    security(("api_jwt" = []))
)]
pub async fn toggle_ativo(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    AuthenticatedAdmin(solicitante): AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Admin>, AppError> {
    let admin = app_state.auth_service.toggle_ativo(solicitante.id, id).await?;
    Ok(ApiResponse::success(admin))
}
