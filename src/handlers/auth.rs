// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::auth::{AuthenticatedAdmin, TokenAtual},
    models::auth::{Admin, AuthResponse, ChangePasswordPayload, LoginPayload, RegisterAdminPayload, RegisterResponse},
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterAdminPayload,
    responses(
        (status = 201, description = "Cadastro criado (o primeiro já sai aprovado)", body = RegisterResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Login já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterAdminPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let resposta = app_state.auth_service.register(&payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::success(resposta)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
        (status = 403, description = "Cadastro pendente ou desativado")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    payload.validate()?;

    let resposta = app_state.auth_service.login(&payload).await?;
    Ok(ApiResponse::success(resposta))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Token revogado")),
    security(("api_jwt" = []))
)]
pub async fn logout(State(app_state): State<AppState>, atual: TokenAtual) -> ApiResponse<()> {
    app_state.auth_service.logout(&atual.token, atual.exp).await;
    ApiResponse::with_message((), "Logout realizado com sucesso")
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses((status = 200, description = "Operador autenticado", body = Admin)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedAdmin(admin): AuthenticatedAdmin) -> ApiResponse<Admin> {
    ApiResponse::success(admin)
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "Auth",
    request_body = ChangePasswordPayload,
    responses(
        (status = 200, description = "Senha alterada"),
        (status = 400, description = "Senha atual incorreta")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedAdmin(admin): AuthenticatedAdmin,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<ApiResponse<()>, AppError> {
    payload.validate()?;

    app_state.auth_service.change_password(admin.id, &payload).await?;
    Ok(ApiResponse::with_message((), "Senha alterada com sucesso"))
}
