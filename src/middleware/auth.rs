// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState, models::auth::Admin};

/// Token da requisição atual, guardado para o logout revogá-lo.
#[derive(Debug, Clone)]
pub struct TokenAtual {
    pub token: String,
    pub exp: usize,
}

// Valida o Bearer token e injeta o operador nos extensions da requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| AppError::unauthorized("Token de autenticação não fornecido"))?;
    let token = bearer.token();

    let (admin, claims) = app_state.auth_service.validate_token(token).await?;

    request.extensions_mut().insert(AuthenticatedAdmin(admin));
    request.extensions_mut().insert(TokenAtual { token: token.to_owned(), exp: claims.exp });

    Ok(next.run(request).await)
}

// Extrator para obter o operador autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin(pub Admin);

impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedAdmin>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Usuário não autenticado"))
    }
}

impl<S> FromRequestParts<S> for TokenAtual
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenAtual>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Usuário não autenticado"))
    }
}
