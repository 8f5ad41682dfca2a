// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, middleware::auth::AuthenticatedAdmin, models::auth::AdminRole};

/// Perfil exigido por uma rota
pub trait RoleDef: Send + Sync + 'static {
    fn role() -> AdminRole;
}

/// Guardião: rejeita com 403 quem não tem o perfil `T`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = parts
            .extensions
            .get::<AuthenticatedAdmin>()
            .ok_or_else(|| AppError::unauthorized("Usuário não autenticado"))?;

        if admin.0.role != T::role() {
            return Err(AppError::forbidden("Acesso restrito a administradores"));
        }

        Ok(RequireRole(PhantomData))
    }
}

pub struct RoleAdmin;
impl RoleDef for RoleAdmin {
    fn role() -> AdminRole {
        AdminRole::Admin
    }
}
