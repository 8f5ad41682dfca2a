// src/middleware/admin.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState};

const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Protege as rotas operacionais com a senha de `ADMIN_IMPORT_PASSWORD`.
pub async fn admin_password_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(esperada) = app_state.config.admin_password.as_deref() else {
        return Err(AppError::forbidden("Rotas administrativas desabilitadas"));
    };

    let informada = request
        .headers()
        .get(ADMIN_PASSWORD_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Senha administrativa não fornecida"))?;

    if !senhas_iguais(informada.as_bytes(), esperada.as_bytes()) {
        return Err(AppError::forbidden("Senha administrativa inválida"));
    }

    Ok(next.run(request).await)
}

// Comparação em tempo constante para o mesmo tamanho
fn senhas_iguais(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compara_senhas() {
        assert!(senhas_iguais(b"abc123", b"abc123"));
        assert!(!senhas_iguais(b"abc123", b"abc124"));
        assert!(!senhas_iguais(b"abc", b"abc123"));
    }
}
