// src/common/db_utils.rs

use crate::common::error::AppError;

/// Converte violação de chave única em `Conflict` com a mensagem dada.
/// Outros erros seguem como erro de banco.
pub(crate) fn conflito_se_unico(e: sqlx::Error, mensagem: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(mensagem);
        }
    }
    e.into()
}

/// Mesmo que `conflito_se_unico`, mas com mensagem por constraint.
pub(crate) fn conflito_por_constraint(e: sqlx::Error, mapa: &[(&str, &str)]) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            if let Some(constraint) = db_err.constraint() {
                if let Some((_, msg)) = mapa.iter().find(|(c, _)| *c == constraint) {
                    return AppError::conflict(*msg);
                }
                return AppError::conflict(format!("Registro duplicado ({})", constraint));
            }
        }
    }
    e.into()
}
