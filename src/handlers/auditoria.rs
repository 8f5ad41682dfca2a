// src/handlers/auditoria.rs

use axum::extract::{Query, State};

use crate::{
    common::{
        error::AppError,
        response::{ApiResponse, PageQuery},
    },
    config::AppState,
    middleware::rbac::{RequireRole, RoleAdmin},
    models::auditoria::{Auditoria, AuditoriaFiltros},
};

#[utoipa::path(
    get,
    path = "/api/auditoria",
    tag = "Auditoria",
    params(AuditoriaFiltros),
    responses(
        (status = 200, description = "Trilha de auditoria, mais recentes primeiro", body = Vec<Auditoria>),
        (status = 403, description = "Apenas ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_auditoria(
    State(app_state): State<AppState>,
    _guard: RequireRole<RoleAdmin>,
    Query(filtros): Query<AuditoriaFiltros>,
) -> Result<ApiResponse<Vec<Auditoria>>, AppError> {
    let page = PageQuery { page: filtros.page, limit: filtros.limit };
    let (registros, total) = app_state
        .auditoria_repo
        .find_all(&filtros, page.limit(), page.offset())
        .await?;

    Ok(ApiResponse::paginated(registros, page.pagination(total)))
}
