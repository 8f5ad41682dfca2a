// src/models/auditoria.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "acao_auditoria", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcaoAuditoria {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Auditoria {
    pub id: Uuid,
    pub admin_id: Option<Uuid>,
    pub acao: AcaoAuditoria,
    #[schema(example = "pagamento")]
    pub entidade: String,
    pub registro_id: Uuid,
    pub detalhes: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AuditoriaFiltros {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub entidade: Option<String>,
    pub registro_id: Option<Uuid>,
    pub admin_id: Option<Uuid>,
}
