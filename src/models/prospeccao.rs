// src/models/prospeccao.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::usuario::Usuario;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prospeccao {
    pub id: Uuid,
    pub email: String,
    pub nome: String,
    pub telefone: Option<String>,
    #[schema(example = "Instagram")]
    pub origem: Option<String>,
    pub indicador: Option<String>,
    pub convertido: bool,
    pub usuario_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProspeccaoPayload {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "O nome é obrigatório"))]
    pub nome: String,
    pub telefone: Option<String>,
    pub origem: Option<String>,
    pub indicador: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProspeccaoPayload {
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "O nome não pode ser vazio"))]
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub origem: Option<String>,
    pub indicador: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProspeccaoFiltros {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub convertido: Option<bool>,
    pub origem: Option<String>,
    pub indicador: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConversaoResultado {
    pub prospeccao: Prospeccao,
    pub usuario: Usuario,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversaoPorGrupo {
    pub grupo: String,
    pub total: i64,
    pub convertidos: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProspeccaoStats {
    pub total: i64,
    pub convertidos: i64,
    pub nao_convertidos: i64,
    /// Percentual de prospecções convertidas
    pub taxa_conversao: Decimal,
    pub por_origem: Vec<ConversaoPorGrupo>,
    pub por_indicador: Vec<ConversaoPorGrupo>,
}
