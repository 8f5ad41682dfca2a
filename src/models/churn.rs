// src/models/churn.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::usuario::Usuario;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Churn {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub data_churn: NaiveDate,
    pub motivo: Option<String>,
    pub revertido: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChurnComUsuario {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub churn: Churn,
    pub email_login: String,
    pub nome_completo: String,
    pub indicador: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChurnPayload {
    pub usuario_id: Uuid,
    pub data_churn: NaiveDate,
    #[validate(length(max = 500, message = "Motivo muito longo"))]
    pub motivo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChurnPayload {
    pub data_churn: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Motivo muito longo"))]
    pub motivo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ChurnFiltros {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub revertido: Option<bool>,
    pub usuario_id: Option<Uuid>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub mes: Option<i32>,
    pub ano: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ChurnPorMotivo {
    pub motivo: String,
    pub quantidade: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChurnStats {
    pub total_churns: i64,
    pub churn_ativos: i64,
    pub churn_revertidos: i64,
    /// Percentual de churns revertidos
    pub taxa_reversao: Decimal,
    pub churn_por_motivo: Vec<ChurnPorMotivo>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChurnMensal {
    pub mes: String,
    pub total: i64,
    pub revertidos: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioEmChurn {
    pub churn_id: Uuid,
    pub usuario_id: Uuid,
    pub email_login: String,
    pub nome_completo: String,
    pub data_churn: NaiveDate,
    pub motivo: Option<String>,
    pub dias_desde_churn: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReversaoChurn {
    pub churn: Churn,
    pub usuario: Usuario,
    /// Falso quando o usuário não tinha vencimento futuro e ficou INATIVO.
    pub reativado: bool,
}
