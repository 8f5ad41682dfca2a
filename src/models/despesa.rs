// src/models/despesa.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_despesa", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusDespesa {
    Pendente,
    Pago,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Despesa {
    pub id: Uuid,
    #[schema(example = "Marketing")]
    pub categoria: String,
    pub descricao: String,
    pub valor: Decimal,
    pub conta: Option<String>,
    pub indicador: Option<String>,
    pub status: StatusDespesa,
    pub competencia_mes: i32,
    pub competencia_ano: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDespesaPayload {
    #[validate(length(min = 1, message = "A categoria é obrigatória"))]
    pub categoria: String,
    #[validate(length(min = 1, message = "A descrição é obrigatória"))]
    pub descricao: String,
    #[validate(custom(function = "crate::models::validar_valor_positivo"))]
    pub valor: Decimal,
    pub conta: Option<String>,
    pub indicador: Option<String>,
    pub status: Option<StatusDespesa>,
    #[validate(range(min = 1, max = 12, message = "Mês de competência deve estar entre 1 e 12"))]
    pub competencia_mes: i32,
    #[validate(range(min = 2000, max = 2100, message = "Ano de competência inválido"))]
    pub competencia_ano: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDespesaPayload {
    #[validate(length(min = 1, message = "A categoria não pode ser vazia"))]
    pub categoria: Option<String>,
    #[validate(length(min = 1, message = "A descrição não pode ser vazia"))]
    pub descricao: Option<String>,
    #[validate(custom(function = "crate::models::validar_valor_positivo"))]
    pub valor: Option<Decimal>,
    pub conta: Option<String>,
    pub indicador: Option<String>,
    pub status: Option<StatusDespesa>,
    #[validate(range(min = 1, max = 12, message = "Mês de competência deve estar entre 1 e 12"))]
    pub competencia_mes: Option<i32>,
    #[validate(range(min = 2000, max = 2100, message = "Ano de competência inválido"))]
    pub competencia_ano: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DespesaFiltros {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub categoria: Option<String>,
    pub status: Option<StatusDespesa>,
    pub conta: Option<String>,
    pub indicador: Option<String>,
    /// Competência no formato MM/YYYY
    pub competencia: Option<String>,
    pub competencia_ano: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DespesaStats {
    pub total_despesas: i64,
    pub valor_total: Decimal,
    pub valor_pendente: Decimal,
    pub valor_pago: Decimal,
    pub valor_mes_atual: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DespesaPorCategoria {
    pub categoria: String,
    pub quantidade: i64,
    pub valor_total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DespesaMensal {
    /// Competência no formato MM/YYYY
    pub competencia: String,
    pub quantidade: i64,
    pub valor_total: Decimal,
    pub valor_pago: Decimal,
}
