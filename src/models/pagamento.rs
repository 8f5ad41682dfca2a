// src/models/pagamento.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "metodo_pagamento", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetodoPagamento {
    Pix,
    Credito,
    Dinheiro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "regra_tipo", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegraTipo {
    Primeiro,   // Primeira adesão
    Recorrente, // Renovação
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagamento {
    pub id: Uuid,
    pub usuario_id: Uuid,
    /// Item da agenda renovado por este pagamento (apenas RECORRENTE).
    pub agenda_id: Option<Uuid>,
    pub data_pagto: NaiveDate,
    #[schema(example = "03/2024")]
    pub mes_pagto: String,
    #[schema(example = "150.00")]
    pub valor: Decimal,
    pub metodo: MetodoPagamento,
    #[schema(example = "Nubank")]
    pub conta: String,
    pub regra_tipo: RegraTipo,
    pub regra_valor: Option<Decimal>,
    pub elegivel_comissao: bool,
    pub comissao_valor: Option<Decimal>,
    pub observacao: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pagamento com o resumo do usuário, usado nas listagens.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagamentoComUsuario {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub pagamento: Pagamento,
    pub email_login: String,
    pub nome_completo: String,
    pub indicador: Option<String>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePagamentoPayload {
    pub usuario_id: Uuid,
    pub data_pagto: NaiveDate,
    #[validate(custom(function = "crate::models::validar_valor_positivo"))]
    #[schema(example = "150.00")]
    pub valor: Decimal,
    pub metodo: MetodoPagamento,
    #[validate(length(min = 1, message = "A conta é obrigatória"))]
    pub conta: String,
    pub regra_tipo: RegraTipo,
    pub regra_valor: Option<Decimal>,
    pub elegivel_comissao: Option<bool>,
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePagamentoPayload {
    #[validate(custom(function = "crate::models::validar_valor_positivo"))]
    pub valor: Option<Decimal>,
    pub data_pagto: Option<NaiveDate>,
    pub metodo: Option<MetodoPagamento>,
    #[validate(length(min = 1, message = "A conta não pode ser vazia"))]
    pub conta: Option<String>,
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PagamentoFiltros {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub usuario_id: Option<Uuid>,
    pub metodo: Option<MetodoPagamento>,
    pub conta: Option<String>,
    pub regra_tipo: Option<RegraTipo>,
    /// Mês no formato MM/YYYY
    pub mes: Option<String>,
    pub elegivel_comissao: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct MesQuery {
    /// Mês no formato MM/YYYY
    pub mes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AnoQuery {
    pub ano: Option<i32>,
}

// --- Relatórios ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagamentoStats {
    pub total_pagamentos: i64,
    pub total_receita: Decimal,
    pub receita_mes: Decimal,
    pub primeiras_adesoes: i64,
    pub renovacoes: i64,
    pub valor_medio_pagamento: Decimal,
    pub pagamentos_elegiveis: i64,
    pub total_comissoes: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagamentoMensal {
    #[schema(example = "03/2024")]
    pub mes: String,
    pub quantidade: i64,
    pub receita: Decimal,
    pub primeiras_adesoes: i64,
    pub renovacoes: i64,
}
