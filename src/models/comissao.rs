// src/models/comissao.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::pagamento::RegraTipo;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comissao {
    pub id: Uuid,
    pub pagamento_id: Uuid,
    #[schema(example = "João")]
    pub indicador: String,
    pub regra_tipo: RegraTipo,
    pub valor: Decimal,
    #[schema(example = "03/2024")]
    pub mes_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComissaoPayload {
    pub pagamento_id: Uuid,
    #[validate(length(min = 1, message = "O indicador é obrigatório"))]
    pub indicador: String,
    pub regra_tipo: RegraTipo,
    #[validate(custom(function = "crate::models::validar_valor_positivo"))]
    pub valor: Decimal,
    #[validate(custom(function = "crate::models::validar_mes_ref"))]
    pub mes_ref: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComissaoPayload {
    #[validate(custom(function = "crate::models::validar_valor_positivo"))]
    pub valor: Option<Decimal>,
    #[validate(custom(function = "crate::models::validar_mes_ref"))]
    pub mes_ref: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ComissaoFiltros {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub indicador: Option<String>,
    pub regra_tipo: Option<RegraTipo>,
    pub mes_ref: Option<String>,
    pub pagamento_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComissaoStats {
    pub total_comissoes: i64,
    pub valor_total: Decimal,
    pub valor_mes: Decimal,
    pub total_indicadores: i64,
    pub valor_primeiro: Decimal,
    pub valor_recorrente: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidacaoIndicador {
    pub indicador: String,
    pub quantidade: i64,
    pub valor_total: Decimal,
    pub valor_primeiro: Decimal,
    pub valor_recorrente: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComissaoMensal {
    pub mes_ref: String,
    pub quantidade: i64,
    pub valor_total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtratoItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comissao: Comissao,
    pub usuario_id: Uuid,
    pub email_login: String,
    pub nome_completo: String,
    pub valor_pagamento: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtratoIndicador {
    pub indicador: String,
    pub valor_total: Decimal,
    pub itens: Vec<ExtratoItem>,
}
