// src/models/usuario.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    agenda::Agenda,
    churn::Churn,
    pagamento::{MetodoPagamento, Pagamento, RegraTipo},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_final", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFinal {
    Ativo,
    EmAtraso,
    Inativo,
    Historico,
}

// Cliente da assinatura. Os campos de vencimento são derivados de `data_venc`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,
    #[schema(example = "cliente@email.com")]
    pub email_login: String,
    #[schema(example = "Maria da Silva")]
    pub nome_completo: String,
    pub telefone: Option<String>,
    pub indicador: Option<String>,
    pub obs: Option<String>,

    pub status_final: StatusFinal,
    pub ciclo: i32,
    pub total_ciclos_usuario: i32,

    pub data_pagto: Option<NaiveDate>,
    pub mes_pagto: Option<String>,
    pub mes_ref: Option<String>,
    pub data_venc: Option<NaiveDate>,
    pub dias_para_vencer: Option<i32>,
    pub vence_hoje: bool,
    pub prox_7_dias: bool,
    pub em_atraso: bool,

    pub metodo: Option<MetodoPagamento>,
    pub conta: Option<String>,
    pub regra_tipo: Option<RegraTipo>,
    pub regra_valor: Option<Decimal>,
    pub elegivel_comissao: bool,
    pub comissao_valor: Option<Decimal>,

    pub entrou: bool,
    pub renovou: bool,
    pub ativo_atual: bool,
    pub churn: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Usuário com seus pagamentos recentes, agenda e churns.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioDetalhe {
    #[serde(flatten)]
    pub usuario: Usuario,
    pub pagamentos: Vec<Pagamento>,
    pub agenda: Vec<Agenda>,
    pub churns: Vec<Churn>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUsuarioPayload {
    #[validate(email(message = "Email inválido"))]
    pub email_login: String,
    #[validate(length(min = 1, message = "O nome é obrigatório"))]
    pub nome_completo: String,
    pub telefone: Option<String>,
    pub indicador: Option<String>,
    pub obs: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUsuarioPayload {
    #[validate(length(min = 1, message = "O nome não pode ser vazio"))]
    pub nome_completo: Option<String>,
    pub telefone: Option<String>,
    pub indicador: Option<String>,
    pub obs: Option<String>,
    pub status_final: Option<StatusFinal>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioFiltros {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<StatusFinal>,
    /// Busca por email, nome ou telefone
    pub search: Option<String>,
    pub indicador: Option<String>,
    pub vence_hoje: Option<bool>,
    pub prox_7_dias: Option<bool>,
    pub em_atraso: Option<bool>,
}

// --- Importação em lote ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportUsuarioItem {
    pub email_login: Option<String>,
    pub nome_completo: Option<String>,
    pub telefone: Option<String>,
    pub indicador: Option<String>,
    pub obs: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportUsuariosPayload {
    pub usuarios: Vec<ImportUsuarioItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResultadoLinha {
    Criado,
    Ignorado,
    Erro,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportDetalhe {
    pub linha: usize,
    pub email: Option<String>,
    pub resultado: ResultadoLinha,
    pub mensagem: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResultado {
    pub success: usize,
    pub errors: usize,
    pub skipped: usize,
    pub details: Vec<ImportDetalhe>,
}

// --- Estatísticas ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioStats {
    pub total: i64,
    pub ativos: i64,
    pub inativos: i64,
    pub em_atraso: i64,
    pub vencem_hoje: i64,
    pub vencem_proximos_7_dias: i64,
}
