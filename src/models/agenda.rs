// src/models/agenda.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{churn::Churn, pagamento::{MetodoPagamento, Pagamento}};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_agenda", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusAgenda {
    Ativo,
    Inativo,
}

/// Estado do ciclo de vida de um item, derivado de `renovou`/`cancelou`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoAgenda {
    Pendente,
    Renovado,
    Cancelado,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Agenda {
    pub id: Uuid,
    pub usuario_id: Uuid,
    pub data_venc: NaiveDate,
    pub dias_para_vencer: i32,
    pub status: StatusAgenda,
    pub ciclo: i32,
    pub renovou: bool,
    pub cancelou: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agenda {
    pub fn estado(&self) -> EstadoAgenda {
        if self.cancelou {
            EstadoAgenda::Cancelado
        } else if self.renovou {
            EstadoAgenda::Renovado
        } else {
            EstadoAgenda::Pendente
        }
    }

    /// Item ATIVO ainda não processado (nem renovado, nem cancelado).
    pub fn is_pendente(&self) -> bool {
        self.status == StatusAgenda::Ativo && self.estado() == EstadoAgenda::Pendente
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendaComUsuario {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub agenda: Agenda,
    pub email_login: String,
    pub nome_completo: String,
    pub telefone: Option<String>,
    pub indicador: Option<String>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgendaPayload {
    pub usuario_id: Uuid,
    pub data_venc: NaiveDate,
    #[validate(range(min = 0, message = "O ciclo não pode ser negativo"))]
    pub ciclo: Option<i32>,
    pub status: Option<StatusAgenda>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgendaPayload {
    pub data_venc: Option<NaiveDate>,
    pub status: Option<StatusAgenda>,
    #[validate(range(min = 0, message = "O ciclo não pode ser negativo"))]
    pub ciclo: Option<i32>,
}

/// Dados do pagamento de renovação registrado ao marcar "renovou".
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarcarRenovouPayload {
    pub data_pagto: NaiveDate,
    #[validate(custom(function = "crate::models::validar_valor_positivo"))]
    pub valor: Decimal,
    pub metodo: MetodoPagamento,
    #[validate(length(min = 1, message = "A conta é obrigatória"))]
    pub conta: String,
    pub regra_valor: Option<Decimal>,
    pub elegivel_comissao: Option<bool>,
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MarcarCancelouPayload {
    pub motivo: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum JanelaAgenda {
    #[serde(rename = "vencidos")]
    Vencidos,
    #[serde(rename = "hoje")]
    Hoje,
    #[serde(rename = "proximos7dias")]
    Proximos7Dias,
    #[serde(rename = "mesAtual")]
    MesAtual,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AgendaFiltros {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<StatusAgenda>,
    pub usuario_id: Option<Uuid>,
    pub renovou: Option<bool>,
    pub cancelou: Option<bool>,
    #[param(value_type = Option<String>)]
    pub janela: Option<JanelaAgenda>,
}

// --- Respostas ---

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenovacaoResultado {
    pub agenda: Agenda,
    pub pagamento: Pagamento,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelamentoResultado {
    pub agenda: Agenda,
    pub churn: Churn,
    /// Verdadeiro quando o item estava renovado e o pagamento da renovação foi desfeito.
    pub pagamento_revertido: bool,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SincronizacaoResultado {
    pub adicionados: u64,
    pub atualizados: u64,
    pub erros: u64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgendaStats {
    pub total_ativos: i64,
    pub vencidos: i64,
    pub vencem_hoje: i64,
    pub vencem_proximos_7_dias: i64,
    pub vencem_mes_atual: i64,
    pub renovados: i64,
    pub cancelados: i64,
}
