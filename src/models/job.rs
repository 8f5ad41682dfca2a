// src/models/job.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::agenda::SincronizacaoResultado;

/// Contagem de uma etapa em lote. Falhas por item não interrompem a etapa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResultadoEtapa {
    pub processados: u64,
    pub atualizados: u64,
    pub erros: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoJob {
    pub usuarios: ResultadoEtapa,
    pub agenda: ResultadoEtapa,
    pub sincronizacao: SincronizacaoResultado,
    pub duracao_ms: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecucaoJob {
    pub iniciado_em: DateTime<Utc>,
    pub resultado: Option<ResultadoJob>,
    pub erro: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusJob {
    pub agendamento_ativo: bool,
    /// Hora (UTC) da execução diária
    pub hora_execucao: u32,
    pub em_execucao: bool,
    pub ultima_execucao: Option<ExecucaoJob>,
}
