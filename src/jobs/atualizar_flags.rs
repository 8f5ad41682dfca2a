// src/jobs/atualizar_flags.rs
//
// Reconciliação diária: flags dos usuários, dias da agenda e sincronização
// da agenda com os vencimentos.

use std::{sync::Arc, time::Instant};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, Notify, RwLock};

use crate::{
    common::error::AppError,
    models::job::{ExecucaoJob, ResultadoJob, StatusJob},
    services::{agenda_service::AgendaService, usuario_service::UsuarioService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobConfig {
    pub ativo: bool,
    /// Hora (UTC, 0..=23) da execução diária
    pub hora: u32,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self { ativo: true, hora: 0 }
    }
}

/// Tempo até a próxima ocorrência de `hora:00` UTC, sempre no futuro.
pub fn ate_proxima_execucao(agora: DateTime<Utc>, hora: u32) -> Duration {
    let hoje = agora.date_naive();
    let alvo_hoje = hoje.and_hms_opt(hora.min(23), 0, 0).map(|d| d.and_utc());

    let proxima = match alvo_hoje {
        Some(alvo) if alvo > agora => alvo,
        Some(alvo) => alvo + Duration::days(1),
        None => agora + Duration::days(1),
    };
    proxima - agora
}

#[derive(Clone)]
pub struct AtualizarFlagsJob {
    usuario_service: UsuarioService,
    agenda_service: AgendaService,
    config: JobConfig,
    // Impede duas execuções simultâneas (agendada e manual)
    execucao: Arc<Mutex<()>>,
    ultima: Arc<RwLock<Option<ExecucaoJob>>>,
    shutdown: Arc<Notify>,
}

impl AtualizarFlagsJob {
    pub fn new(usuario_service: UsuarioService, agenda_service: AgendaService, config: JobConfig) -> Self {
        Self {
            usuario_service,
            agenda_service,
            config,
            execucao: Arc::new(Mutex::new(())),
            ultima: Arc::new(RwLock::new(None)),
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    pub async fn executar_job(&self) -> Result<ResultadoJob, AppError> {
        let Ok(_guard) = self.execucao.try_lock() else {
            return Err(AppError::conflict("O job de atualização já está em execução"));
        };

        let iniciado_em = Utc::now();
        tracing::info!("[JOB] Iniciando atualização de flags e agenda");

        let resultado = self.executar_etapas().await;

        let registro = match &resultado {
            Ok(r) => {
                tracing::info!(
                    "[JOB] Concluído em {} ms: usuários {}/{} (erros {}), agenda {}/{} (erros {}), sincronização +{} ~{} (erros {})",
                    r.duracao_ms,
                    r.usuarios.atualizados,
                    r.usuarios.processados,
                    r.usuarios.erros,
                    r.agenda.atualizados,
                    r.agenda.processados,
                    r.agenda.erros,
                    r.sincronizacao.adicionados,
                    r.sincronizacao.atualizados,
                    r.sincronizacao.erros
                );
                ExecucaoJob { iniciado_em, resultado: Some(r.clone()), erro: None }
            }
            Err(e) => {
                tracing::error!("[JOB] Falha na execução: {:?}", e);
                ExecucaoJob { iniciado_em, resultado: None, erro: Some(e.to_string()) }
            }
        };
        *self.ultima.write().await = Some(registro);

        resultado
    }

    async fn executar_etapas(&self) -> Result<ResultadoJob, AppError> {
        let inicio = Instant::now();

        let usuarios = self.usuario_service.atualizar_flags_em_lote().await?;
        let agenda = self.agenda_service.atualizar_dias_para_vencer(true).await?;
        let sincronizacao = self.agenda_service.sincronizar_agenda().await?;

        Ok(ResultadoJob {
            usuarios,
            agenda,
            sincronizacao,
            duracao_ms: inicio.elapsed().as_millis() as u64,
        })
    }

    pub async fn status(&self) -> StatusJob {
        StatusJob {
            agendamento_ativo: self.config.ativo,
            hora_execucao: self.config.hora,
            em_execucao: self.execucao.try_lock().is_err(),
            ultima_execucao: self.ultima.read().await.clone(),
        }
    }

    /// Loop do agendamento diário. Termina com o sinal de shutdown.
    pub async fn run(&self) {
        if !self.config.ativo {
            tracing::info!("[JOB] Agendamento diário desativado");
            return;
        }
        tracing::info!("[JOB] Agendamento diário ativo às {:02}:00 UTC", self.config.hora);

        loop {
            let espera = ate_proxima_execucao(Utc::now(), self.config.hora)
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(60));

            tokio::select! {
                biased;

                _ = self.shutdown.notified() => {
                    tracing::info!("[JOB] Agendamento encerrado");
                    break;
                }

                _ = tokio::time::sleep(espera) => {
                    // Erros já foram registrados em executar_job
                    let _ = self.executar_job().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn proxima_execucao_hoje_se_a_hora_ainda_nao_passou() {
        let agora = Utc.with_ymd_and_hms(2025, 5, 10, 1, 30, 0).unwrap();
        assert_eq!(ate_proxima_execucao(agora, 3), Duration::minutes(90));
    }

    #[test]
    fn proxima_execucao_amanha_se_a_hora_ja_passou() {
        let agora = Utc.with_ymd_and_hms(2025, 5, 10, 3, 0, 0).unwrap();
        assert_eq!(ate_proxima_execucao(agora, 3), Duration::hours(24));

        let agora = Utc.with_ymd_and_hms(2025, 5, 10, 23, 59, 0).unwrap();
        assert_eq!(ate_proxima_execucao(agora, 0), Duration::minutes(1));
    }
}
