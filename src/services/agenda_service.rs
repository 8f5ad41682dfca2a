// src/services/agenda_service.rs

use chrono::{Duration, NaiveDate};
use serde_json::json;
use sqlx::{Acquire, Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        date_utils::{
            calcular_dias_para_vencer, hoje, primeiro_dia_do_mes, ultimo_dia_do_mes, DIAS_ALERTA_VENCIMENTO,
            JANELA_SINCRONIZACAO_DIAS,
        },
        error::AppError,
    },
    db::{
        agenda_repo::{AgendaConsulta, MSG_PENDENTE_DUPLICADO},
        AgendaRepository, AuditoriaRepository, ChurnRepository, PagamentoRepository, UsuarioRepository,
    },
    models::{
        agenda::{
            Agenda, AgendaComUsuario, AgendaFiltros, AgendaStats, CancelamentoResultado, CreateAgendaPayload,
            JanelaAgenda, MarcarRenovouPayload, RenovacaoResultado, SincronizacaoResultado, StatusAgenda,
            UpdateAgendaPayload,
        },
        auditoria::AcaoAuditoria,
        job::ResultadoEtapa,
        pagamento::{CreatePagamentoPayload, RegraTipo},
        usuario::Usuario,
    },
    services::{ciclo, pagamento_service::PagamentoService},
};

pub const MOTIVO_CANCELAMENTO_PADRAO: &str = "Cancelamento via agenda";

/// Converte a janela nomeada em intervalo de `data_venc` (inclusivo).
pub fn intervalo_janela(janela: JanelaAgenda, hoje: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match janela {
        JanelaAgenda::Vencidos => (None, Some(hoje - Duration::days(1))),
        JanelaAgenda::Hoje => (Some(hoje), Some(hoje)),
        JanelaAgenda::Proximos7Dias => (Some(hoje + Duration::days(1)), Some(hoje + Duration::days(DIAS_ALERTA_VENCIMENTO))),
        JanelaAgenda::MesAtual => (Some(primeiro_dia_do_mes(hoje)), Some(ultimo_dia_do_mes(hoje))),
    }
}

/// Se o item pendente existente diverge do vencimento atual do usuário.
fn precisa_sincronizar(item: &Agenda, usuario: &Usuario, data_venc: NaiveDate, dias: i32) -> bool {
    item.data_venc != data_venc || item.dias_para_vencer != dias || item.ciclo != usuario.ciclo
}

#[derive(Clone)]
pub struct AgendaService {
    pool: PgPool,
    agenda_repo: AgendaRepository,
    usuario_repo: UsuarioRepository,
    pagamento_repo: PagamentoRepository,
    churn_repo: ChurnRepository,
    auditoria_repo: AuditoriaRepository,
    pagamento_service: PagamentoService,
}

impl AgendaService {
    pub fn new(
        pool: PgPool,
        agenda_repo: AgendaRepository,
        usuario_repo: UsuarioRepository,
        pagamento_repo: PagamentoRepository,
        churn_repo: ChurnRepository,
        auditoria_repo: AuditoriaRepository,
        pagamento_service: PagamentoService,
    ) -> Self {
        Self { pool, agenda_repo, usuario_repo, pagamento_repo, churn_repo, auditoria_repo, pagamento_service }
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn find_all(&self, filtros: &AgendaFiltros, limit: i64, offset: i64) -> Result<(Vec<AgendaComUsuario>, i64), AppError> {
        let (venc_de, venc_ate) = match filtros.janela {
            Some(janela) => intervalo_janela(janela, hoje()),
            None => (None, None),
        };
        let consulta = AgendaConsulta {
            status: filtros.status,
            usuario_id: filtros.usuario_id,
            renovou: filtros.renovou,
            cancelou: filtros.cancelou,
            venc_de,
            venc_ate,
        };
        self.agenda_repo.find_all(&consulta, limit, offset).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Agenda, AppError> {
        self.agenda_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Item da agenda não encontrado"))
    }

    pub async fn get_stats(&self) -> Result<AgendaStats, AppError> {
        let hoje = hoje();
        self.agenda_repo
            .stats(
                &self.pool,
                hoje,
                hoje + Duration::days(DIAS_ALERTA_VENCIMENTO),
                primeiro_dia_do_mes(hoje),
                ultimo_dia_do_mes(hoje),
            )
            .await
    }

    // =========================================================================
    //  CRUD
    // =========================================================================

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateAgendaPayload) -> Result<Agenda, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let usuario = self
            .usuario_repo
            .find_by_id_for_update(&mut *tx, payload.usuario_id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        let status = payload.status.unwrap_or(StatusAgenda::Ativo);
        if status == StatusAgenda::Ativo {
            let pendentes = self.agenda_repo.find_pendentes_by_usuario(&mut *tx, usuario.id).await?;
            if !pendentes.is_empty() {
                return Err(AppError::conflict(MSG_PENDENTE_DUPLICADO));
            }
        }

        let dias = calcular_dias_para_vencer(payload.data_venc, hoje());
        let ciclo = payload.ciclo.unwrap_or(usuario.ciclo);
        let agenda = self
            .agenda_repo
            .create(&mut *tx, usuario.id, payload.data_venc, dias, status, ciclo)
            .await?;

        tx.commit().await?;
        tracing::info!("📅 Item {} criado na agenda do usuário {}", agenda.id, usuario.id);
        Ok(agenda)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateAgendaPayload) -> Result<Agenda, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let (_, item) = self.travar_item(&mut *tx, id).await?;

        let dias = payload.data_venc.map(|d| calcular_dias_para_vencer(d, hoje()));
        // O índice parcial barra dois pendentes se o status voltar a ATIVO
        let agenda = self
            .agenda_repo
            .update(&mut *tx, item.id, payload.data_venc, dias, payload.status, payload.ciclo)
            .await?;

        tx.commit().await?;
        Ok(agenda)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.agenda_repo.delete(executor, id).await? {
            return Err(AppError::not_found("Item da agenda não encontrado"));
        }
        Ok(())
    }

    // =========================================================================
    //  TRANSIÇÕES
    // =========================================================================

    /// Trava usuário e item, nessa ordem (a mesma usada pelos pagamentos).
    async fn travar_item(&self, conn: &mut PgConnection, id: Uuid) -> Result<(Usuario, Agenda), AppError> {
        let item = self
            .agenda_repo
            .find_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("Item da agenda não encontrado"))?;

        let usuario = self
            .usuario_repo
            .find_by_id_for_update(&mut *conn, item.usuario_id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        let item = self
            .agenda_repo
            .find_by_id_for_update(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::not_found("Item da agenda não encontrado"))?;

        Ok((usuario, item))
    }

    pub async fn marcar_renovou<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &MarcarRenovouPayload,
        admin_id: Option<Uuid>,
    ) -> Result<RenovacaoResultado, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let (usuario, item) = self.travar_item(&mut *tx, id).await?;
        ciclo::validar_renovacao(&item)?;

        let dados_pagamento = CreatePagamentoPayload {
            usuario_id: usuario.id,
            data_pagto: payload.data_pagto,
            valor: payload.valor,
            metodo: payload.metodo,
            conta: payload.conta.clone(),
            regra_tipo: RegraTipo::Recorrente,
            regra_valor: payload.regra_valor,
            elegivel_comissao: payload.elegivel_comissao,
            observacao: payload
                .observacao
                .clone()
                .or_else(|| Some(ciclo::observacao_renovacao(item.ciclo))),
        };
        let pagamento = self
            .pagamento_service
            .registrar(&mut *tx, &dados_pagamento, Some(&item), admin_id)
            .await?;

        let agenda = self
            .agenda_repo
            .find_by_id(&mut *tx, item.id)
            .await?
            .ok_or_else(|| AppError::not_found("Item da agenda não encontrado"))?;

        tx.commit().await?;
        tracing::info!("🔁 Item {} renovado (pagamento {})", agenda.id, pagamento.id);
        Ok(RenovacaoResultado { agenda, pagamento })
    }

    pub async fn marcar_cancelou<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        motivo: Option<&str>,
        admin_id: Option<Uuid>,
    ) -> Result<CancelamentoResultado, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let (usuario, item) = self.travar_item(&mut *tx, id).await?;
        let estava_renovado = ciclo::validar_cancelamento(&item)?;

        let mut pagamento_revertido = false;
        if estava_renovado {
            match self
                .pagamento_repo
                .find_renovacao_da_agenda(&mut *tx, item.id, usuario.id)
                .await?
            {
                Some(pagamento) => {
                    self.pagamento_service.excluir(&mut *tx, &pagamento, admin_id).await?;
                    pagamento_revertido = true;
                }
                None => tracing::warn!(
                    "⚠️ Item {} estava renovado mas nenhum pagamento RECORRENTE foi encontrado para desfazer",
                    item.id
                ),
            }
        }

        // Estado do usuário pode ter mudado com a reversão do pagamento
        let mut usuario = self
            .usuario_repo
            .find_by_id_for_update(&mut *tx, usuario.id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        let motivo = motivo
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(MOTIVO_CANCELAMENTO_PADRAO);
        let churn = self.churn_repo.create(&mut *tx, usuario.id, hoje(), Some(motivo)).await?;

        ciclo::cancelar_por_agenda(&mut usuario);
        self.usuario_repo.salvar_estado(&mut *tx, &usuario).await?;

        let agenda = self
            .agenda_repo
            .set_estado(&mut *tx, item.id, false, true, StatusAgenda::Inativo)
            .await?;

        self.auditoria_repo
            .registrar(
                &mut *tx,
                admin_id,
                AcaoAuditoria::Update,
                "agenda",
                agenda.id,
                Some(json!({
                    "acao": "cancelamento",
                    "churnId": churn.id,
                    "pagamentoRevertido": pagamento_revertido,
                })),
            )
            .await?;

        tx.commit().await?;
        tracing::info!("❌ Item {} cancelado, churn {} registrado", agenda.id, churn.id);
        Ok(CancelamentoResultado { agenda, churn, pagamento_revertido })
    }

    /// Limpa apenas a flag. O pagamento continua registrado.
    pub async fn reverter_renovou<'e, E>(&self, executor: E, id: Uuid) -> Result<Agenda, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let (_, item) = self.travar_item(&mut *tx, id).await?;
        ciclo::validar_reverter_renovou(&item)?;

        let agenda = self
            .agenda_repo
            .set_estado(&mut *tx, item.id, false, item.cancelou, item.status)
            .await?;

        tx.commit().await?;
        Ok(agenda)
    }

    /// Limpa apenas a flag e reativa o item. O churn continua registrado.
    pub async fn reverter_cancelou<'e, E>(&self, executor: E, id: Uuid) -> Result<Agenda, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let (usuario, item) = self.travar_item(&mut *tx, id).await?;
        ciclo::validar_reverter_cancelou(&item)?;

        if !item.renovou {
            let pendentes = self.agenda_repo.find_pendentes_by_usuario(&mut *tx, usuario.id).await?;
            if pendentes.iter().any(|p| p.id != item.id) {
                return Err(AppError::conflict(MSG_PENDENTE_DUPLICADO));
            }
        }

        let agenda = self
            .agenda_repo
            .set_estado(&mut *tx, item.id, item.renovou, false, StatusAgenda::Ativo)
            .await?;

        tx.commit().await?;
        Ok(agenda)
    }

    // =========================================================================
    //  LOTE
    // =========================================================================

    /// Recalcula `dias_para_vencer` dos itens ATIVO, gravando só os que mudaram.
    pub async fn atualizar_dias_para_vencer(&self, apenas_pendentes: bool) -> Result<ResultadoEtapa, AppError> {
        let hoje = hoje();
        let itens = self.agenda_repo.find_ativos(&self.pool, apenas_pendentes).await?;

        let mut resultado = ResultadoEtapa::default();
        for item in itens {
            resultado.processados += 1;
            let dias = calcular_dias_para_vencer(item.data_venc, hoje);
            if dias == item.dias_para_vencer {
                continue;
            }
            match self.agenda_repo.update_dias(&self.pool, item.id, dias).await {
                Ok(()) => resultado.atualizados += 1,
                Err(e) => {
                    resultado.erros += 1;
                    tracing::error!("🔥 Falha ao atualizar dias do item {} da agenda: {:?}", item.id, e);
                }
            }
        }
        Ok(resultado)
    }

    /// Garante um item pendente coerente para quem vence nos próximos dias.
    pub async fn sincronizar_agenda(&self) -> Result<SincronizacaoResultado, AppError> {
        let hoje = hoje();
        let limite = hoje + Duration::days(JANELA_SINCRONIZACAO_DIAS);
        let usuarios = self.usuario_repo.find_para_sincronizar(&self.pool, limite).await?;

        let mut resultado = SincronizacaoResultado::default();
        for usuario in usuarios {
            match self.sincronizar_usuario(usuario.id, hoje).await {
                Ok(Sincronizado::Adicionado) => resultado.adicionados += 1,
                Ok(Sincronizado::Atualizado) => resultado.atualizados += 1,
                Ok(Sincronizado::SemMudanca) => {}
                Err(e) => {
                    resultado.erros += 1;
                    tracing::error!("🔥 Falha ao sincronizar agenda do usuário {}: {:?}", usuario.id, e);
                }
            }
        }
        Ok(resultado)
    }

    async fn sincronizar_usuario(&self, usuario_id: Uuid, hoje: NaiveDate) -> Result<Sincronizado, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(usuario) = self.usuario_repo.find_by_id_for_update(&mut *tx, usuario_id).await? else {
            return Ok(Sincronizado::SemMudanca);
        };
        // Pode ter mudado desde a listagem
        let Some(data_venc) = usuario.data_venc else {
            return Ok(Sincronizado::SemMudanca);
        };
        let dias = calcular_dias_para_vencer(data_venc, hoje);

        let pendentes = self.agenda_repo.find_pendentes_by_usuario(&mut *tx, usuario.id).await?;
        let resultado = match pendentes.first() {
            Some(item) if precisa_sincronizar(item, &usuario, data_venc, dias) => {
                self.agenda_repo
                    .update(&mut *tx, item.id, Some(data_venc), Some(dias), None, Some(usuario.ciclo))
                    .await?;
                Sincronizado::Atualizado
            }
            Some(_) => Sincronizado::SemMudanca,
            None => {
                self.agenda_repo
                    .create(&mut *tx, usuario.id, data_venc, dias, StatusAgenda::Ativo, usuario.ciclo)
                    .await?;
                Sincronizado::Adicionado
            }
        };

        tx.commit().await?;
        Ok(resultado)
    }
}

enum Sincronizado {
    Adicionado,
    Atualizado,
    SemMudanca,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, dia).unwrap()
    }

    #[test]
    fn janela_vencidos_termina_ontem() {
        assert_eq!(intervalo_janela(JanelaAgenda::Vencidos, d(2025, 3, 10)), (None, Some(d(2025, 3, 9))));
    }

    #[test]
    fn janela_proximos_7_dias_exclui_hoje() {
        assert_eq!(
            intervalo_janela(JanelaAgenda::Proximos7Dias, d(2025, 3, 10)),
            (Some(d(2025, 3, 11)), Some(d(2025, 3, 17)))
        );
    }

    #[test]
    fn janela_mes_atual_cobre_o_mes_inteiro() {
        assert_eq!(
            intervalo_janela(JanelaAgenda::MesAtual, d(2024, 2, 15)),
            (Some(d(2024, 2, 1)), Some(d(2024, 2, 29)))
        );
        assert_eq!(intervalo_janela(JanelaAgenda::Hoje, d(2024, 2, 15)), (Some(d(2024, 2, 15)), Some(d(2024, 2, 15))));
    }
}
