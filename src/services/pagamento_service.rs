// src/services/pagamento_service.rs

use serde_json::json;
use sqlx::{Acquire, Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        comissao::{calcular_comissao, is_elegivel_comissao},
        date_utils::{hoje, mes_pagto},
        error::AppError,
    },
    db::{pagamento_repo::NovoPagamento, AgendaRepository, AuditoriaRepository, ComissaoRepository, PagamentoRepository, UsuarioRepository},
    models::{
        agenda::{Agenda, StatusAgenda},
        auditoria::AcaoAuditoria,
        pagamento::{
            CreatePagamentoPayload, Pagamento, PagamentoComUsuario, PagamentoFiltros, PagamentoMensal, PagamentoStats,
            RegraTipo, UpdatePagamentoPayload,
        },
    },
    services::ciclo,
};

pub const MSG_SEM_ITEM_PENDENTE: &str =
    "Nenhum item ATIVO pendente na agenda para este usuário. Crie um item na agenda antes de registrar a renovação.";
pub const MSG_VARIOS_ITENS_PENDENTES: &str =
    "O usuário possui mais de um item ATIVO pendente na agenda. Resolva a agenda antes de registrar a renovação.";

#[derive(Clone)]
pub struct PagamentoService {
    pool: PgPool,
    pagamento_repo: PagamentoRepository,
    usuario_repo: UsuarioRepository,
    agenda_repo: AgendaRepository,
    comissao_repo: ComissaoRepository,
    auditoria_repo: AuditoriaRepository,
}

impl PagamentoService {
    pub fn new(
        pool: PgPool,
        pagamento_repo: PagamentoRepository,
        usuario_repo: UsuarioRepository,
        agenda_repo: AgendaRepository,
        comissao_repo: ComissaoRepository,
        auditoria_repo: AuditoriaRepository,
    ) -> Self {
        Self { pool, pagamento_repo, usuario_repo, agenda_repo, comissao_repo, auditoria_repo }
    }

    // =========================================================================
    //  CONSULTAS
    // =========================================================================

    pub async fn find_all(&self, filtros: &PagamentoFiltros, limit: i64, offset: i64) -> Result<(Vec<PagamentoComUsuario>, i64), AppError> {
        self.pagamento_repo.find_all(filtros, limit, offset).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Pagamento, AppError> {
        self.pagamento_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Pagamento não encontrado"))
    }

    pub async fn get_stats(&self, mes: Option<&str>) -> Result<PagamentoStats, AppError> {
        let mes = mes.map(str::to_owned).unwrap_or_else(|| mes_pagto(hoje()));
        self.pagamento_repo.stats(&self.pool, &mes).await
    }

    pub async fn relatorio_mensal(&self, ano: Option<i32>) -> Result<Vec<PagamentoMensal>, AppError> {
        self.pagamento_repo.relatorio_mensal(&self.pool, ano).await
    }

    // =========================================================================
    //  CRIAÇÃO
    // =========================================================================

    pub async fn create<'e, E>(&self, executor: E, payload: &CreatePagamentoPayload, admin_id: Option<Uuid>) -> Result<Pagamento, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let pagamento = self.registrar(&mut *tx, payload, None, admin_id).await?;
        tx.commit().await?;
        Ok(pagamento)
    }

    /// Registra o pagamento e aplica seus efeitos na conexão dada, sem commit.
    ///
    /// `agenda` é o item que a renovação processa quando o chamador já o
    /// travou e validou. Sem ele, um RECORRENTE exige exatamente um item
    /// pendente para o usuário.
    pub(crate) async fn registrar(
        &self,
        conn: &mut PgConnection,
        payload: &CreatePagamentoPayload,
        agenda: Option<&Agenda>,
        admin_id: Option<Uuid>,
    ) -> Result<Pagamento, AppError> {
        // Lock do usuário serializa pagamentos e renovações concorrentes
        let mut usuario = self
            .usuario_repo
            .find_by_id_for_update(&mut *conn, payload.usuario_id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        let item_renovado = match payload.regra_tipo {
            RegraTipo::Primeiro => None,
            RegraTipo::Recorrente => match agenda {
                Some(item) => Some(item.clone()),
                None => {
                    let mut pendentes = self.agenda_repo.find_pendentes_by_usuario(&mut *conn, usuario.id).await?;
                    match pendentes.len() {
                        0 => return Err(AppError::bad_request(MSG_SEM_ITEM_PENDENTE)),
                        1 => pendentes.pop(),
                        _ => return Err(AppError::conflict(MSG_VARIOS_ITENS_PENDENTES)),
                    }
                }
            },
        };

        let elegivel = payload
            .elegivel_comissao
            .unwrap_or_else(|| is_elegivel_comissao(usuario.indicador.as_deref()));
        let comissao_valor = if elegivel {
            calcular_comissao(payload.valor, payload.regra_tipo, payload.regra_valor)
        } else {
            None
        };

        let novo = NovoPagamento {
            usuario_id: usuario.id,
            agenda_id: item_renovado.as_ref().map(|a| a.id),
            data_pagto: payload.data_pagto,
            mes_pagto: mes_pagto(payload.data_pagto),
            valor: payload.valor,
            metodo: payload.metodo,
            conta: payload.conta.trim().to_owned(),
            regra_tipo: payload.regra_tipo,
            regra_valor: payload.regra_valor,
            elegivel_comissao: elegivel,
            comissao_valor,
            observacao: payload.observacao.clone(),
        };
        let pagamento = self.pagamento_repo.create(&mut *conn, &novo).await?;

        if let Some(item) = &item_renovado {
            self.agenda_repo
                .set_estado(&mut *conn, item.id, true, false, item.status)
                .await?;
        }

        ciclo::aplicar_pagamento(&mut usuario, &pagamento, hoje());
        self.usuario_repo.salvar_estado(&mut *conn, &usuario).await?;

        if let (Some(valor), Some(indicador)) = (comissao_valor, usuario.indicador.as_deref().map(str::trim)) {
            if !indicador.is_empty() {
                self.comissao_repo
                    .create(&mut *conn, pagamento.id, indicador, pagamento.regra_tipo, valor, &pagamento.mes_pagto)
                    .await?;
            }
        }

        self.auditoria_repo
            .registrar(
                &mut *conn,
                admin_id,
                AcaoAuditoria::Create,
                "pagamento",
                pagamento.id,
                Some(json!({
                    "usuarioId": pagamento.usuario_id,
                    "regraTipo": pagamento.regra_tipo,
                    "valor": pagamento.valor,
                    "agendaId": pagamento.agenda_id,
                })),
            )
            .await?;

        tracing::info!(
            "💰 Pagamento {} ({:?}) registrado para o usuário {}",
            pagamento.id,
            pagamento.regra_tipo,
            pagamento.usuario_id
        );
        Ok(pagamento)
    }

    // =========================================================================
    //  ATUALIZAÇÃO
    // =========================================================================

    /// Altera apenas a linha do pagamento. O usuário não é recalculado.
    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdatePagamentoPayload) -> Result<Pagamento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.pagamento_repo
            .update(
                executor,
                id,
                payload.valor,
                payload.data_pagto,
                payload.data_pagto.map(mes_pagto),
                payload.metodo,
                payload.conta.as_deref().map(str::trim),
                payload.observacao.as_deref(),
            )
            .await?
            .ok_or_else(|| AppError::not_found("Pagamento não encontrado"))
    }

    // =========================================================================
    //  EXCLUSÃO
    // =========================================================================

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid, admin_id: Option<Uuid>) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let pagamento = self
            .pagamento_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Pagamento não encontrado"))?;

        self.excluir(&mut *tx, &pagamento, admin_id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove o pagamento e desfaz seus efeitos no usuário e na agenda, sem commit.
    pub(crate) async fn excluir(&self, conn: &mut PgConnection, pagamento: &Pagamento, admin_id: Option<Uuid>) -> Result<(), AppError> {
        let mut usuario = self
            .usuario_repo
            .find_by_id_for_update(&mut *conn, pagamento.usuario_id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        let anterior = self
            .pagamento_repo
            .find_mais_recente(&mut *conn, usuario.id, Some(pagamento.id))
            .await?;

        // Comissão sai junto por cascade
        self.pagamento_repo.delete(&mut *conn, pagamento.id).await?;

        ciclo::reverter_pagamento(&mut usuario, pagamento, anterior.as_ref(), hoje());
        self.usuario_repo.salvar_estado(&mut *conn, &usuario).await?;

        if pagamento.regra_tipo == RegraTipo::Recorrente {
            if let Some(agenda_id) = pagamento.agenda_id {
                self.desfazer_renovacao_na_agenda(conn, agenda_id, usuario.id).await?;
            }
        }

        self.auditoria_repo
            .registrar(
                &mut *conn,
                admin_id,
                AcaoAuditoria::Delete,
                "pagamento",
                pagamento.id,
                Some(json!({
                    "usuarioId": pagamento.usuario_id,
                    "regraTipo": pagamento.regra_tipo,
                    "valor": pagamento.valor,
                    "dataPagto": pagamento.data_pagto,
                })),
            )
            .await?;

        tracing::info!("🗑️ Pagamento {} removido e usuário {} revertido", pagamento.id, usuario.id);
        Ok(())
    }

    async fn desfazer_renovacao_na_agenda(&self, conn: &mut PgConnection, agenda_id: Uuid, usuario_id: Uuid) -> Result<(), AppError> {
        let Some(item) = self.agenda_repo.find_by_id_for_update(&mut *conn, agenda_id).await? else {
            return Ok(());
        };
        if !item.renovou || item.cancelou {
            return Ok(());
        }

        let pendentes = self.agenda_repo.find_pendentes_by_usuario(&mut *conn, usuario_id).await?;
        if item.status == StatusAgenda::Ativo && !pendentes.is_empty() {
            tracing::warn!(
                "⚠️ Item {} da agenda continua marcado como renovado: o usuário {} já tem outro item pendente",
                item.id,
                usuario_id
            );
            return Ok(());
        }

        self.agenda_repo
            .set_estado(&mut *conn, item.id, false, false, item.status)
            .await?;
        Ok(())
    }
}
