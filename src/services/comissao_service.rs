// src/services/comissao_service.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        date_utils::{hoje, mes_pagto},
        error::AppError,
    },
    db::{ComissaoRepository, PagamentoRepository},
    models::comissao::{
        Comissao, ComissaoFiltros, ComissaoMensal, ComissaoStats, ConsolidacaoIndicador, CreateComissaoPayload,
        ExtratoIndicador, UpdateComissaoPayload,
    },
};

#[derive(Clone)]
pub struct ComissaoService {
    pool: PgPool,
    comissao_repo: ComissaoRepository,
    pagamento_repo: PagamentoRepository,
}

impl ComissaoService {
    pub fn new(pool: PgPool, comissao_repo: ComissaoRepository, pagamento_repo: PagamentoRepository) -> Self {
        Self { pool, comissao_repo, pagamento_repo }
    }

    pub async fn find_all(&self, filtros: &ComissaoFiltros, limit: i64, offset: i64) -> Result<(Vec<Comissao>, i64), AppError> {
        self.comissao_repo.find_all(filtros, limit, offset).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Comissao, AppError> {
        self.comissao_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Comissão não encontrada"))
    }

    /// Lançamento manual. O pagamento precisa existir e ter no máximo uma comissão.
    pub async fn create<'e, E>(&self, executor: E, payload: &CreateComissaoPayload) -> Result<Comissao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if self.pagamento_repo.find_by_id(&self.pool, payload.pagamento_id).await?.is_none() {
            return Err(AppError::not_found("Pagamento não encontrado"));
        }
        self.comissao_repo
            .create(
                executor,
                payload.pagamento_id,
                payload.indicador.trim(),
                payload.regra_tipo,
                payload.valor,
                &payload.mes_ref,
            )
            .await
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateComissaoPayload) -> Result<Comissao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.comissao_repo
            .update(executor, id, payload.valor, payload.mes_ref.as_deref())
            .await?
            .ok_or_else(|| AppError::not_found("Comissão não encontrada"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.comissao_repo.delete(executor, id).await? {
            return Err(AppError::not_found("Comissão não encontrada"));
        }
        Ok(())
    }

    pub async fn get_stats(&self, mes_ref: Option<&str>) -> Result<ComissaoStats, AppError> {
        let mes_ref = mes_ref.map(str::to_owned).unwrap_or_else(|| mes_pagto(hoje()));
        self.comissao_repo.stats(&self.pool, &mes_ref).await
    }

    pub async fn consolidacao_por_indicador(&self, mes_ref: Option<&str>) -> Result<Vec<ConsolidacaoIndicador>, AppError> {
        self.comissao_repo.consolidacao_por_indicador(&self.pool, mes_ref).await
    }

    pub async fn relatorio_mensal(&self, ano: Option<i32>) -> Result<Vec<ComissaoMensal>, AppError> {
        self.comissao_repo.relatorio_mensal(&self.pool, ano).await
    }

    pub async fn extrato(&self, indicador: &str, mes_ref: Option<&str>) -> Result<ExtratoIndicador, AppError> {
        let itens = self.comissao_repo.extrato(&self.pool, indicador, mes_ref).await?;
        let valor_total = itens.iter().map(|i| i.comissao.valor).sum::<Decimal>();
        Ok(ExtratoIndicador { indicador: indicador.to_owned(), valor_total, itens })
    }
}
