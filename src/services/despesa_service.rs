// src/services/despesa_service.rs

use chrono::Datelike;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        date_utils::{hoje, parse_mes_ano},
        error::AppError,
    },
    db::{despesa_repo::DespesaConsulta, DespesaRepository},
    models::despesa::{
        CreateDespesaPayload, Despesa, DespesaFiltros, DespesaMensal, DespesaPorCategoria, DespesaStats, StatusDespesa,
        UpdateDespesaPayload,
    },
};

/// Separa a competência `MM/YYYY` dos filtros. Ela prevalece sobre `competenciaAno`.
pub fn resolver_consulta(filtros: &DespesaFiltros) -> Result<DespesaConsulta, AppError> {
    let (competencia_mes, competencia_ano) = match filtros.competencia.as_deref() {
        Some(c) => {
            let (mes, ano) = parse_mes_ano(c)
                .ok_or_else(|| AppError::bad_request("Competência inválida. Use o formato MM/YYYY"))?;
            (Some(mes as i32), Some(ano))
        }
        None => (None, filtros.competencia_ano),
    };

    Ok(DespesaConsulta {
        categoria: filtros.categoria.clone(),
        status: filtros.status,
        conta: filtros.conta.clone(),
        indicador: filtros.indicador.clone(),
        competencia_mes,
        competencia_ano,
    })
}

#[derive(Clone)]
pub struct DespesaService {
    pool: PgPool,
    despesa_repo: DespesaRepository,
}

impl DespesaService {
    pub fn new(pool: PgPool, despesa_repo: DespesaRepository) -> Self {
        Self { pool, despesa_repo }
    }

    pub async fn find_all(&self, filtros: &DespesaFiltros, limit: i64, offset: i64) -> Result<(Vec<Despesa>, i64), AppError> {
        let consulta = resolver_consulta(filtros)?;
        self.despesa_repo.find_all(&consulta, limit, offset).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Despesa, AppError> {
        self.despesa_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Despesa não encontrada"))
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateDespesaPayload) -> Result<Despesa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let despesa = self.despesa_repo.create(executor, payload).await?;
        tracing::info!("🧾 Despesa {} lançada em {:02}/{}", despesa.id, despesa.competencia_mes, despesa.competencia_ano);
        Ok(despesa)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateDespesaPayload) -> Result<Despesa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.despesa_repo
            .update(executor, id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("Despesa não encontrada"))
    }

    pub async fn marcar_status<'e, E>(&self, executor: E, id: Uuid, status: StatusDespesa) -> Result<Despesa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.despesa_repo
            .set_status(executor, id, status)
            .await?
            .ok_or_else(|| AppError::not_found("Despesa não encontrada"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.despesa_repo.delete(executor, id).await? {
            return Err(AppError::not_found("Despesa não encontrada"));
        }
        Ok(())
    }

    pub async fn get_stats(&self) -> Result<DespesaStats, AppError> {
        let hoje = hoje();
        self.despesa_repo.stats(&self.pool, hoje.month() as i32, hoje.year()).await
    }

    pub async fn relatorio_por_categoria(&self, ano: Option<i32>) -> Result<Vec<DespesaPorCategoria>, AppError> {
        self.despesa_repo.por_categoria(&self.pool, ano).await
    }

    pub async fn relatorio_mensal(&self, ano: Option<i32>) -> Result<Vec<DespesaMensal>, AppError> {
        self.despesa_repo.relatorio_mensal(&self.pool, ano).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn competencia_separa_mes_e_ano() {
        let filtros = DespesaFiltros { competencia: Some("03/2025".into()), competencia_ano: Some(2020), ..Default::default() };
        let consulta = resolver_consulta(&filtros).unwrap();
        assert_eq!(consulta.competencia_mes, Some(3));
        assert_eq!(consulta.competencia_ano, Some(2025));
    }

    #[test]
    fn competencia_invalida_e_bad_request() {
        let filtros = DespesaFiltros { competencia: Some("13/2025".into()), ..Default::default() };
        let err = resolver_consulta(&filtros).unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[test]
    fn sem_competencia_usa_apenas_o_ano() {
        let filtros = DespesaFiltros { competencia_ano: Some(2024), ..Default::default() };
        let consulta = resolver_consulta(&filtros).unwrap();
        assert_eq!(consulta.competencia_mes, None);
        assert_eq!(consulta.competencia_ano, Some(2024));
    }
}
