// src/db/relatorio_repo.rs
//
// Consultas somente leitura para dashboard e relatórios.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::relatorio::{
        ContagemPorGrupo, DesempenhoMes, DistribuicaoCiclo, FinanceiroMensal, IndicadorResumo, KpiComissoes,
        KpiFinanceiro, KpiPagamentos, KpiProspeccao, TotalPorGrupo,
    },
};

/// KPIs do dashboard, lidos num mesmo snapshot.
pub struct KpisDashboard {
    pub financeiro: KpiFinanceiro,
    pub pagamentos: KpiPagamentos,
    pub comissoes: KpiComissoes,
    pub prospeccao: KpiProspeccao,
}

#[derive(Clone)]
pub struct RelatorioRepository {
    pool: PgPool,
}

impl RelatorioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  DASHBOARD
    // =========================================================================

    pub async fn kpis_dashboard(&self, mes: i32, ano: i32, mes_ref: &str) -> Result<KpisDashboard, AppError> {
        // Transação só para ter um snapshot consistente
        let mut tx = self.pool.begin().await?;

        let financeiro = sqlx::query_as::<_, KpiFinanceiro>(
            r#"
            WITH receita AS (
                SELECT COALESCE(SUM(valor), 0) AS total,
                       COALESCE(SUM(valor) FILTER (WHERE mes_pagto = $3), 0) AS mes
                FROM pagamentos
            ), despesa AS (
                SELECT COALESCE(SUM(valor), 0) AS total,
                       COALESCE(SUM(valor) FILTER (WHERE competencia_mes = $1 AND competencia_ano = $2), 0) AS mes
                FROM despesas
            ), comissao AS (
                SELECT COALESCE(SUM(valor) FILTER (WHERE mes_ref = $3), 0) AS mes FROM comissoes
            )
            SELECT
                receita.total AS receita_total,
                receita.mes AS receita_mes,
                despesa.total AS despesas_total,
                despesa.mes AS despesas_mes,
                comissao.mes AS comissoes_mes,
                receita.mes - despesa.mes - comissao.mes AS lucro_mes
            FROM receita, despesa, comissao
            "#,
        )
        .bind(mes)
        .bind(ano)
        .bind(mes_ref)
        .fetch_one(&mut *tx)
        .await?;

        let pagamentos = sqlx::query_as::<_, KpiPagamentos>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE mes_pagto = $1) AS mes,
                COUNT(*) FILTER (WHERE mes_pagto = $1 AND regra_tipo = 'PRIMEIRO') AS primeiras_adesoes_mes,
                COUNT(*) FILTER (WHERE mes_pagto = $1 AND regra_tipo = 'RECORRENTE') AS renovacoes_mes
            FROM pagamentos
            "#,
        )
        .bind(mes_ref)
        .fetch_one(&mut *tx)
        .await?;

        let comissoes = sqlx::query_as::<_, KpiComissoes>(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(valor), 0) AS valor_total,
                COALESCE(SUM(valor) FILTER (WHERE mes_ref = $1), 0) AS valor_mes
            FROM comissoes
            "#,
        )
        .bind(mes_ref)
        .fetch_one(&mut *tx)
        .await?;

        let prospeccao = sqlx::query_as::<_, KpiProspeccao>(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE convertido) AS convertidos FROM prospeccao",
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(KpisDashboard { financeiro, pagamentos, comissoes, prospeccao })
    }

    // =========================================================================
    //  FINANCEIRO
    // =========================================================================

    pub async fn financeiro_mensal(&self, inicio: NaiveDate, fim: NaiveDate) -> Result<Vec<FinanceiroMensal>, AppError> {
        let linhas = sqlx::query_as::<_, FinanceiroMensal>(
            r#"
            WITH meses AS (
                SELECT generate_series(DATE_TRUNC('month', $1::date), DATE_TRUNC('month', $2::date), INTERVAL '1 month')::date AS inicio
            )
            SELECT
                TO_CHAR(m.inicio, 'MM/YYYY') AS mes,
                COALESCE((SELECT SUM(p.valor) FROM pagamentos p
                          WHERE DATE_TRUNC('month', p.data_pagto) = m.inicio
                            AND p.data_pagto BETWEEN $1 AND $2), 0) AS receita,
                COALESCE((SELECT SUM(d.valor) FROM despesas d
                          WHERE d.competencia_ano = EXTRACT(YEAR FROM m.inicio)::int
                            AND d.competencia_mes = EXTRACT(MONTH FROM m.inicio)::int), 0) AS despesas,
                COALESCE((SELECT SUM(c.valor) FROM comissoes c
                          WHERE c.mes_ref = TO_CHAR(m.inicio, 'MM/YYYY')), 0) AS comissoes,
                0::numeric AS lucro
            FROM meses m
            ORDER BY m.inicio
            "#,
        )
        .bind(inicio)
        .bind(fim)
        .fetch_all(&self.pool)
        .await?;

        // lucro calculado aqui para não repetir as subconsultas
        Ok(linhas
            .into_iter()
            .map(|mut l| {
                l.lucro = l.receita - l.despesas - l.comissoes;
                l
            })
            .collect())
    }

    pub async fn receita_por_conta(&self, inicio: NaiveDate, fim: NaiveDate) -> Result<Vec<TotalPorGrupo>, AppError> {
        let linhas = sqlx::query_as::<_, TotalPorGrupo>(
            r#"
            SELECT conta AS grupo, COUNT(*) AS quantidade, COALESCE(SUM(valor), 0) AS valor
            FROM pagamentos
            WHERE data_pagto BETWEEN $1 AND $2
            GROUP BY conta
            ORDER BY valor DESC
            "#,
        )
        .bind(inicio)
        .bind(fim)
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas)
    }

    pub async fn receita_por_metodo(&self, inicio: NaiveDate, fim: NaiveDate) -> Result<Vec<TotalPorGrupo>, AppError> {
        let linhas = sqlx::query_as::<_, TotalPorGrupo>(
            r#"
            SELECT metodo::text AS grupo, COUNT(*) AS quantidade, COALESCE(SUM(valor), 0) AS valor
            FROM pagamentos
            WHERE data_pagto BETWEEN $1 AND $2
            GROUP BY metodo
            ORDER BY valor DESC
            "#,
        )
        .bind(inicio)
        .bind(fim)
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas)
    }

    // =========================================================================
    //  USUÁRIOS
    // =========================================================================

    pub async fn usuarios_por_status(&self) -> Result<Vec<ContagemPorGrupo>, AppError> {
        let linhas = sqlx::query_as::<_, ContagemPorGrupo>(
            "SELECT status_final::text AS grupo, COUNT(*) AS quantidade FROM usuarios GROUP BY status_final ORDER BY quantidade DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas)
    }

    pub async fn usuarios_por_indicador(&self) -> Result<Vec<IndicadorResumo>, AppError> {
        let linhas = sqlx::query_as::<_, IndicadorResumo>(
            r#"
            SELECT COALESCE(NULLIF(TRIM(indicador), ''), 'Sem indicador') AS indicador,
                   COUNT(*) AS quantidade,
                   COUNT(*) FILTER (WHERE status_final = 'ATIVO') AS ativos
            FROM usuarios
            GROUP BY 1
            ORDER BY quantidade DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas)
    }

    pub async fn distribuicao_ciclos(&self) -> Result<Vec<DistribuicaoCiclo>, AppError> {
        let linhas = sqlx::query_as::<_, DistribuicaoCiclo>(
            "SELECT ciclo, COUNT(*) AS quantidade FROM usuarios GROUP BY ciclo ORDER BY ciclo",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas)
    }

    // =========================================================================
    //  DESEMPENHO MENSAL
    // =========================================================================

    pub async fn desempenho_mensal(&self, ano: i32) -> Result<Vec<DesempenhoMes>, AppError> {
        let linhas = sqlx::query_as::<_, DesempenhoMes>(
            r#"
            WITH meses AS (SELECT generate_series(1, 12) AS mes)
            SELECT
                m.mes,
                LPAD(m.mes::text, 2, '0') || '/' || $1::text AS mes_ref,
                COALESCE((SELECT SUM(p.valor) FROM pagamentos p
                          WHERE EXTRACT(YEAR FROM p.data_pagto)::int = $1
                            AND EXTRACT(MONTH FROM p.data_pagto)::int = m.mes), 0) AS receita,
                COALESCE((SELECT SUM(d.valor) FROM despesas d
                          WHERE d.competencia_ano = $1 AND d.competencia_mes = m.mes), 0) AS despesas,
                0::numeric AS lucro,
                (SELECT COUNT(*) FROM pagamentos p
                  WHERE p.regra_tipo = 'PRIMEIRO'
                    AND EXTRACT(YEAR FROM p.data_pagto)::int = $1
                    AND EXTRACT(MONTH FROM p.data_pagto)::int = m.mes) AS novos_usuarios,
                (SELECT COUNT(*) FROM pagamentos p
                  WHERE p.regra_tipo = 'RECORRENTE'
                    AND EXTRACT(YEAR FROM p.data_pagto)::int = $1
                    AND EXTRACT(MONTH FROM p.data_pagto)::int = m.mes) AS renovacoes,
                (SELECT COUNT(*) FROM churn c
                  WHERE EXTRACT(YEAR FROM c.data_churn)::int = $1
                    AND EXTRACT(MONTH FROM c.data_churn)::int = m.mes) AS churns
            FROM meses m
            ORDER BY m.mes
            "#,
        )
        .bind(ano)
        .fetch_all(&self.pool)
        .await?;

        Ok(linhas
            .into_iter()
            .map(|mut l| {
                l.lucro = l.receita - l.despesas;
                l
            })
            .collect())
    }
}
