// src/db/comissao_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::conflito_se_unico, error::AppError},
    models::{
        comissao::{Comissao, ComissaoFiltros, ComissaoMensal, ComissaoStats, ConsolidacaoIndicador, ExtratoItem},
        pagamento::RegraTipo,
    },
};

const MSG_COMISSAO_DUPLICADA: &str = "Já existe uma comissão registrada para este pagamento";

const FILTRO_COMISSOES: &str = r#"
    WHERE ($1::text IS NULL OR indicador = $1)
      AND ($2::regra_tipo IS NULL OR regra_tipo = $2)
      AND ($3::text IS NULL OR mes_ref = $3)
      AND ($4::uuid IS NULL OR pagamento_id = $4)
"#;

#[derive(Clone)]
pub struct ComissaoRepository {
    pool: PgPool,
}

impl ComissaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Comissao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let comissao = sqlx::query_as::<_, Comissao>("SELECT * FROM comissoes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(comissao)
    }

    pub async fn find_all(&self, filtros: &ComissaoFiltros, limit: i64, offset: i64) -> Result<(Vec<Comissao>, i64), AppError> {
        let sql = format!("SELECT * FROM comissoes {} ORDER BY created_at DESC LIMIT $5 OFFSET $6", FILTRO_COMISSOES);
        let comissoes = sqlx::query_as::<_, Comissao>(&sql)
            .bind(&filtros.indicador)
            .bind(filtros.regra_tipo)
            .bind(&filtros.mes_ref)
            .bind(filtros.pagamento_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM comissoes {}", FILTRO_COMISSOES);
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(&filtros.indicador)
            .bind(filtros.regra_tipo)
            .bind(&filtros.mes_ref)
            .bind(filtros.pagamento_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((comissoes, total))
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        pagamento_id: Uuid,
        indicador: &str,
        regra_tipo: RegraTipo,
        valor: Decimal,
        mes_ref: &str,
    ) -> Result<Comissao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Comissao>(
            r#"
            INSERT INTO comissoes (id, pagamento_id, indicador, regra_tipo, valor, mes_ref)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(pagamento_id)
        .bind(indicador)
        .bind(regra_tipo)
        .bind(valor)
        .bind(mes_ref)
        .fetch_one(executor)
        .await
        .map_err(|e| conflito_se_unico(e, MSG_COMISSAO_DUPLICADA))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, valor: Option<Decimal>, mes_ref: Option<&str>) -> Result<Option<Comissao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let comissao = sqlx::query_as::<_, Comissao>(
            r#"
            UPDATE comissoes SET
                valor      = COALESCE($2, valor),
                mes_ref    = COALESCE($3, mes_ref),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(valor)
        .bind(mes_ref)
        .fetch_optional(executor)
        .await?;
        Ok(comissao)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM comissoes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn stats<'e, E>(&self, executor: E, mes_ref: &str) -> Result<ComissaoStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stats = sqlx::query_as::<_, ComissaoStats>(
            r#"
            SELECT
                COUNT(*) AS total_comissoes,
                COALESCE(SUM(valor), 0) AS valor_total,
                COALESCE(SUM(valor) FILTER (WHERE mes_ref = $1), 0) AS valor_mes,
                COUNT(DISTINCT indicador) AS total_indicadores,
                COALESCE(SUM(valor) FILTER (WHERE regra_tipo = 'PRIMEIRO'), 0) AS valor_primeiro,
                COALESCE(SUM(valor) FILTER (WHERE regra_tipo = 'RECORRENTE'), 0) AS valor_recorrente
            FROM comissoes
            "#,
        )
        .bind(mes_ref)
        .fetch_one(executor)
        .await?;
        Ok(stats)
    }

    pub async fn consolidacao_por_indicador<'e, E>(&self, executor: E, mes_ref: Option<&str>) -> Result<Vec<ConsolidacaoIndicador>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, ConsolidacaoIndicador>(
            r#"
            SELECT
                indicador,
                COUNT(*) AS quantidade,
                COALESCE(SUM(valor), 0) AS valor_total,
                COALESCE(SUM(valor) FILTER (WHERE regra_tipo = 'PRIMEIRO'), 0) AS valor_primeiro,
                COALESCE(SUM(valor) FILTER (WHERE regra_tipo = 'RECORRENTE'), 0) AS valor_recorrente
            FROM comissoes
            WHERE ($1::text IS NULL OR mes_ref = $1)
            GROUP BY indicador
            ORDER BY valor_total DESC
            "#,
        )
        .bind(mes_ref)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }

    pub async fn relatorio_mensal<'e, E>(&self, executor: E, ano: Option<i32>) -> Result<Vec<ComissaoMensal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // mes_ref é MM/YYYY: o ano está nos 4 últimos caracteres
        let linhas = sqlx::query_as::<_, ComissaoMensal>(
            r#"
            SELECT mes_ref, COUNT(*) AS quantidade, COALESCE(SUM(valor), 0) AS valor_total
            FROM comissoes
            WHERE ($1::int IS NULL OR RIGHT(mes_ref, 4) = $1::text)
            GROUP BY mes_ref
            ORDER BY RIGHT(mes_ref, 4) DESC, LEFT(mes_ref, 2) DESC
            "#,
        )
        .bind(ano)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }

    pub async fn extrato<'e, E>(&self, executor: E, indicador: &str, mes_ref: Option<&str>) -> Result<Vec<ExtratoItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let itens = sqlx::query_as::<_, ExtratoItem>(
            r#"
            SELECT c.*, u.id AS usuario_id, u.email_login, u.nome_completo, p.valor AS valor_pagamento
            FROM comissoes c
            JOIN pagamentos p ON p.id = c.pagamento_id
            JOIN usuarios u ON u.id = p.usuario_id
            WHERE c.indicador = $1 AND ($2::text IS NULL OR c.mes_ref = $2)
            ORDER BY p.data_pagto DESC
            "#,
        )
        .bind(indicador)
        .bind(mes_ref)
        .fetch_all(executor)
        .await?;
        Ok(itens)
    }
}
