// src/db/despesa_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::despesa::{
        CreateDespesaPayload, Despesa, DespesaMensal, DespesaPorCategoria, DespesaStats, StatusDespesa,
        UpdateDespesaPayload,
    },
};

const FILTRO_DESPESAS: &str = r#"
    WHERE ($1::text IS NULL OR categoria = $1)
      AND ($2::status_despesa IS NULL OR status = $2)
      AND ($3::text IS NULL OR conta = $3)
      AND ($4::text IS NULL OR indicador = $4)
      AND ($5::int IS NULL OR competencia_mes = $5)
      AND ($6::int IS NULL OR competencia_ano = $6)
"#;

/// Filtros com a competência MM/YYYY já separada em mês e ano.
#[derive(Debug, Clone, Default)]
pub struct DespesaConsulta {
    pub categoria: Option<String>,
    pub status: Option<StatusDespesa>,
    pub conta: Option<String>,
    pub indicador: Option<String>,
    pub competencia_mes: Option<i32>,
    pub competencia_ano: Option<i32>,
}

#[derive(Clone)]
pub struct DespesaRepository {
    pool: PgPool,
}

impl DespesaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Despesa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let despesa = sqlx::query_as::<_, Despesa>("SELECT * FROM despesas WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(despesa)
    }

    pub async fn find_all(&self, consulta: &DespesaConsulta, limit: i64, offset: i64) -> Result<(Vec<Despesa>, i64), AppError> {
        let sql = format!(
            "SELECT * FROM despesas {} ORDER BY competencia_ano DESC, competencia_mes DESC, created_at DESC LIMIT $7 OFFSET $8",
            FILTRO_DESPESAS
        );
        let despesas = sqlx::query_as::<_, Despesa>(&sql)
            .bind(&consulta.categoria)
            .bind(consulta.status)
            .bind(&consulta.conta)
            .bind(&consulta.indicador)
            .bind(consulta.competencia_mes)
            .bind(consulta.competencia_ano)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM despesas {}", FILTRO_DESPESAS);
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(&consulta.categoria)
            .bind(consulta.status)
            .bind(&consulta.conta)
            .bind(&consulta.indicador)
            .bind(consulta.competencia_mes)
            .bind(consulta.competencia_ano)
            .fetch_one(&self.pool)
            .await?;

        Ok((despesas, total))
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateDespesaPayload) -> Result<Despesa, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let despesa = sqlx::query_as::<_, Despesa>(
            r#"
            INSERT INTO despesas (id, categoria, descricao, valor, conta, indicador, status, competencia_mes, competencia_ano)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&payload.categoria)
        .bind(&payload.descricao)
        .bind(payload.valor)
        .bind(&payload.conta)
        .bind(&payload.indicador)
        .bind(payload.status.unwrap_or(StatusDespesa::Pendente))
        .bind(payload.competencia_mes)
        .bind(payload.competencia_ano)
        .fetch_one(executor)
        .await?;
        Ok(despesa)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateDespesaPayload) -> Result<Option<Despesa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let despesa = sqlx::query_as::<_, Despesa>(
            r#"
            UPDATE despesas SET
                categoria       = COALESCE($2, categoria),
                descricao       = COALESCE($3, descricao),
                valor           = COALESCE($4, valor),
                conta           = COALESCE($5, conta),
                indicador       = COALESCE($6, indicador),
                status          = COALESCE($7, status),
                competencia_mes = COALESCE($8, competencia_mes),
                competencia_ano = COALESCE($9, competencia_ano),
                updated_at      = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.categoria)
        .bind(&payload.descricao)
        .bind(payload.valor)
        .bind(&payload.conta)
        .bind(&payload.indicador)
        .bind(payload.status)
        .bind(payload.competencia_mes)
        .bind(payload.competencia_ano)
        .fetch_optional(executor)
        .await?;
        Ok(despesa)
    }

    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: StatusDespesa) -> Result<Option<Despesa>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let despesa = sqlx::query_as::<_, Despesa>(
            "UPDATE despesas SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(despesa)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM despesas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn stats<'e, E>(&self, executor: E, mes: i32, ano: i32) -> Result<DespesaStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stats = sqlx::query_as::<_, DespesaStats>(
            r#"
            SELECT
                COUNT(*) AS total_despesas,
                COALESCE(SUM(valor), 0) AS valor_total,
                COALESCE(SUM(valor) FILTER (WHERE status = 'PENDENTE'), 0) AS valor_pendente,
                COALESCE(SUM(valor) FILTER (WHERE status = 'PAGO'), 0) AS valor_pago,
                COALESCE(SUM(valor) FILTER (WHERE competencia_mes = $1 AND competencia_ano = $2), 0) AS valor_mes_atual
            FROM despesas
            "#,
        )
        .bind(mes)
        .bind(ano)
        .fetch_one(executor)
        .await?;
        Ok(stats)
    }

    pub async fn por_categoria<'e, E>(&self, executor: E, ano: Option<i32>) -> Result<Vec<DespesaPorCategoria>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, DespesaPorCategoria>(
            r#"
            SELECT categoria, COUNT(*) AS quantidade, COALESCE(SUM(valor), 0) AS valor_total
            FROM despesas
            WHERE ($1::int IS NULL OR competencia_ano = $1)
            GROUP BY categoria
            ORDER BY valor_total DESC
            "#,
        )
        .bind(ano)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }

    pub async fn relatorio_mensal<'e, E>(&self, executor: E, ano: Option<i32>) -> Result<Vec<DespesaMensal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, DespesaMensal>(
            r#"
            SELECT
                LPAD(competencia_mes::text, 2, '0') || '/' || competencia_ano::text AS competencia,
                COUNT(*) AS quantidade,
                COALESCE(SUM(valor), 0) AS valor_total,
                COALESCE(SUM(valor) FILTER (WHERE status = 'PAGO'), 0) AS valor_pago
            FROM despesas
            WHERE ($1::int IS NULL OR competencia_ano = $1)
            GROUP BY competencia_ano, competencia_mes
            ORDER BY competencia_ano DESC, competencia_mes DESC
            "#,
        )
        .bind(ano)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }
}
