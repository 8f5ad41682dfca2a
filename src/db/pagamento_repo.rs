// src/db/pagamento_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::pagamento::{
        MetodoPagamento, Pagamento, PagamentoComUsuario, PagamentoFiltros, PagamentoMensal, PagamentoStats, RegraTipo,
    },
};

const FILTRO_PAGAMENTOS: &str = r#"
    WHERE ($1::uuid IS NULL OR p.usuario_id = $1)
      AND ($2::metodo_pagamento IS NULL OR p.metodo = $2)
      AND ($3::text IS NULL OR p.conta = $3)
      AND ($4::regra_tipo IS NULL OR p.regra_tipo = $4)
      AND ($5::text IS NULL OR p.mes_pagto = $5)
      AND ($6::bool IS NULL OR p.elegivel_comissao = $6)
"#;

/// Linha a inserir em `pagamentos`, já com os campos derivados calculados.
#[derive(Debug, Clone)]
pub struct NovoPagamento {
    pub usuario_id: Uuid,
    pub agenda_id: Option<Uuid>,
    pub data_pagto: NaiveDate,
    pub mes_pagto: String,
    pub valor: Decimal,
    pub metodo: MetodoPagamento,
    pub conta: String,
    pub regra_tipo: RegraTipo,
    pub regra_valor: Option<Decimal>,
    pub elegivel_comissao: bool,
    pub comissao_valor: Option<Decimal>,
    pub observacao: Option<String>,
}

#[derive(Clone)]
pub struct PagamentoRepository {
    pool: PgPool,
}

impl PagamentoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Pagamento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamento = sqlx::query_as::<_, Pagamento>("SELECT * FROM pagamentos WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(pagamento)
    }

    pub async fn find_all(&self, filtros: &PagamentoFiltros, limit: i64, offset: i64) -> Result<(Vec<PagamentoComUsuario>, i64), AppError> {
        let sql = format!(
            r#"
            SELECT p.*, u.email_login, u.nome_completo, u.indicador
            FROM pagamentos p
            JOIN usuarios u ON u.id = p.usuario_id
            {}
            ORDER BY p.data_pagto DESC, p.created_at DESC
            LIMIT $7 OFFSET $8
            "#,
            FILTRO_PAGAMENTOS
        );
        let pagamentos = sqlx::query_as::<_, PagamentoComUsuario>(&sql)
            .bind(filtros.usuario_id)
            .bind(filtros.metodo)
            .bind(&filtros.conta)
            .bind(filtros.regra_tipo)
            .bind(&filtros.mes)
            .bind(filtros.elegivel_comissao)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM pagamentos p {}", FILTRO_PAGAMENTOS);
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(filtros.usuario_id)
            .bind(filtros.metodo)
            .bind(&filtros.conta)
            .bind(filtros.regra_tipo)
            .bind(&filtros.mes)
            .bind(filtros.elegivel_comissao)
            .fetch_one(&self.pool)
            .await?;

        Ok((pagamentos, total))
    }

    pub async fn find_by_usuario<'e, E>(&self, executor: E, usuario_id: Uuid, limit: i64) -> Result<Vec<Pagamento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamentos = sqlx::query_as::<_, Pagamento>(
            "SELECT * FROM pagamentos WHERE usuario_id = $1 ORDER BY data_pagto DESC, created_at DESC LIMIT $2",
        )
        .bind(usuario_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(pagamentos)
    }

    /// Pagamento mais recente do usuário, ignorando `excluir`.
    pub async fn find_mais_recente<'e, E>(&self, executor: E, usuario_id: Uuid, excluir: Option<Uuid>) -> Result<Option<Pagamento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamento = sqlx::query_as::<_, Pagamento>(
            r#"
            SELECT * FROM pagamentos
            WHERE usuario_id = $1 AND ($2::uuid IS NULL OR id <> $2)
            ORDER BY data_pagto DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(usuario_id)
        .bind(excluir)
        .fetch_optional(executor)
        .await?;
        Ok(pagamento)
    }

    /// Pagamento que renovou o item da agenda. Sem vínculo explícito, cai no
    /// RECORRENTE mais recente do usuário que não pertence a outro item.
    pub async fn find_renovacao_da_agenda<'e, E>(&self, executor: E, agenda_id: Uuid, usuario_id: Uuid) -> Result<Option<Pagamento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamento = sqlx::query_as::<_, Pagamento>(
            r#"
            SELECT * FROM pagamentos
            WHERE usuario_id = $2
              AND regra_tipo = 'RECORRENTE'
              AND (agenda_id = $1 OR agenda_id IS NULL)
            ORDER BY (agenda_id IS NOT NULL) DESC, data_pagto DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(agenda_id)
        .bind(usuario_id)
        .fetch_optional(executor)
        .await?;
        Ok(pagamento)
    }

    pub async fn create<'e, E>(&self, executor: E, novo: &NovoPagamento) -> Result<Pagamento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamento = sqlx::query_as::<_, Pagamento>(
            r#"
            INSERT INTO pagamentos (
                id, usuario_id, agenda_id, data_pagto, mes_pagto, valor, metodo, conta,
                regra_tipo, regra_valor, elegivel_comissao, comissao_valor, observacao
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(novo.usuario_id)
        .bind(novo.agenda_id)
        .bind(novo.data_pagto)
        .bind(&novo.mes_pagto)
        .bind(novo.valor)
        .bind(novo.metodo)
        .bind(&novo.conta)
        .bind(novo.regra_tipo)
        .bind(novo.regra_valor)
        .bind(novo.elegivel_comissao)
        .bind(novo.comissao_valor)
        .bind(&novo.observacao)
        .fetch_one(executor)
        .await?;
        Ok(pagamento)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        valor: Option<Decimal>,
        data_pagto: Option<NaiveDate>,
        mes_pagto: Option<String>,
        metodo: Option<MetodoPagamento>,
        conta: Option<&str>,
        observacao: Option<&str>,
    ) -> Result<Option<Pagamento>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamento = sqlx::query_as::<_, Pagamento>(
            r#"
            UPDATE pagamentos SET
                valor      = COALESCE($2, valor),
                data_pagto = COALESCE($3, data_pagto),
                mes_pagto  = COALESCE($4, mes_pagto),
                metodo     = COALESCE($5, metodo),
                conta      = COALESCE($6, conta),
                observacao = COALESCE($7, observacao),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(valor)
        .bind(data_pagto)
        .bind(mes_pagto)
        .bind(metodo)
        .bind(conta)
        .bind(observacao)
        .fetch_optional(executor)
        .await?;
        Ok(pagamento)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM pagamentos WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn stats<'e, E>(&self, executor: E, mes: &str) -> Result<PagamentoStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stats = sqlx::query_as::<_, PagamentoStats>(
            r#"
            SELECT
                COUNT(*) AS total_pagamentos,
                COALESCE(SUM(valor), 0) AS total_receita,
                COALESCE(SUM(valor) FILTER (WHERE mes_pagto = $1), 0) AS receita_mes,
                COUNT(*) FILTER (WHERE regra_tipo = 'PRIMEIRO') AS primeiras_adesoes,
                COUNT(*) FILTER (WHERE regra_tipo = 'RECORRENTE') AS renovacoes,
                COALESCE(ROUND(AVG(valor), 2), 0) AS valor_medio_pagamento,
                COUNT(*) FILTER (WHERE elegivel_comissao) AS pagamentos_elegiveis,
                COALESCE(SUM(comissao_valor) FILTER (WHERE elegivel_comissao), 0) AS total_comissoes
            FROM pagamentos
            "#,
        )
        .bind(mes)
        .fetch_one(executor)
        .await?;
        Ok(stats)
    }

    pub async fn relatorio_mensal<'e, E>(&self, executor: E, ano: Option<i32>) -> Result<Vec<PagamentoMensal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, PagamentoMensal>(
            r#"
            SELECT
                mes_pagto AS mes,
                COUNT(*) AS quantidade,
                COALESCE(SUM(valor), 0) AS receita,
                COUNT(*) FILTER (WHERE regra_tipo = 'PRIMEIRO') AS primeiras_adesoes,
                COUNT(*) FILTER (WHERE regra_tipo = 'RECORRENTE') AS renovacoes
            FROM pagamentos
            WHERE ($1::int IS NULL OR EXTRACT(YEAR FROM data_pagto)::int = $1)
            GROUP BY mes_pagto, DATE_TRUNC('month', data_pagto)
            ORDER BY DATE_TRUNC('month', data_pagto) DESC
            "#,
        )
        .bind(ano)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }
}
