// src/db/usuario_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::conflito_se_unico, error::AppError},
    models::usuario::{
        CreateUsuarioPayload, ImportUsuarioItem, UpdateUsuarioPayload, Usuario,
        UsuarioFiltros, UsuarioStats,
    },
};

// Mesmo WHERE para a listagem e para a contagem
const FILTRO_USUARIOS: &str = r#"
    WHERE ($1::status_final IS NULL OR status_final = $1)
      AND ($2::text IS NULL OR email_login ILIKE $2 OR nome_completo ILIKE $2 OR telefone ILIKE $2)
      AND ($3::text IS NULL OR indicador = $3)
      AND ($4::bool IS NULL OR vence_hoje = $4)
      AND ($5::bool IS NULL OR prox_7_dias = $5)
      AND ($6::bool IS NULL OR em_atraso = $6)
"#;

#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(usuario)
    }

    /// Busca com `FOR UPDATE`: serializa operações concorrentes sobre o mesmo usuário.
    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(usuario)
    }

    pub async fn find_by_email<'e, E>(&self, executor: E, email: &str) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE LOWER(email_login) = LOWER($1)")
            .bind(email)
            .fetch_optional(executor)
            .await?;
        Ok(usuario)
    }

    pub async fn find_all(&self, filtros: &UsuarioFiltros, limit: i64, offset: i64) -> Result<(Vec<Usuario>, i64), AppError> {
        let search = filtros.search.as_ref().filter(|s| !s.trim().is_empty()).map(|s| format!("%{}%", s.trim()));

        let sql = format!("SELECT * FROM usuarios {} ORDER BY created_at DESC LIMIT $7 OFFSET $8", FILTRO_USUARIOS);
        let usuarios = sqlx::query_as::<_, Usuario>(&sql)
            .bind(filtros.status)
            .bind(&search)
            .bind(&filtros.indicador)
            .bind(filtros.vence_hoje)
            .bind(filtros.prox_7_dias)
            .bind(filtros.em_atraso)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM usuarios {}", FILTRO_USUARIOS);
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(filtros.status)
            .bind(&search)
            .bind(&filtros.indicador)
            .bind(filtros.vence_hoje)
            .bind(filtros.prox_7_dias)
            .bind(filtros.em_atraso)
            .fetch_one(&self.pool)
            .await?;

        Ok((usuarios, total))
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateUsuarioPayload) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Usuario>(
            r#"
            INSERT INTO usuarios (id, email_login, nome_completo, telefone, indicador, obs, status_final)
            VALUES ($1, $2, $3, $4, $5, $6, 'INATIVO')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payload.email_login.trim().to_lowercase())
        .bind(payload.nome_completo.trim())
        .bind(&payload.telefone)
        .bind(&payload.indicador)
        .bind(&payload.obs)
        .fetch_one(executor)
        .await
        .map_err(|e| conflito_se_unico(e, "Email já cadastrado"))
    }

    /// Insere vários usuários de uma vez, ignorando emails já existentes.
    /// Retorna os emails efetivamente inseridos.
    pub async fn create_many<'e, E>(&self, executor: E, itens: &[ImportUsuarioItem]) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut ids = Vec::with_capacity(itens.len());
        let mut emails = Vec::with_capacity(itens.len());
        let mut nomes = Vec::with_capacity(itens.len());
        let mut telefones = Vec::with_capacity(itens.len());
        let mut indicadores = Vec::with_capacity(itens.len());
        let mut observacoes = Vec::with_capacity(itens.len());

        for item in itens {
            ids.push(Uuid::new_v4());
            emails.push(item.email_login.clone().unwrap_or_default().trim().to_lowercase());
            nomes.push(item.nome_completo.clone().unwrap_or_default().trim().to_string());
            telefones.push(item.telefone.clone());
            indicadores.push(item.indicador.clone());
            observacoes.push(item.obs.clone());
        }

        let inseridos: Vec<String> = sqlx::query_scalar(
            r#"
            INSERT INTO usuarios (id, email_login, nome_completo, telefone, indicador, obs, status_final)
            SELECT *, 'INATIVO'::status_final
            FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::text[], $5::text[], $6::text[])
            ON CONFLICT (email_login) DO NOTHING
            RETURNING email_login
            "#,
        )
        .bind(&ids)
        .bind(&emails)
        .bind(&nomes)
        .bind(&telefones)
        .bind(&indicadores)
        .bind(&observacoes)
        .fetch_all(executor)
        .await?;

        Ok(inseridos)
    }

    pub async fn emails_existentes<'e, E>(&self, executor: E, emails: &[String]) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let existentes = sqlx::query_scalar("SELECT email_login FROM usuarios WHERE email_login = ANY($1)")
            .bind(emails)
            .fetch_all(executor)
            .await?;
        Ok(existentes)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateUsuarioPayload) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            UPDATE usuarios SET
                nome_completo = COALESCE($2, nome_completo),
                telefone      = COALESCE($3, telefone),
                indicador     = COALESCE($4, indicador),
                obs           = COALESCE($5, obs),
                status_final  = COALESCE($6, status_final),
                updated_at    = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.nome_completo)
        .bind(&payload.telefone)
        .bind(&payload.indicador)
        .bind(&payload.obs)
        .bind(payload.status_final)
        .fetch_optional(executor)
        .await?;
        Ok(usuario)
    }

    /// Grava todos os campos de estado (ciclo, vencimento, pagamento, flags).
    pub async fn salvar_estado<'e, E>(&self, executor: E, u: &Usuario) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            UPDATE usuarios SET
                status_final = $2, ciclo = $3, total_ciclos_usuario = $4,
                data_pagto = $5, mes_pagto = $6, mes_ref = $7, data_venc = $8,
                dias_para_vencer = $9, vence_hoje = $10, prox_7_dias = $11, em_atraso = $12,
                metodo = $13, conta = $14, regra_tipo = $15, regra_valor = $16,
                elegivel_comissao = $17, comissao_valor = $18,
                entrou = $19, renovou = $20, ativo_atual = $21, churn = $22,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(u.id)
        .bind(u.status_final)
        .bind(u.ciclo)
        .bind(u.total_ciclos_usuario)
        .bind(u.data_pagto)
        .bind(&u.mes_pagto)
        .bind(&u.mes_ref)
        .bind(u.data_venc)
        .bind(u.dias_para_vencer)
        .bind(u.vence_hoje)
        .bind(u.prox_7_dias)
        .bind(u.em_atraso)
        .bind(u.metodo)
        .bind(&u.conta)
        .bind(u.regra_tipo)
        .bind(u.regra_valor)
        .bind(u.elegivel_comissao)
        .bind(u.comissao_valor)
        .bind(u.entrou)
        .bind(u.renovou)
        .bind(u.ativo_atual)
        .bind(u.churn)
        .fetch_one(executor)
        .await?;
        Ok(usuario)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Usuários cujo status depende do vencimento (usados pelo job diário).
    pub async fn find_com_vencimento<'e, E>(&self, executor: E) -> Result<Vec<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuarios = sqlx::query_as::<_, Usuario>(
            r#"
            SELECT * FROM usuarios
            WHERE data_venc IS NOT NULL
              AND status_final IN ('ATIVO', 'EM_ATRASO')
            ORDER BY data_venc ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(usuarios)
    }

    /// Usuários ativos que vencem até `limite` (candidatos à agenda).
    pub async fn find_para_sincronizar<'e, E>(&self, executor: E, limite: NaiveDate) -> Result<Vec<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuarios = sqlx::query_as::<_, Usuario>(
            r#"
            SELECT * FROM usuarios
            WHERE data_venc IS NOT NULL
              AND data_venc <= $1
              AND status_final IN ('ATIVO', 'EM_ATRASO')
              AND ativo_atual = TRUE
            ORDER BY data_venc ASC
            "#,
        )
        .bind(limite)
        .fetch_all(executor)
        .await?;
        Ok(usuarios)
    }

    pub async fn stats<'e, E>(&self, executor: E) -> Result<UsuarioStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stats = sqlx::query_as::<_, UsuarioStats>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status_final = 'ATIVO') AS ativos,
                COUNT(*) FILTER (WHERE status_final = 'INATIVO') AS inativos,
                COUNT(*) FILTER (WHERE em_atraso) AS em_atraso,
                COUNT(*) FILTER (WHERE vence_hoje) AS vencem_hoje,
                COUNT(*) FILTER (WHERE prox_7_dias) AS vencem_proximos_7_dias
            FROM usuarios
            "#,
        )
        .fetch_one(executor)
        .await?;
        Ok(stats)
    }
}
