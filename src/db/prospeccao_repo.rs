// src/db/prospeccao_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::conflito_se_unico, error::AppError},
    models::prospeccao::{
        ConversaoPorGrupo, CreateProspeccaoPayload, Prospeccao, ProspeccaoFiltros, UpdateProspeccaoPayload,
    },
};

const MSG_EMAIL_DUPLICADO: &str = "Já existe uma prospecção com este email";

const FILTRO_PROSPECCAO: &str = r#"
    WHERE ($1::bool IS NULL OR convertido = $1)
      AND ($2::text IS NULL OR origem = $2)
      AND ($3::text IS NULL OR indicador = $3)
      AND ($4::text IS NULL OR email ILIKE $4 OR nome ILIKE $4 OR telefone ILIKE $4)
"#;

#[derive(Clone)]
pub struct ProspeccaoRepository {
    pool: PgPool,
}

impl ProspeccaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Prospeccao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let prospeccao = sqlx::query_as::<_, Prospeccao>("SELECT * FROM prospeccao WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(prospeccao)
    }

    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Prospeccao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let prospeccao = sqlx::query_as::<_, Prospeccao>("SELECT * FROM prospeccao WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(prospeccao)
    }

    pub async fn find_all(&self, filtros: &ProspeccaoFiltros, limit: i64, offset: i64) -> Result<(Vec<Prospeccao>, i64), AppError> {
        let search = filtros.search.as_ref().filter(|s| !s.trim().is_empty()).map(|s| format!("%{}%", s.trim()));

        let sql = format!("SELECT * FROM prospeccao {} ORDER BY created_at DESC LIMIT $5 OFFSET $6", FILTRO_PROSPECCAO);
        let itens = sqlx::query_as::<_, Prospeccao>(&sql)
            .bind(filtros.convertido)
            .bind(&filtros.origem)
            .bind(&filtros.indicador)
            .bind(&search)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM prospeccao {}", FILTRO_PROSPECCAO);
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(filtros.convertido)
            .bind(&filtros.origem)
            .bind(&filtros.indicador)
            .bind(&search)
            .fetch_one(&self.pool)
            .await?;

        Ok((itens, total))
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateProspeccaoPayload) -> Result<Prospeccao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Prospeccao>(
            r#"
            INSERT INTO prospeccao (id, email, nome, telefone, origem, indicador)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payload.email.trim().to_lowercase())
        .bind(payload.nome.trim())
        .bind(&payload.telefone)
        .bind(&payload.origem)
        .bind(&payload.indicador)
        .fetch_one(executor)
        .await
        .map_err(|e| conflito_se_unico(e, MSG_EMAIL_DUPLICADO))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateProspeccaoPayload) -> Result<Option<Prospeccao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Prospeccao>(
            r#"
            UPDATE prospeccao SET
                email      = COALESCE($2, email),
                nome       = COALESCE($3, nome),
                telefone   = COALESCE($4, telefone),
                origem     = COALESCE($5, origem),
                indicador  = COALESCE($6, indicador),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.email.as_ref().map(|e| e.trim().to_lowercase()))
        .bind(&payload.nome)
        .bind(&payload.telefone)
        .bind(&payload.origem)
        .bind(&payload.indicador)
        .fetch_optional(executor)
        .await
        .map_err(|e| conflito_se_unico(e, MSG_EMAIL_DUPLICADO))
    }

    pub async fn marcar_convertido<'e, E>(&self, executor: E, id: Uuid, usuario_id: Uuid) -> Result<Prospeccao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let prospeccao = sqlx::query_as::<_, Prospeccao>(
            r#"
            UPDATE prospeccao SET convertido = TRUE, usuario_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(usuario_id)
        .fetch_one(executor)
        .await?;
        Ok(prospeccao)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM prospeccao WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// (total, convertidos)
    pub async fn contagens<'e, E>(&self, executor: E) -> Result<(i64, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contagens = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE convertido) FROM prospeccao",
        )
        .fetch_one(executor)
        .await?;
        Ok(contagens)
    }

    pub async fn conversao_por_origem<'e, E>(&self, executor: E) -> Result<Vec<ConversaoPorGrupo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, ConversaoPorGrupo>(
            r#"
            SELECT COALESCE(NULLIF(TRIM(origem), ''), 'Não informado') AS grupo,
                   COUNT(*) AS total, COUNT(*) FILTER (WHERE convertido) AS convertidos
            FROM prospeccao
            GROUP BY 1
            ORDER BY total DESC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }

    pub async fn conversao_por_indicador<'e, E>(&self, executor: E) -> Result<Vec<ConversaoPorGrupo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, ConversaoPorGrupo>(
            r#"
            SELECT COALESCE(NULLIF(TRIM(indicador), ''), 'Não informado') AS grupo,
                   COUNT(*) AS total, COUNT(*) FILTER (WHERE convertido) AS convertidos
            FROM prospeccao
            GROUP BY 1
            ORDER BY total DESC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }

    pub async fn find_nao_convertidas<'e, E>(&self, executor: E) -> Result<Vec<Prospeccao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let itens = sqlx::query_as::<_, Prospeccao>(
            "SELECT * FROM prospeccao WHERE convertido = FALSE ORDER BY created_at DESC",
        )
        .fetch_all(executor)
        .await?;
        Ok(itens)
    }
}
