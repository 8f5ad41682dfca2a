// src/db/churn_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::churn::{Churn, ChurnComUsuario, ChurnFiltros, ChurnMensal, ChurnPorMotivo, UsuarioEmChurn},
};

const FILTRO_CHURN: &str = r#"
    WHERE ($1::bool IS NULL OR c.revertido = $1)
      AND ($2::uuid IS NULL OR c.usuario_id = $2)
      AND ($3::date IS NULL OR c.data_churn >= $3)
      AND ($4::date IS NULL OR c.data_churn <= $4)
      AND ($5::int IS NULL OR EXTRACT(MONTH FROM c.data_churn)::int = $5)
      AND ($6::int IS NULL OR EXTRACT(YEAR FROM c.data_churn)::int = $6)
"#;

#[derive(Clone)]
pub struct ChurnRepository {
    pool: PgPool,
}

impl ChurnRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Churn>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let churn = sqlx::query_as::<_, Churn>("SELECT * FROM churn WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(churn)
    }

    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Churn>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let churn = sqlx::query_as::<_, Churn>("SELECT * FROM churn WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(churn)
    }

    pub async fn find_all(&self, filtros: &ChurnFiltros, limit: i64, offset: i64) -> Result<(Vec<ChurnComUsuario>, i64), AppError> {
        let sql = format!(
            r#"
            SELECT c.*, u.email_login, u.nome_completo, u.indicador
            FROM churn c
            JOIN usuarios u ON u.id = c.usuario_id
            {}
            ORDER BY c.data_churn DESC, c.created_at DESC
            LIMIT $7 OFFSET $8
            "#,
            FILTRO_CHURN
        );
        let churns = sqlx::query_as::<_, ChurnComUsuario>(&sql)
            .bind(filtros.revertido)
            .bind(filtros.usuario_id)
            .bind(filtros.data_inicio)
            .bind(filtros.data_fim)
            .bind(filtros.mes)
            .bind(filtros.ano)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM churn c {}", FILTRO_CHURN);
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(filtros.revertido)
            .bind(filtros.usuario_id)
            .bind(filtros.data_inicio)
            .bind(filtros.data_fim)
            .bind(filtros.mes)
            .bind(filtros.ano)
            .fetch_one(&self.pool)
            .await?;

        Ok((churns, total))
    }

    pub async fn find_by_usuario<'e, E>(&self, executor: E, usuario_id: Uuid) -> Result<Vec<Churn>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let churns = sqlx::query_as::<_, Churn>("SELECT * FROM churn WHERE usuario_id = $1 ORDER BY data_churn DESC")
            .bind(usuario_id)
            .fetch_all(executor)
            .await?;
        Ok(churns)
    }

    pub async fn create<'e, E>(&self, executor: E, usuario_id: Uuid, data_churn: NaiveDate, motivo: Option<&str>) -> Result<Churn, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let churn = sqlx::query_as::<_, Churn>(
            r#"
            INSERT INTO churn (id, usuario_id, data_churn, motivo)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(usuario_id)
        .bind(data_churn)
        .bind(motivo)
        .fetch_one(executor)
        .await?;
        Ok(churn)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, data_churn: Option<NaiveDate>, motivo: Option<&str>) -> Result<Option<Churn>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let churn = sqlx::query_as::<_, Churn>(
            r#"
            UPDATE churn SET
                data_churn = COALESCE($2, data_churn),
                motivo     = COALESCE($3, motivo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data_churn)
        .bind(motivo)
        .fetch_optional(executor)
        .await?;
        Ok(churn)
    }

    pub async fn marcar_revertido<'e, E>(&self, executor: E, id: Uuid) -> Result<Churn, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let churn = sqlx::query_as::<_, Churn>(
            "UPDATE churn SET revertido = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(churn)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM churn WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// (total, revertidos)
    pub async fn contagens<'e, E>(&self, executor: E) -> Result<(i64, i64), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contagens = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE revertido) FROM churn",
        )
        .fetch_one(executor)
        .await?;
        Ok(contagens)
    }

    pub async fn por_motivo<'e, E>(&self, executor: E) -> Result<Vec<ChurnPorMotivo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, ChurnPorMotivo>(
            r#"
            SELECT COALESCE(NULLIF(TRIM(motivo), ''), 'Não informado') AS motivo, COUNT(*) AS quantidade
            FROM churn
            GROUP BY 1
            ORDER BY quantidade DESC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }

    pub async fn relatorio_mensal<'e, E>(&self, executor: E, ano: Option<i32>) -> Result<Vec<ChurnMensal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, ChurnMensal>(
            r#"
            SELECT
                TO_CHAR(DATE_TRUNC('month', data_churn), 'MM/YYYY') AS mes,
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE revertido) AS revertidos
            FROM churn
            WHERE ($1::int IS NULL OR EXTRACT(YEAR FROM data_churn)::int = $1)
            GROUP BY DATE_TRUNC('month', data_churn)
            ORDER BY DATE_TRUNC('month', data_churn) DESC
            "#,
        )
        .bind(ano)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }

    pub async fn usuarios_em_churn<'e, E>(&self, executor: E, hoje: NaiveDate) -> Result<Vec<UsuarioEmChurn>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let linhas = sqlx::query_as::<_, UsuarioEmChurn>(
            r#"
            SELECT
                c.id AS churn_id, u.id AS usuario_id, u.email_login, u.nome_completo,
                c.data_churn, c.motivo, ($1::date - c.data_churn)::int AS dias_desde_churn
            FROM churn c
            JOIN usuarios u ON u.id = c.usuario_id
            WHERE c.revertido = FALSE
            ORDER BY c.data_churn DESC
            "#,
        )
        .bind(hoje)
        .fetch_all(executor)
        .await?;
        Ok(linhas)
    }
}
