// src/db/auditoria_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auditoria::{AcaoAuditoria, Auditoria, AuditoriaFiltros},
};

const FILTRO_AUDITORIA: &str = r#"
    WHERE ($1::text IS NULL OR entidade = $1)
      AND ($2::uuid IS NULL OR registro_id = $2)
      AND ($3::uuid IS NULL OR admin_id = $3)
"#;

#[derive(Clone)]
pub struct AuditoriaRepository {
    pool: PgPool,
}

impl AuditoriaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn registrar<'e, E>(
        &self,
        executor: E,
        admin_id: Option<Uuid>,
        acao: AcaoAuditoria,
        entidade: &str,
        registro_id: Uuid,
        detalhes: Option<Value>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO auditoria (id, admin_id, acao, entidade, registro_id, detalhes)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(admin_id)
        .bind(acao)
        .bind(entidade)
        .bind(registro_id)
        .bind(detalhes)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn find_all(&self, filtros: &AuditoriaFiltros, limit: i64, offset: i64) -> Result<(Vec<Auditoria>, i64), AppError> {
        let sql = format!("SELECT * FROM auditoria {} ORDER BY created_at DESC LIMIT $4 OFFSET $5", FILTRO_AUDITORIA);
        let itens = sqlx::query_as::<_, Auditoria>(&sql)
            .bind(&filtros.entidade)
            .bind(filtros.registro_id)
            .bind(filtros.admin_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM auditoria {}", FILTRO_AUDITORIA);
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(&filtros.entidade)
            .bind(filtros.registro_id)
            .bind(filtros.admin_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((itens, total))
    }
}
