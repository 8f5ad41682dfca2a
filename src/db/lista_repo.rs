// src/db/lista_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::conflito_se_unico, error::AppError},
    models::lista::{ListaAuxiliar, TipoLista},
};

const MSG_LISTA_DUPLICADA: &str = "Este valor já existe para o tipo informado";

#[derive(Clone)]
pub struct ListaRepository {
    pool: PgPool,
}

impl ListaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_ativos(&self) -> Result<Vec<ListaAuxiliar>, AppError> {
        let itens = sqlx::query_as::<_, ListaAuxiliar>(
            "SELECT * FROM listas_auxiliares WHERE ativo = TRUE ORDER BY tipo, valor",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(itens)
    }

    pub async fn find_by_tipo(&self, tipo: TipoLista, incluir_inativos: bool) -> Result<Vec<ListaAuxiliar>, AppError> {
        let itens = sqlx::query_as::<_, ListaAuxiliar>(
            "SELECT * FROM listas_auxiliares WHERE tipo = $1 AND ($2::bool OR ativo = TRUE) ORDER BY valor",
        )
        .bind(tipo)
        .bind(incluir_inativos)
        .fetch_all(&self.pool)
        .await?;
        Ok(itens)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ListaAuxiliar>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, ListaAuxiliar>("SELECT * FROM listas_auxiliares WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn create<'e, E>(&self, executor: E, tipo: TipoLista, valor: &str) -> Result<ListaAuxiliar, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ListaAuxiliar>(
            "INSERT INTO listas_auxiliares (id, tipo, valor) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(tipo)
        .bind(valor.trim())
        .fetch_one(executor)
        .await
        .map_err(|e| conflito_se_unico(e, MSG_LISTA_DUPLICADA))
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, valor: Option<&str>, ativo: Option<bool>) -> Result<Option<ListaAuxiliar>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ListaAuxiliar>(
            r#"
            UPDATE listas_auxiliares SET
                valor      = COALESCE($2, valor),
                ativo      = COALESCE($3, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(valor.map(str::trim))
        .bind(ativo)
        .fetch_optional(executor)
        .await
        .map_err(|e| conflito_se_unico(e, MSG_LISTA_DUPLICADA))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM listas_auxiliares WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
