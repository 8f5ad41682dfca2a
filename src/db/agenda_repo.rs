// src/db/agenda_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::conflito_por_constraint, error::AppError},
    models::agenda::{Agenda, AgendaComUsuario, AgendaStats, StatusAgenda},
};

pub const MSG_PENDENTE_DUPLICADO: &str = "Já existe um item ATIVO não processado na agenda para este usuário";

const CONSTRAINTS_AGENDA: [(&str, &str); 1] = [("agenda_um_pendente_por_usuario", MSG_PENDENTE_DUPLICADO)];

const FILTRO_AGENDA: &str = r#"
    WHERE ($1::status_agenda IS NULL OR a.status = $1)
      AND ($2::uuid IS NULL OR a.usuario_id = $2)
      AND ($3::bool IS NULL OR a.renovou = $3)
      AND ($4::bool IS NULL OR a.cancelou = $4)
      AND ($5::date IS NULL OR a.data_venc >= $5)
      AND ($6::date IS NULL OR a.data_venc <= $6)
"#;

/// Filtros já resolvidos em datas (a janela é convertida no serviço).
#[derive(Debug, Clone, Default)]
pub struct AgendaConsulta {
    pub status: Option<StatusAgenda>,
    pub usuario_id: Option<Uuid>,
    pub renovou: Option<bool>,
    pub cancelou: Option<bool>,
    pub venc_de: Option<NaiveDate>,
    pub venc_ate: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct AgendaRepository {
    pool: PgPool,
}

impl AgendaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Agenda>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let agenda = sqlx::query_as::<_, Agenda>("SELECT * FROM agenda WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(agenda)
    }

    pub async fn find_by_id_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Agenda>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let agenda = sqlx::query_as::<_, Agenda>("SELECT * FROM agenda WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(agenda)
    }

    pub async fn find_all(&self, consulta: &AgendaConsulta, limit: i64, offset: i64) -> Result<(Vec<AgendaComUsuario>, i64), AppError> {
        let sql = format!(
            r#"
            SELECT a.*, u.email_login, u.nome_completo, u.telefone, u.indicador
            FROM agenda a
            JOIN usuarios u ON u.id = a.usuario_id
            {}
            ORDER BY a.data_venc ASC
            LIMIT $7 OFFSET $8
            "#,
            FILTRO_AGENDA
        );
        let itens = sqlx::query_as::<_, AgendaComUsuario>(&sql)
            .bind(consulta.status)
            .bind(consulta.usuario_id)
            .bind(consulta.renovou)
            .bind(consulta.cancelou)
            .bind(consulta.venc_de)
            .bind(consulta.venc_ate)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM agenda a {}", FILTRO_AGENDA);
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(consulta.status)
            .bind(consulta.usuario_id)
            .bind(consulta.renovou)
            .bind(consulta.cancelou)
            .bind(consulta.venc_de)
            .bind(consulta.venc_ate)
            .fetch_one(&self.pool)
            .await?;

        Ok((itens, total))
    }

    pub async fn find_by_usuario<'e, E>(&self, executor: E, usuario_id: Uuid) -> Result<Vec<Agenda>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let itens = sqlx::query_as::<_, Agenda>("SELECT * FROM agenda WHERE usuario_id = $1 ORDER BY data_venc DESC")
            .bind(usuario_id)
            .fetch_all(executor)
            .await?;
        Ok(itens)
    }

    /// Itens ATIVO ainda não processados de um usuário.
    pub async fn find_pendentes_by_usuario<'e, E>(&self, executor: E, usuario_id: Uuid) -> Result<Vec<Agenda>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let itens = sqlx::query_as::<_, Agenda>(
            r#"
            SELECT * FROM agenda
            WHERE usuario_id = $1 AND status = 'ATIVO' AND renovou = FALSE AND cancelou = FALSE
            ORDER BY data_venc ASC
            "#,
        )
        .bind(usuario_id)
        .fetch_all(executor)
        .await?;
        Ok(itens)
    }

    /// Itens ATIVO; com `apenas_pendentes` exclui renovados e cancelados.
    pub async fn find_ativos<'e, E>(&self, executor: E, apenas_pendentes: bool) -> Result<Vec<Agenda>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let itens = sqlx::query_as::<_, Agenda>(
            r#"
            SELECT * FROM agenda
            WHERE status = 'ATIVO'
              AND ($1::bool = FALSE OR (renovou = FALSE AND cancelou = FALSE))
            ORDER BY data_venc ASC
            "#,
        )
        .bind(apenas_pendentes)
        .fetch_all(executor)
        .await?;
        Ok(itens)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        usuario_id: Uuid,
        data_venc: NaiveDate,
        dias_para_vencer: i32,
        status: StatusAgenda,
        ciclo: i32,
    ) -> Result<Agenda, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Agenda>(
            r#"
            INSERT INTO agenda (id, usuario_id, data_venc, dias_para_vencer, status, ciclo)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(usuario_id)
        .bind(data_venc)
        .bind(dias_para_vencer)
        .bind(status)
        .bind(ciclo)
        .fetch_one(executor)
        .await
        .map_err(|e| conflito_por_constraint(e, &CONSTRAINTS_AGENDA))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data_venc: Option<NaiveDate>,
        dias_para_vencer: Option<i32>,
        status: Option<StatusAgenda>,
        ciclo: Option<i32>,
    ) -> Result<Agenda, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Agenda>(
            r#"
            UPDATE agenda SET
                data_venc        = COALESCE($2, data_venc),
                dias_para_vencer = COALESCE($3, dias_para_vencer),
                status           = COALESCE($4, status),
                ciclo            = COALESCE($5, ciclo),
                updated_at       = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data_venc)
        .bind(dias_para_vencer)
        .bind(status)
        .bind(ciclo)
        .fetch_one(executor)
        .await
        .map_err(|e| conflito_por_constraint(e, &CONSTRAINTS_AGENDA))
    }

    /// Grava a transição de estado do item (flags e status).
    pub async fn set_estado<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        renovou: bool,
        cancelou: bool,
        status: StatusAgenda,
    ) -> Result<Agenda, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Agenda>(
            r#"
            UPDATE agenda SET renovou = $2, cancelou = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(renovou)
        .bind(cancelou)
        .bind(status)
        .fetch_one(executor)
        .await
        .map_err(|e| conflito_por_constraint(e, &CONSTRAINTS_AGENDA))
    }

    pub async fn update_dias<'e, E>(&self, executor: E, id: Uuid, dias_para_vencer: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE agenda SET dias_para_vencer = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(dias_para_vencer)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM agenda WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn stats<'e, E>(
        &self,
        executor: E,
        hoje: NaiveDate,
        limite_7_dias: NaiveDate,
        inicio_mes: NaiveDate,
        fim_mes: NaiveDate,
    ) -> Result<AgendaStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stats = sqlx::query_as::<_, AgendaStats>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'ATIVO' AND NOT renovou AND NOT cancelou) AS total_ativos,
                COUNT(*) FILTER (WHERE status = 'ATIVO' AND NOT renovou AND NOT cancelou AND data_venc < $1) AS vencidos,
                COUNT(*) FILTER (WHERE status = 'ATIVO' AND NOT renovou AND NOT cancelou AND data_venc = $1) AS vencem_hoje,
                COUNT(*) FILTER (WHERE status = 'ATIVO' AND NOT renovou AND NOT cancelou
                                 AND data_venc > $1 AND data_venc <= $2) AS vencem_proximos_7_dias,
                COUNT(*) FILTER (WHERE status = 'ATIVO' AND NOT renovou AND NOT cancelou
                                 AND data_venc BETWEEN $3 AND $4) AS vencem_mes_atual,
                COUNT(*) FILTER (WHERE renovou) AS renovados,
                COUNT(*) FILTER (WHERE cancelou) AS cancelados
            FROM agenda
            "#,
        )
        .bind(hoje)
        .bind(limite_7_dias)
        .bind(inicio_mes)
        .bind(fim_mes)
        .fetch_one(executor)
        .await?;
        Ok(stats)
    }
}
