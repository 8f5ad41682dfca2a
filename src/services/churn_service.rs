// src/services/churn_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{date_utils::hoje, error::AppError},
    db::{AuditoriaRepository, ChurnRepository, UsuarioRepository},
    models::{
        auditoria::AcaoAuditoria,
        churn::{
            Churn, ChurnComUsuario, ChurnFiltros, ChurnMensal, ChurnStats, CreateChurnPayload, ReversaoChurn,
            UpdateChurnPayload, UsuarioEmChurn,
        },
    },
    services::ciclo,
};

/// Percentual com duas casas; zero quando não há base.
pub fn percentual(parte: i64, total: i64) -> Decimal {
    if total <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(parte) * Decimal::from(100) / Decimal::from(total)).round_dp(2)
}

#[derive(Clone)]
pub struct ChurnService {
    pool: PgPool,
    churn_repo: ChurnRepository,
    usuario_repo: UsuarioRepository,
    auditoria_repo: AuditoriaRepository,
}

impl ChurnService {
    pub fn new(
        pool: PgPool,
        churn_repo: ChurnRepository,
        usuario_repo: UsuarioRepository,
        auditoria_repo: AuditoriaRepository,
    ) -> Self {
        Self { pool, churn_repo, usuario_repo, auditoria_repo }
    }

    pub async fn find_all(&self, filtros: &ChurnFiltros, limit: i64, offset: i64) -> Result<(Vec<ChurnComUsuario>, i64), AppError> {
        self.churn_repo.find_all(filtros, limit, offset).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Churn, AppError> {
        self.churn_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Churn não encontrado"))
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateChurnPayload) -> Result<Churn, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let mut usuario = self
            .usuario_repo
            .find_by_id_for_update(&mut *tx, payload.usuario_id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        let churn = self
            .churn_repo
            .create(&mut *tx, usuario.id, payload.data_churn, payload.motivo.as_deref())
            .await?;

        ciclo::registrar_churn(&mut usuario);
        self.usuario_repo.salvar_estado(&mut *tx, &usuario).await?;

        tx.commit().await?;
        tracing::info!("📉 Churn {} registrado para o usuário {}", churn.id, usuario.id);
        Ok(churn)
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateChurnPayload) -> Result<Churn, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.churn_repo
            .update(executor, id, payload.data_churn, payload.motivo.as_deref())
            .await?
            .ok_or_else(|| AppError::not_found("Churn não encontrado"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.churn_repo.delete(executor, id).await? {
            return Err(AppError::not_found("Churn não encontrado"));
        }
        Ok(())
    }

    pub async fn reverter_churn<'e, E>(&self, executor: E, id: Uuid, admin_id: Option<Uuid>) -> Result<ReversaoChurn, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let churn = self
            .churn_repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Churn não encontrado"))?;

        // Usuário antes do churn, mesma ordem de lock dos demais fluxos
        let mut usuario = self
            .usuario_repo
            .find_by_id_for_update(&mut *tx, churn.usuario_id)
            .await?
            .ok_or_else(|| AppError::not_found("Usuário não encontrado"))?;

        let churn = self
            .churn_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Churn não encontrado"))?;
        if churn.revertido {
            return Err(AppError::bad_request("Este churn já foi revertido"));
        }

        let churn = self.churn_repo.marcar_revertido(&mut *tx, churn.id).await?;

        let reativado = ciclo::reativar_apos_churn(&mut usuario, hoje());
        if !reativado {
            tracing::warn!(
                "⚠️ Churn {} revertido, mas o usuário {} não tem vencimento futuro e ficou INATIVO",
                churn.id,
                usuario.id
            );
        }
        let usuario = self.usuario_repo.salvar_estado(&mut *tx, &usuario).await?;

        self.auditoria_repo
            .registrar(
                &mut *tx,
                admin_id,
                AcaoAuditoria::Update,
                "churn",
                churn.id,
                Some(json!({ "acao": "reversao", "usuarioId": usuario.id, "reativado": reativado })),
            )
            .await?;

        tx.commit().await?;
        Ok(ReversaoChurn { churn, usuario, reativado })
    }

    pub async fn get_stats(&self) -> Result<ChurnStats, AppError> {
        let (total, revertidos) = self.churn_repo.contagens(&self.pool).await?;
        let churn_por_motivo = self.churn_repo.por_motivo(&self.pool).await?;

        Ok(ChurnStats {
            total_churns: total,
            churn_ativos: total - revertidos,
            churn_revertidos: revertidos,
            taxa_reversao: percentual(revertidos, total),
            churn_por_motivo,
        })
    }

    pub async fn relatorio_mensal(&self, ano: Option<i32>) -> Result<Vec<ChurnMensal>, AppError> {
        self.churn_repo.relatorio_mensal(&self.pool, ano).await
    }

    pub async fn usuarios_em_churn(&self) -> Result<Vec<UsuarioEmChurn>, AppError> {
        self.churn_repo.usuarios_em_churn(&self.pool, hoje()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn percentual_arredonda_em_duas_casas() {
        assert_eq!(percentual(1, 3), Decimal::from_str("33.33").unwrap());
        assert_eq!(percentual(2, 4), Decimal::from(50));
    }

    #[test]
    fn percentual_sem_base_e_zero() {
        assert_eq!(percentual(0, 0), Decimal::ZERO);
    }
}
