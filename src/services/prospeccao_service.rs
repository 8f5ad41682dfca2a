// src/services/prospeccao_service.rs

use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProspeccaoRepository, UsuarioRepository},
    models::{
        prospeccao::{
            ConversaoResultado, CreateProspeccaoPayload, Prospeccao, ProspeccaoFiltros, ProspeccaoStats,
            UpdateProspeccaoPayload,
        },
        usuario::CreateUsuarioPayload,
    },
    services::churn_service::percentual,
};

#[derive(Clone)]
pub struct ProspeccaoService {
    pool: PgPool,
    prospeccao_repo: ProspeccaoRepository,
    usuario_repo: UsuarioRepository,
}

impl ProspeccaoService {
    pub fn new(pool: PgPool, prospeccao_repo: ProspeccaoRepository, usuario_repo: UsuarioRepository) -> Self {
        Self { pool, prospeccao_repo, usuario_repo }
    }

    pub async fn find_all(&self, filtros: &ProspeccaoFiltros, limit: i64, offset: i64) -> Result<(Vec<Prospeccao>, i64), AppError> {
        self.prospeccao_repo.find_all(filtros, limit, offset).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Prospeccao, AppError> {
        self.prospeccao_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Prospecção não encontrada"))
    }

    pub async fn find_nao_convertidas(&self) -> Result<Vec<Prospeccao>, AppError> {
        self.prospeccao_repo.find_nao_convertidas(&self.pool).await
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateProspeccaoPayload) -> Result<Prospeccao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.prospeccao_repo.create(executor, payload).await
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateProspeccaoPayload) -> Result<Prospeccao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.prospeccao_repo
            .update(executor, id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("Prospecção não encontrada"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let prospeccao = self
            .prospeccao_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Prospecção não encontrada"))?;
        if prospeccao.convertido {
            return Err(AppError::bad_request("Não é possível excluir uma prospecção já convertida"));
        }

        self.prospeccao_repo.delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Cria o usuário (INATIVO) a partir da prospecção e faz o vínculo.
    pub async fn converter_para_usuario<'e, E>(&self, executor: E, id: Uuid) -> Result<ConversaoResultado, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let prospeccao = self
            .prospeccao_repo
            .find_by_id_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Prospecção não encontrada"))?;
        if prospeccao.convertido {
            return Err(AppError::bad_request("Esta prospecção já foi convertida"));
        }

        if self.usuario_repo.find_by_email(&mut *tx, &prospeccao.email).await?.is_some() {
            return Err(AppError::conflict("Já existe um usuário com este email"));
        }

        let dados = CreateUsuarioPayload {
            email_login: prospeccao.email.clone(),
            nome_completo: prospeccao.nome.clone(),
            telefone: prospeccao.telefone.clone(),
            indicador: prospeccao.indicador.clone(),
            obs: prospeccao.origem.as_ref().map(|o| format!("Convertido de prospecção ({})", o)),
        };
        let usuario = self.usuario_repo.create(&mut *tx, &dados).await?;
        let prospeccao = self.prospeccao_repo.marcar_convertido(&mut *tx, prospeccao.id, usuario.id).await?;

        tx.commit().await?;
        tracing::info!("🎯 Prospecção {} convertida no usuário {}", prospeccao.id, usuario.id);
        Ok(ConversaoResultado { prospeccao, usuario })
    }

    pub async fn get_stats(&self) -> Result<ProspeccaoStats, AppError> {
        let (total, convertidos) = self.prospeccao_repo.contagens(&self.pool).await?;
        let por_origem = self.prospeccao_repo.conversao_por_origem(&self.pool).await?;
        let por_indicador = self.prospeccao_repo.conversao_por_indicador(&self.pool).await?;

        Ok(ProspeccaoStats {
            total,
            convertidos,
            nao_convertidos: total - convertidos,
            taxa_conversao: percentual(convertidos, total),
            por_origem,
            por_indicador,
        })
    }
}
